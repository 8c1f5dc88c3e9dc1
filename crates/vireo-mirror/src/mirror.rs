//! The mirror container and its codecs.

use rand::{Rng, RngExt};

use vireo_core::error::AccessError;
use vireo_core::{AttrDef, HostData, Layout, Schema, Shape, SliceSpec};

/// Host-side structured container: one flat slot buffer per attribute.
///
/// Constructed from the same schema and shape as the device field, so
/// the two layouts agree by construction. All codecs address slots in
/// schema declaration order, instances row-major, lanes contiguous.
#[derive(Clone, Debug)]
pub struct TypedBufferMirror {
    schema: Schema,
    shape: Shape,
    layout: Layout,
    data: HostData,
}

impl TypedBufferMirror {
    /// Allocate a zero-filled mirror for a schema bound to a shape.
    pub fn new(schema: Schema, shape: Shape) -> Self {
        let layout = Layout::of(&schema, &shape);
        let data = HostData::zeroed(&layout);
        Self {
            schema,
            shape,
            layout,
            data,
        }
    }

    /// Total scalar slot count across all attributes.
    pub fn size(&self) -> usize {
        self.layout.total_slots()
    }

    /// Slot count of one attribute across all instances.
    pub fn attr_size(&self, attr: &str) -> Result<usize, AccessError> {
        self.layout
            .attr_slots(attr)
            .ok_or_else(|| AccessError::UnknownName { name: attr.into() })
    }

    /// The schema this mirror was built from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The shape this mirror was built from.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The per-attribute slot layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn attr_def(&self, attr: &str) -> Result<&AttrDef, AccessError> {
        self.schema
            .get(attr)
            .ok_or_else(|| AccessError::UnknownName { name: attr.into() })
    }

    /// Fill every attribute with independent uniform draws from its
    /// declared [min, max] bound (inclusive), quantized to its host
    /// scalar.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for (name, def) in self.schema.iter() {
            let scalar = def.elem.host_scalar().unwrap_or(vireo_core::HostScalar::F32);
            let buf = self
                .data
                .attr_mut(name)
                .unwrap_or_else(|| unreachable!("mirror buffer missing for '{name}'"));
            for slot in buf.iter_mut() {
                *slot = scalar.quantize(rng.random_range(def.min..=def.max));
            }
        }
    }

    /// Bulk snapshot of every buffer, in the device-compatible layout.
    pub fn get_data(&self) -> HostData {
        self.data.clone()
    }

    /// Bulk overwrite from a device snapshot. Verbatim: no clamping or
    /// quantization, so readback never alters kernel output.
    ///
    /// Fails with [`AccessError::ShapeMismatch`] if the snapshot's
    /// layout disagrees with the mirror's.
    pub fn set_data(&mut self, data: &HostData) -> Result<(), AccessError> {
        data.check_layout(&self.layout)?;
        self.data = data.clone();
        Ok(())
    }

    // ---- whole-block codec ----

    /// Extract every slot: attributes in declaration order, instances
    /// row-major, lanes contiguous.
    pub fn to_vector(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.size());
        for (_, buf) in self.data.iter() {
            out.extend_from_slice(buf);
        }
        out
    }

    /// Overwrite every slot from a flat vector in
    /// [`to_vector`](TypedBufferMirror::to_vector) order.
    ///
    /// Length-checked against the whole-block size before any write.
    pub fn from_vector(&mut self, vec: &[f32]) -> Result<(), AccessError> {
        let expected = self.size();
        if vec.len() != expected {
            return Err(AccessError::SizeMismatch {
                expected,
                actual: vec.len(),
            });
        }
        let mut offset = 0;
        for (name, def) in self.schema.iter() {
            let scalar = def.elem.host_scalar().unwrap_or(vireo_core::HostScalar::F32);
            let buf = self
                .data
                .attr_mut(name)
                .unwrap_or_else(|| unreachable!("mirror buffer missing for '{name}'"));
            let len = buf.len();
            for (slot, v) in buf.iter_mut().zip(&vec[offset..offset + len]) {
                *slot = scalar.quantize(*v);
            }
            offset += len;
        }
        Ok(())
    }

    // ---- per-attribute codec ----

    /// Extract one attribute across all instances.
    pub fn attr_to_vector(&self, attr: &str) -> Result<Vec<f32>, AccessError> {
        self.attr_def(attr)?;
        Ok(self
            .data
            .attr(attr)
            .map(<[f32]>::to_vec)
            .unwrap_or_default())
    }

    /// Overwrite one attribute across all instances.
    pub fn attr_from_vector(&mut self, attr: &str, vec: &[f32]) -> Result<(), AccessError> {
        let def = *self.attr_def(attr)?;
        let expected = self.attr_size(attr)?;
        if vec.len() != expected {
            return Err(AccessError::SizeMismatch {
                expected,
                actual: vec.len(),
            });
        }
        let scalar = def.elem.host_scalar().unwrap_or(vireo_core::HostScalar::F32);
        let buf = self
            .data
            .attr_mut(attr)
            .unwrap_or_else(|| unreachable!("mirror buffer missing for '{attr}'"));
        for (slot, v) in buf.iter_mut().zip(vec) {
            *slot = scalar.quantize(*v);
        }
        Ok(())
    }

    // ---- slice codecs ----

    /// Size of the region a slice addresses across all attributes.
    pub fn slice_size(&self, spec: &SliceSpec) -> Result<usize, AccessError> {
        let plan = spec.resolve(&self.shape)?;
        Ok(plan.instance_count * self.schema.slots_per_instance())
    }

    /// Extract a sub-range of instances across all attributes.
    pub fn slice_to_vector(&self, spec: &SliceSpec) -> Result<Vec<f32>, AccessError> {
        let plan = spec.resolve(&self.shape)?;
        let mut out = Vec::with_capacity(plan.instance_count * self.schema.slots_per_instance());
        for (name, def) in self.schema.iter() {
            let lanes = def.slots_per_instance();
            let buf = self.data.attr(name).unwrap_or_default();
            for &rank in &plan.ranks {
                out.extend_from_slice(&buf[rank * lanes..(rank + 1) * lanes]);
            }
        }
        Ok(out)
    }

    /// Overwrite a sub-range of instances across all attributes.
    ///
    /// Length-checked against the addressed region before any write.
    pub fn slice_from_vector(&mut self, spec: &SliceSpec, vec: &[f32]) -> Result<(), AccessError> {
        let plan = spec.resolve(&self.shape)?;
        let expected = plan.instance_count * self.schema.slots_per_instance();
        if vec.len() != expected {
            return Err(AccessError::SizeMismatch {
                expected,
                actual: vec.len(),
            });
        }
        let mut offset = 0;
        for (name, def) in self.schema.iter() {
            let lanes = def.slots_per_instance();
            let scalar = def.elem.host_scalar().unwrap_or(vireo_core::HostScalar::F32);
            let buf = self
                .data
                .attr_mut(name)
                .unwrap_or_else(|| unreachable!("mirror buffer missing for '{name}'"));
            for &rank in &plan.ranks {
                for lane in 0..lanes {
                    buf[rank * lanes + lane] = scalar.quantize(vec[offset]);
                    offset += 1;
                }
            }
        }
        Ok(())
    }

    /// Extract a sub-range of instances of one attribute.
    pub fn attr_slice_to_vector(
        &self,
        attr: &str,
        spec: &SliceSpec,
    ) -> Result<Vec<f32>, AccessError> {
        let def = *self.attr_def(attr)?;
        let plan = spec.resolve(&self.shape)?;
        let lanes = def.slots_per_instance();
        let buf = self.data.attr(attr).unwrap_or_default();
        let mut out = Vec::with_capacity(plan.instance_count * lanes);
        for &rank in &plan.ranks {
            out.extend_from_slice(&buf[rank * lanes..(rank + 1) * lanes]);
        }
        Ok(out)
    }

    /// Overwrite a sub-range of instances of one attribute.
    pub fn attr_slice_from_vector(
        &mut self,
        attr: &str,
        spec: &SliceSpec,
        vec: &[f32],
    ) -> Result<(), AccessError> {
        let def = *self.attr_def(attr)?;
        let plan = spec.resolve(&self.shape)?;
        let lanes = def.slots_per_instance();
        let expected = plan.instance_count * lanes;
        if vec.len() != expected {
            return Err(AccessError::SizeMismatch {
                expected,
                actual: vec.len(),
            });
        }
        let scalar = def.elem.host_scalar().unwrap_or(vireo_core::HostScalar::F32);
        let buf = self
            .data
            .attr_mut(attr)
            .unwrap_or_else(|| unreachable!("mirror buffer missing for '{attr}'"));
        for (i, &rank) in plan.ranks.iter().enumerate() {
            for lane in 0..lanes {
                buf[rank * lanes + lane] = scalar.quantize(vec[i * lanes + lane]);
            }
        }
        Ok(())
    }

    // ---- point and instance access (external-protocol write path) ----

    /// Read one instance's lanes of one attribute.
    pub fn get_point(&self, attr: &str, rank: usize) -> Result<&[f32], AccessError> {
        let def = *self.attr_def(attr)?;
        let lanes = def.slots_per_instance();
        let buf = self.data.attr(attr).unwrap_or_default();
        if (rank + 1) * lanes > buf.len() {
            return Err(AccessError::OutOfBounds {
                index: vec![rank as i32],
            });
        }
        Ok(&buf[rank * lanes..(rank + 1) * lanes])
    }

    /// Overwrite one instance's lanes of one attribute, quantized and
    /// clamped to the declared bound.
    pub fn set_point(&mut self, attr: &str, rank: usize, lanes_in: &[f32]) -> Result<(), AccessError> {
        self.write_instances(attr, &[rank], lanes_in)
    }

    /// Read the given instances of one attribute, in the order given.
    pub fn read_instances(&self, attr: &str, ranks: &[usize]) -> Result<Vec<f32>, AccessError> {
        let def = *self.attr_def(attr)?;
        let lanes = def.slots_per_instance();
        let buf = self.data.attr(attr).unwrap_or_default();
        let mut out = Vec::with_capacity(ranks.len() * lanes);
        for &rank in ranks {
            if (rank + 1) * lanes > buf.len() {
                return Err(AccessError::OutOfBounds {
                    index: vec![rank as i32],
                });
            }
            out.extend_from_slice(&buf[rank * lanes..(rank + 1) * lanes]);
        }
        Ok(out)
    }

    /// Overwrite the given instances of one attribute, quantized and
    /// clamped to the declared bound. Length-checked before any write.
    pub fn write_instances(
        &mut self,
        attr: &str,
        ranks: &[usize],
        values: &[f32],
    ) -> Result<(), AccessError> {
        let def = *self.attr_def(attr)?;
        let lanes = def.slots_per_instance();
        let expected = ranks.len() * lanes;
        if values.len() != expected {
            return Err(AccessError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        let instances = self.shape.instance_count();
        if let Some(&bad) = ranks.iter().find(|&&r| r >= instances) {
            return Err(AccessError::OutOfBounds {
                index: vec![bad as i32],
            });
        }
        let scalar = def.elem.host_scalar().unwrap_or(vireo_core::HostScalar::F32);
        let buf = self
            .data
            .attr_mut(attr)
            .unwrap_or_else(|| unreachable!("mirror buffer missing for '{attr}'"));
        for (i, &rank) in ranks.iter().enumerate() {
            for lane in 0..lanes {
                let v = values[i * lanes + lane].clamp(def.min, def.max);
                buf[rank * lanes + lane] = scalar.quantize(v);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use vireo_core::{DimRange, ElemType};

    fn xy_mirror(n: usize) -> TypedBufferMirror {
        let schema = Schema::new()
            .with("x", AttrDef::new(ElemType::F32, -1.0, 1.0))
            .unwrap()
            .with("y", AttrDef::new(ElemType::F32, -1.0, 1.0))
            .unwrap();
        TypedBufferMirror::new(schema, Shape::new([n]).unwrap())
    }

    #[test]
    fn size_is_sum_of_attr_sizes() {
        let m = xy_mirror(4);
        assert_eq!(m.size(), 8);
        assert_eq!(m.attr_size("x").unwrap(), 4);
        assert_eq!(m.attr_size("y").unwrap(), 4);
        assert_eq!(m.to_vector().len(), m.size());
    }

    #[test]
    fn from_vector_rejects_wrong_length_without_mutation() {
        let mut m = xy_mirror(4);
        let before = m.to_vector();
        let err = m.from_vector(&[1.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            AccessError::SizeMismatch {
                expected: 8,
                actual: 5
            }
        ));
        assert_eq!(m.to_vector(), before);
    }

    #[test]
    fn attr_round_trip_leaves_other_attr_untouched() {
        let mut m = xy_mirror(3);
        m.attr_from_vector("x", &[0.1, 0.2, 0.3]).unwrap();
        m.attr_from_vector("y", &[0.9, 0.8, 0.7]).unwrap();
        let x = m.attr_to_vector("x").unwrap();
        m.attr_from_vector("x", &x).unwrap();
        assert_eq!(m.attr_to_vector("y").unwrap(), vec![0.9, 0.8, 0.7]);
    }

    #[test]
    fn slice_order_is_attr_major_instances_row_major() {
        let schema = Schema::new()
            .with("a", AttrDef::new(ElemType::F32, 0.0, 100.0))
            .unwrap()
            .with("b", AttrDef::new(ElemType::F32, 0.0, 100.0))
            .unwrap();
        let mut m = TypedBufferMirror::new(schema, Shape::new([4]).unwrap());
        m.from_vector(&[0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0])
            .unwrap();
        let spec = SliceSpec::new([DimRange::span(1, 3)]);
        assert_eq!(m.slice_to_vector(&spec).unwrap(), vec![1.0, 2.0, 11.0, 12.0]);
    }

    #[test]
    fn slice_from_vector_rejects_wrong_length_without_mutation() {
        let mut m = xy_mirror(4);
        let before = m.to_vector();
        let spec = SliceSpec::new([DimRange::span(0, 2)]);
        // the slice addresses 2 instances x 2 attrs = 4 slots
        let err = m.slice_from_vector(&spec, &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            AccessError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        ));
        assert_eq!(m.to_vector(), before);
    }

    #[test]
    fn attr_slice_round_trip() {
        let mut m = xy_mirror(4);
        m.attr_from_vector("x", &[0.0, 0.25, 0.5, 0.75]).unwrap();
        let spec = SliceSpec::new([DimRange::span(1, 3)]);
        let mid = m.attr_slice_to_vector("x", &spec).unwrap();
        assert_eq!(mid, vec![0.25, 0.5]);
        m.attr_slice_from_vector("x", &spec, &[-0.25, -0.5]).unwrap();
        assert_eq!(
            m.attr_to_vector("x").unwrap(),
            vec![0.0, -0.25, -0.5, 0.75]
        );
    }

    #[test]
    fn point_writes_clamp_to_declared_bound() {
        let mut m = xy_mirror(4);
        m.set_point("x", 2, &[7.5]).unwrap();
        assert_eq!(m.get_point("x", 2).unwrap(), &[1.0]);
        m.set_point("x", 2, &[-7.5]).unwrap();
        assert_eq!(m.get_point("x", 2).unwrap(), &[-1.0]);
    }

    #[test]
    fn integer_attrs_quantize_on_write() {
        let schema = Schema::new()
            .with("species", AttrDef::new(ElemType::I32, 0.0, 5.0))
            .unwrap();
        let mut m = TypedBufferMirror::new(schema, Shape::new([2]).unwrap());
        m.from_vector(&[1.4, 2.6]).unwrap();
        assert_eq!(m.to_vector(), vec![1.0, 3.0]);
    }

    #[test]
    fn vector_lanes_are_contiguous_per_instance() {
        let schema = Schema::new()
            .with("pos", AttrDef::new(ElemType::Vec2, -10.0, 10.0))
            .unwrap();
        let mut m = TypedBufferMirror::new(schema, Shape::new([2]).unwrap());
        m.from_vector(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.get_point("pos", 0).unwrap(), &[1.0, 2.0]);
        assert_eq!(m.get_point("pos", 1).unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn out_of_range_rank_rejected() {
        let mut m = xy_mirror(4);
        assert!(matches!(
            m.set_point("x", 4, &[0.0]),
            Err(AccessError::OutOfBounds { .. })
        ));
        assert!(matches!(
            m.write_instances("x", &[1, 9], &[0.0, 0.0]),
            Err(AccessError::OutOfBounds { .. })
        ));
    }

    proptest! {
        #[test]
        fn randomize_respects_declared_bounds(seed in any::<u64>(), n in 1usize..32) {
            let mut m = xy_mirror(n);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            m.randomize(&mut rng);
            for v in m.to_vector() {
                prop_assert!((-1.0..=1.0).contains(&v));
            }
        }

        #[test]
        fn from_to_vector_is_identity(vals in prop::collection::vec(-1.0f32..=1.0, 8)) {
            let mut m = xy_mirror(4);
            m.from_vector(&vals).unwrap();
            prop_assert_eq!(m.to_vector(), vals);
        }

        #[test]
        fn reapplying_own_vector_is_idempotent(seed in any::<u64>()) {
            let mut m = xy_mirror(6);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            m.randomize(&mut rng);
            let first = m.to_vector();
            m.from_vector(&first).unwrap();
            prop_assert_eq!(m.to_vector(), first);
        }
    }
}
