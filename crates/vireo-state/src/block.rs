//! State blocks: one named, schema-defined structured state instance.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use vireo_core::error::{AccessError, SpecError};
use vireo_core::{
    AccessFlags, HostData, MappingLayer, RouteTable, RoutingLayer, Schema, Shape, SliceSpec,
};
use vireo_device::{Backend, DeviceField};
use vireo_mirror::TypedBufferMirror;

use crate::accessors;

/// A named per-attribute behavior extension.
///
/// The closed replacement for dynamically attached struct methods: a
/// host-side operation over one attribute's slots, supplied at block
/// construction and resolved against the schema exactly once. Invoked
/// on demand via [`StateBlock::apply_extension`], between a device pull
/// and a device push, so it composes with kernel writes.
pub struct AttrExtension {
    /// The attribute the operation applies to.
    pub attr: String,
    /// The operation over the attribute's flat slots.
    pub op: Box<dyn FnMut(&mut [f32])>,
}

/// Declarative specification of one state block.
///
/// `shape` defaults to the scalar shape `(1,)`; `randomize` defaults to
/// true, filling the block with in-bounds values at creation.
pub struct BlockSpec {
    /// Attribute declarations, in order.
    pub schema: Schema,
    /// Instance extent; `None` means scalar.
    pub shape: Option<Shape>,
    /// Per-protocol accessor capability flags.
    pub flags: AccessFlags,
    /// Randomize the block immediately after allocation.
    pub randomize: bool,
    /// Named behavior extensions, resolved at construction.
    pub extensions: IndexMap<String, AttrExtension>,
}

impl BlockSpec {
    /// Spec with the given schema, scalar shape, no external access,
    /// and randomize-on-create.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            shape: None,
            flags: AccessFlags::none(),
            randomize: true,
            extensions: IndexMap::new(),
        }
    }

    /// Set the shape.
    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Set the accessor capability flags.
    pub fn flags(mut self, flags: AccessFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Disable randomize-on-create, leaving the block zero-filled.
    pub fn zeroed(mut self) -> Self {
        self.randomize = false;
        self
    }

    /// Attach a named behavior extension.
    pub fn extension(mut self, name: impl Into<String>, ext: AttrExtension) -> Self {
        self.extensions.insert(name.into(), ext);
        self
    }
}

/// The mutable heart of a block, shared with its generated handlers.
pub(crate) struct BlockCore {
    pub(crate) name: String,
    pub(crate) mirror: TypedBufferMirror,
    pub(crate) device: Box<dyn DeviceField>,
    rng: ChaCha8Rng,
    extensions: IndexMap<String, AttrExtension>,
}

impl BlockCore {
    /// Push the host mirror into the device field.
    pub(crate) fn sync_to_device(&mut self) -> Result<(), AccessError> {
        self.device.field_from_host(&self.mirror.get_data())
    }

    /// Pull the device field into the host mirror.
    pub(crate) fn sync_from_device(&mut self) -> Result<(), AccessError> {
        let mut data = self.mirror.get_data();
        self.device.host_from_field(&mut data)?;
        self.mirror.set_data(&data)
    }

    pub(crate) fn randomize(&mut self) -> Result<(), AccessError> {
        self.mirror.randomize(&mut self.rng);
        self.sync_to_device()
    }

    pub(crate) fn to_vector(&mut self) -> Result<Vec<f32>, AccessError> {
        self.sync_from_device()?;
        Ok(self.mirror.to_vector())
    }

    pub(crate) fn from_vector(&mut self, vec: &[f32]) -> Result<(), AccessError> {
        let expected = self.mirror.size();
        if vec.len() != expected {
            return Err(AccessError::SizeMismatch {
                expected,
                actual: vec.len(),
            });
        }
        self.sync_from_device()?;
        self.mirror.from_vector(vec)?;
        self.sync_to_device()
    }

    pub(crate) fn attr_to_vector(&mut self, attr: &str) -> Result<Vec<f32>, AccessError> {
        self.sync_from_device()?;
        self.mirror.attr_to_vector(attr)
    }

    pub(crate) fn attr_from_vector(&mut self, attr: &str, vec: &[f32]) -> Result<(), AccessError> {
        let expected = self.mirror.attr_size(attr)?;
        if vec.len() != expected {
            return Err(AccessError::SizeMismatch {
                expected,
                actual: vec.len(),
            });
        }
        self.sync_from_device()?;
        self.mirror.attr_from_vector(attr, vec)?;
        self.sync_to_device()
    }

    pub(crate) fn slice_to_vector(&mut self, spec: &SliceSpec) -> Result<Vec<f32>, AccessError> {
        self.sync_from_device()?;
        self.mirror.slice_to_vector(spec)
    }

    pub(crate) fn slice_from_vector(
        &mut self,
        spec: &SliceSpec,
        vec: &[f32],
    ) -> Result<(), AccessError> {
        let expected = self.mirror.slice_size(spec)?;
        if vec.len() != expected {
            return Err(AccessError::SizeMismatch {
                expected,
                actual: vec.len(),
            });
        }
        self.sync_from_device()?;
        self.mirror.slice_from_vector(spec, vec)?;
        self.sync_to_device()
    }

    pub(crate) fn attr_slice_to_vector(
        &mut self,
        attr: &str,
        spec: &SliceSpec,
    ) -> Result<Vec<f32>, AccessError> {
        self.sync_from_device()?;
        self.mirror.attr_slice_to_vector(attr, spec)
    }

    pub(crate) fn attr_slice_from_vector(
        &mut self,
        attr: &str,
        spec: &SliceSpec,
        vec: &[f32],
    ) -> Result<(), AccessError> {
        self.sync_from_device()?;
        self.mirror.attr_slice_from_vector(attr, spec, vec)?;
        self.sync_to_device()
    }

    /// Read one attribute's lanes at a coordinate, device-synchronized.
    pub(crate) fn get(&mut self, coord: &[usize], attr: &str) -> Result<Vec<f32>, AccessError> {
        self.sync_from_device()?;
        let rank = self.rank(coord)?;
        Ok(self.mirror.get_point(attr, rank)?.to_vec())
    }

    /// Write every attribute's lanes at one coordinate.
    pub(crate) fn set_idx(&mut self, coord: &[usize], values: &[f32]) -> Result<(), AccessError> {
        let rank = self.rank(coord)?;
        self.write_ranks(&[rank], values)
    }

    /// Write every attribute across one row of a matrix block.
    pub(crate) fn set_row(&mut self, row: usize, values: &[f32]) -> Result<(), AccessError> {
        let ranks = self.row_ranks(row)?;
        self.write_ranks(&ranks, values)
    }

    /// Write every attribute across one column of a matrix block.
    pub(crate) fn set_col(&mut self, col: usize, values: &[f32]) -> Result<(), AccessError> {
        let ranks = self.col_ranks(col)?;
        self.write_ranks(&ranks, values)
    }

    /// Write the entire block (equivalent to `from_vector` but in
    /// instance-major order, matching the other positional setters).
    pub(crate) fn set_all(&mut self, values: &[f32]) -> Result<(), AccessError> {
        let ranks: Vec<usize> = (0..self.mirror.shape().instance_count()).collect();
        self.write_ranks(&ranks, values)
    }

    pub(crate) fn set_attr_idx(
        &mut self,
        attr: &str,
        coord: &[usize],
        values: &[f32],
    ) -> Result<(), AccessError> {
        let rank = self.rank(coord)?;
        self.write_attr_ranks(attr, &[rank], values)
    }

    pub(crate) fn set_attr_row(
        &mut self,
        attr: &str,
        row: usize,
        values: &[f32],
    ) -> Result<(), AccessError> {
        let ranks = self.row_ranks(row)?;
        self.write_attr_ranks(attr, &ranks, values)
    }

    pub(crate) fn set_attr_col(
        &mut self,
        attr: &str,
        col: usize,
        values: &[f32],
    ) -> Result<(), AccessError> {
        let ranks = self.col_ranks(col)?;
        self.write_attr_ranks(attr, &ranks, values)
    }

    pub(crate) fn set_attr_all(&mut self, attr: &str, values: &[f32]) -> Result<(), AccessError> {
        let ranks: Vec<usize> = (0..self.mirror.shape().instance_count()).collect();
        self.write_attr_ranks(attr, &ranks, values)
    }

    /// Run a named behavior extension over its attribute, between a
    /// device pull and a device push.
    pub(crate) fn apply_extension(&mut self, name: &str) -> Result<(), AccessError> {
        if !self.extensions.contains_key(name) {
            return Err(AccessError::UnknownName { name: name.into() });
        }
        self.sync_from_device()?;
        let ext = self
            .extensions
            .get_mut(name)
            .unwrap_or_else(|| unreachable!("extension '{name}' vanished"));
        let mut values = self.mirror.attr_to_vector(&ext.attr)?;
        (ext.op)(&mut values);
        self.mirror.attr_from_vector(&ext.attr, &values)?;
        self.sync_to_device()
    }

    // ---- addressing helpers ----

    fn rank(&self, coord: &[usize]) -> Result<usize, AccessError> {
        self.mirror
            .shape()
            .rank_of(coord)
            .ok_or_else(|| AccessError::OutOfBounds {
                index: coord.iter().map(|&c| c as i32).collect(),
            })
    }

    fn row_ranks(&self, row: usize) -> Result<Vec<usize>, AccessError> {
        let shape = self.mirror.shape();
        let (rows, cols) = match (shape.rows(), shape.cols()) {
            (Some(r), Some(c)) => (r, c),
            _ => {
                return Err(AccessError::BadSlice {
                    reason: format!("row access requires a matrix shape, block is {shape}"),
                })
            }
        };
        if row >= rows {
            return Err(AccessError::OutOfBounds {
                index: vec![row as i32],
            });
        }
        Ok((row * cols..(row + 1) * cols).collect())
    }

    fn col_ranks(&self, col: usize) -> Result<Vec<usize>, AccessError> {
        let shape = self.mirror.shape();
        let (rows, cols) = match (shape.rows(), shape.cols()) {
            (Some(r), Some(c)) => (r, c),
            _ => {
                return Err(AccessError::BadSlice {
                    reason: format!("column access requires a matrix shape, block is {shape}"),
                })
            }
        };
        if col >= cols {
            return Err(AccessError::OutOfBounds {
                index: vec![col as i32],
            });
        }
        Ok((0..rows).map(|r| r * cols + col).collect())
    }

    /// Write all attributes at the given instances: values are
    /// instance-major, attributes in declaration order within each
    /// instance.
    fn write_ranks(&mut self, ranks: &[usize], values: &[f32]) -> Result<(), AccessError> {
        let spi = self.mirror.schema().slots_per_instance();
        let expected = ranks.len() * spi;
        if values.len() != expected {
            return Err(AccessError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        self.sync_from_device()?;
        let attrs: Vec<(String, usize)> = self
            .mirror
            .schema()
            .iter()
            .map(|(n, d)| (n.to_string(), d.slots_per_instance()))
            .collect();
        for (i, &rank) in ranks.iter().enumerate() {
            let mut offset = i * spi;
            for (attr, lanes) in &attrs {
                self.mirror
                    .set_point(attr, rank, &values[offset..offset + lanes])?;
                offset += lanes;
            }
        }
        self.sync_to_device()
    }

    fn write_attr_ranks(
        &mut self,
        attr: &str,
        ranks: &[usize],
        values: &[f32],
    ) -> Result<(), AccessError> {
        self.sync_from_device()?;
        self.mirror.write_instances(attr, ranks, values)?;
        self.sync_to_device()
    }
}

/// One named, schema-defined structured state instance.
///
/// Owns the device field, the host mirror, and the generated accessors.
/// All mutation goes through interior mutability so that generated
/// protocol handlers and direct callers share the same core; the
/// surrounding runtime serializes access.
pub struct StateBlock {
    name: String,
    schema: Schema,
    shape: Shape,
    size: usize,
    flags: AccessFlags,
    routes: RouteTable,
    core: Rc<RefCell<BlockCore>>,
}

impl std::fmt::Debug for StateBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateBlock")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("shape", &self.shape)
            .field("size", &self.size)
            .field("flags", &self.flags)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl StateBlock {
    /// Construct a block and generate its protocol accessors.
    ///
    /// Construction is all-or-nothing: every validation (name, schema,
    /// shape, element types, extensions, route table) happens before
    /// the block allocates device storage or registers anything with a
    /// protocol layer.
    pub fn new(
        name: impl Into<String>,
        spec: BlockSpec,
        backend: &dyn Backend,
        seed: u64,
        mapping: Option<&mut dyn MappingLayer>,
        routing: Option<&mut dyn RoutingLayer>,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SpecError::InvalidSpec {
                reason: "state must have a name".into(),
            });
        }
        if spec.schema.is_empty() {
            return Err(SpecError::InvalidSpec {
                reason: format!("state '{name}' has an empty schema"),
            });
        }
        let shape = spec.shape.unwrap_or_else(Shape::scalar);
        for (_, ext) in spec.extensions.iter() {
            if spec.schema.get(&ext.attr).is_none() {
                return Err(SpecError::UnknownName {
                    name: ext.attr.clone(),
                });
            }
        }
        let routes = RouteTable::build(&name, &spec.schema)?;

        let device = backend.allocate(&spec.schema, &shape)?;
        let mirror = TypedBufferMirror::new(spec.schema.clone(), shape.clone());
        let size = mirror.size();

        let core = Rc::new(RefCell::new(BlockCore {
            name: name.clone(),
            mirror,
            device,
            rng: ChaCha8Rng::seed_from_u64(seed),
            extensions: spec.extensions,
        }));

        if spec.randomize {
            core.borrow_mut().randomize().map_err(|e| SpecError::InvalidSpec {
                reason: format!("initial randomize of '{name}' failed: {e}"),
            })?;
        }

        accessors::generate(&core, &routes, &spec.schema, &shape, spec.flags, mapping, routing);

        Ok(Self {
            name,
            schema: spec.schema,
            shape,
            size,
            flags: spec.flags,
            routes,
            core,
        })
    }

    /// The block's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema the block was declared with.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The block's instance extent.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Total scalar element count; fixed for the block's lifetime and
    /// always equal to the host mirror's size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The accessor capability flags the block was declared with.
    pub fn flags(&self) -> AccessFlags {
        self.flags
    }

    /// The block's canonical accessor route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub(crate) fn core(&self) -> &Rc<RefCell<BlockCore>> {
        &self.core
    }

    fn diag<T>(&self, op: &str, res: Result<T, AccessError>) -> Result<T, AccessError> {
        if let Err(e) = &res {
            log::warn!("[vireo.state] {}.{op}: {}: {e}", self.name, e.category());
        }
        res
    }

    /// Fill the host mirror with uniform in-bounds draws and push the
    /// result to the device field.
    pub fn randomize(&self) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().randomize();
        self.diag("randomize", res)
    }

    /// Push the host mirror into the device field.
    pub fn sync_to_device(&self) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().sync_to_device();
        self.diag("sync_to_device", res)
    }

    /// Pull the device field into the host mirror.
    pub fn sync_from_device(&self) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().sync_from_device();
        self.diag("sync_from_device", res)
    }

    /// Extract the whole block as a flat vector, device-synchronized.
    pub fn to_vector(&self) -> Result<Vec<f32>, AccessError> {
        let res = self.core.borrow_mut().to_vector();
        self.diag("to_vector", res)
    }

    /// Overwrite the whole block from a flat vector and push to device.
    pub fn from_vector(&self, vec: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().from_vector(vec);
        self.diag("from_vector", res)
    }

    /// Extract one attribute across all instances.
    pub fn attr_to_vector(&self, attr: &str) -> Result<Vec<f32>, AccessError> {
        let res = self.core.borrow_mut().attr_to_vector(attr);
        self.diag("attr_to_vector", res)
    }

    /// Overwrite one attribute across all instances.
    pub fn attr_from_vector(&self, attr: &str, vec: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().attr_from_vector(attr, vec);
        self.diag("attr_from_vector", res)
    }

    /// Extract a sub-range of instances across all attributes.
    pub fn slice_to_vector(&self, spec: &SliceSpec) -> Result<Vec<f32>, AccessError> {
        let res = self.core.borrow_mut().slice_to_vector(spec);
        self.diag("slice_to_vector", res)
    }

    /// Overwrite a sub-range of instances across all attributes.
    pub fn slice_from_vector(&self, spec: &SliceSpec, vec: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().slice_from_vector(spec, vec);
        self.diag("slice_from_vector", res)
    }

    /// Extract a sub-range of instances of one attribute.
    pub fn attr_slice_to_vector(
        &self,
        attr: &str,
        spec: &SliceSpec,
    ) -> Result<Vec<f32>, AccessError> {
        let res = self.core.borrow_mut().attr_slice_to_vector(attr, spec);
        self.diag("attr_slice_to_vector", res)
    }

    /// Overwrite a sub-range of instances of one attribute.
    pub fn attr_slice_from_vector(
        &self,
        attr: &str,
        spec: &SliceSpec,
        vec: &[f32],
    ) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().attr_slice_from_vector(attr, spec, vec);
        self.diag("attr_slice_from_vector", res)
    }

    /// Read one attribute's lanes at a coordinate, device-synchronized.
    ///
    /// The coordinate's dimensionality must match the block's shape.
    pub fn get(&self, coord: &[usize], attr: &str) -> Result<Vec<f32>, AccessError> {
        let res = self.core.borrow_mut().get(coord, attr);
        self.diag("get", res)
    }

    /// Write every attribute's lanes at one coordinate, then sync.
    pub fn set_idx(&self, coord: &[usize], values: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().set_idx(coord, values);
        self.diag("set_idx", res)
    }

    /// Write one row of a matrix block across all attributes, then sync.
    pub fn set_row(&self, row: usize, values: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().set_row(row, values);
        self.diag("set_row", res)
    }

    /// Write one column of a matrix block across all attributes, then sync.
    pub fn set_col(&self, col: usize, values: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().set_col(col, values);
        self.diag("set_col", res)
    }

    /// Write the entire block in instance-major order, then sync.
    pub fn set_all(&self, values: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().set_all(values);
        self.diag("set_all", res)
    }

    /// Write one attribute's lanes at one coordinate, then sync.
    pub fn set_attr_idx(&self, attr: &str, coord: &[usize], values: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().set_attr_idx(attr, coord, values);
        self.diag("set_attr_idx", res)
    }

    /// Write one attribute across one row, then sync.
    pub fn set_attr_row(&self, attr: &str, row: usize, values: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().set_attr_row(attr, row, values);
        self.diag("set_attr_row", res)
    }

    /// Write one attribute across one column, then sync.
    pub fn set_attr_col(&self, attr: &str, col: usize, values: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().set_attr_col(attr, col, values);
        self.diag("set_attr_col", res)
    }

    /// Write one attribute across all instances, then sync.
    pub fn set_attr_all(&self, attr: &str, values: &[f32]) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().set_attr_all(attr, values);
        self.diag("set_attr_all", res)
    }

    /// Run a named behavior extension, then sync.
    pub fn apply_extension(&self, name: &str) -> Result<(), AccessError> {
        let res = self.core.borrow_mut().apply_extension(name);
        self.diag("apply_extension", res)
    }

    /// Bulk device-synchronized snapshot (for persistence and debugging).
    pub fn snapshot(&self) -> Result<HostData, AccessError> {
        let mut core = self.core.borrow_mut();
        let res = core.sync_from_device().map(|()| core.mirror.get_data());
        drop(core);
        self.diag("snapshot", res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vireo_device::CpuBackend;
    use vireo_test_utils::fixtures;

    fn block(spec: BlockSpec) -> StateBlock {
        StateBlock::new("p", spec, &CpuBackend::new(), 7, None, None).unwrap()
    }

    #[test]
    fn empty_name_is_rejected() {
        let spec = BlockSpec::new(fixtures::xy_schema());
        let err = StateBlock::new("", spec, &CpuBackend::new(), 0, None, None).unwrap_err();
        assert!(matches!(err, SpecError::InvalidSpec { .. }));
    }

    #[test]
    fn empty_schema_is_rejected() {
        let spec = BlockSpec::new(Schema::new());
        let err = StateBlock::new("p", spec, &CpuBackend::new(), 0, None, None).unwrap_err();
        assert!(matches!(err, SpecError::InvalidSpec { .. }));
    }

    #[test]
    fn extension_over_unknown_attr_is_rejected() {
        let spec = BlockSpec::new(fixtures::xy_schema()).extension(
            "wrap",
            AttrExtension {
                attr: "z".into(),
                op: Box::new(|_| {}),
            },
        );
        let err = StateBlock::new("p", spec, &CpuBackend::new(), 0, None, None).unwrap_err();
        assert!(matches!(err, SpecError::UnknownName { name } if name == "z"));
    }

    #[test]
    fn size_is_slots_times_instances() {
        let b = block(BlockSpec::new(fixtures::particle_schema()).shape(fixtures::four()));
        // vec2 pos + species + cell = 4 slots per instance, 4 instances
        assert_eq!(b.size(), 16);
        assert_eq!(b.to_vector().unwrap().len(), 16);
    }

    #[test]
    fn zeroed_block_starts_at_zero_and_randomize_stays_in_bounds() {
        let b = block(
            BlockSpec::new(fixtures::xy_schema())
                .shape(fixtures::four())
                .zeroed(),
        );
        assert!(b.to_vector().unwrap().iter().all(|&v| v == 0.0));
        b.randomize().unwrap();
        assert!(b
            .to_vector()
            .unwrap()
            .iter()
            .all(|&v| (-1.0..=1.0).contains(&v)));
    }

    #[test]
    fn randomize_is_seed_deterministic() {
        let spec = || BlockSpec::new(fixtures::xy_schema()).shape(fixtures::four());
        let a = StateBlock::new("p", spec(), &CpuBackend::new(), 42, None, None).unwrap();
        let b = StateBlock::new("p", spec(), &CpuBackend::new(), 42, None, None).unwrap();
        assert_eq!(a.to_vector().unwrap(), b.to_vector().unwrap());
    }

    #[test]
    fn point_writes_clamp_to_declared_bounds() {
        let b = block(
            BlockSpec::new(fixtures::particle_schema())
                .shape(fixtures::four())
                .zeroed(),
        );
        b.set_attr_idx("species", &[1], &[9.7]).unwrap();
        assert_eq!(b.get(&[1], "species").unwrap(), vec![4.0]);
        b.set_attr_idx("cell", &[1], &[-3.0]).unwrap();
        assert_eq!(b.get(&[1], "cell").unwrap(), vec![0.0]);
    }

    #[test]
    fn row_write_needs_a_matrix_shape() {
        let b = block(
            BlockSpec::new(fixtures::xy_schema())
                .shape(fixtures::four())
                .zeroed(),
        );
        let err = b.set_row(0, &[0.0; 2]).unwrap_err();
        assert!(matches!(err, AccessError::BadSlice { .. }));
    }

    #[test]
    fn row_and_col_writes_address_the_right_instances() {
        let b = block(
            BlockSpec::new(fixtures::xy_schema())
                .shape(fixtures::grid3x2())
                .zeroed(),
        );
        // row 1 of a 3x2 grid is instances 2 and 3; two attrs each
        b.set_row(1, &[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(b.get(&[1, 0], "x").unwrap(), vec![0.1]);
        assert_eq!(b.get(&[1, 0], "y").unwrap(), vec![0.2]);
        assert_eq!(b.get(&[1, 1], "x").unwrap(), vec![0.3]);
        assert_eq!(b.get(&[0, 0], "x").unwrap(), vec![0.0]);
        // column 1 is instances (0,1), (1,1), (2,1)
        b.set_attr_col("y", 1, &[0.5, 0.6, 0.7]).unwrap();
        assert_eq!(b.get(&[0, 1], "y").unwrap(), vec![0.5]);
        assert_eq!(b.get(&[2, 1], "y").unwrap(), vec![0.7]);
    }

    #[test]
    fn extension_runs_over_its_attr_only() {
        let spec = BlockSpec::new(fixtures::xy_schema())
            .shape(fixtures::four())
            .zeroed()
            .extension(
                "bump_x",
                AttrExtension {
                    attr: "x".into(),
                    op: Box::new(|vals| {
                        for v in vals {
                            *v += 0.25;
                        }
                    }),
                },
            );
        let b = block(spec);
        b.apply_extension("bump_x").unwrap();
        assert_eq!(b.attr_to_vector("x").unwrap(), vec![0.25; 4]);
        assert_eq!(b.attr_to_vector("y").unwrap(), vec![0.0; 4]);
    }

    #[test]
    fn unknown_extension_name_is_reported() {
        let b = block(BlockSpec::new(fixtures::xy_schema()).zeroed());
        let err = b.apply_extension("missing").unwrap_err();
        assert!(matches!(err, AccessError::UnknownName { name } if name == "missing"));
    }

    #[test]
    fn failed_bulk_write_leaves_state_unchanged() {
        let b = block(
            BlockSpec::new(fixtures::xy_schema())
                .shape(fixtures::four())
                .zeroed(),
        );
        let before = b.to_vector().unwrap();
        let err = b.from_vector(&[1.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            AccessError::SizeMismatch {
                expected: 8,
                actual: 5
            }
        ));
        assert_eq!(b.to_vector().unwrap(), before);
    }
}
