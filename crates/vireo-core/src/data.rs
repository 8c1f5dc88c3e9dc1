//! Bulk host-side data layout shared by the mirror and device boundary.

use indexmap::IndexMap;
use std::fmt;

use crate::error::AccessError;
use crate::schema::Schema;
use crate::shape::Shape;

/// Per-attribute slot counts of a schema bound to a shape.
///
/// Both sides of the device/host boundary derive their layout from the
/// same schema and shape, so the layouts can never legitimately
/// disagree; every sync still compares them and fails with
/// [`AccessError::ShapeMismatch`] rather than copying through a skew.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    slots: IndexMap<String, usize>,
}

impl Layout {
    /// Derive the layout of a schema bound to a shape.
    pub fn of(schema: &Schema, shape: &Shape) -> Self {
        let instances = shape.instance_count();
        let slots = schema
            .iter()
            .map(|(name, def)| (name.to_string(), def.slots_per_instance() * instances))
            .collect();
        Self { slots }
    }

    /// Slot count of one attribute.
    pub fn attr_slots(&self, attr: &str) -> Option<usize> {
        self.slots.get(attr).copied()
    }

    /// Total scalar slot count across all attributes.
    pub fn total_slots(&self) -> usize {
        self.slots.values().sum()
    }

    /// Iterate (attribute, slot count) in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.slots.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, slots)) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {slots}")?;
        }
        write!(f, "}}")
    }
}

/// Device-compatible bulk snapshot: one flat slot vector per attribute,
/// in schema declaration order.
///
/// This is the unit of transfer for `field_from_host` /
/// `host_from_field` and the mirror's bulk `get_data` / `set_data`.
#[derive(Clone, Debug, PartialEq)]
pub struct HostData {
    attrs: IndexMap<String, Vec<f32>>,
}

impl HostData {
    /// Allocate a zero-filled snapshot matching a layout.
    pub fn zeroed(layout: &Layout) -> Self {
        let attrs = layout
            .iter()
            .map(|(name, slots)| (name.to_string(), vec![0.0; slots]))
            .collect();
        Self { attrs }
    }

    /// The layout implied by this snapshot's buffers.
    pub fn layout(&self) -> Layout {
        Layout {
            slots: self
                .attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.len()))
                .collect(),
        }
    }

    /// Borrow one attribute's slots.
    pub fn attr(&self, name: &str) -> Option<&[f32]> {
        self.attrs.get(name).map(Vec::as_slice)
    }

    /// Mutably borrow one attribute's slots.
    pub fn attr_mut(&mut self, name: &str) -> Option<&mut [f32]> {
        self.attrs.get_mut(name).map(Vec::as_mut_slice)
    }

    /// Iterate (attribute, slots) in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Verify this snapshot matches `expected`. Checked at every
    /// device/host boundary crossing.
    pub fn check_layout(&self, expected: &Layout) -> Result<(), AccessError> {
        let actual = self.layout();
        if actual != *expected {
            return Err(AccessError::ShapeMismatch {
                reason: format!("snapshot layout {actual} != expected {expected}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elem::ElemType;
    use crate::schema::AttrDef;

    fn schema() -> Schema {
        Schema::new()
            .with("pos", AttrDef::new(ElemType::Vec2, 0.0, 1.0))
            .unwrap()
            .with("mass", AttrDef::new(ElemType::F32, 0.1, 10.0))
            .unwrap()
    }

    #[test]
    fn layout_counts_lanes_times_instances() {
        let shape = Shape::new([4]).unwrap();
        let layout = Layout::of(&schema(), &shape);
        assert_eq!(layout.attr_slots("pos"), Some(8));
        assert_eq!(layout.attr_slots("mass"), Some(4));
        assert_eq!(layout.total_slots(), 12);
    }

    #[test]
    fn zeroed_snapshot_matches_layout() {
        let layout = Layout::of(&schema(), &Shape::new([2, 3]).unwrap());
        let data = HostData::zeroed(&layout);
        assert_eq!(data.layout(), layout);
        assert!(data.check_layout(&layout).is_ok());
        assert!(data.attr("pos").unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn layout_skew_detected() {
        let layout = Layout::of(&schema(), &Shape::new([4]).unwrap());
        let mut data = HostData::zeroed(&layout);
        data.attrs.get_mut("mass").unwrap().push(0.0);
        assert!(matches!(
            data.check_layout(&layout),
            Err(AccessError::ShapeMismatch { .. })
        ));
    }
}
