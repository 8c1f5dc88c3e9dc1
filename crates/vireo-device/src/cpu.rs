//! Reference CPU backend: flat per-attribute slot vectors.

use vireo_core::error::{AccessError, SpecError};
use vireo_core::{ElemType, HostData, Layout, Schema, Shape};

use crate::{Backend, DeviceField};

/// Reference backend holding device fields in ordinary host memory.
///
/// Supports every element type with a host equivalent. Used by tests
/// and by sessions without a GPU backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuBackend;

impl CpuBackend {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }
}

impl Backend for CpuBackend {
    fn supports(&self, elem: ElemType) -> bool {
        elem.host_scalar().is_some()
    }

    fn allocate(&self, schema: &Schema, shape: &Shape) -> Result<Box<dyn DeviceField>, SpecError> {
        for (attr, def) in schema.iter() {
            if !self.supports(def.elem) {
                return Err(SpecError::UnsupportedType {
                    attr: attr.to_string(),
                    elem: def.elem,
                });
            }
        }
        let layout = Layout::of(schema, shape);
        let data = HostData::zeroed(&layout);
        Ok(Box::new(CpuField { layout, data }))
    }
}

/// A CPU-resident field: the same flat layout a GPU backend would use,
/// minus the transfer.
struct CpuField {
    layout: Layout,
    data: HostData,
}

impl DeviceField for CpuField {
    fn layout(&self) -> &Layout {
        &self.layout
    }

    fn field_from_host(&mut self, data: &HostData) -> Result<(), AccessError> {
        data.check_layout(&self.layout)?;
        self.data = data.clone();
        Ok(())
    }

    fn host_from_field(&self, data: &mut HostData) -> Result<(), AccessError> {
        data.check_layout(&self.layout)?;
        *data = self.data.clone();
        Ok(())
    }
}
