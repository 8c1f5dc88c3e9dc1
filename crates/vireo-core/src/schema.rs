//! Schema definitions: ordered attribute declarations with bounds.

use indexmap::IndexMap;

use crate::elem::ElemType;
use crate::error::SpecError;

/// Declaration of a single attribute: element type plus inclusive bounds.
///
/// Bounds drive randomization and value clamping. `min` and `max` apply
/// per lane for vector element types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttrDef {
    /// Declared element type.
    pub elem: ElemType,
    /// Inclusive lower bound.
    pub min: f32,
    /// Inclusive upper bound.
    pub max: f32,
}

impl AttrDef {
    /// Shorthand constructor.
    pub fn new(elem: ElemType, min: f32, max: f32) -> Self {
        Self { elem, min, max }
    }

    /// Storage slots this attribute occupies per instance.
    pub fn slots_per_instance(&self) -> usize {
        self.elem.lanes() as usize
    }
}

/// Ordered mapping from attribute name to [`AttrDef`].
///
/// Declaration order is load-bearing: every whole-block vector codec
/// visits attributes in this order, and the accessor route table is
/// built in this order. Attribute names are unique within a schema;
/// re-declaring a name fails at push time, before the schema can be
/// used to construct a block.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    attrs: IndexMap<String, AttrDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self {
            attrs: IndexMap::new(),
        }
    }

    /// Add an attribute declaration.
    ///
    /// Fails with [`SpecError::InvalidSpec`] on a duplicate name, an
    /// empty name, or a non-finite or inverted bound pair. Fails with
    /// [`SpecError::UnsupportedType`] when the element type has no
    /// host-side equivalent.
    pub fn push(&mut self, name: impl Into<String>, def: AttrDef) -> Result<(), SpecError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SpecError::InvalidSpec {
                reason: "attribute name must not be empty".into(),
            });
        }
        if self.attrs.contains_key(&name) {
            return Err(SpecError::InvalidSpec {
                reason: format!("duplicate attribute '{name}'"),
            });
        }
        if !def.min.is_finite() || !def.max.is_finite() || def.min > def.max {
            return Err(SpecError::InvalidSpec {
                reason: format!(
                    "attribute '{name}' has invalid bounds [{}, {}]",
                    def.min, def.max
                ),
            });
        }
        if def.elem.host_scalar().is_none() {
            return Err(SpecError::UnsupportedType {
                attr: name,
                elem: def.elem,
            });
        }
        self.attrs.insert(name, def);
        Ok(())
    }

    /// Builder-style [`push`](Schema::push) for literal schemas.
    pub fn with(mut self, name: impl Into<String>, def: AttrDef) -> Result<Self, SpecError> {
        self.push(name, def)?;
        Ok(self)
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttrDef> {
        self.attrs.get(name)
    }

    /// Declaration index of an attribute, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attrs.get_index_of(name)
    }

    /// Iterate attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrDef)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of declared attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the schema has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Storage slots one structured instance occupies across all attributes.
    pub fn slots_per_instance(&self) -> usize {
        self.attrs.values().map(AttrDef::slots_per_instance).sum()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}
