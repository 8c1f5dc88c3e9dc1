//! Canonical route identifiers and the per-block route table.
//!
//! External-protocol accessor names are not assembled ad hoc at call
//! sites. Each block builds one [`RouteTable`] at accessor-generation
//! time, mapping every (scope, granularity, direction) key to a
//! canonical [`RouteId`]; collisions are detected there, once, instead
//! of surfacing later as silently shadowed handlers.

use indexmap::IndexMap;
use std::fmt;

use crate::error::SpecError;
use crate::schema::Schema;

/// Write granularity of a positional setter route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One coordinate (two index args for a matrix block).
    Idx,
    /// One row of a matrix block (one index arg).
    Row,
    /// One column of a matrix block (one index arg).
    Col,
    /// The entire addressed region (no index args).
    All,
}

impl Granularity {
    /// Canonical name suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Idx => "idx",
            Self::Row => "row",
            Self::Col => "col",
            Self::All => "all",
        }
    }
}

/// Whether a route addresses the whole block or one attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RouteScope {
    /// Every attribute of the addressed instances.
    Block,
    /// A single named attribute.
    Attr(String),
}

/// Key of one accessor route within a block's table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RouteKey {
    /// Positional setter at a given scope and granularity.
    Set {
        /// Block-wide or per-attribute.
        scope: RouteScope,
        /// Write granularity.
        gran: Granularity,
    },
    /// Re-randomize the whole block.
    Randomise,
    /// Read a single coordinate of one attribute.
    Get {
        /// The addressed attribute.
        attr: String,
    },
}

/// Canonical identifier of one accessor route.
///
/// The underlying string is the accessor's canonical name, e.g.
/// `flock_set_x_idx`. [`RouteId::reply_route`] derives the slash-path
/// form used when dispatching a getter's result back to the peer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(String);

impl RouteId {
    /// Wrap a canonical name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The canonical name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reply route derived deterministically from this route's canonical
    /// name: each underscore-separated segment becomes a path segment
    /// (`flock_get_x` -> `/flock/get/x`).
    pub fn reply_route(&self) -> RouteId {
        let mut path = String::with_capacity(self.0.len() + 1);
        for segment in self.0.split('_') {
            path.push('/');
            path.push_str(segment);
        }
        RouteId(path)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The complete accessor route table of one block.
///
/// Built once per block from its name and schema. The table always
/// contains every possible route; the capability flags decide which of
/// them are actually registered with a protocol.
#[derive(Clone, Debug)]
pub struct RouteTable {
    routes: IndexMap<RouteKey, RouteId>,
    setter_prefix: String,
    getter_prefix: String,
}

impl RouteTable {
    /// Build the table for a block.
    ///
    /// Fails with [`SpecError::InvalidSpec`] if two keys render to the
    /// same canonical name (possible when an attribute is itself named
    /// like a granularity suffix).
    pub fn build(block: &str, schema: &Schema) -> Result<Self, SpecError> {
        let setter_prefix = format!("{block}_set");
        let getter_prefix = format!("{block}_get");

        let mut routes = IndexMap::new();
        let mut insert = |key: RouteKey, name: String| -> Result<(), SpecError> {
            let id = RouteId::new(name);
            if routes.values().any(|existing| *existing == id) {
                return Err(SpecError::InvalidSpec {
                    reason: format!("route collision on '{id}'"),
                });
            }
            routes.insert(key, id);
            Ok(())
        };

        for gran in [
            Granularity::Idx,
            Granularity::Row,
            Granularity::Col,
            Granularity::All,
        ] {
            insert(
                RouteKey::Set {
                    scope: RouteScope::Block,
                    gran,
                },
                format!("{setter_prefix}_{}", gran.suffix()),
            )?;
        }
        insert(RouteKey::Randomise, format!("{setter_prefix}_randomise"))?;

        for (attr, _) in schema.iter() {
            for gran in [
                Granularity::Idx,
                Granularity::Row,
                Granularity::Col,
                Granularity::All,
            ] {
                insert(
                    RouteKey::Set {
                        scope: RouteScope::Attr(attr.to_string()),
                        gran,
                    },
                    format!("{setter_prefix}_{attr}_{}", gran.suffix()),
                )?;
            }
            insert(
                RouteKey::Get {
                    attr: attr.to_string(),
                },
                format!("{getter_prefix}_{attr}"),
            )?;
        }

        Ok(Self {
            routes,
            setter_prefix,
            getter_prefix,
        })
    }

    /// Look up the canonical route for a key.
    pub fn route(&self, key: &RouteKey) -> Option<&RouteId> {
        self.routes.get(key)
    }

    /// Iterate all (key, route) pairs in generation order.
    pub fn iter(&self) -> impl Iterator<Item = (&RouteKey, &RouteId)> {
        self.routes.iter()
    }

    /// Canonical setter family name (`<block>_set`), the name registered
    /// with the mapping layer for the set direction.
    pub fn setter_name(&self) -> &str {
        &self.setter_prefix
    }

    /// Canonical getter family name (`<block>_get`).
    pub fn getter_name(&self) -> &str {
        &self.getter_prefix
    }

    /// Number of routes in the table.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty (never true for a valid schema).
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elem::ElemType;
    use crate::schema::AttrDef;

    fn two_attr_schema() -> Schema {
        Schema::new()
            .with("x", AttrDef::new(ElemType::F32, -1.0, 1.0))
            .unwrap()
            .with("y", AttrDef::new(ElemType::F32, -1.0, 1.0))
            .unwrap()
    }

    #[test]
    fn table_covers_every_granularity_and_attr() {
        let table = RouteTable::build("flock", &two_attr_schema()).unwrap();
        // 4 block setters + randomise + 2 attrs * (4 setters + 1 getter)
        assert_eq!(table.len(), 15);
        let idx = table
            .route(&RouteKey::Set {
                scope: RouteScope::Attr("x".into()),
                gran: Granularity::Idx,
            })
            .unwrap();
        assert_eq!(idx.as_str(), "flock_set_x_idx");
        let get = table.route(&RouteKey::Get { attr: "y".into() }).unwrap();
        assert_eq!(get.as_str(), "flock_get_y");
    }

    #[test]
    fn reply_route_is_slash_path_of_name() {
        let table = RouteTable::build("flock", &two_attr_schema()).unwrap();
        let get = table.route(&RouteKey::Get { attr: "x".into() }).unwrap();
        assert_eq!(get.reply_route().as_str(), "/flock/get/x");
    }

    #[test]
    fn suffix_like_attr_names_stay_collision_free() {
        // Attributes named after granularity suffixes render to distinct
        // canonical names because attr routes always carry their own
        // suffix ("flock_set_idx" vs "flock_set_idx_idx").
        let schema = Schema::new()
            .with("idx", AttrDef::new(ElemType::F32, 0.0, 1.0))
            .unwrap()
            .with("x_idx", AttrDef::new(ElemType::F32, 0.0, 1.0))
            .unwrap();
        let table = RouteTable::build("flock", &schema).unwrap();
        let mut names: Vec<&str> = table.iter().map(|(_, id)| id.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn setter_and_getter_family_names() {
        let table = RouteTable::build("flock", &two_attr_schema()).unwrap();
        assert_eq!(table.setter_name(), "flock_set");
        assert_eq!(table.getter_name(), "flock_get");
    }
}
