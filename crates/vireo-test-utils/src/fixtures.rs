//! Reusable schema and shape fixtures.
//!
//! Small, deliberately boring declarations used throughout the block
//! and registry test suites, so failure output is easy to read.

use vireo_core::{AttrDef, ElemType, Schema, Shape};

/// Two scalar float attributes `x` and `y`, each bounded to [-1, 1].
pub fn xy_schema() -> Schema {
    Schema::new()
        .with("x", AttrDef::new(ElemType::F32, -1.0, 1.0))
        .and_then(|s| s.with("y", AttrDef::new(ElemType::F32, -1.0, 1.0)))
        .unwrap_or_else(|e| panic!("xy fixture schema invalid: {e}"))
}

/// A mixed-type schema: a vec2 position, an integer species tag, and an
/// unsigned cell index. Exercises lane widths and quantization.
pub fn particle_schema() -> Schema {
    Schema::new()
        .with("pos", AttrDef::new(ElemType::Vec2, 0.0, 100.0))
        .and_then(|s| s.with("species", AttrDef::new(ElemType::I32, -4.0, 4.0)))
        .and_then(|s| s.with("cell", AttrDef::new(ElemType::U32, 0.0, 255.0)))
        .unwrap_or_else(|e| panic!("particle fixture schema invalid: {e}"))
}

/// A one-dimensional shape of four instances.
pub fn four() -> Shape {
    Shape::new([4]).unwrap_or_else(|e| panic!("fixture shape invalid: {e}"))
}

/// A 3x2 matrix shape, for row and column accessor tests.
pub fn grid3x2() -> Shape {
    Shape::new([3, 2]).unwrap_or_else(|e| panic!("fixture shape invalid: {e}"))
}
