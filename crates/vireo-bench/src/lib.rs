//! Benchmark profiles for the Vireo state runtime.
//!
//! Provides pre-built registry profiles shared by the benchmarks and
//! examples:
//!
//! - [`flock_profile`]: one "flock" block of `n` boids with position,
//!   velocity, and a species tag.
//! - [`session_profile`]: a multi-block session (flock, field grid,
//!   parameters) sized like a small interactive piece.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use vireo_core::{AttrDef, ElemType, Schema, Shape, SpecError};
use vireo_device::CpuBackend;
use vireo_state::{BlockSpec, RegistryConfig, StateRegistry};

/// Schema of one boid: vec2 position and velocity plus a species tag.
pub fn flock_schema() -> Result<Schema, SpecError> {
    Schema::new()
        .with("pos", AttrDef::new(ElemType::Vec2, 0.0, 1920.0))?
        .with("vel", AttrDef::new(ElemType::Vec2, -10.0, 10.0))?
        .with("species", AttrDef::new(ElemType::I32, 0.0, 4.0))
}

/// A registry holding one "flock" block of `n` boids.
pub fn flock_profile(n: usize, seed: u64) -> Result<StateRegistry, SpecError> {
    let mut registry =
        StateRegistry::new(RegistryConfig::new(Box::new(CpuBackend::new())).seed(seed));
    let spec = BlockSpec::new(flock_schema()?).shape(shape([n])?);
    registry.declare("flock", spec)?;
    Ok(registry)
}

/// A multi-block session: a flock, a 64x64 scalar field grid, and a
/// handful of global parameters.
pub fn session_profile(boids: usize, seed: u64) -> Result<StateRegistry, SpecError> {
    let mut registry =
        StateRegistry::new(RegistryConfig::new(Box::new(CpuBackend::new())).seed(seed));
    registry.declare(
        "flock",
        BlockSpec::new(flock_schema()?).shape(shape([boids])?),
    )?;
    let field = Schema::new().with("heat", AttrDef::new(ElemType::F32, 0.0, 1.0))?;
    registry.declare("field", BlockSpec::new(field).shape(shape([64, 64])?))?;
    let params = Schema::new()
        .with("speed", AttrDef::new(ElemType::F32, 0.0, 5.0))?
        .with("radius", AttrDef::new(ElemType::F32, 0.0, 300.0))?;
    registry.declare("params", BlockSpec::new(params))?;
    Ok(registry)
}

fn shape(dims: impl IntoIterator<Item = usize>) -> Result<Shape, SpecError> {
    Shape::new(dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flock_profile_sizes_as_declared() {
        let registry = flock_profile(64, 42).unwrap();
        // 2 + 2 + 1 slots per boid
        assert_eq!(registry.total_size(), 64 * 5);
    }

    #[test]
    fn session_profile_declares_three_blocks() {
        let registry = session_profile(32, 42).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.total_size(), 32 * 5 + 64 * 64 + 2);
    }
}
