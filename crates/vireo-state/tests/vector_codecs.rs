//! Property tests for the block and registry vector codecs.

use proptest::prelude::*;

use vireo_device::CpuBackend;
use vireo_state::{BlockSpec, RegistryConfig, StateRegistry};
use vireo_test_utils::fixtures;

fn registry_with_two_blocks() -> StateRegistry {
    let mut reg = StateRegistry::new(RegistryConfig::new(Box::new(CpuBackend::new())));
    reg.declare(
        "a",
        BlockSpec::new(fixtures::xy_schema())
            .shape(fixtures::four())
            .zeroed(),
    )
    .unwrap();
    reg.declare(
        "b",
        BlockSpec::new(fixtures::xy_schema())
            .shape(fixtures::four())
            .zeroed(),
    )
    .unwrap();
    reg
}

proptest! {
    /// Loading a concatenated vector and reading the blocks back
    /// reproduces it exactly: partition boundaries introduce no skew
    /// and float attributes pass values through unchanged.
    #[test]
    fn load_then_extract_is_identity(values in proptest::collection::vec(-1.0f32..=1.0, 16)) {
        let reg = registry_with_two_blocks();
        reg.load_vector(&["a", "b"], &values).unwrap();
        let mut out = reg.block("a").unwrap().to_vector().unwrap();
        out.extend(reg.block("b").unwrap().to_vector().unwrap());
        prop_assert_eq!(out, values);
    }

    /// Loading the same vector twice is the same as loading it once.
    #[test]
    fn loading_is_idempotent(values in proptest::collection::vec(-1.0f32..=1.0, 16)) {
        let reg = registry_with_two_blocks();
        reg.load_vector(&["a", "b"], &values).unwrap();
        let once = reg.block("a").unwrap().to_vector().unwrap();
        reg.load_vector(&["a", "b"], &values).unwrap();
        prop_assert_eq!(reg.block("a").unwrap().to_vector().unwrap(), once);
    }

    /// Integer attributes quantize on the way in, so an extracted
    /// vector is always a fixed point of load-then-extract.
    #[test]
    fn extraction_is_a_quantization_fixed_point(
        values in proptest::collection::vec(0.0f32..=100.0, 16),
    ) {
        let mut reg = StateRegistry::new(RegistryConfig::new(Box::new(CpuBackend::new())));
        reg.declare(
            "p",
            BlockSpec::new(fixtures::particle_schema())
                .shape(fixtures::four())
                .zeroed(),
        )
        .unwrap();
        reg.load_vector(&["p"], &values).unwrap();
        let first = reg.block("p").unwrap().to_vector().unwrap();
        reg.load_vector(&["p"], &first).unwrap();
        prop_assert_eq!(reg.block("p").unwrap().to_vector().unwrap(), first);
    }
}
