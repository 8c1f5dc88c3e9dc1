//! Integration test: JSON snapshot round-trips.

use vireo_device::CpuBackend;
use vireo_state::{BlockSpec, PersistError, StateBlock};
use vireo_test_utils::fixtures;

fn block(name: &str, spec: BlockSpec) -> StateBlock {
    StateBlock::new(name, spec, &CpuBackend::new(), 11, None, None).unwrap()
}

#[test]
fn snapshot_round_trips_through_a_fresh_block() {
    let a = block(
        "flock",
        BlockSpec::new(fixtures::particle_schema()).shape(fixtures::four()),
    );
    let json = a.serialize().unwrap();

    let b = block(
        "flock",
        BlockSpec::new(fixtures::particle_schema())
            .shape(fixtures::four())
            .zeroed(),
    );
    b.deserialize(&json).unwrap();
    assert_eq!(a.to_vector().unwrap(), b.to_vector().unwrap());
}

#[test]
fn snapshot_for_another_block_is_rejected() {
    let a = block("flock", BlockSpec::new(fixtures::xy_schema()).shape(fixtures::four()));
    let json = a.serialize().unwrap();
    let b = block("swarm", BlockSpec::new(fixtures::xy_schema()).shape(fixtures::four()));
    let err = b.deserialize(&json).unwrap_err();
    assert!(matches!(err, PersistError::Codec { .. }));
}

#[test]
fn shape_skew_is_rejected_before_any_write() {
    let a = block("grid", BlockSpec::new(fixtures::xy_schema()).shape(fixtures::four()));
    let json = a.serialize().unwrap();
    let b = block(
        "grid",
        BlockSpec::new(fixtures::xy_schema())
            .shape(fixtures::grid3x2())
            .zeroed(),
    );
    let err = b.deserialize(&json).unwrap_err();
    assert!(matches!(err, PersistError::Access(_)));
    assert!(b.to_vector().unwrap().iter().all(|&v| v == 0.0));
}

#[test]
fn garbage_text_is_a_codec_error() {
    let b = block("flock", BlockSpec::new(fixtures::xy_schema()));
    let err = b.deserialize("not json").unwrap_err();
    assert!(matches!(err, PersistError::Codec { .. }));
}
