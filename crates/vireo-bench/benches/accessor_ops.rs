//! Criterion micro-benchmarks for routed accessor dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vireo_core::{Access, AccessFlags, RoutingLayer};
use vireo_device::CpuBackend;
use vireo_state::{BlockSpec, RegistryConfig, StateRegistry};
use vireo_test_utils::RecordingRouter;

fn routed_flock(n: usize) -> (StateRegistry, Rc<RefCell<RecordingRouter>>) {
    let router = Rc::new(RefCell::new(RecordingRouter::new()));
    let routing: Rc<RefCell<dyn RoutingLayer>> = router.clone();
    let mut registry =
        StateRegistry::new(RegistryConfig::new(Box::new(CpuBackend::new())).routing(routing));
    let spec = BlockSpec::new(vireo_bench::flock_schema().unwrap())
        .shape(vireo_core::Shape::new([n]).unwrap())
        .flags(AccessFlags::none().routing(Access::GetSet));
    registry.declare("flock", spec).unwrap();
    (registry, router)
}

fn bench_routed_point_set(c: &mut Criterion) {
    let (_registry, router) = routed_flock(16384);
    c.bench_function("routed_set/pos_idx", |b| {
        b.iter(|| {
            router
                .borrow_mut()
                .invoke("flock_set_pos_idx", black_box(&[7]), black_box(&[3.0, 4.0]))
                .unwrap()
        })
    });
}

fn bench_routed_get_reply(c: &mut Criterion) {
    let (_registry, router) = routed_flock(16384);
    c.bench_function("routed_get/pos_reply", |b| {
        b.iter(|| {
            let mut r = router.borrow_mut();
            r.invoke("flock_get_pos", black_box(&[7]), &[]).unwrap();
            r.clear_replies();
        })
    });
}

fn bench_routed_randomise(c: &mut Criterion) {
    let (_registry, router) = routed_flock(1024);
    c.bench_function("routed_set/randomise_1k", |b| {
        b.iter(|| {
            router
                .borrow_mut()
                .invoke("flock_set_randomise", &[], &[])
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_routed_point_set,
    bench_routed_get_reply,
    bench_routed_randomise
);
criterion_main!(benches);
