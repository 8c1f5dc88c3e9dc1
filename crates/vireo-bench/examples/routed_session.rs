//! Drive a multi-block session through its routed accessors.
//!
//! Builds the `session_profile` registry with a recording router, then
//! plays a short sequence of inbound messages and prints what each one
//! did to the state.

use std::cell::RefCell;
use std::rc::Rc;

use vireo_core::{Access, AccessFlags, RoutingLayer, Shape};
use vireo_device::CpuBackend;
use vireo_state::{BlockSpec, RegistryConfig, StateRegistry};
use vireo_test_utils::RecordingRouter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let router = Rc::new(RefCell::new(RecordingRouter::new()));
    let routing: Rc<RefCell<dyn RoutingLayer>> = router.clone();
    let mut registry =
        StateRegistry::new(RegistryConfig::new(Box::new(CpuBackend::new())).seed(42).routing(routing));

    registry.declare(
        "flock",
        BlockSpec::new(vireo_bench::flock_schema()?)
            .shape(Shape::new([8])?)
            .flags(AccessFlags::none().routing(Access::GetSet)),
    )?;

    println!("routes registered:");
    for name in router.borrow().route_names() {
        println!("  {name}");
    }

    // A peer teleports boid 3 and asks where it ended up.
    router
        .borrow_mut()
        .invoke("flock_set_pos_idx", &[3], &[120.0, 450.0])?;
    router.borrow_mut().invoke("flock_get_pos", &[3], &[])?;

    for reply in router.borrow().replies() {
        println!("reply on {}: {:?}", reply.route.as_str(), reply.args);
    }

    let flock = registry.block("flock").unwrap();
    println!(
        "flock occupies {} of {} registry slots",
        flock.size(),
        registry.total_size()
    );
    Ok(())
}
