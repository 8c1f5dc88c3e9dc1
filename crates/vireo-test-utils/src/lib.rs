//! Test utilities and mock protocol layers for Vireo development.
//!
//! Provides recording implementations of the protocol boundary traits
//! ([`MappingLayer`], [`RoutingLayer`]) and reusable schema fixtures for
//! block and registry tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use indexmap::IndexMap;

use vireo_core::error::AccessError;
use vireo_core::{MappingLayer, Reply, RouteBinding, RouteHandler, RoutingLayer};

/// Mock mapping layer that records every registered parameter name, in
/// registration order.
#[derive(Default)]
pub struct RecordingMapper {
    instances: Vec<String>,
}

impl RecordingMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names registered so far, in order.
    pub fn instances(&self) -> &[String] {
        &self.instances
    }
}

impl MappingLayer for RecordingMapper {
    fn add_instance(&mut self, name: &str) {
        self.instances.push(name.to_string());
    }
}

/// Mock routing layer that stores registered handlers and lets tests
/// invoke them as if a peer had sent a message.
///
/// A [`Reply`] returned by a getter handler is collected into
/// [`replies`](RecordingRouter::replies), mirroring a real layer's
/// send-after-return contract.
#[derive(Default)]
pub struct RecordingRouter {
    routes: IndexMap<String, (RouteBinding, RouteHandler)>,
    replies: Vec<Reply>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered route names, in registration order.
    pub fn route_names(&self) -> Vec<&str> {
        self.routes.keys().map(|k| k.as_str()).collect()
    }

    /// Whether a route is registered.
    pub fn has_route(&self, route: &str) -> bool {
        self.routes.contains_key(route)
    }

    /// Registration metadata for a route.
    pub fn binding(&self, route: &str) -> Option<&RouteBinding> {
        self.routes.get(route).map(|(b, _)| b)
    }

    /// Invoke a registered handler, as the transport would on an
    /// inbound message. Panics on an unregistered route; that is a test
    /// bug, not a scenario.
    pub fn invoke(
        &mut self,
        route: &str,
        coords: &[i32],
        payload: &[f32],
    ) -> Result<(), AccessError> {
        let (_, handler) = self
            .routes
            .get_mut(route)
            .unwrap_or_else(|| panic!("no handler registered on '{route}'"));
        if let Some(reply) = handler(coords, payload)? {
            self.replies.push(reply);
        }
        Ok(())
    }

    /// Replies collected from getter handlers, in dispatch order.
    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    /// Drop all collected replies.
    pub fn clear_replies(&mut self) {
        self.replies.clear();
    }
}

impl RoutingLayer for RecordingRouter {
    fn register(&mut self, binding: RouteBinding, handler: RouteHandler) {
        self.routes
            .insert(binding.route.as_str().to_string(), (binding, handler));
    }
}
