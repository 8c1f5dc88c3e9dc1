//! Boundary traits for the external control protocols.
//!
//! The runtime does not implement the incremental-mapping layer or the
//! network message-routing layer; it registers generated accessors with
//! them through these traits. Both layers deliver events one at a time
//! relative to each other and to simulation steps; nothing here locks.

use crate::error::AccessError;
use crate::route::RouteId;

/// Incremental-mapping layer (interactive mapping/learning).
///
/// The runtime only registers named mapped parameters; training and
/// inference are the layer's own business.
pub trait MappingLayer {
    /// Register a named mapped parameter for a generated accessor.
    fn add_instance(&mut self, name: &str);
}

/// Registration metadata for one routed handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteBinding {
    /// Canonical route the handler answers on.
    pub route: RouteId,
    /// Number of leading integer coordinate arguments.
    pub coord_args: u8,
    /// Expected payload length; 0 for coordinate-only messages.
    pub payload_len: usize,
}

/// One argument of a reply message.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyArg {
    /// A string argument (e.g. the attribute name).
    Str(String),
    /// A float argument.
    Float(f32),
    /// An integer argument.
    Int(i32),
}

/// A message to dispatch back to the peer that triggered a getter.
///
/// Handlers cannot re-enter the routing layer that is invoking them, so
/// a getter returns its reply and the routing layer sends it after the
/// call returns. The reply route is derived from the getter's canonical
/// name via [`RouteId::reply_route`].
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    /// Destination route.
    pub route: RouteId,
    /// Message arguments.
    pub args: Vec<ReplyArg>,
}

/// A registered route handler.
///
/// Invoked with the leading coordinate arguments and the payload values
/// of an inbound message. Returns an optional [`Reply`] for the routing
/// layer to dispatch back to the originating peer.
pub type RouteHandler = Box<dyn FnMut(&[i32], &[f32]) -> Result<Option<Reply>, AccessError>>;

/// Network message-routing layer.
///
/// Implementations own transport and dispatch; the contract here is
/// that a registered handler is invoked with exactly the declared
/// argument shape, and that a returned [`Reply`] is forwarded to the
/// peer that sent the triggering message.
pub trait RoutingLayer {
    /// Register a handler for a canonical route.
    fn register(&mut self, binding: RouteBinding, handler: RouteHandler);
}
