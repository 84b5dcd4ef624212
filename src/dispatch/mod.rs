//! Event dispatch
//!
//! Inbound events, outbound replies, the per-chat serializer and the router
//! that connects them to the services.

pub mod event;
pub mod reply;
pub mod router;
pub mod serializer;

pub use event::{Actor, ChatMemberState, ChatRef, EventKind, InboundEvent};
pub use reply::{Line, Outbound, ParamValue, Params, Reply, ReplyOption};
pub use router::Router;
pub use serializer::{DispatchSerializer, EventHandler};
