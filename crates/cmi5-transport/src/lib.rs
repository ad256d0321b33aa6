//! # cmi5-transport — dual-mode HTTP transport
//!
//! Environment capability probe, origin classifier, and the transport
//! that unifies the native and legacy request primitives behind one
//! result contract, including the bounded synchronous emulation bridge
//! for blocking callers.

pub mod capabilities;
pub mod origin;
pub mod primitive;
pub mod sync;
pub mod transport;

pub use capabilities::TransportCapabilities;
pub use origin::{DocumentOrigin, TransportSelection, classify};
pub use primitive::{LegacyEvent, LegacyPrimitive, NativePrimitive, PrimitiveOutcome,
    RequestPrimitive};
pub use sync::{DEFAULT_EMULATION_BOUND, SyncBridge};
pub use transport::DualModeTransport;
