//! In-place DNS query-name rewriting for the packet data path.
//!
//! Everything under this crate runs once per packet, synchronously, without
//! heap allocation. Malformed or non-matching input is never an error: the
//! packet is passed on unchanged and the returned [`HookReport`] says where
//! processing stopped.
pub mod dns;
pub mod hooks;
pub mod packet;

pub use hooks::{
    DontFragment, EgressHook, HookReport, IngressHook, Layer, Outcome, PacketHook, Skip,
};
