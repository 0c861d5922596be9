//! Host-side glue around the dpos voter.
//!
//! The voter itself is a pure, lock-free state machine. This crate is the
//! thin layer a host node embeds:
//!
//! - [`Node`]: one exclusive lock around one voter instance, entry points
//!   mirroring the voter's handlers
//! - archive replay on startup and write-back on shutdown
//! - [`RelayMap`]: relay-once bookkeeping with expiry
//! - [`NodeConfig`]: TOML-loadable configuration
//!
//! Outbound votes leave the voter unsigned; the host signs them with the
//! masternode operator key before broadcast, outside this crate.

mod config;
mod node;
mod relay;

pub use config::{ConfigError, NodeConfig};
pub use node::Node;
pub use relay::RelayMap;
