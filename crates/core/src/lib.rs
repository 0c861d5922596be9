//! Core contracts for the dpos voting state machine.
//!
//! This crate defines the voter's boundary:
//!
//! - [`Event`]: all possible inputs to the voter
//! - [`Output`]: everything a handler call asks the outer system to do
//! - [`World`]: the injected host callbacks
//! - [`Misbehavior`]: Byzantine evidence returned to the host
//!
//! # Architecture
//!
//! The voter is built on a simple reducer model:
//!
//! ```text
//! Events → Voter::handle() → Output
//! ```
//!
//! The voter is:
//! - **Synchronous**: no async, no .await
//! - **Deterministic**: same state + event sequence = same outputs
//! - **Pure-ish**: mutates itself, but performs no I/O
//!
//! All I/O (broadcast, transaction fetch, block submission, archiving) is
//! executed by the host from the returned [`Output`].

mod error;
mod event;
mod output;
mod world;

pub use error::Misbehavior;
pub use event::Event;
pub use output::{BlockToSubmit, Output};
pub use world::World;
