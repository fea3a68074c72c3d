//! Implementations of the fact provider traits.
//!
//! [`LinuxHost`] reads a real (or copied) filesystem tree, [`mock`] holds
//! in-memory providers for tests and benchmarks.

pub mod linux;
pub mod mock;

pub use linux::{IdleSession, LinuxHost};
pub use mock::{MockHost, MockSession};
