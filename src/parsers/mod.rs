//! Parsers for the line-oriented system files the host adapter reads.
//!
//! Every parser works on text already read from disk, so they can be tested
//! against fixtures without touching the host. Malformed lines are skipped
//! rather than failing the whole file.

pub mod autofs;
pub mod cpuinfo;
pub mod inet6;
pub mod interfaces;
pub mod meminfo;
pub mod nim_sockets;
pub mod os_release;
pub mod route;
pub mod uptime;
