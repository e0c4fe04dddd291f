//! Client-facing transport: accept loop and per-connection I/O (spec §4.A, §4.C).

pub mod connection;
pub mod gateway;

pub use gateway::Gateway;
