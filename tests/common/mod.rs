//! Integration test common infrastructure.
//!
//! Spawns a real `tidalnetd` process per test and drives it over plain TCP.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
pub use server::TestServer;
