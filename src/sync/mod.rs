//! Server-to-server linking: handshake, burst, and remote-event routing
//! (spec §4.H, §4.I, §4.J, §4.K).

pub mod burst;
pub mod connection;
pub mod handshake;
pub mod router;

pub use handshake::{HandshakeError, HandshakeMachine, HandshakeState};
