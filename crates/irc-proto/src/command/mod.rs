//! The [`Command`] enum: every client and server-to-server verb this core
//! understands, plus typed parse/serialize halves.

mod parse;
mod serialize;
mod types;

pub use types::Command;
