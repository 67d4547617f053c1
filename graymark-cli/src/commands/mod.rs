//! CLI command implementations.

pub mod generate;
pub mod keygen;
pub mod read;
pub mod verify;
