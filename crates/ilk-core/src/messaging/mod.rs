//! Chat platform abstractions (message builder + update port).

pub mod port;
pub mod types;
