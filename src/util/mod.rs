//! Utility modules

pub mod buffer;
pub mod diskspace;
pub mod memory;
pub mod time;
