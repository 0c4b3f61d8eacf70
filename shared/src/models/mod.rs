//! Domain models for the Farm Weather service

mod condition;
mod settings;
mod weather;

pub use condition::*;
pub use settings::*;
pub use weather::*;
