//! Data models for flight board entities

mod airport;
mod flight;
mod schedule;
mod status;

pub use airport::*;
pub use flight::*;
pub use schedule::*;
pub use status::*;
