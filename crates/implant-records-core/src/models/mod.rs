//! Domain models for the implant record store.

mod operation;
mod patient;

pub use operation::*;
pub use patient::*;
