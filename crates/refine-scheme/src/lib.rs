//! Scheme documents and change-based scheme filtering

pub mod error;
pub mod filter;
pub mod model;


pub use error::{Result, SchemeError};
pub use filter::{SchemeFilter, TargetDecision};
pub use model::{BuildAction, BuildEntry, Scheme, SchemeFormat, TestEntry};
