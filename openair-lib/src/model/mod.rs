//! Typed models

mod record;
pub mod types;
mod value;

pub use record::*;
pub use value::*;
