//! OpenAir composite data types

mod address;
mod date;

pub use address::*;
pub use date::*;
