//! XML API wire format

mod page;
mod request;
mod response;
pub mod xml;

pub use page::*;
pub use request::*;
pub use response::*;
