//! OpenAir XML API client library
//!
//! Infers the field layout of OpenAir record types from a sample response and
//! enumerates every record of a type through authenticated, paginated,
//! retrying background reads.

pub mod api;
pub mod error;
pub mod model;
pub mod naming;
pub mod retry;
pub mod schema;
pub mod stream;

mod client;
mod config;
mod transport;

pub use client::*;
pub use config::Config;
pub use error::Error;
pub use schema::Field;
pub use schema::RecordTypeDescriptor;
pub use schema::ValueKind;
pub use stream::RecordStream;
pub use transport::HttpTransport;
pub use transport::Transport;
