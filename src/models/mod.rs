//! Request and response data model.
//!
//! These are the types that flow through the agent: intercepted requests,
//! live network responses, and the durable form a response takes inside a
//! cache generation.

pub mod request;
pub mod response;

pub use request::{Destination, Method, Request};
pub use response::{Response, ResponseKind, StoredResponse};
