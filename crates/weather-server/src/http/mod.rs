//! Minimal wire-level HTTP: one request in, one response out, no keep-alive.

mod request;
mod response;

pub use request::{parse_request, Method, Request};
pub use response::{error_response, Response};
