//! Lambda entry points: decode the inbound event, run a pipeline, shape the reply.

pub mod authentication;
pub mod registration;
pub mod registration_auto;
pub mod response;

pub use response::json_response;
