//! Serverless handlers for a face-recognition classroom attendance system.
//!
//! Students are registered by indexing a portrait in a face collection and
//! storing their identity under the returned face id. A classroom photo is
//! later split into unique faces, each face is matched against the
//! collection, and recognized students have their attendance stamped.

#![allow(async_fn_in_trait)]

pub mod config;
pub mod error;
pub mod faces;
pub mod handlers;
pub mod model;
pub mod pipeline;
pub mod services;

#[cfg(test)]
mod testing;

pub use config::{AttendanceMode, Settings};
pub use error::{AttendanceError, AttendanceResult};
