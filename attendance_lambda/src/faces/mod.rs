//! Pure face geometry: detection dedup and crop extraction.

pub mod crop;
pub mod normalizer;

pub use crop::{crop_face, crop_face_bytes};
pub use normalizer::{dedup_faces, DetectedFace};
