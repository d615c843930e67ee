use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Face position as fractions of the image size, as reported by the face index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
    pub left: f32,
    pub top: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            left,
            top,
        }
    }

    /// Scales into pixel space, truncating each component toward zero.
    pub fn to_pixel_rect(&self, image_width: u32, image_height: u32) -> PixelRect {
        let scale =
            |fraction: f32, dimension: u32| (f64::from(fraction) * f64::from(dimension)) as i64;
        PixelRect {
            left: scale(self.left, image_width),
            top: scale(self.top, image_height),
            width: scale(self.width, image_width),
            height: scale(self.height, image_height),
        }
    }
}

/// Pixel-space rectangle; two detections with the same rect are the same face.
///
/// Signed because the face index may report boxes that start slightly
/// outside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.left, self.top
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceMatch {
    pub face_id: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    pub face_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub attendance_status: bool,
    pub record_time: Option<DateTime<Utc>>,
}

impl IdentityRecord {
    /// A freshly registered student, not yet seen in class.
    pub fn registered(face_id: String, student: NewStudent) -> Self {
        Self {
            face_id,
            first_name: student.first_name,
            last_name: student.last_name,
            email: student.email,
            attendance_status: false,
            record_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendanceUpdate {
    pub attendance_status: bool,
    pub record_time: DateTime<Utc>,
}

impl AttendanceUpdate {
    pub fn present_at(record_time: DateTime<Utc>) -> Self {
        Self {
            attendance_status: true,
            record_time,
        }
    }
}

/// Reference to an image held in the image store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub bucket: String,
    pub key: String,
}

impl ImageRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedStudent {
    pub first_name: String,
    pub last_name: String,
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}
