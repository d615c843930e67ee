use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::error::{AttendanceError, AttendanceResult};

const ATTENDANCE_BUCKET_ENV: &str = "ATTENDANCE_BUCKET";
const STUDENT_IMAGES_BUCKET_ENV: &str = "STUDENT_IMAGES_BUCKET";
const STUDENT_TABLE_ENV: &str = "STUDENT_TABLE";
const FACE_COLLECTION_ENV: &str = "FACE_COLLECTION_ID";
const REGION_ENV: &str = "SERVICE_REGION";
const MARK_ATTENDANCE_ENV: &str = "MARK_ATTENDANCE";

const DEFAULT_ATTENDANCE_BUCKET: &str = "utar-attendance-images";
const DEFAULT_STUDENT_IMAGES_BUCKET: &str = "utar-student-images";
const DEFAULT_STUDENT_TABLE: &str = "utar-student";
const DEFAULT_FACE_COLLECTION: &str = "student-collection";

/// Whether a recognized face also stamps the student's attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttendanceMode {
    RecognizeOnly,
    #[default]
    MarkAttendance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub attendance_bucket: String,
    pub student_images_bucket: String,
    pub student_table: String,
    pub face_collection_id: String,
    pub region: Option<String>,
    pub mode: AttendanceMode,
}

impl Settings {
    pub fn from_env() -> AttendanceResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AttendanceResult<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let or_default =
            |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let mode = match var(MARK_ATTENDANCE_ENV) {
            None => AttendanceMode::default(),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => AttendanceMode::MarkAttendance,
                "false" | "0" | "no" => AttendanceMode::RecognizeOnly,
                _ => {
                    return Err(AttendanceError::Config {
                        name: MARK_ATTENDANCE_ENV,
                        message: format!("expected a boolean, got '{raw}'"),
                    })
                }
            },
        };

        Ok(Self {
            attendance_bucket: or_default(ATTENDANCE_BUCKET_ENV, DEFAULT_ATTENDANCE_BUCKET),
            student_images_bucket: or_default(
                STUDENT_IMAGES_BUCKET_ENV,
                DEFAULT_STUDENT_IMAGES_BUCKET,
            ),
            student_table: or_default(STUDENT_TABLE_ENV, DEFAULT_STUDENT_TABLE),
            face_collection_id: or_default(FACE_COLLECTION_ENV, DEFAULT_FACE_COLLECTION),
            region: var(REGION_ENV),
            mode,
        })
    }

    pub async fn load_aws_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::v2025_01_17());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        loader.load().await
    }
}
