use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use lambda_runtime::{tracing, Error, LambdaEvent};
use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::error::{AttendanceError, AttendanceResult};
use crate::model::{ImageRef, NewStudent};
use crate::pipeline::Registrar;
use crate::services::{FaceIndex, RecordStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredStudent {
    pub face_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUpload {
    pub key: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    pub registered: Vec<RegisteredStudent>,
    pub failed: Vec<FailedUpload>,
}

/// Derives a student's name from an uploaded portrait key:
/// `John_Smith Jr.jpg` is John / Smith Jr.
pub fn student_from_key(key: &str) -> NewStudent {
    let stem = key.split('.').next().unwrap_or_default();
    let mut parts = stem.split('_');
    let first_name = parts.next().unwrap_or_default().to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");
    NewStudent {
        first_name,
        last_name,
        email: None,
    }
}

/// Decodes an S3 notification key, which is form-encoded: `+` is a space and
/// everything else is percent-escaped UTF-8.
fn decode_object_key(raw: &str) -> AttendanceResult<String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|key| key.into_owned())
        .map_err(|_| AttendanceError::Validation(format!("Object key {raw} is not valid UTF-8")))
}

fn image_ref(record: &S3EventRecord) -> AttendanceResult<ImageRef> {
    let bucket = record
        .s3
        .bucket
        .name
        .clone()
        .ok_or_else(|| AttendanceError::Validation("No bucket name found in S3 event".into()))?;
    let raw_key = record
        .s3
        .object
        .key
        .as_deref()
        .ok_or_else(|| AttendanceError::Validation("No object key found in S3 event".into()))?;
    Ok(ImageRef::new(bucket, decode_object_key(raw_key)?))
}

async fn register_record<F: FaceIndex, R: RecordStore>(
    registrar: &Registrar<'_, F, R>,
    record: &S3EventRecord,
) -> AttendanceResult<RegisteredStudent> {
    let image = image_ref(record)?;
    let student = student_from_key(&image.key);
    tracing::info!(
        "Registering {} {} from {}",
        student.first_name,
        student.last_name,
        image
    );
    let stored = registrar.register(&image, student).await?;
    Ok(RegisteredStudent {
        face_id: stored.face_id,
        first_name: stored.first_name,
        last_name: stored.last_name,
    })
}

/// Registers every uploaded portrait in the event.
///
/// A failed record is logged and skipped. The invocation only fails when no
/// record was registered: S3 retries failed invocations, and a retry after a
/// partial success would index the successful portraits a second time.
pub async fn function_handler<F, R>(
    event: LambdaEvent<S3Event>,
    registrar: &Registrar<'_, F, R>,
) -> Result<RegistrationSummary, Error>
where
    F: FaceIndex,
    R: RecordStore,
{
    let payload = event.payload;
    if payload.records.is_empty() {
        tracing::warn!("No records found in S3 event");
        return Ok(RegistrationSummary::default());
    }

    let mut summary = RegistrationSummary::default();
    let mut first_error = None;
    for record in &payload.records {
        match register_record(registrar, record).await {
            Ok(student) => summary.registered.push(student),
            Err(err) => {
                let key = record.s3.object.key.clone().unwrap_or_default();
                tracing::error!("Error processing student image {}: {}", key, err.detailed());
                summary.failed.push(FailedUpload {
                    key,
                    error: err.to_string(),
                });
                first_error.get_or_insert(err);
            }
        }
    }

    if summary.registered.is_empty() {
        if let Some(err) = first_error {
            return Err(err.into());
        }
    }
    tracing::info!(
        "Registered {} students, {} uploads failed",
        summary.registered.len(),
        summary.failed.len()
    );
    Ok(summary)
}
