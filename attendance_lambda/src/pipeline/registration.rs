use lambda_runtime::tracing;

use crate::error::{AttendanceError, AttendanceResult};
use crate::model::{IdentityRecord, ImageRef, NewStudent};
use crate::services::{FaceIndex, RecordStore};

/// Indexes a student's portrait and stores their identity under the face id.
pub struct Registrar<'a, F, R> {
    face_index: &'a F,
    records: &'a R,
}

impl<'a, F: FaceIndex, R: RecordStore> Registrar<'a, F, R> {
    pub fn new(face_index: &'a F, records: &'a R) -> Self {
        Self {
            face_index,
            records,
        }
    }

    /// When the portrait holds several faces the first indexed one is used.
    ///
    /// There is no rollback: if the record write fails the face stays in the
    /// collection without an identity.
    pub async fn register(
        &self,
        image: &ImageRef,
        student: NewStudent,
    ) -> AttendanceResult<IdentityRecord> {
        let face_id = self
            .face_index
            .index_face(image)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AttendanceError::NoFaceDetected {
                bucket: image.bucket.clone(),
                key: image.key.clone(),
            })?;
        tracing::info!("Image {} indexed with face id {}", image, face_id);

        let record = IdentityRecord::registered(face_id, student);
        if let Err(err) = self.records.put(&record).await {
            tracing::error!(
                "Face {} is indexed but its student record was not stored: {}",
                record.face_id,
                err.detailed()
            );
            return Err(err);
        }
        Ok(record)
    }
}
