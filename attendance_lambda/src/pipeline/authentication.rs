use image::GenericImageView;
use lambda_runtime::tracing;

use crate::config::AttendanceMode;
use crate::error::{AttendanceError, AttendanceResult};
use crate::faces::{crop_face, dedup_faces};
use crate::model::{ImageRef, RecognizedStudent};
use crate::pipeline::resolver::{BestMatchResolver, Resolution};
use crate::services::{FaceIndex, ImageStore, RecordStore};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticationOutcome {
    /// At least one student, in detection order.
    Recognized(Vec<RecognizedStudent>),
    NoneFound,
}

/// Recognizes the students in a classroom photo.
pub struct Authenticator<'a, S, F, R> {
    images: &'a S,
    face_index: &'a F,
    records: &'a R,
    bucket: String,
    mode: AttendanceMode,
}

impl<'a, S, F, R> Authenticator<'a, S, F, R>
where
    S: ImageStore,
    F: FaceIndex,
    R: RecordStore,
{
    pub fn new(
        images: &'a S,
        face_index: &'a F,
        records: &'a R,
        bucket: impl Into<String>,
        mode: AttendanceMode,
    ) -> Self {
        Self {
            images,
            face_index,
            records,
            bucket: bucket.into(),
            mode,
        }
    }

    /// Fetch, decode and detection failures abort the call. Crop or match
    /// failures for a single face are logged and that face is skipped.
    pub async fn authenticate(&self, object_key: &str) -> AttendanceResult<AuthenticationOutcome> {
        let source = ImageRef::new(self.bucket.as_str(), object_key);
        let bytes = self.images.get(&source).await?;
        let image = image::load_from_memory(&bytes)
            .map_err(|source| AttendanceError::ImageDecode { source })?;
        let (width, height) = image.dimensions();

        let boxes = self.face_index.detect_faces(&bytes).await?;
        tracing::info!("Detected {} faces in {} ({}x{})", boxes.len(), source, width, height);

        let resolver = BestMatchResolver::new(self.face_index, self.records, self.mode);
        let mut recognized = Vec::new();
        for face in dedup_faces(&boxes, width, height) {
            tracing::debug!(rect = %face.rect, "Processing face");
            let crop = match crop_face(&image, face.rect) {
                Ok(crop) => crop,
                Err(err) => {
                    tracing::warn!("Skipping face {}: {}", face.rect, err.detailed());
                    continue;
                }
            };
            match resolver.resolve(&crop, face.bounding_box).await {
                Ok(Resolution::Recognized(student)) => {
                    tracing::info!(
                        "Recognized {} {} ({:.2})",
                        student.first_name,
                        student.last_name,
                        student.confidence
                    );
                    recognized.push(student);
                }
                Ok(Resolution::NoMatchFound) | Ok(Resolution::IdentityNotFound { .. }) => {}
                Err(err) => {
                    tracing::warn!("Matching failed for face {}: {}", face.rect, err.detailed());
                }
            }
        }

        if recognized.is_empty() {
            tracing::info!("No students could be recognized in {}", source);
            return Ok(AuthenticationOutcome::NoneFound);
        }
        Ok(AuthenticationOutcome::Recognized(recognized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, FaceMatch};
    use crate::testing::{
        sample_jpeg, student, MemoryFaceIndex, MemoryImageStore, MemoryRecordStore,
    };

    const BUCKET: &str = "utar-attendance-images";

    fn photo_store() -> MemoryImageStore {
        MemoryImageStore::default().with_object(BUCKET, "class.jpeg", sample_jpeg(200, 100))
    }

    #[tokio::test]
    async fn photo_without_faces_is_none_found() {
        let images = photo_store();
        let index = MemoryFaceIndex::detecting(Vec::new(), 99.0);
        let records = MemoryRecordStore::default();
        let auth =
            Authenticator::new(&images, &index, &records, BUCKET, AttendanceMode::MarkAttendance);
        assert_eq!(
            auth.authenticate("class.jpeg").await.unwrap(),
            AuthenticationOutcome::NoneFound
        );
        assert_eq!(index.search_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_detections_are_searched_once() {
        let images = photo_store();
        let face = BoundingBox::new(0.1, 0.1, 0.2, 0.4);
        let index = MemoryFaceIndex {
            indexed: vec!["face-1".to_string()].into(),
            ..MemoryFaceIndex::detecting(vec![face, face], 92.0)
        };
        let records = MemoryRecordStore::default().with_record(student("face-1", "Jane", "Doe"));
        let auth =
            Authenticator::new(&images, &index, &records, BUCKET, AttendanceMode::MarkAttendance);

        let outcome = auth.authenticate("class.jpeg").await.unwrap();
        let AuthenticationOutcome::Recognized(students) = outcome else {
            panic!("expected a recognized student, got {outcome:?}");
        };
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].bounding_box, face);
        assert_eq!(index.search_count(), 1);
        assert!(records.record("face-1").unwrap().attendance_status);
    }

    #[tokio::test]
    async fn failing_face_does_not_stop_the_rest() {
        let images = photo_store();
        let index = MemoryFaceIndex::detecting(
            vec![
                // Entirely right of the frame: crop fails.
                BoundingBox::new(1.5, 0.1, 0.2, 0.2),
                BoundingBox::new(0.1, 0.1, 0.2, 0.2),
                BoundingBox::new(0.5, 0.1, 0.2, 0.2),
                BoundingBox::new(0.7, 0.1, 0.2, 0.2),
            ],
            0.0,
        );
        index.scripted_searches.lock().unwrap().extend([
            None,
            Some(vec![FaceMatch {
                face_id: "face-orphan".into(),
                confidence: 88.0,
            }]),
            Some(vec![FaceMatch {
                face_id: "face-2".into(),
                confidence: 85.5,
            }]),
        ]);
        let records =
            MemoryRecordStore::default().with_record(student("face-2", "John", "Smith Jr"));
        let auth =
            Authenticator::new(&images, &index, &records, BUCKET, AttendanceMode::RecognizeOnly);

        let outcome = auth.authenticate("class.jpeg").await.unwrap();
        assert_eq!(
            outcome,
            AuthenticationOutcome::Recognized(vec![RecognizedStudent {
                first_name: "John".into(),
                last_name: "Smith Jr".into(),
                confidence: 85.5,
                bounding_box: BoundingBox::new(0.7, 0.1, 0.2, 0.2),
            }])
        );
        assert_eq!(index.search_count(), 3);
    }

    #[tokio::test]
    async fn detection_failure_aborts() {
        let images = photo_store();
        let index = MemoryFaceIndex {
            fail_detection: true,
            ..Default::default()
        };
        let records = MemoryRecordStore::default();
        let auth =
            Authenticator::new(&images, &index, &records, BUCKET, AttendanceMode::MarkAttendance);
        let err = auth.authenticate("class.jpeg").await.unwrap_err();
        assert!(matches!(err, AttendanceError::FaceIndex(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn missing_photo_aborts() {
        let images = MemoryImageStore::default();
        let index = MemoryFaceIndex::default();
        let records = MemoryRecordStore::default();
        let auth =
            Authenticator::new(&images, &index, &records, BUCKET, AttendanceMode::MarkAttendance);
        let err = auth.authenticate("nope.jpeg").await.unwrap_err();
        assert!(matches!(err, AttendanceError::ImageNotFound { .. }));
    }
}
