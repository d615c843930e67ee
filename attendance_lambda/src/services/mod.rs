//! The three managed services the pipelines talk to, behind narrow traits so
//! that the pipelines can run against fakes.

pub mod dynamodb;
pub mod rekognition;
pub mod s3;

pub use dynamodb::DynamoRecordStore;
pub use rekognition::RekognitionFaceIndex;
pub use s3::S3ImageStore;

use crate::error::AttendanceResult;
use crate::model::{AttendanceUpdate, BoundingBox, FaceMatch, IdentityRecord, ImageRef};

pub trait ImageStore {
    /// Fails with `ImageNotFound` when the key is absent.
    async fn get(&self, image: &ImageRef) -> AttendanceResult<Vec<u8>>;
}

pub trait FaceIndex {
    async fn detect_faces(&self, image: &[u8]) -> AttendanceResult<Vec<BoundingBox>>;

    /// Adds the faces in a stored image to the collection. Empty when the
    /// image contains no face.
    async fn index_face(&self, image: &ImageRef) -> AttendanceResult<Vec<String>>;

    /// Empty when nothing scores at or above `threshold`.
    async fn search_best_match(
        &self,
        image: &[u8],
        threshold: f32,
        max_results: i32,
    ) -> AttendanceResult<Vec<FaceMatch>>;
}

pub trait RecordStore {
    async fn get(&self, face_id: &str) -> AttendanceResult<Option<IdentityRecord>>;

    async fn put(&self, record: &IdentityRecord) -> AttendanceResult<()>;

    /// Blind overwrite of the attendance fields of an existing record.
    async fn update_attendance(
        &self,
        face_id: &str,
        update: AttendanceUpdate,
    ) -> AttendanceResult<()>;
}
