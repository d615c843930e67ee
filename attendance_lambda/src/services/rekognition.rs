use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{Attribute, Image, S3Object};
use aws_sdk_rekognition::Client as RekognitionClient;
use lambda_runtime::tracing;

use crate::error::{AttendanceError, AttendanceResult};
use crate::model::{BoundingBox, FaceMatch, ImageRef};
use crate::services::FaceIndex;

/// Face index backed by one Rekognition collection.
#[derive(Debug, Clone)]
pub struct RekognitionFaceIndex {
    client: RekognitionClient,
    collection_id: String,
}

impl RekognitionFaceIndex {
    pub fn new(client: RekognitionClient, collection_id: impl Into<String>) -> Self {
        Self {
            client,
            collection_id: collection_id.into(),
        }
    }
}

fn inline_image(bytes: &[u8]) -> Image {
    Image::builder().bytes(Blob::new(bytes)).build()
}

impl FaceIndex for RekognitionFaceIndex {
    async fn detect_faces(&self, image: &[u8]) -> AttendanceResult<Vec<BoundingBox>> {
        let response = self
            .client
            .detect_faces()
            .image(inline_image(image))
            .attributes(Attribute::Default)
            .send()
            .await
            .map_err(AttendanceError::face_index)?;
        let boxes = response
            .face_details()
            .iter()
            .filter_map(|detail| detail.bounding_box())
            .map(|bounding_box| {
                BoundingBox::new(
                    bounding_box.left().unwrap_or_default(),
                    bounding_box.top().unwrap_or_default(),
                    bounding_box.width().unwrap_or_default(),
                    bounding_box.height().unwrap_or_default(),
                )
            })
            .collect();
        Ok(boxes)
    }

    async fn index_face(&self, image: &ImageRef) -> AttendanceResult<Vec<String>> {
        let source = S3Object::builder()
            .bucket(&image.bucket)
            .name(&image.key)
            .build();
        let response = self
            .client
            .index_faces()
            .collection_id(&self.collection_id)
            .image(Image::builder().s3_object(source).build())
            .send()
            .await
            .map_err(AttendanceError::face_index)?;
        let face_ids: Vec<String> = response
            .face_records()
            .iter()
            .filter_map(|record| record.face().and_then(|face| face.face_id()))
            .map(str::to_owned)
            .collect();
        tracing::info!(
            "Indexed {} into {} with face ids {:?}",
            image,
            self.collection_id,
            face_ids
        );
        Ok(face_ids)
    }

    async fn search_best_match(
        &self,
        image: &[u8],
        threshold: f32,
        max_results: i32,
    ) -> AttendanceResult<Vec<FaceMatch>> {
        let response = self
            .client
            .search_faces_by_image()
            .collection_id(&self.collection_id)
            .image(inline_image(image))
            .face_match_threshold(threshold)
            .max_faces(max_results)
            .send()
            .await
            .map_err(AttendanceError::face_index)?;
        let matches = response
            .face_matches()
            .iter()
            .filter_map(|face_match| {
                let face_id = face_match.face().and_then(|face| face.face_id())?;
                Some(FaceMatch {
                    face_id: face_id.to_owned(),
                    confidence: face_match.similarity().unwrap_or_default(),
                })
            })
            .collect();
        Ok(matches)
    }
}
