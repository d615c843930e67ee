use aws_sdk_s3::Client as S3Client;
use lambda_runtime::tracing;

use crate::error::{AttendanceError, AttendanceResult};
use crate::model::ImageRef;
use crate::services::ImageStore;

#[derive(Debug, Clone)]
pub struct S3ImageStore {
    client: S3Client,
}

impl S3ImageStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

impl ImageStore for S3ImageStore {
    async fn get(&self, image: &ImageRef) -> AttendanceResult<Vec<u8>> {
        tracing::info!("Fetching {}", image);
        let object = self
            .client
            .get_object()
            .bucket(&image.bucket)
            .key(&image.key)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|service| service.is_no_such_key())
                {
                    AttendanceError::ImageNotFound {
                        bucket: image.bucket.clone(),
                        key: image.key.clone(),
                    }
                } else {
                    AttendanceError::image_store(err)
                }
            })?;
        let body = object
            .body
            .collect()
            .await
            .map_err(AttendanceError::image_store)?;
        Ok(body.into_bytes().to_vec())
    }
}
