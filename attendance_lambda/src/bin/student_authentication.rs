use attendance_lambda::handlers::authentication::function_handler;
use attendance_lambda::pipeline::Authenticator;
use attendance_lambda::services::{DynamoRecordStore, RekognitionFaceIndex, S3ImageStore};
use attendance_lambda::Settings;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_rekognition::Client as RekognitionClient;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{run, service_fn, tracing, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::subscriber::fmt().json().init();
    let settings = Settings::from_env()?;
    let shared_config = settings.load_aws_config().await;
    let images = S3ImageStore::new(S3Client::new(&shared_config));
    let face_index = RekognitionFaceIndex::new(
        RekognitionClient::new(&shared_config),
        &settings.face_collection_id,
    );
    let records =
        DynamoRecordStore::new(DynamoClient::new(&shared_config), &settings.student_table);
    let authenticator = Authenticator::new(
        &images,
        &face_index,
        &records,
        &settings.attendance_bucket,
        settings.mode,
    );
    run(service_fn(|event| function_handler(event, &authenticator))).await
}
