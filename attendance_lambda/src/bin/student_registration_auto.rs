use attendance_lambda::handlers::registration_auto::function_handler;
use attendance_lambda::pipeline::Registrar;
use attendance_lambda::services::{DynamoRecordStore, RekognitionFaceIndex};
use attendance_lambda::Settings;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_rekognition::Client as RekognitionClient;
use lambda_runtime::{run, service_fn, tracing, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::subscriber::fmt().json().init();
    let settings = Settings::from_env()?;
    let shared_config = settings.load_aws_config().await;
    let face_index = RekognitionFaceIndex::new(
        RekognitionClient::new(&shared_config),
        &settings.face_collection_id,
    );
    let records =
        DynamoRecordStore::new(DynamoClient::new(&shared_config), &settings.student_table);
    let registrar = Registrar::new(&face_index, &records);
    run(service_fn(|event| function_handler(event, &registrar))).await
}
