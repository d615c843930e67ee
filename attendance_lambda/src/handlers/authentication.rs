use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::Serialize;

use crate::handlers::response::json_response;
use crate::model::RecognizedStudent;
use crate::pipeline::{AuthenticationOutcome, Authenticator};
use crate::services::{FaceIndex, ImageStore, RecordStore};

const OBJECT_KEY_PARAM: &str = "objectKey";

#[derive(Debug, Serialize)]
struct AuthenticationBody<'a> {
    #[serde(rename = "Message")]
    message: &'a str,
    #[serde(rename = "recognizedStudents", skip_serializing_if = "Option::is_none")]
    recognized_students: Option<&'a [RecognizedStudent]>,
}

impl<'a> AuthenticationBody<'a> {
    fn message(message: &'a str) -> Self {
        Self {
            message,
            recognized_students: None,
        }
    }
}

pub async fn function_handler<S, F, R>(
    event: LambdaEvent<ApiGatewayProxyRequest>,
    authenticator: &Authenticator<'_, S, F, R>,
) -> Result<ApiGatewayProxyResponse, Error>
where
    S: ImageStore,
    F: FaceIndex,
    R: RecordStore,
{
    let request = event.payload;
    let Some(object_key) = request
        .query_string_parameters
        .first(OBJECT_KEY_PARAM)
        .filter(|key| !key.trim().is_empty())
    else {
        tracing::warn!("Request without {} query parameter", OBJECT_KEY_PARAM);
        return Ok(json_response(
            400,
            &AuthenticationBody::message("Missing objectKey query parameter"),
        )?);
    };
    tracing::info!("Authenticating students in {}", object_key);

    let response = match authenticator.authenticate(object_key).await {
        Ok(AuthenticationOutcome::Recognized(students)) => json_response(
            200,
            &AuthenticationBody {
                message: "Success",
                recognized_students: Some(students.as_slice()),
            },
        )?,
        Ok(AuthenticationOutcome::NoneFound) => {
            json_response(403, &AuthenticationBody::message("No students found!"))?
        }
        Err(err) => {
            tracing::error!("Authentication of {} failed: {}", object_key, err.detailed());
            json_response(
                err.status_code(),
                &AuthenticationBody::message(&err.to_string()),
            )?
        }
    };
    Ok(response)
}
