use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use base64::{engine::general_purpose, Engine as _};
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AttendanceError, AttendanceResult};
use crate::handlers::response::json_response;
use crate::model::{ImageRef, NewStudent};
use crate::pipeline::Registrar;
use crate::services::{FaceIndex, RecordStore};

/// Body of a manual registration request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub file_name: Option<String>,
}

/// A registration request with every field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub student: NewStudent,
    pub file_name: String,
}

impl RegistrationRequest {
    pub fn from_proxy_request(request: &ApiGatewayProxyRequest) -> AttendanceResult<Self> {
        let body = request
            .body
            .as_deref()
            .filter(|body| !body.is_empty())
            .ok_or_else(|| AttendanceError::Validation("Request body is missing".into()))?;
        let body = if request.is_base64_encoded {
            let decoded = general_purpose::STANDARD.decode(body).map_err(|err| {
                AttendanceError::Validation(format!("Request body is not valid base64: {err}"))
            })?;
            String::from_utf8(decoded).map_err(|_| {
                AttendanceError::Validation("Request body is not valid UTF-8".into())
            })?
        } else {
            body.to_string()
        };
        serde_json::from_str(&body).map_err(|err| {
            AttendanceError::Validation(format!("Request body is not valid JSON: {err}"))
        })
    }

    pub fn validate(self) -> AttendanceResult<ValidRegistration> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|value| !value.trim().is_empty())
        }
        match (
            present(self.first_name),
            present(self.last_name),
            present(self.email),
            present(self.file_name),
        ) {
            (Some(first_name), Some(last_name), Some(email), Some(file_name)) => {
                Ok(ValidRegistration {
                    student: NewStudent {
                        first_name,
                        last_name,
                        email: Some(email),
                    },
                    file_name,
                })
            }
            _ => Err(AttendanceError::Validation(
                "Missing required fields in the request body".into(),
            )),
        }
    }
}

pub async fn function_handler<F, R>(
    event: LambdaEvent<ApiGatewayProxyRequest>,
    registrar: &Registrar<'_, F, R>,
    bucket: &str,
) -> Result<ApiGatewayProxyResponse, Error>
where
    F: FaceIndex,
    R: RecordStore,
{
    let result = async {
        let registration = RegistrationRequest::from_proxy_request(&event.payload)?.validate()?;
        tracing::info!(
            "Registering {} {} from {}",
            registration.student.first_name,
            registration.student.last_name,
            registration.file_name
        );
        let image = ImageRef::new(bucket, registration.file_name);
        registrar.register(&image, registration.student).await
    }
    .await;

    let response = match result {
        Ok(record) => {
            tracing::info!("Registered student with face id {}", record.face_id);
            json_response(200, &json!({ "message": "Student registered successfully!" }))?
        }
        Err(err) => {
            if err.is_client_error() {
                tracing::warn!("Registration rejected: {}", err);
            } else {
                tracing::error!("Registration failed: {}", err.detailed());
            }
            json_response(err.status_code(), &json!({ "error": err.to_string() }))?
        }
    };
    Ok(response)
}
