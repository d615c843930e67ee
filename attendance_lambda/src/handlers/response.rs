use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use aws_lambda_events::encodings::Body;
use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use serde::Serialize;

use crate::error::AttendanceResult;

/// JSON proxy response open to any origin.
pub fn json_response<T: Serialize>(
    status: u16,
    body: &T,
) -> AttendanceResult<ApiGatewayProxyResponse> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    Ok(ApiGatewayProxyResponse {
        status_code: i64::from(status),
        headers,
        body: Some(Body::Text(serde_json::to_string(body)?)),
        ..Default::default()
    })
}

#[cfg(test)]
pub(crate) fn body_json(response: &ApiGatewayProxyResponse) -> serde_json::Value {
    match &response.body {
        Some(Body::Text(text)) => serde_json::from_str(text).unwrap(),
        other => panic!("expected a text body, got {other:?}"),
    }
}
