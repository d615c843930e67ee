use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{DateTime, Utc};
use lambda_runtime::tracing;

use crate::error::{AttendanceError, AttendanceResult};
use crate::model::{AttendanceUpdate, IdentityRecord};
use crate::services::RecordStore;

const FACE_ID: &str = "rekognitionID";
const FIRST_NAME: &str = "firstName";
const LAST_NAME: &str = "lastName";
const EMAIL: &str = "email";
const ATTENDANCE_STATUS: &str = "attendanceStatus";
const RECORD_TIME: &str = "record_time";

/// Student identities in one DynamoDB table keyed by face id.
#[derive(Debug, Clone)]
pub struct DynamoRecordStore {
    client: DynamoClient,
    table: String,
}

impl DynamoRecordStore {
    pub fn new(client: DynamoClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

fn timestamp_value(time: Option<DateTime<Utc>>) -> AttributeValue {
    match time {
        Some(time) => AttributeValue::S(time.to_rfc3339()),
        None => AttributeValue::Null(true),
    }
}

fn to_item(record: &IdentityRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        (FACE_ID.to_string(), AttributeValue::S(record.face_id.clone())),
        (FIRST_NAME.to_string(), AttributeValue::S(record.first_name.clone())),
        (LAST_NAME.to_string(), AttributeValue::S(record.last_name.clone())),
        (
            ATTENDANCE_STATUS.to_string(),
            AttributeValue::Bool(record.attendance_status),
        ),
        (RECORD_TIME.to_string(), timestamp_value(record.record_time)),
    ]);
    if let Some(email) = &record.email {
        item.insert(EMAIL.to_string(), AttributeValue::S(email.clone()));
    }
    item
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
}

fn from_item(item: &HashMap<String, AttributeValue>) -> AttendanceResult<IdentityRecord> {
    let required = |name: &'static str| {
        string_attr(item, name).ok_or_else(|| {
            AttendanceError::record_store(format!("student record is missing {name}"))
        })
    };
    let record_time = match string_attr(item, RECORD_TIME) {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(&raw)
                .map_err(AttendanceError::record_store)?
                .with_timezone(&Utc),
        ),
        None => None,
    };
    Ok(IdentityRecord {
        face_id: required(FACE_ID)?,
        first_name: required(FIRST_NAME)?,
        last_name: required(LAST_NAME)?,
        email: string_attr(item, EMAIL),
        attendance_status: item
            .get(ATTENDANCE_STATUS)
            .and_then(|value| value.as_bool().ok())
            .copied()
            .unwrap_or(false),
        record_time,
    })
}

impl RecordStore for DynamoRecordStore {
    async fn get(&self, face_id: &str) -> AttendanceResult<Option<IdentityRecord>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(FACE_ID, AttributeValue::S(face_id.to_string()))
            .send()
            .await
            .map_err(AttendanceError::record_store)?;
        response.item().map(from_item).transpose()
    }

    async fn put(&self, record: &IdentityRecord) -> AttendanceResult<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_item(record)))
            .send()
            .await
            .map_err(AttendanceError::record_store)?;
        tracing::info!(
            "Stored student {} {} under face id {}",
            record.first_name,
            record.last_name,
            record.face_id
        );
        Ok(())
    }

    async fn update_attendance(
        &self,
        face_id: &str,
        update: AttendanceUpdate,
    ) -> AttendanceResult<()> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key(FACE_ID, AttributeValue::S(face_id.to_string()))
            .update_expression(format!(
                "SET {ATTENDANCE_STATUS} = :status, {RECORD_TIME} = :time"
            ))
            .expression_attribute_values(
                ":status",
                AttributeValue::Bool(update.attendance_status),
            )
            .expression_attribute_values(":time", timestamp_value(Some(update.record_time)))
            .send()
            .await
            .map_err(AttendanceError::record_store)?;
        Ok(())
    }
}
