use chrono::Utc;
use lambda_runtime::tracing;

use crate::config::AttendanceMode;
use crate::error::AttendanceResult;
use crate::model::{AttendanceUpdate, BoundingBox, RecognizedStudent};
use crate::services::{FaceIndex, RecordStore};

/// Minimum face-index similarity for a crop to count as a student.
pub const MATCH_THRESHOLD: f32 = 80.0;
/// Only the single best candidate is ever considered.
pub const MAX_MATCHES: i32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Recognized(RecognizedStudent),
    NoMatchFound,
    /// The face is indexed but nobody was registered under it.
    IdentityNotFound { face_id: String },
}

pub struct BestMatchResolver<'a, F, R> {
    face_index: &'a F,
    records: &'a R,
    mode: AttendanceMode,
}

impl<'a, F: FaceIndex, R: RecordStore> BestMatchResolver<'a, F, R> {
    pub fn new(face_index: &'a F, records: &'a R, mode: AttendanceMode) -> Self {
        Self {
            face_index,
            records,
            mode,
        }
    }

    pub async fn resolve(
        &self,
        crop: &[u8],
        bounding_box: BoundingBox,
    ) -> AttendanceResult<Resolution> {
        let matches = self
            .face_index
            .search_best_match(crop, MATCH_THRESHOLD, MAX_MATCHES)
            .await?;
        let Some(best) = matches
            .into_iter()
            .find(|candidate| candidate.confidence >= MATCH_THRESHOLD)
        else {
            return Ok(Resolution::NoMatchFound);
        };
        tracing::info!("Matched face {} ({:.2})", best.face_id, best.confidence);

        let Some(identity) = self.records.get(&best.face_id).await? else {
            tracing::warn!("Face {} has no student record", best.face_id);
            return Ok(Resolution::IdentityNotFound {
                face_id: best.face_id,
            });
        };

        if self.mode == AttendanceMode::MarkAttendance {
            self.records
                .update_attendance(&identity.face_id, AttendanceUpdate::present_at(Utc::now()))
                .await?;
        }

        Ok(Resolution::Recognized(RecognizedStudent {
            first_name: identity.first_name,
            last_name: identity.last_name,
            confidence: best.confidence,
            bounding_box,
        }))
    }
}
