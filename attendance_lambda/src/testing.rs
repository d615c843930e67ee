//! In-memory stand-ins for the managed services.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::{AttendanceError, AttendanceResult};
use crate::model::{AttendanceUpdate, BoundingBox, FaceMatch, IdentityRecord, ImageRef};
use crate::services::{FaceIndex, ImageStore, RecordStore};

pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut bytes, ImageFormat::Jpeg)
        .unwrap();
    bytes.into_inner()
}

#[derive(Default)]
pub struct MemoryImageStore {
    objects: HashMap<(String, String), Vec<u8>>,
}

impl MemoryImageStore {
    pub fn with_object(mut self, bucket: &str, key: &str, bytes: Vec<u8>) -> Self {
        self.objects.insert((bucket.into(), key.into()), bytes);
        self
    }
}

impl ImageStore for MemoryImageStore {
    async fn get(&self, image: &ImageRef) -> AttendanceResult<Vec<u8>> {
        self.objects
            .get(&(image.bucket.clone(), image.key.clone()))
            .cloned()
            .ok_or_else(|| AttendanceError::ImageNotFound {
                bucket: image.bucket.clone(),
                key: image.key.clone(),
            })
    }
}

/// Every indexed face "appears" in every searched crop with `similarity`.
/// Individual searches can be scripted to fail or return a fixed answer.
#[derive(Default)]
pub struct MemoryFaceIndex {
    pub detections: Vec<BoundingBox>,
    pub similarity: f32,
    pub fail_detection: bool,
    pub faces_per_image: HashMap<String, usize>,
    pub scripted_searches: Mutex<Vec<Option<Vec<FaceMatch>>>>,
    pub indexed: Mutex<Vec<String>>,
    pub searches: Mutex<Vec<(f32, i32)>>,
}

impl MemoryFaceIndex {
    pub fn detecting(detections: Vec<BoundingBox>, similarity: f32) -> Self {
        Self {
            detections,
            similarity,
            ..Default::default()
        }
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }
}

impl FaceIndex for MemoryFaceIndex {
    async fn detect_faces(&self, _image: &[u8]) -> AttendanceResult<Vec<BoundingBox>> {
        if self.fail_detection {
            return Err(AttendanceError::face_index("detect_faces throttled"));
        }
        Ok(self.detections.clone())
    }

    async fn index_face(&self, image: &ImageRef) -> AttendanceResult<Vec<String>> {
        let faces = self.faces_per_image.get(&image.key).copied().unwrap_or(1);
        let mut indexed = self.indexed.lock().unwrap();
        let ids: Vec<String> = (0..faces)
            .map(|n| format!("face-{}", indexed.len() + n + 1))
            .collect();
        indexed.extend(ids.iter().cloned());
        Ok(ids)
    }

    async fn search_best_match(
        &self,
        _image: &[u8],
        threshold: f32,
        max_results: i32,
    ) -> AttendanceResult<Vec<FaceMatch>> {
        self.searches.lock().unwrap().push((threshold, max_results));
        let scripted = {
            let mut scripted = self.scripted_searches.lock().unwrap();
            if scripted.is_empty() {
                None
            } else {
                Some(scripted.remove(0))
            }
        };
        match scripted {
            Some(Some(matches)) => return Ok(matches),
            Some(None) => return Err(AttendanceError::face_index("search_faces_by_image failed")),
            None => {}
        }
        if self.similarity < threshold {
            return Ok(Vec::new());
        }
        Ok(self
            .indexed
            .lock()
            .unwrap()
            .iter()
            .take(usize::try_from(max_results).unwrap_or(0))
            .map(|face_id| FaceMatch {
                face_id: face_id.clone(),
                confidence: self.similarity,
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    pub records: Mutex<HashMap<String, IdentityRecord>>,
    pub updates: Mutex<Vec<(String, AttendanceUpdate)>>,
    pub fail_puts: bool,
}

impl MemoryRecordStore {
    pub fn with_record(self, record: IdentityRecord) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(record.face_id.clone(), record);
        self
    }

    pub fn record(&self, face_id: &str) -> Option<IdentityRecord> {
        self.records.lock().unwrap().get(face_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl RecordStore for MemoryRecordStore {
    async fn get(&self, face_id: &str) -> AttendanceResult<Option<IdentityRecord>> {
        Ok(self.record(face_id))
    }

    async fn put(&self, record: &IdentityRecord) -> AttendanceResult<()> {
        if self.fail_puts {
            return Err(AttendanceError::record_store("put_item failed"));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.face_id.clone(), record.clone());
        Ok(())
    }

    async fn update_attendance(
        &self,
        face_id: &str,
        update: AttendanceUpdate,
    ) -> AttendanceResult<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(face_id)
            .ok_or_else(|| AttendanceError::record_store("update_item failed"))?;
        record.attendance_status = update.attendance_status;
        record.record_time = Some(update.record_time);
        self.updates
            .lock()
            .unwrap()
            .push((face_id.to_string(), update));
        Ok(())
    }
}

pub fn student(face_id: &str, first_name: &str, last_name: &str) -> IdentityRecord {
    IdentityRecord {
        face_id: face_id.into(),
        first_name: first_name.into(),
        last_name: last_name.into(),
        email: None,
        attendance_status: false,
        record_time: None,
    }
}
