use std::collections::HashSet;

use lambda_runtime::tracing;

use crate::model::{BoundingBox, PixelRect};

/// A unique detection: its pixel rect plus the box it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedFace {
    pub rect: PixelRect,
    pub bounding_box: BoundingBox,
}

/// Converts detections to pixel rects and drops repeats of an already seen
/// rect, keeping first-seen order. Degenerate rects are kept.
pub fn dedup_faces(
    boxes: &[BoundingBox],
    image_width: u32,
    image_height: u32,
) -> Vec<DetectedFace> {
    let mut seen = HashSet::with_capacity(boxes.len());
    let mut faces = Vec::with_capacity(boxes.len());
    for bounding_box in boxes {
        let rect = bounding_box.to_pixel_rect(image_width, image_height);
        if !seen.insert(rect) {
            tracing::debug!(%rect, "Skipping duplicate face");
            continue;
        }
        faces.push(DetectedFace {
            rect,
            bounding_box: *bounding_box,
        });
    }
    faces
}
