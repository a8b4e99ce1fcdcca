use crate::detection::Detection;

/// Keeps the detections scoring at least `threshold`, in their original order.
///
/// NaN scores never pass.
pub fn by_confidence(mut detections: Vec<Detection>, threshold: f32) -> Vec<Detection> {
    detections.retain(|d| d.confidence >= threshold);
    detections
}
