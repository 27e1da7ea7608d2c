//! Detector output: landmarks, hand detections and frames
//!
//! Coordinates are in video pixels. Detectors emit landmarks either as
//! `[x, y, z]` arrays or as `{x, y, z}` objects; both deserialize.

use serde::{Deserialize, Serialize};

use crate::{HALO_ALPHA, HALO_SCALE, LANDMARK_COUNT};

/// A single landmark point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Depth relative to the wrist; 0 when the detector is 2D only
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Xyz([f64; 3]),
    Xy([f64; 2]),
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Xyz([x, y, z]) => Landmark { x, y, z },
            LandmarkRepr::Xy([x, y]) => Landmark::new(x, y),
            LandmarkRepr::Object { x, y, z } => Landmark { x, y, z },
        }
    }
}

/// One detected hand
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HandDetection {
    pub landmarks: Vec<Landmark>,
}

impl HandDetection {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// A flat hand of `LANDMARK_COUNT` points spread around a centre
    pub fn centered_at(x: f64, y: f64, span: f64) -> Self {
        let landmarks = (0..LANDMARK_COUNT)
            .map(|i| {
                let t = i as f64 / (LANDMARK_COUNT - 1) as f64 - 0.5;
                Landmark::new(x + t * span, y - t.abs() * span)
            })
            .collect();
        Self { landmarks }
    }

    /// Has the full landmark set
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() == LANDMARK_COUNT
    }

    pub fn mean_x(&self) -> Option<f64> {
        mean(self.landmarks.iter().map(|l| l.x))
    }

    pub fn mean_y(&self) -> Option<f64> {
        mean(self.landmarks.iter().map(|l| l.y))
    }

    /// Horizontal extent (max x − min x)
    pub fn width(&self) -> f64 {
        let (min, max) = self
            .landmarks
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), l| {
                (lo.min(l.x), hi.max(l.x))
            });
        if min.is_finite() { max - min } else { 0.0 }
    }

    /// Aura circle over this hand, in video coordinates
    pub fn halo(&self) -> Option<AuraHalo> {
        Some(AuraHalo {
            center_x: self.mean_x()?,
            center_y: self.mean_y()?,
            diameter: self.width() * HALO_SCALE,
            alpha: HALO_ALPHA,
        })
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { None } else { Some(sum / count as f64) }
}

/// Detector output for one video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Video width in pixels
    pub width: f64,
    /// Video height in pixels
    pub height: f64,
    #[serde(default)]
    pub hands: Vec<HandDetection>,
}

impl Frame {
    pub fn empty(width: f64, height: f64) -> Self {
        Self { width, height, hands: Vec::new() }
    }

    pub fn with_hand(mut self, hand: HandDetection) -> Self {
        self.hands.push(hand);
        self
    }

    /// Frame with one hand whose landmarks average at `fraction` of the width
    pub fn with_hand_at(width: f64, height: f64, fraction: f64) -> Self {
        Self::empty(width, height)
            .with_hand(HandDetection::centered_at(width * fraction, height * 0.5, width * 0.1))
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }

    /// Mean x of a hand as a fraction of frame width
    pub fn horizontal_fraction(&self, hand: &HandDetection) -> Option<f64> {
        if self.width <= 0.0 {
            return None;
        }
        hand.mean_x().map(|x| x / self.width)
    }
}

/// Translucent circle drawn over the hand after the reveal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuraHalo {
    pub center_x: f64,
    pub center_y: f64,
    pub diameter: f64,
    /// Fill opacity of the aura color (0 – 255)
    pub alpha: u8,
}

impl AuraHalo {
    /// Map from video to canvas coordinates
    pub fn scaled(&self, frame: &Frame, canvas_w: f64, canvas_h: f64) -> Self {
        let sx = if frame.width > 0.0 { canvas_w / frame.width } else { 1.0 };
        let sy = if frame.height > 0.0 { canvas_h / frame.height } else { 1.0 };
        Self {
            center_x: self.center_x * sx,
            center_y: self.center_y * sy,
            diameter: self.diameter * sx,
            alpha: self.alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_from_array_and_object() {
        let lm: Vec<Landmark> =
            serde_json::from_str(r#"[[1.0, 2.0, 3.0], [4.0, 5.0], {"x": 6.0, "y": 7.0}]"#).unwrap();
        assert_eq!(lm[0], Landmark { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(lm[1], Landmark::new(4.0, 5.0));
        assert_eq!(lm[2], Landmark::new(6.0, 7.0));
    }

    #[test]
    fn test_mean_and_width() {
        let hand = HandDetection::new(vec![
            Landmark::new(10.0, 0.0),
            Landmark::new(30.0, 10.0),
            Landmark::new(20.0, 20.0),
        ]);
        assert_eq!(hand.mean_x(), Some(20.0));
        assert_eq!(hand.mean_y(), Some(10.0));
        assert_eq!(hand.width(), 20.0);
    }

    #[test]
    fn test_empty_hand_has_no_mean() {
        let hand = HandDetection::default();
        assert_eq!(hand.mean_x(), None);
        assert_eq!(hand.width(), 0.0);
        assert!(hand.halo().is_none());
    }

    #[test]
    fn test_halo_diameter_scales_hand_width() {
        let hand = HandDetection::new(vec![Landmark::new(100.0, 50.0), Landmark::new(200.0, 50.0)]);
        let halo = hand.halo().unwrap();
        assert!((halo.diameter - 170.0).abs() < 1e-9);
        assert_eq!(halo.center_x, 150.0);
    }

    #[test]
    fn test_halo_scaled_to_canvas() {
        let frame = Frame::empty(640.0, 480.0);
        let halo = AuraHalo { center_x: 320.0, center_y: 240.0, diameter: 100.0, alpha: HALO_ALPHA };
        let scaled = halo.scaled(&frame, 1280.0, 960.0);
        assert_eq!(scaled.center_x, 640.0);
        assert_eq!(scaled.center_y, 480.0);
        assert_eq!(scaled.diameter, 200.0);
        assert_eq!(scaled.alpha, HALO_ALPHA);
    }

    #[test]
    fn test_centered_hand_is_complete() {
        let frame = Frame::with_hand_at(640.0, 480.0, 0.4);
        let hand = &frame.hands[0];
        assert!(hand.is_complete());
        let fraction = frame.horizontal_fraction(hand).unwrap();
        assert!((fraction - 0.4).abs() < 1e-9);
    }
}
