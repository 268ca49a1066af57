//! Detected regions and recognized text tokens.

use serde::{Deserialize, Serialize};

/// Integer pixel rectangle `(x1, y1, x2, y2)`, exclusive on the far edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box covering a whole `width x height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Zero for degenerate boxes.
    pub fn area(&self) -> i64 {
        if self.is_degenerate() {
            0
        } else {
            self.width() as i64 * self.height() as i64
        }
    }

    /// `x1 >= x2` or `y1 >= y2`.
    pub fn is_degenerate(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    /// Clamp to image bounds. Returns `None` when nothing of the box is left
    /// inside the image.
    pub fn clamp(&self, width: u32, height: u32) -> Option<Self> {
        let w = width as i32;
        let h = height as i32;
        let clamped = Self {
            x1: self.x1.clamp(0, w),
            y1: self.y1.clamp(0, h),
            x2: self.x2.clamp(0, w),
            y2: self.y2.clamp(0, h),
        };
        (!clamped.is_degenerate()).then_some(clamped)
    }

    /// Intersection over union.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter = BoundingBox::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        )
        .area();
        let union = self.area() + other.area() - inter;
        if union > 0 {
            inter as f32 / union as f32
        } else {
            0.0
        }
    }
}

/// One candidate document or sub-region returned by a region detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Class label, e.g. `cccd_front`, `name`, `qr`.
    pub class_name: String,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, class_name: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            class_name: class_name.into(),
            confidence,
        }
    }

    /// Class name of the synthetic detection used when OCR runs on the full frame.
    pub const FULL_IMAGE_CLASS: &'static str = "full_image";

    /// Synthetic detection covering the whole image.
    pub fn full_image(width: u32, height: u32) -> Self {
        Self::new(BoundingBox::full(width, height), Self::FULL_IMAGE_CLASS, 1.0)
    }

    pub fn is_full_image(&self) -> bool {
        self.class_name == Self::FULL_IMAGE_CLASS
    }
}

/// One OCR-detected text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawToken {
    /// Polygon vertices in source image coordinates, at least three points.
    pub polygon: Vec<[f32; 2]>,

    /// Recognized text as-is, diacritics and case preserved.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl RawToken {
    pub fn new(polygon: Vec<[f32; 2]>, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }

    /// Axis-aligned rectangle `(min_x, min_y, max_x, max_y)` around the polygon.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        self.polygon.iter().fold(
            (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), [x, y]| {
                (min_x.min(*x), min_y.min(*y), max_x.max(*x), max_y.max(*y))
            },
        )
    }

    /// Shift every vertex by `(dx, dy)`, used to map crop-local tokens back to
    /// the source frame.
    pub fn translated(mut self, dx: f32, dy: f32) -> Self {
        for point in &mut self.polygon {
            point[0] += dx;
            point[1] += dy;
        }
        self
    }

    /// Whether the token carries any non-whitespace text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside_and_outside() {
        let bbox = BoundingBox::new(-10, -5, 50, 40);
        assert_eq!(bbox.clamp(30, 30), Some(BoundingBox::new(0, 0, 30, 30)));

        let outside = BoundingBox::new(100, 100, 200, 200);
        assert_eq!(outside.clamp(50, 50), None);

        let inverted = BoundingBox::new(20, 20, 10, 30);
        assert_eq!(inverted.clamp(50, 50), None);
    }

    #[test]
    fn test_iou() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(5, 0, 15, 10);
        assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-6);
        assert_eq!(a.iou(&BoundingBox::new(20, 20, 30, 30)), 0.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_full_image_detection() {
        let det = Detection::full_image(640, 480);
        assert_eq!(det.bbox, BoundingBox::new(0, 0, 640, 480));
        assert_eq!(det.confidence, 1.0);
        assert!(det.is_full_image());
    }

    #[test]
    fn test_token_rect_and_translate() {
        let token = RawToken::new(vec![[1.0, 2.0], [5.0, 2.0], [5.0, 6.0], [1.0, 6.0]], "A", 0.9);
        assert_eq!(token.rect(), (1.0, 2.0, 5.0, 6.0));

        let moved = token.translated(10.0, 20.0);
        assert_eq!(moved.rect(), (11.0, 22.0, 15.0, 26.0));
        assert!(moved.has_text());
        assert!(!RawToken::new(vec![], "  \n", 1.0).has_text());
    }
}
