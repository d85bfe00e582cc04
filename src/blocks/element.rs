//! Text element tree
//!
//! A single node type shared by every grouping stage. Leaves come straight from
//! OCR fragments; composite nodes own their children and keep their bounds,
//! confidence and text in sync as children are pushed.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Bounding box of a polygon, `None` if it has no extent
    pub fn from_polygon(polygon: &[(f32, f32)]) -> Option<Self> {
        if polygon.is_empty() {
            return None;
        }

        let min_x = polygon.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
        let min_y = polygon.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_x = polygon.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
        let max_y = polygon.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

        let rect = Self::new(min_x, min_y, max_x - min_x, max_y - min_y);
        rect.is_valid().then_some(rect)
    }

    /// Finite and with positive width and height
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Width of the shared horizontal span (0 when disjoint)
    pub fn horizontal_overlap(&self, other: &Rect) -> f32 {
        (self.right().min(other.right()) - self.x.max(other.x)).max(0.0)
    }

    /// Corners as top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.x, self.y),
            (self.right(), self.y),
            (self.right(), self.bottom()),
            (self.x, self.bottom()),
        ]
    }
}

/// Semantic level of a text element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Character,
    Word,
    Line,
    Paragraph,
    Other,
}

/// Averaged color as emitted on output records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorInfo {
    pub rgb: [u8; 3],
    pub hex: String,
    pub percentage: f32,
}

/// Color estimate attached to a single OCR fragment
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSample {
    pub rgb: [u8; 3],
    /// Hex string as sent by the OCR back-end, if it sent one
    pub hex: Option<String>,
    pub percentage: f32,
}

/// Foreground/background estimates for a leaf
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorHints {
    pub foreground: Option<ColorSample>,
    pub background: Option<ColorSample>,
    /// Which estimator produced the colors
    pub source: Option<String>,
}

impl ColorHints {
    /// No color estimate; a bare source tag does not count
    pub fn is_empty(&self) -> bool {
        self.foreground.is_none() && self.background.is_none()
    }
}

/// A node of the reading-unit tree
#[derive(Debug, Clone)]
pub struct TextElement {
    pub text: String,
    pub confidence: f32,
    pub polygon: Vec<(f32, f32)>,
    pub granularity: Granularity,
    pub orientation: String,
    pub color_hints: Option<ColorHints>,
    bounds: Rect,
    center_y: f32,
    /// Visual text lines spanned by this element
    line_count: usize,
    children: Vec<TextElement>,
}

impl TextElement {
    /// Create a leaf from one OCR fragment
    pub fn leaf(
        text: impl Into<String>,
        confidence: f32,
        bounds: Rect,
        granularity: Granularity,
    ) -> Self {
        Self {
            text: text.into(),
            confidence,
            polygon: bounds.corners().to_vec(),
            granularity,
            orientation: "unknown".to_string(),
            color_hints: None,
            bounds,
            center_y: bounds.center_y(),
            line_count: 1,
            children: Vec::new(),
        }
    }

    pub fn with_polygon(mut self, polygon: Vec<(f32, f32)>) -> Self {
        self.polygon = polygon;
        self
    }

    pub fn with_orientation(mut self, orientation: impl Into<String>) -> Self {
        self.orientation = orientation.into();
        self
    }

    pub fn with_line_count(mut self, line_count: usize) -> Self {
        self.line_count = line_count.max(1);
        self
    }

    pub fn with_color_hints(mut self, hints: ColorHints) -> Self {
        self.color_hints = (!hints.is_empty()).then_some(hints);
        self
    }

    /// Start a composite node whose first child is `first`
    pub fn composite(granularity: Granularity, first: TextElement) -> Self {
        Self {
            text: first.text.clone(),
            confidence: first.confidence,
            polygon: Vec::new(),
            granularity,
            orientation: first.orientation.clone(),
            color_hints: None,
            bounds: first.bounds,
            center_y: first.center_y,
            line_count: first.line_count,
            children: vec![first],
        }
    }

    /// Append a child, joining its text with `separator`
    pub fn push_child(&mut self, child: TextElement, separator: &str) {
        self.text.push_str(separator);
        self.text.push_str(&child.text);
        self.bounds = self.bounds.union(&child.bounds);
        self.center_y = self.bounds.center_y();
        self.line_count = match self.granularity {
            Granularity::Paragraph => self.line_count + child.line_count,
            _ => self.line_count.max(child.line_count),
        };
        self.children.push(child);

        let total: f32 = self.children.iter().map(|c| c.confidence).sum();
        self.confidence = total / self.children.len() as f32;
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn center_y(&self) -> f32 {
        self.center_y
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Height of one visual line of this element
    pub fn line_height(&self) -> f32 {
        self.bounds.height / self.line_count.max(1) as f32
    }

    pub fn children(&self) -> &[TextElement] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf descendants in depth-first order
    pub fn leaves(&self) -> Vec<&TextElement> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }
}

fn collect_leaves<'a>(element: &'a TextElement, out: &mut Vec<&'a TextElement>) {
    if element.is_leaf() {
        out.push(element);
    } else {
        for child in &element.children {
            collect_leaves(child, out);
        }
    }
}
