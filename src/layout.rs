//! Back-end independent page description.
//!
//! Coordinates are points with the origin at the top-left corner of the page
//! and y growing downwards. Text positions are baselines.

use std::sync::Arc;

use crate::assets::ImageAsset;
use crate::fonts::FontStyle;

pub const MM: f32 = 72.0 / 25.4;

/// Millimetres to points.
pub fn mm(v: f32) -> f32 {
    v * MM
}

/// A4 landscape.
pub const PAGE_WIDTH: f32 = 297.0 * MM;
pub const PAGE_HEIGHT: f32 = 210.0 * MM;

pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];
pub const HEADER_FILL: Rgb = [242, 242, 242];
pub const ALERT_RED: Rgb = [220, 38, 38];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Index into [`Layout::images`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub baseline: f32,
    pub text: String,
    pub style: FontStyle,
    pub size: f32,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Text(TextRun),
    Image { id: ImageId, rect: Rect },
    Line { x1: f32, y1: f32, x2: f32, y2: f32, width: f32 },
    StrokeRect { rect: Rect, width: f32 },
    FillRect { rect: Rect, color: Rgb },
}

/// Which part of the artifact a page belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    Report,
    Roster { index: usize },
}

#[derive(Clone, Debug)]
pub struct Page {
    pub kind: PageKind,
    pub ops: Vec<Op>,
}

impl Page {
    pub fn new(kind: PageKind) -> Self {
        Self {
            kind,
            ops: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            Op::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = (ImageId, &Rect)> {
        self.ops.iter().filter_map(|op| match op {
            Op::Image { id, rect } => Some((*id, rect)),
            _ => None,
        })
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.text == needle)
    }
}

/// The whole artifact: pages in output order plus the images they reference.
#[derive(Clone, Debug)]
pub struct Layout {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Page>,
    pub images: Vec<Arc<ImageAsset>>,
}

impl Layout {
    pub fn new() -> Self {
        Self {
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Register an image, reusing the id of an already registered `Arc`.
    pub fn add_image(&mut self, image: &Arc<ImageAsset>) -> ImageId {
        if let Some(idx) = self.images.iter().position(|i| Arc::ptr_eq(i, image)) {
            return ImageId(idx);
        }
        self.images.push(Arc::clone(image));
        ImageId(self.images.len() - 1)
    }

    pub fn report_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|p| p.kind == PageKind::Report)
    }

    pub fn roster_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages
            .iter()
            .filter(|p| matches!(p.kind, PageKind::Roster { .. }))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns a [`Layout`] into a concrete artifact.
pub trait Renderer {
    type Output;

    fn render(&self, layout: &Layout) -> crate::error::Result<Self::Output>;
}
