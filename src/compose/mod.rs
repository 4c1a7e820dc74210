mod report;
mod roster;
mod table;

pub use roster::{
    COLUMNS_PER_PAGE, ROWS_PER_COLUMN, SLOTS_PER_PAGE, Slot, SlotPosition, locate, page_count, slot,
};

use std::sync::Arc;

use crate::assets::{ImageAsset, ResolvedAssets};
use crate::fonts::{FontStyle, TextMeasure};
use crate::layout::{BLACK, Layout, Op, Page, PageKind, Rect, Rgb, TextRun, mm};
use crate::model::{MeetingRecord, UnitRecord, UserRecord};
use crate::primitives::fit_box;
use crate::resolve::Directory;
use crate::template::Template;

/// jsPDF-compatible line height factor.
pub(crate) const LINE_HEIGHT: f32 = 1.15;

pub(crate) const MARGIN_X: f32 = 14.0;
/// Where content resumes on a continuation page, in mm.
pub(crate) const CONTINUATION_TOP: f32 = 20.0;

/// Read-only inputs shared by both builders.
pub(crate) struct Context<'a> {
    pub(crate) meeting: &'a MeetingRecord,
    pub(crate) assets: &'a ResolvedAssets,
    pub(crate) template: &'a Template,
    pub(crate) measure: &'a dyn TextMeasure,
    pub(crate) directory: Directory<'a>,
}

/// Lay out the minutes report followed by the attendance roster.
pub fn compose(
    meeting: &MeetingRecord,
    users: &[UserRecord],
    units: &[UnitRecord],
    assets: &ResolvedAssets,
    template: &Template,
    measure: &dyn TextMeasure,
) -> Layout {
    let ctx = Context {
        meeting,
        assets,
        template,
        measure,
        directory: Directory::new(users, units),
    };
    let mut layout = Layout::new();
    report::build_report(&ctx, &mut layout);
    roster::build_roster(&ctx, &mut layout);
    layout
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Font {
    pub(crate) style: FontStyle,
    pub(crate) size: f32,
    pub(crate) color: Rgb,
}

impl Font {
    pub(crate) const fn new(style: FontStyle, size: f32) -> Self {
        Self {
            style,
            size,
            color: BLACK,
        }
    }

    pub(crate) const fn colored(self, color: Rgb) -> Self {
        Self { color, ..self }
    }

    pub(crate) fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
}

/// A run of pages of one kind with a vertical cursor.
pub(crate) struct Flow<'a> {
    layout: &'a mut Layout,
    kind: PageKind,
    current: Page,
    pub(crate) y: f32,
    pub(crate) top: f32,
    pub(crate) bottom: f32,
}

impl<'a> Flow<'a> {
    pub(crate) fn new(layout: &'a mut Layout, kind: PageKind, bottom: f32) -> Self {
        Self {
            layout,
            kind,
            current: Page::new(kind),
            y: 0.0,
            top: mm(CONTINUATION_TOP),
            bottom,
        }
    }

    pub(crate) fn page(&mut self) -> &mut Page {
        &mut self.current
    }

    pub(crate) fn new_page(&mut self) {
        let done = std::mem::replace(&mut self.current, Page::new(self.kind));
        self.layout.pages.push(done);
        self.y = self.top;
        log::debug!("{:?}: page break, now {} pages", self.kind, self.layout.pages.len() + 1);
    }

    pub(crate) fn add_image(&mut self, image: &Arc<ImageAsset>) -> crate::layout::ImageId {
        self.layout.add_image(image)
    }

    pub(crate) fn finish(self) {
        self.layout.pages.push(self.current);
    }
}

pub(crate) fn text(page: &mut Page, font: Font, x: f32, baseline: f32, s: &str) {
    if s.is_empty() {
        return;
    }
    page.ops.push(Op::Text(TextRun {
        x,
        baseline,
        text: s.to_string(),
        style: font.style,
        size: font.size,
        color: font.color,
    }));
}

/// Draw `s` aligned inside `[x, x + width]`.
pub(crate) fn text_in(
    page: &mut Page,
    measure: &dyn TextMeasure,
    font: Font,
    x: f32,
    width: f32,
    baseline: f32,
    s: &str,
    align: Align,
) {
    let w = measure.text_width(s, font.style, font.size);
    let start = match align {
        Align::Left => x,
        Align::Center => x + (width - w) / 2.0,
    };
    text(page, font, start, baseline, s);
}

/// Draw wrapped lines starting at `first_baseline`; returns the baseline after the last line.
pub(crate) fn text_lines(
    page: &mut Page,
    measure: &dyn TextMeasure,
    font: Font,
    x: f32,
    width: f32,
    first_baseline: f32,
    line_pitch: f32,
    lines: &[String],
    align: Align,
) -> f32 {
    let mut baseline = first_baseline;
    for line in lines {
        text_in(page, measure, font, x, width, baseline, line, align);
        baseline += line_pitch;
    }
    baseline
}

pub(crate) fn wrap(measure: &dyn TextMeasure, font: Font, s: &str, width: f32) -> Vec<String> {
    crate::primitives::wrap_text(s, width, |w| measure.text_width(w, font.style, font.size))
}

pub(crate) fn hline(page: &mut Page, x1: f32, x2: f32, y: f32, width: f32) {
    page.ops.push(Op::Line {
        x1,
        y1: y,
        x2,
        y2: y,
        width,
    });
}

/// Place `image` proportionally inside `bounds`.
pub(crate) fn image_in(flow: &mut Flow, image: &Arc<ImageAsset>, bounds: Rect) -> Rect {
    let fit = fit_box(
        image.pixel_width as f32,
        image.pixel_height as f32,
        bounds.width,
        bounds.height,
    );
    let rect = Rect::new(
        bounds.x + fit.offset_x,
        bounds.y + fit.offset_y,
        fit.width,
        fit.height,
    );
    let id = flow.add_image(image);
    flow.page().ops.push(Op::Image { id, rect });
    rect
}

/// Geometry of a form header, in mm.
pub(crate) struct HeaderSpec<'a> {
    pub(crate) code: &'a str,
    pub(crate) date: &'a str,
    pub(crate) logo_size: f32,
    pub(crate) text_x_with_logo: f32,
    pub(crate) rule_y: f32,
}

pub(crate) const HEADER_FONT: Font = Font::new(FontStyle::Bold, 12.0);

/// Logo, document code, revision date and the rule below them.
pub(crate) fn draw_header(flow: &mut Flow, logo: Option<&Arc<ImageAsset>>, spec: &HeaderSpec) {
    let text_x = match logo {
        Some(logo) => {
            let bounds = Rect::new(mm(MARGIN_X), mm(5.0), mm(spec.logo_size), mm(spec.logo_size));
            image_in(flow, logo, bounds);
            spec.text_x_with_logo
        }
        None => MARGIN_X,
    };
    let page = flow.page();
    text(page, HEADER_FONT, mm(text_x), mm(15.0), spec.code);
    text(page, HEADER_FONT, mm(text_x), mm(20.0), spec.date);
    hline(
        page,
        mm(MARGIN_X),
        crate::layout::PAGE_WIDTH - mm(MARGIN_X),
        mm(spec.rule_y),
        mm(0.5),
    );
}
