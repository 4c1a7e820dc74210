//! Page content streams. Layout coordinates have a top-left origin; PDF user
//! space starts bottom-left, so every y is flipped against the page height.

use std::collections::HashMap;

use pdf_writer::{Content, Name, Str};

use crate::fonts::{FontStyle, WrittenFont};
use crate::layout::{BLACK, Op, Page, Rect, Rgb, TextRun};

use super::font_resource_name;

pub(super) struct PageResources<'a> {
    pub(super) fonts: &'a HashMap<FontStyle, WrittenFont>,
    pub(super) page_height: f32,
}

pub(super) fn image_name(idx: usize) -> String {
    format!("Im{}", idx + 1)
}

fn rgb(color: Rgb) -> (f32, f32, f32) {
    let [r, g, b] = color;
    (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

pub(super) fn page_content(page: &Page, res: &PageResources) -> Vec<u8> {
    let mut content = Content::new();
    let h = res.page_height;

    for op in &page.ops {
        match op {
            Op::Text(run) => draw_text(&mut content, run, res),
            Op::Image { id, rect } => {
                content.save_state();
                content.transform([
                    rect.width,
                    0.0,
                    0.0,
                    rect.height,
                    rect.x,
                    h - rect.y - rect.height,
                ]);
                content.x_object(Name(image_name(id.0).as_bytes()));
                content.restore_state();
            }
            Op::Line {
                x1,
                y1,
                x2,
                y2,
                width,
            } => {
                let (r, g, b) = rgb(BLACK);
                content.set_line_width(*width);
                content.set_stroke_rgb(r, g, b);
                content.move_to(*x1, h - y1);
                content.line_to(*x2, h - y2);
                content.stroke();
            }
            Op::StrokeRect { rect, width } => {
                let (r, g, b) = rgb(BLACK);
                content.set_line_width(*width);
                content.set_stroke_rgb(r, g, b);
                flipped_rect(&mut content, rect, h);
                content.stroke();
            }
            Op::FillRect { rect, color } => {
                let (r, g, b) = rgb(*color);
                content.set_fill_rgb(r, g, b);
                flipped_rect(&mut content, rect, h);
                content.fill_nonzero();
            }
        }
    }

    content.finish().as_slice().to_vec()
}

fn flipped_rect(content: &mut Content, rect: &Rect, page_height: f32) {
    content.rect(
        rect.x,
        page_height - rect.y - rect.height,
        rect.width,
        rect.height,
    );
}

fn draw_text(content: &mut Content, run: &TextRun, res: &PageResources) {
    let Some(font) = res.fonts.get(&run.style) else {
        log::warn!("No font written for {:?}, dropping text run", run.style);
        return;
    };
    let bytes = font.encode(&run.text);
    if bytes.is_empty() {
        return;
    }
    let (r, g, b) = rgb(run.color);
    content
        .begin_text()
        .set_fill_rgb(r, g, b)
        .set_font(Name(font_resource_name(run.style).as_bytes()), run.size)
        .next_line(run.x, res.page_height - run.baseline)
        .show(Str(&bytes))
        .end_text();
}
