use crate::fonts::{FontStyle, TextMeasure};
use crate::layout::{HEADER_FILL, ImageId, Op, Rect};
use crate::primitives::fit_box;

use super::{Align, Flow, Font, text_lines, wrap};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Overflow {
    /// Grow the row to fit every wrapped line.
    Wrap,
    /// Keep one line, cutting characters that do not fit.
    Clip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VAlign {
    Top,
    Middle,
}

pub(crate) struct Column {
    pub(crate) width: f32,
    pub(crate) align: Align,
}

/// An image centered in its cell, fit into a `box_w` × `box_h` area.
pub(crate) struct CellImage {
    pub(crate) id: ImageId,
    pub(crate) natural_w: f32,
    pub(crate) natural_h: f32,
    pub(crate) box_w: f32,
    pub(crate) box_h: f32,
}

#[derive(Default)]
pub(crate) struct Cell {
    pub(crate) text: String,
    pub(crate) font: Option<Font>,
    pub(crate) align: Option<Align>,
    pub(crate) image: Option<CellImage>,
}

impl Cell {
    pub(crate) fn text(s: impl Into<String>) -> Self {
        Self {
            text: s.into(),
            ..Self::default()
        }
    }

    pub(crate) fn styled(s: impl Into<String>, font: Font, align: Align) -> Self {
        Self {
            text: s.into(),
            font: Some(font),
            align: Some(align),
            image: None,
        }
    }

    pub(crate) fn image(image: CellImage) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }
}

pub(crate) struct Table {
    pub(crate) columns: Vec<Column>,
    pub(crate) header: Vec<String>,
    pub(crate) rows: Vec<Vec<Cell>>,
    pub(crate) font_size: f32,
    pub(crate) padding: f32,
    pub(crate) line_width: f32,
    pub(crate) min_row_height: f32,
    pub(crate) overflow: Overflow,
    pub(crate) body_valign: VAlign,
}

struct RowLayout {
    height: f32,
    cell_lines: Vec<(Vec<String>, Font)>,
}

/// Remove trailing characters until `s` fits in `width`.
pub(crate) fn clip_to_width(measure: &dyn TextMeasure, font: Font, s: &str, width: f32) -> String {
    let mut end = s.len();
    for (idx, _) in s.char_indices().rev() {
        if measure.text_width(&s[..end], font.style, font.size) <= width {
            break;
        }
        end = idx;
    }
    s[..end].trim_end().to_string()
}

impl Table {
    fn body_font(&self) -> Font {
        Font::new(FontStyle::Regular, self.font_size)
    }

    fn header_font(&self) -> Font {
        Font::new(FontStyle::Bold, self.font_size)
    }

    fn layout_cells<'c>(
        &self,
        measure: &dyn TextMeasure,
        cells: impl Iterator<Item = (&'c str, Font)>,
    ) -> RowLayout {
        let mut height = self.min_row_height;
        let cell_lines = cells
            .zip(&self.columns)
            .map(|((s, font), col)| {
                let inner = (col.width - 2.0 * self.padding).max(0.0);
                let lines = match self.overflow {
                    Overflow::Wrap => wrap(measure, font, s, inner),
                    Overflow::Clip => {
                        let first = s.split('\n').next().unwrap_or("");
                        let clipped = clip_to_width(measure, font, first, inner);
                        if clipped.is_empty() { vec![] } else { vec![clipped] }
                    }
                };
                let h = lines.len().max(1) as f32 * font.line_height() + 2.0 * self.padding;
                height = height.max(h);
                (lines, font)
            })
            .collect();
        RowLayout { height, cell_lines }
    }

    fn header_layout(&self, measure: &dyn TextMeasure) -> RowLayout {
        let font = self.header_font();
        self.layout_cells(measure, self.header.iter().map(|h| (h.as_str(), font)))
    }

    fn row_layout(&self, measure: &dyn TextMeasure, row: &[Cell]) -> RowLayout {
        let body = self.body_font();
        self.layout_cells(
            measure,
            row.iter().map(|c| (c.text.as_str(), c.font.unwrap_or(body))),
        )
    }
}

/// Draw `table` at the flow cursor. Body rows that do not fit move to a new
/// page where the header is repeated. A row taller than a whole page is split
/// at line boundaries and continues on the following pages.
pub(crate) fn draw_table(flow: &mut Flow, measure: &dyn TextMeasure, table: &Table, x: f32) {
    let header = table.header_layout(measure);
    let rows: Vec<RowLayout> = table
        .rows
        .iter()
        .map(|row| table.row_layout(measure, row))
        .collect();

    if let Some(first) = rows.first() {
        let need = if fits_fresh_page(flow, &header, first) {
            first.height
        } else {
            table.body_font().line_height() + 2.0 * table.padding
        };
        if flow.y + header.height + need > flow.bottom {
            log::debug!("table header moves to a new page with its first row");
            flow.new_page();
        }
    }
    draw_header_row(flow, measure, table, &header, x);

    for (ri, (row, layout)) in table.rows.iter().zip(rows).enumerate() {
        if flow.y + layout.height <= flow.bottom {
            draw_row(flow, measure, table, &layout, Some(row.as_slice()), true, x);
        } else if fits_fresh_page(flow, &header, &layout) {
            log::debug!("table row {ri} (h={:.1}) moves to a new page", layout.height);
            flow.new_page();
            draw_header_row(flow, measure, table, &header, x);
            draw_row(flow, measure, table, &layout, Some(row.as_slice()), true, x);
        } else {
            log::debug!("table row {ri} (h={:.1}) is split across pages", layout.height);
            draw_split_row(flow, measure, table, &header, layout, row, x);
        }
    }
}

fn fits_fresh_page(flow: &Flow, header: &RowLayout, row: &RowLayout) -> bool {
    header.height + row.height <= flow.bottom - flow.top
}

/// Draw as many lines of each cell as fit above the page bottom, then carry
/// the rest to a new page under a repeated header.
fn draw_split_row(
    flow: &mut Flow,
    measure: &dyn TextMeasure,
    table: &Table,
    header: &RowLayout,
    layout: RowLayout,
    row: &[Cell],
    x: f32,
) {
    let mut rest = layout.cell_lines;
    let mut first_piece = true;
    let mut fresh = false;
    loop {
        let available = flow.bottom - flow.y - 2.0 * table.padding;
        let counts: Vec<usize> = rest
            .iter()
            .map(|(_, font)| (available / font.line_height()).floor().max(0.0) as usize)
            .collect();
        if !fresh && counts.contains(&0) {
            flow.new_page();
            draw_header_row(flow, measure, table, header, x);
            fresh = true;
            continue;
        }

        let piece: Vec<(Vec<String>, Font)> = rest
            .iter_mut()
            .zip(&counts)
            .map(|((lines, font), &n)| {
                let n = n.max(1).min(lines.len());
                (lines.drain(..n).collect(), *font)
            })
            .collect();
        let height = piece
            .iter()
            .map(|(lines, font)| {
                lines.len().max(1) as f32 * font.line_height() + 2.0 * table.padding
            })
            .fold(table.min_row_height, f32::max);
        let piece = RowLayout {
            height,
            cell_lines: piece,
        };
        draw_row(flow, measure, table, &piece, Some(row), first_piece, x);
        first_piece = false;

        if rest.iter().all(|(lines, _)| lines.is_empty()) {
            break;
        }
        flow.new_page();
        draw_header_row(flow, measure, table, header, x);
        fresh = true;
    }
}

fn draw_header_row(
    flow: &mut Flow,
    measure: &dyn TextMeasure,
    table: &Table,
    header: &RowLayout,
    x: f32,
) {
    let total_w: f32 = table.columns.iter().map(|c| c.width).sum();
    let rect = Rect::new(x, flow.y, total_w, header.height);
    flow.page().ops.push(Op::FillRect {
        rect,
        color: HEADER_FILL,
    });
    draw_row(flow, measure, table, header, None, false, x);
}

fn draw_row(
    flow: &mut Flow,
    measure: &dyn TextMeasure,
    table: &Table,
    layout: &RowLayout,
    cells: Option<&[Cell]>,
    with_images: bool,
    x: f32,
) {
    let row_top = flow.y;
    let row_h = layout.height;
    let is_header = cells.is_none();
    let valign = if is_header { VAlign::Middle } else { table.body_valign };

    let mut cell_x = x;
    for (ci, (col, (lines, font))) in table.columns.iter().zip(&layout.cell_lines).enumerate() {
        let cell = cells.and_then(|c| c.get(ci));
        let page = flow.page();

        if !lines.is_empty() {
            let pitch = font.line_height();
            let content_h = lines.len() as f32 * pitch;
            let content_top = match valign {
                VAlign::Top => row_top + table.padding,
                VAlign::Middle => row_top + (row_h - content_h) / 2.0,
            };
            let first_baseline = content_top
                + (pitch - font.size) / 2.0
                + measure.ascent(font.style, font.size);
            let align = if is_header {
                Align::Center
            } else {
                cell.and_then(|c| c.align).unwrap_or(col.align)
            };
            text_lines(
                page,
                measure,
                *font,
                cell_x + table.padding,
                col.width - 2.0 * table.padding,
                first_baseline,
                pitch,
                lines,
                align,
            );
        }

        if let Some(img) = cell.and_then(|c| c.image.as_ref()).filter(|_| with_images) {
            let fit = fit_box(img.natural_w, img.natural_h, img.box_w, img.box_h);
            let rect = Rect::new(
                cell_x + (col.width - img.box_w) / 2.0 + fit.offset_x,
                row_top + (row_h - img.box_h) / 2.0 + fit.offset_y,
                fit.width,
                fit.height,
            );
            page.ops.push(Op::Image { id: img.id, rect });
        }

        page.ops.push(Op::StrokeRect {
            rect: Rect::new(cell_x, row_top, col.width, row_h),
            width: table.line_width,
        });
        cell_x += col.width;
    }

    flow.y = row_top + row_h;
}
