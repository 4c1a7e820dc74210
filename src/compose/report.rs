//! The minutes report: header, meta block, agenda table, PIC signature and
//! attachment gallery, flowing over as many pages as needed.

use crate::assets::AttachmentAsset;
use crate::fonts::FontStyle;
use crate::layout::{Layout, PAGE_HEIGHT, PAGE_WIDTH, PageKind, Rect, mm};
use crate::primitives::{day_date_label, strip_markup, time_label};

use super::table::{Cell, Column, Overflow, Table, VAlign, draw_table};
use super::{
    Align, Context, Flow, Font, HeaderSpec, MARGIN_X, draw_header, image_in, text, text_lines,
    wrap,
};

const LABEL_FONT: Font = Font::new(FontStyle::Bold, 11.0);
const VALUE_FONT: Font = Font::new(FontStyle::Regular, 11.0);

const META_TOP: f32 = 40.0;
const META_LINE: f32 = 5.0;
const META_ROW: f32 = 7.0;
const TITLE_WRAP: f32 = 120.0;
const RIGHT_COL_X: f32 = 160.0;
const RIGHT_LABEL_W: f32 = 35.0;

const AGENDA_WIDTHS: [f32; 6] = [12.0, 50.0, 65.0, 65.0, 35.0, 40.0];
const AGENDA_HEADER: [&str; 6] = [
    "No",
    "Pokok Bahasan",
    "Keputusan",
    "Tindakan",
    "PIC",
    "Monitoring",
];

/// Lowest baseline for flowing content before a page break, in mm.
const FLOW_LIMIT: f32 = 190.0;
const SIGNATURE_BLOCK_H: f32 = 40.0;
const SIGNATURE_X: f32 = 230.0;

const GALLERY_LIMIT: f32 = 170.0;
const GALLERY_GAP: f32 = 5.0;
const GALLERY_COLUMNS: usize = 3;
const GALLERY_ROW_H: f32 = 75.0;
const GALLERY_CAPTION_H: f32 = 10.0;
const CAPTION_FONT: Font = Font::new(FontStyle::Regular, 8.0);

pub(crate) fn build_report(ctx: &Context, layout: &mut Layout) {
    let mut flow = Flow::new(layout, PageKind::Report, PAGE_HEIGHT - mm(10.0));
    let template = ctx.template;

    draw_header(
        &mut flow,
        ctx.assets.logo.as_ref(),
        &HeaderSpec {
            code: &template.report_code,
            date: &template.report_date,
            logo_size: 25.0,
            text_x_with_logo: 45.0,
            rule_y: 32.0,
        },
    );

    let meta_bottom = draw_meta(ctx, &mut flow);
    flow.y = mm(meta_bottom + 10.0);
    draw_agenda(ctx, &mut flow);

    flow.y += mm(10.0);
    draw_signature(ctx, &mut flow);

    if !ctx.assets.attachments.is_empty() {
        draw_gallery(ctx, &mut flow);
    }
    flow.finish();
}

/// Label, colon and value columns at `x` mm.
fn meta_label(flow: &mut Flow, x: f32, label_w: f32, y: f32, label: &str) {
    let page = flow.page();
    text(page, LABEL_FONT, mm(x), mm(y), label);
    text(page, LABEL_FONT, mm(x + label_w), mm(y), ":");
}

/// Returns the lowest used row position in mm.
fn draw_meta(ctx: &Context, flow: &mut Flow) -> f32 {
    let meeting = ctx.meeting;
    let measure = ctx.measure;
    let value_x = MARGIN_X + 23.0;

    meta_label(flow, MARGIN_X, 20.0, META_TOP, "Acara");
    let title_lines = wrap(measure, VALUE_FONT, &meeting.title, mm(TITLE_WRAP));
    text_lines(
        flow.page(),
        measure,
        VALUE_FONT,
        mm(value_x),
        mm(TITLE_WRAP),
        mm(META_TOP),
        mm(META_LINE),
        &title_lines,
        Align::Left,
    );

    let venue_y = META_TOP + title_lines.len().max(1) as f32 * META_LINE + 2.0;
    meta_label(flow, MARGIN_X, 20.0, venue_y, "Tempat");
    text(flow.page(), VALUE_FONT, mm(value_x), mm(venue_y), &meeting.location);

    let participants_y = venue_y + META_ROW;
    meta_label(flow, MARGIN_X, 20.0, participants_y, "Peserta");
    text(
        flow.page(),
        VALUE_FONT,
        mm(value_x),
        mm(participants_y),
        "Sesuai Daftar Hadir (Terlampir)",
    );

    let pic_name = if meeting.responsible_party_name.is_empty() {
        "-"
    } else {
        meeting.responsible_party_name.as_str()
    };
    let right = [
        ("Hari/Tanggal", day_date_label(&meeting.date)),
        ("Jam", time_label(&meeting.time, &ctx.template.time_zone_label)),
        ("PIC", pic_name.to_string()),
    ];
    let right_value_x = RIGHT_COL_X + RIGHT_LABEL_W + 3.0;
    let mut y = META_TOP;
    for (label, value) in &right {
        meta_label(flow, RIGHT_COL_X, RIGHT_LABEL_W, y, label);
        text(flow.page(), VALUE_FONT, mm(right_value_x), mm(y), value);
        y += META_ROW;
    }

    participants_y.max(META_TOP + 2.0 * META_ROW)
}

fn draw_agenda(ctx: &Context, flow: &mut Flow) {
    let items = &ctx.meeting.agenda_items;
    let rows: Vec<Vec<Cell>> = if items.is_empty() {
        vec![
            ["-", "Tidak ada item pembahasan", "-", "-", "-", "-"]
                .into_iter()
                .map(Cell::text)
                .collect(),
        ]
    } else {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                vec![
                    Cell::text((i + 1).to_string()),
                    Cell::text(item.topic.as_str()),
                    Cell::text(strip_markup(&item.decision)),
                    Cell::text(strip_markup(&item.action)),
                    Cell::text(item.executor.as_str()),
                    Cell::text(item.monitoring_note.as_str()),
                ]
            })
            .collect()
    };

    let table = Table {
        columns: AGENDA_WIDTHS
            .iter()
            .enumerate()
            .map(|(i, &w)| Column {
                width: mm(w),
                align: if i == 0 { Align::Center } else { Align::Left },
            })
            .collect(),
        header: AGENDA_HEADER.iter().map(|h| h.to_string()).collect(),
        rows,
        font_size: 10.0,
        padding: mm(3.0),
        line_width: mm(0.1),
        min_row_height: 0.0,
        overflow: Overflow::Wrap,
        body_valign: VAlign::Top,
    };
    draw_table(flow, ctx.measure, &table, mm(MARGIN_X));
}

fn draw_signature(ctx: &Context, flow: &mut Flow) {
    if flow.y + mm(SIGNATURE_BLOCK_H) > mm(FLOW_LIMIT) {
        flow.new_page();
    }
    let top = flow.y;
    let x = mm(SIGNATURE_X);
    let page = flow.page();
    text(page, VALUE_FONT, x, top, "Mengetahui,");
    text(page, VALUE_FONT, x, top + mm(5.0), "Penanggung Jawab Rapat");

    match &ctx.assets.pic_signature {
        Some(signature) => {
            image_in(flow, signature, Rect::new(x, top + mm(10.0), mm(30.0), mm(15.0)));
        }
        None => text(
            flow.page(),
            VALUE_FONT,
            x,
            top + mm(30.0),
            "..........................................",
        ),
    }
    let name = format!("( {} )", ctx.meeting.responsible_party_name);
    text(flow.page(), VALUE_FONT, x, top + mm(35.0), &name);

    flow.y = top + mm(45.0);
}

fn draw_gallery(ctx: &Context, flow: &mut Flow) {
    let measure = ctx.measure;
    if flow.y > mm(GALLERY_LIMIT) {
        flow.new_page();
    } else {
        flow.y += mm(10.0);
    }
    let y = flow.y;
    text(
        flow.page(),
        Font::new(FontStyle::Bold, 12.0),
        mm(MARGIN_X),
        y,
        "Lampiran:",
    );
    flow.y += mm(10.0);

    let attachments = &ctx.assets.attachments;
    let documents: Vec<_> = attachments
        .iter()
        .filter(|a| matches!(a.asset, AttachmentAsset::Document))
        .collect();
    let images: Vec<_> = attachments
        .iter()
        .filter(|a| !matches!(a.asset, AttachmentAsset::Document))
        .collect();

    if !documents.is_empty() {
        for doc in &documents {
            if flow.y > mm(FLOW_LIMIT) {
                flow.new_page();
            }
            let line = format!("- {} (Dokumen/File)", doc.file_name);
            let y = flow.y;
            text(flow.page(), VALUE_FONT, mm(MARGIN_X), y, &line);
            flow.y += mm(6.0);
        }
        flow.y += mm(5.0);
    }

    let gaps = mm(GALLERY_GAP) * (GALLERY_COLUMNS - 1) as f32;
    let col_w = (PAGE_WIDTH - 2.0 * mm(MARGIN_X) - gaps) / GALLERY_COLUMNS as f32;
    let row_h = mm(GALLERY_ROW_H);
    let box_h = row_h - mm(GALLERY_CAPTION_H);
    let page_limit = PAGE_HEIGHT - mm(10.0);

    for (i, attachment) in images.iter().enumerate() {
        let col = i % GALLERY_COLUMNS;
        if col == 0 && flow.y + row_h > page_limit {
            flow.new_page();
        }
        let cell_x = mm(MARGIN_X) + col as f32 * (col_w + mm(GALLERY_GAP));
        let row_top = flow.y;

        match &attachment.asset {
            AttachmentAsset::Image(image) => {
                image_in(flow, image, Rect::new(cell_x, row_top, col_w, box_h));
                let caption = wrap(measure, CAPTION_FONT, &attachment.file_name, col_w);
                text_lines(
                    flow.page(),
                    measure,
                    CAPTION_FONT,
                    cell_x,
                    col_w,
                    row_top + box_h + mm(5.0),
                    CAPTION_FONT.line_height(),
                    &caption,
                    Align::Center,
                );
            }
            _ => {
                let fallback = format!("(Gagal memuat gambar: {})", attachment.file_name);
                let lines = wrap(measure, CAPTION_FONT, &fallback, col_w);
                text_lines(
                    flow.page(),
                    measure,
                    CAPTION_FONT,
                    cell_x,
                    col_w,
                    row_top + mm(10.0),
                    CAPTION_FONT.line_height(),
                    &lines,
                    Align::Left,
                );
            }
        }

        if col == GALLERY_COLUMNS - 1 {
            flow.y += row_h;
        }
    }
}
