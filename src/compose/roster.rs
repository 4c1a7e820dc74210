//! Attendance roster pages.
//!
//! Each page holds a fixed 3 × 20 grid of slots filled column-major: slot 1
//! to 20 run down the first table, 21 to 40 down the second and so on.
//! Slots past the last participant are drawn as blank rows.

use crate::fonts::FontStyle;
use crate::layout::{ALERT_RED, Layout, PAGE_HEIGHT, PAGE_WIDTH, PageKind, mm};
use crate::model::AttendanceState;
use crate::primitives::{day_date_label, time_label, truncate};

use super::table::{Cell, CellImage, Column, Overflow, Table, VAlign, draw_table};
use super::{Align, Context, Flow, Font, HeaderSpec, MARGIN_X, draw_header, hline, text};

pub const COLUMNS_PER_PAGE: usize = 3;
pub const ROWS_PER_COLUMN: usize = 20;
pub const SLOTS_PER_PAGE: usize = COLUMNS_PER_PAGE * ROWS_PER_COLUMN;

/// Number of roster pages for `participants`; never zero.
pub fn page_count(participants: usize) -> usize {
    participants.div_ceil(SLOTS_PER_PAGE).max(1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    /// 1-based number printed in the `No.` column, restarting on each page.
    pub display_number: usize,
    /// Index into the meeting's participant list.
    pub global_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotPosition {
    pub page: usize,
    pub column: usize,
    pub row: usize,
}

pub fn slot(page: usize, column: usize, row: usize) -> Slot {
    let display_number = column * ROWS_PER_COLUMN + row + 1;
    Slot {
        display_number,
        global_index: page * SLOTS_PER_PAGE + display_number - 1,
    }
}

/// Inverse of [`slot`].
pub fn locate(global_index: usize) -> SlotPosition {
    let within = global_index % SLOTS_PER_PAGE;
    SlotPosition {
        page: global_index / SLOTS_PER_PAGE,
        column: within / ROWS_PER_COLUMN,
        row: within % ROWS_PER_COLUMN,
    }
}

const INFO_FONT_SIZE: f32 = 12.0;
const INFO_LABEL_X: f32 = 80.0;
const INFO_COLON_X: f32 = 115.0;
const INFO_VALUE_X: f32 = 117.0;
const INFO_RULE_LEN: f32 = 110.0;
const INFO_TOP: f32 = 33.0;
const INFO_PITCH: f32 = 6.0;

const TABLE_TOP: f32 = 52.0;
const TABLE_GAP: f32 = 5.0;
const NUMBER_W: f32 = 8.0;
const UNIT_W: f32 = 20.0;
const MARK_W: f32 = 18.0;
const ROW_H: f32 = 6.5;
const BODY_SIZE: f32 = 9.0;

const SIGNATURE_BOX_W: f32 = 12.0;
const SIGNATURE_BOX_H: f32 = 5.0;
const ABSENT_FONT: Font = Font::new(FontStyle::Italic, 7.0).colored(ALERT_RED);

pub(crate) fn build_roster(ctx: &Context, layout: &mut Layout) {
    let participants = ctx.meeting.participants.len();
    let pages = page_count(participants);
    log::debug!("roster: {participants} participants on {pages} pages");

    for index in 0..pages {
        let mut flow = Flow::new(layout, PageKind::Roster { index }, PAGE_HEIGHT);
        draw_header(
            &mut flow,
            ctx.assets.logo.as_ref(),
            &HeaderSpec {
                code: &ctx.template.roster_code,
                date: &ctx.template.roster_date,
                logo_size: 20.0,
                text_x_with_logo: 40.0,
                rule_y: 27.0,
            },
        );
        draw_info(ctx, &mut flow);

        let col_w = table_width();
        for column in 0..COLUMNS_PER_PAGE {
            let table = column_table(ctx, &mut flow, index, column, col_w);
            flow.y = mm(TABLE_TOP);
            let x = mm(MARGIN_X) + column as f32 * (col_w + mm(TABLE_GAP));
            draw_table(&mut flow, ctx.measure, &table, x);
        }
        flow.finish();
    }
}

fn table_width() -> f32 {
    let gaps = mm(TABLE_GAP) * (COLUMNS_PER_PAGE - 1) as f32;
    (PAGE_WIDTH - 2.0 * mm(MARGIN_X) - gaps) / COLUMNS_PER_PAGE as f32
}

fn draw_info(ctx: &Context, flow: &mut Flow) {
    let meeting = ctx.meeting;
    let title = truncate(&meeting.title, ctx.template.roster_title_max_chars);
    let rows = [
        ("Hari / Tanggal", day_date_label(&meeting.date)),
        ("Jam", time_label(&meeting.time, &ctx.template.time_zone_label)),
        ("Tempat", meeting.location.clone()),
        ("Acara", title),
    ];

    let label = Font::new(FontStyle::Bold, INFO_FONT_SIZE);
    let value = Font::new(FontStyle::Regular, INFO_FONT_SIZE);
    let page = flow.page();
    for (i, (name, val)) in rows.iter().enumerate() {
        let y = mm(INFO_TOP + i as f32 * INFO_PITCH);
        text(page, label, mm(INFO_LABEL_X), y, name);
        text(page, label, mm(INFO_COLON_X), y, ":");
        text(page, value, mm(INFO_VALUE_X), y, val);
        hline(
            page,
            mm(INFO_VALUE_X),
            mm(INFO_VALUE_X + INFO_RULE_LEN),
            y + mm(1.0),
            mm(0.1),
        );
    }
}

fn column_table(ctx: &Context, flow: &mut Flow, page: usize, column: usize, col_w: f32) -> Table {
    let participants = &ctx.meeting.participants;
    let rows = (0..ROWS_PER_COLUMN)
        .map(|row| {
            let slot = slot(page, column, row);
            let number = Cell::text(format!("{}.", slot.display_number));
            let Some(participant) = participants.get(slot.global_index) else {
                return vec![number, Cell::default(), Cell::default(), Cell::default()];
            };

            let mark = match participant.attendance_state {
                AttendanceState::Absent => Cell::styled("Tidak Hadir", ABSENT_FONT, Align::Center),
                AttendanceState::Present => ctx
                    .assets
                    .participant_signatures
                    .get(slot.global_index)
                    .and_then(Option::as_ref)
                    .map(|signature| {
                        Cell::image(CellImage {
                            id: flow.add_image(signature),
                            natural_w: signature.pixel_width as f32,
                            natural_h: signature.pixel_height as f32,
                            box_w: mm(SIGNATURE_BOX_W),
                            box_h: mm(SIGNATURE_BOX_H),
                        })
                    })
                    .unwrap_or_default(),
            };
            vec![
                number,
                Cell::text(participant.display_name.as_str()),
                Cell::text(ctx.directory.unit_label(participant)),
                mark,
            ]
        })
        .collect();

    let name_w = col_w - mm(NUMBER_W + UNIT_W + MARK_W);
    Table {
        columns: vec![
            Column {
                width: mm(NUMBER_W),
                align: Align::Center,
            },
            Column {
                width: name_w,
                align: Align::Left,
            },
            Column {
                width: mm(UNIT_W),
                align: Align::Center,
            },
            Column {
                width: mm(MARK_W),
                align: Align::Center,
            },
        ],
        header: ["No.", "NAMA", "BAGIAN", "PARAF"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
        font_size: BODY_SIZE,
        padding: mm(1.0),
        line_width: mm(0.1),
        min_row_height: mm(ROW_H),
        overflow: Overflow::Clip,
        body_valign: VAlign::Middle,
    }
}

