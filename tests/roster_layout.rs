mod common;

use std::collections::HashMap;

use notulen_pdf::compose::{
    COLUMNS_PER_PAGE, ROWS_PER_COLUMN, SLOTS_PER_PAGE, SlotPosition, locate, page_count, slot,
};
use notulen_pdf::layout::{Op, Page, PageKind};
use notulen_pdf::primitives::truncate;

use common::{absent, layout, meeting, page_texts, signature};

#[test]
fn page_count_is_never_zero() {
    assert_eq!(page_count(0), 1);
    for n in 1..=400 {
        assert_eq!(page_count(n), n.div_ceil(60), "n={n}");
    }
    assert_eq!(SLOTS_PER_PAGE, COLUMNS_PER_PAGE * ROWS_PER_COLUMN);
}

#[test]
fn slots_fill_columns_first() {
    assert_eq!(slot(0, 0, 0).display_number, 1);
    assert_eq!(slot(0, 0, 19).display_number, 20);
    assert_eq!(slot(0, 1, 0).display_number, 21);
    assert_eq!(slot(0, 2, 19).display_number, 60);
    assert_eq!(slot(1, 0, 0).display_number, 1);
    assert_eq!(slot(1, 0, 0).global_index, 60);
    assert_eq!(slot(2, 1, 4).global_index, 2 * 60 + 24);
}

#[test]
fn locate_inverts_slot() {
    for index in 0..500 {
        let SlotPosition { page, column, row } = locate(index);
        assert!(column < COLUMNS_PER_PAGE && row < ROWS_PER_COLUMN);
        assert_eq!(slot(page, column, row).global_index, index);
    }
    assert_eq!(locate(0), SlotPosition { page: 0, column: 0, row: 0 });
    assert_eq!(locate(60), SlotPosition { page: 1, column: 0, row: 0 });
}

fn roster_pages(layout: &notulen_pdf::Layout) -> Vec<&Page> {
    layout.roster_pages().collect()
}

fn cell_borders(page: &Page) -> usize {
    page.ops
        .iter()
        .filter(|op| matches!(op, Op::StrokeRect { .. }))
        .count()
}

#[test]
fn sixty_one_participants_need_two_pages() {
    let layout = layout(&meeting(61));
    let pages = roster_pages(&layout);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].kind, PageKind::Roster { index: 0 });
    assert_eq!(pages[1].kind, PageKind::Roster { index: 1 });

    assert!(pages[0].has_text("Peserta 1"));
    assert!(pages[0].has_text("Peserta 60"));
    assert!(!pages[0].has_text("Peserta 61"));
    assert!(pages[1].has_text("Peserta 61"));
}

#[test]
fn every_page_draws_the_full_grid() {
    for n in [0, 1, 61, 125] {
        let layout = layout(&meeting(n));
        for page in roster_pages(&layout) {
            // Header row plus 20 body rows, four cells each, in three tables.
            assert_eq!(cell_borders(page), COLUMNS_PER_PAGE * (ROWS_PER_COLUMN + 1) * 4);
            let texts = page_texts(page);
            for number in 1..=SLOTS_PER_PAGE {
                assert!(texts.contains(&format!("{number}.").as_str()), "n={n}: missing {number}.");
            }
        }
    }
}

#[test]
fn trailing_slots_are_blank() {
    let layout = layout(&meeting(61));
    let last = roster_pages(&layout)[1];
    let names = page_texts(last)
        .into_iter()
        .filter(|t| t.starts_with("Peserta"))
        .count();
    assert_eq!(names, 1);
}

#[test]
fn every_participant_appears_once() {
    let layout = layout(&meeting(130));
    let mut seen: HashMap<String, usize> = HashMap::new();
    for page in roster_pages(&layout) {
        for text in page_texts(page) {
            if text.starts_with("Peserta") {
                *seen.entry(text.to_string()).or_default() += 1;
            }
        }
    }
    assert_eq!(seen.len(), 130);
    assert!(seen.values().all(|&count| count == 1));
}

#[test]
fn mapping_is_column_major_on_the_page() {
    let layout = layout(&meeting(60));
    let page = roster_pages(&layout)[0];
    let pos = |name: &str| {
        page.texts()
            .find(|t| t.text == name)
            .map(|t| (t.x, t.baseline))
            .unwrap()
    };
    let (x1, y1) = pos("Peserta 1");
    let (x2, y2) = pos("Peserta 2");
    let (x21, y21) = pos("Peserta 21");
    let (x41, _) = pos("Peserta 41");

    assert_eq!(x1, x2);
    assert!(y2 > y1);
    assert!((y21 - y1).abs() < 0.01);
    assert!(x21 > x1 && x41 > x21);
}

#[test]
fn absent_participant_never_shows_signature() {
    let mut m = meeting(0);
    let mut stale = absent("u1", "Andi");
    stale.signature_image = Some(signature());
    let mut signed = common::present("u2", "Bela");
    signed.signature_image = Some(signature());
    m.participants = vec![stale, signed];

    let layout = layout(&m);
    let page = roster_pages(&layout)[0];
    assert!(page.has_text("Tidak Hadir"));
    // Only Bela's signature is placed.
    assert_eq!(page.images().count(), 1);

    let absent_mark = page.texts().find(|t| t.text == "Tidak Hadir").unwrap();
    assert_eq!(absent_mark.color, [220, 38, 38]);
    assert_eq!(absent_mark.size, 7.0);
}

#[test]
fn present_without_signature_is_blank() {
    let layout = layout(&meeting(3));
    let page = roster_pages(&layout)[0];
    assert_eq!(page.images().count(), 0);
    assert!(!page.has_text("Tidak Hadir"));
}

#[test]
fn signature_fits_its_cell_box() {
    let mut m = meeting(0);
    let mut p = common::present("u1", "Bela");
    p.signature_image = Some(common::png_data_url(400, 50, [0, 0, 0, 255]));
    m.participants = vec![p];

    let layout = layout(&m);
    let page = roster_pages(&layout)[0];
    let (_, rect) = page.images().next().unwrap();
    let mm = notulen_pdf::layout::mm;
    assert!(rect.width <= mm(12.0) + 0.01);
    assert!(rect.height <= mm(5.0) + 0.01);
    assert!((rect.width / rect.height - 8.0).abs() < 0.01);
}

#[test]
fn long_title_is_truncated_on_the_roster() {
    let mut m = meeting(1);
    m.title = "Pembahasan rencana strategis ".repeat(7).trim_end().to_string();
    assert!(m.title.chars().count() > 200);

    let layout = layout(&m);
    let expected = truncate(&m.title, 55);
    assert!(expected.ends_with("..."));
    assert_eq!(expected.chars().count(), 58);
    for page in roster_pages(&layout) {
        assert!(page.has_text(&expected));
        assert!(!page.has_text(&m.title));
    }
}
