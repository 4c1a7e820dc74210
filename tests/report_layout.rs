mod common;

use notulen_pdf::BrandingAssets;
use notulen_pdf::layout::{Layout, Op, Page, mm};

use common::{attachment, item, layout, layout_with, meeting, page_texts, png_data_url};

fn report_pages(layout: &Layout) -> Vec<&Page> {
    layout.report_pages().collect()
}

fn report_has(layout: &Layout, needle: &str) -> bool {
    layout.report_pages().any(|p| p.has_text(needle))
}

#[test]
fn report_comes_before_roster() {
    let layout = layout(&meeting(5));
    let first_roster = layout
        .pages
        .iter()
        .position(|p| matches!(p.kind, notulen_pdf::layout::PageKind::Roster { .. }))
        .unwrap();
    assert!(first_roster >= 1);
    assert!(layout.pages[..first_roster].iter().all(|p| p.kind == notulen_pdf::layout::PageKind::Report));
    assert!(layout.pages[first_roster..].iter().all(|p| p.kind != notulen_pdf::layout::PageKind::Report));
}

#[test]
fn meta_block_shows_meeting_details() {
    let layout = layout(&meeting(2));
    let first = report_pages(&layout)[0];
    for expected in [
        "No.BO.29.3.1-V3 Borang Notulen",
        "30 Agustus 2017",
        "Acara",
        "Rapat Koordinasi Bulanan",
        "Tempat",
        "Ruang Rapat Utama",
        "Peserta",
        "Sesuai Daftar Hadir (Terlampir)",
        "Hari/Tanggal",
        "Jumat / 15 Mar 2024",
        "Jam",
        "09:00 WIB",
        "PIC",
        "Budi Santoso",
    ] {
        assert!(first.has_text(expected), "missing {expected:?}");
    }
}

#[test]
fn missing_pic_name_prints_dash() {
    let mut m = meeting(1);
    m.responsible_party_name.clear();
    let layout = layout(&m);
    assert!(report_pages(&layout)[0].has_text("-"));
    assert!(report_has(&layout, "(  )"));
}

#[test]
fn empty_agenda_gets_placeholder_row() {
    let mut m = meeting(1);
    m.agenda_items.clear();
    let layout = layout(&m);
    assert!(report_has(&layout, "Tidak ada item pembahasan"));
    assert!(report_has(&layout, "Pokok Bahasan"));
}

#[test]
fn agenda_markup_is_stripped() {
    let mut m = meeting(1);
    m.agenda_items = vec![
        item("Anggaran", "<p>Disetujui &amp; <b>ditandatangani</b></p>"),
        item("Jadwal", "<ul><li>Senin</li><li>Kamis</li></ul>"),
    ];
    let layout = layout(&m);
    assert!(report_has(&layout, "Disetujui & ditandatangani"));
    assert!(report_has(&layout, "Senin"));
    assert!(report_has(&layout, "Kamis"));
    assert!(
        layout
            .report_pages()
            .flat_map(|p| p.texts())
            .all(|t| !t.text.contains('<'))
    );
}

#[test]
fn agenda_rows_keep_order() {
    let mut m = meeting(1);
    m.agenda_items = (1..=5).map(|i| item(&format!("Topik {i}"), "ok")).collect();
    let layout = layout(&m);
    let page = report_pages(&layout)[0];
    let baselines: Vec<f32> = (1..=5)
        .map(|i| {
            page.texts()
                .find(|t| t.text == format!("Topik {i}"))
                .unwrap()
                .baseline
        })
        .collect();
    assert!(baselines.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn long_agenda_breaks_pages_and_repeats_header() {
    let mut m = meeting(1);
    let long = "Keputusan panjang yang membutuhkan beberapa baris dalam sel tabel. ".repeat(6);
    m.agenda_items = (1..=30).map(|i| item(&format!("Topik {i}"), &long)).collect();
    let layout = layout(&m);
    let pages = report_pages(&layout);
    assert!(pages.len() >= 2, "expected a page break, got {} pages", pages.len());

    for page in &pages {
        let has_rows = page.texts().any(|t| t.text.starts_with("Topik "));
        if has_rows {
            assert!(page.has_text("Pokok Bahasan"));
        }
    }
    // Nothing flows below the bottom margin.
    for page in &pages {
        for op in &page.ops {
            if let Op::StrokeRect { rect, .. } = op {
                assert!(rect.y + rect.height <= mm(200.0) + 0.01);
            }
        }
    }
    assert_eq!(
        layout.report_pages().filter(|p| p.has_text("Mengetahui,")).count(),
        1
    );
}

#[test]
fn long_title_wraps_in_report() {
    let mut m = meeting(1);
    m.title = "Pembahasan rencana strategis ".repeat(7).trim_end().to_string();
    let layout = layout(&m);
    let first = report_pages(&layout)[0];
    let lines: Vec<&str> = first
        .texts()
        .filter(|t| t.x == mm(37.0) && t.baseline < mm(90.0))
        .filter(|t| t.text != "Ruang Rapat Utama" && t.text != "Sesuai Daftar Hadir (Terlampir)")
        .map(|t| t.text.as_str())
        .collect();
    assert!(lines.len() > 1);
    assert_eq!(lines.join(" "), m.title);
}

#[test]
fn missing_pic_signature_draws_dotted_line() {
    let layout = layout(&meeting(1));
    assert!(report_has(&layout, ".........................................."));
    assert!(report_has(&layout, "( Budi Santoso )"));
}

#[test]
fn pic_signature_replaces_dotted_line() {
    let mut m = meeting(1);
    m.responsible_party_signature = Some(png_data_url(300, 100, [10, 10, 10, 255]));
    let layout = layout(&m);
    assert!(!report_has(&layout, ".........................................."));
    let images: usize = layout.report_pages().map(|p| p.images().count()).sum();
    assert_eq!(images, 1);
}

#[test]
fn no_attachments_means_no_gallery() {
    let layout = layout(&meeting(1));
    assert!(!report_has(&layout, "Lampiran:"));
}

#[test]
fn documents_are_listed_by_name() {
    let mut m = meeting(1);
    m.attachments = vec![
        attachment("notulen.pdf", "https://storage.example/notulen.pdf"),
        attachment("anggaran.xlsx", "data:application/vnd.ms-excel;base64,UEsDBA=="),
    ];
    let layout = layout(&m);
    assert!(report_has(&layout, "Lampiran:"));
    assert!(report_has(&layout, "- notulen.pdf (Dokumen/File)"));
    assert!(report_has(&layout, "- anggaran.xlsx (Dokumen/File)"));
}

#[test]
fn image_type_is_decided_by_content_not_name() {
    let mut m = meeting(1);
    m.attachments = vec![
        attachment("foto.pdf", &png_data_url(40, 30, [200, 0, 0, 255])),
        attachment("gambar.png", "https://storage.example/gambar.png"),
    ];
    let layout = layout(&m);
    assert!(report_has(&layout, "foto.pdf"));
    assert!(report_has(&layout, "- gambar.png (Dokumen/File)"));
    let images: usize = layout.report_pages().map(|p| p.images().count()).sum();
    assert_eq!(images, 1);
}

#[test]
fn broken_image_gets_fallback_and_later_ones_render() {
    let mut m = meeting(1);
    m.attachments = vec![
        attachment("rusak.png", "data:image/png;base64,AAAAAAAA"),
        attachment("foto.png", &png_data_url(64, 48, [0, 120, 0, 255])),
        attachment("foto2.jpg", &common::jpeg_data_url(32, 32)),
    ];
    let layout = layout(&m);
    assert!(report_has(&layout, "(Gagal memuat gambar: rusak.png)"));
    assert!(report_has(&layout, "foto.png"));
    assert!(report_has(&layout, "foto2.jpg"));
    let images: usize = layout.report_pages().map(|p| p.images().count()).sum();
    assert_eq!(images, 2);
}

#[test]
fn gallery_wraps_after_three_images() {
    let mut m = meeting(1);
    m.attachments = (1..=4)
        .map(|i| attachment(&format!("foto{i}.png"), &png_data_url(50, 50, [0, 0, 200, 255])))
        .collect();
    let layout = layout(&m);
    let placed: Vec<_> = layout
        .report_pages()
        .flat_map(|p| p.images().map(move |(_, r)| (p as *const Page, *r)))
        .collect();
    assert_eq!(placed.len(), 4);
    let (page0, first) = placed[0];
    let (page3, fourth) = placed[3];
    assert!(placed[1].1.x > first.x && placed[2].1.x > placed[1].1.x);
    if page0 == page3 {
        assert!(fourth.y > first.y);
    }
    assert!((fourth.x - first.x).abs() < 0.01);
}

#[test]
fn gallery_images_stay_in_their_cells() {
    let mut m = meeting(1);
    m.attachments = vec![
        attachment("lebar.png", &png_data_url(800, 100, [0, 0, 0, 255])),
        attachment("tinggi.png", &png_data_url(100, 800, [0, 0, 0, 255])),
    ];
    let layout = layout(&m);
    let col_w = (mm(297.0) - 2.0 * mm(14.0) - 2.0 * mm(5.0)) / 3.0;
    for page in layout.report_pages() {
        for (_, rect) in page.images() {
            assert!(rect.width <= col_w + 0.01);
            assert!(rect.height <= mm(65.0) + 0.01);
        }
    }
}

#[test]
fn logo_appears_in_every_header() {
    let branding = BrandingAssets {
        document_logo: Some(png_data_url(200, 100, [0, 50, 150, 255])),
        sidebar_logo: None,
    };
    let layout = layout_with(&meeting(61), &[], &[], &branding);
    assert_eq!(layout.images.len(), 1);

    let first_report = report_pages(&layout)[0];
    let (_, rect) = first_report.images().next().unwrap();
    assert!(rect.width <= mm(25.0) + 0.01 && rect.height <= mm(25.0) + 0.01);
    // Header text moves right of the logo.
    let code = first_report
        .texts()
        .find(|t| t.text == "No.BO.29.3.1-V3 Borang Notulen")
        .unwrap();
    assert_eq!(code.x, mm(45.0));

    for page in layout.roster_pages() {
        assert_eq!(page.images().count(), 1);
        assert!(page_texts(page).contains(&"No.BO.29.3.2-V1 Borang Daftar Hadir"));
    }
}

#[test]
fn undecodable_logo_is_skipped() {
    let branding = BrandingAssets {
        document_logo: Some("bukan-gambar".into()),
        sidebar_logo: None,
    };
    let layout = layout_with(&meeting(1), &[], &[], &branding);
    assert!(layout.images.is_empty());
    let code = report_pages(&layout)[0]
        .texts()
        .find(|t| t.text == "No.BO.29.3.1-V3 Borang Notulen")
        .unwrap();
    assert_eq!(code.x, mm(14.0));
}

#[test]
fn row_taller_than_a_page_is_split_across_pages() {
    let mut m = meeting(1);
    m.agenda_items = vec![item("Satu", &"kata ".repeat(3000))];
    let layout = layout(&m);
    let pages = report_pages(&layout);
    assert!(pages.len() >= 3, "got {} report pages", pages.len());

    let mut words = 0;
    for page in &pages {
        for t in page.texts() {
            assert!(t.baseline <= mm(200.0) + 0.01, "text at {} below the bottom margin", t.baseline);
            words += t.text.split_whitespace().filter(|w| *w == "kata").count();
        }
        if page.texts().any(|t| t.text.starts_with("kata")) {
            assert!(page.has_text("Keputusan"));
        }
    }
    assert_eq!(words, 3000);
    assert_eq!(layout.report_pages().filter(|p| p.has_text("Satu")).count(), 1);
}

#[test]
fn table_header_is_not_left_alone_at_page_bottom() {
    let mut m = meeting(1);
    m.title = "Pembahasan rencana strategis ".repeat(150).trim_end().to_string();
    let layout = layout(&m);
    let header_pages: Vec<usize> = layout
        .report_pages()
        .enumerate()
        .filter(|(_, p)| p.has_text("Pokok Bahasan"))
        .map(|(i, _)| i)
        .collect();
    let first_row_page = layout
        .report_pages()
        .position(|p| p.has_text("Laporan kegiatan"))
        .unwrap();
    assert_eq!(header_pages, vec![first_row_page]);
    for page in layout.report_pages() {
        for op in &page.ops {
            if let Op::FillRect { rect, .. } = op {
                assert!(rect.y + rect.height <= mm(200.0) + 0.01);
            }
        }
    }
}
