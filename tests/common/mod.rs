#![allow(dead_code)]

use std::io::Cursor;

use base64::Engine;
use image::{ImageBuffer, ImageFormat, Rgba};

use notulen_pdf::assets::resolve_assets_blocking;
use notulen_pdf::layout::{Layout, Page};
use notulen_pdf::{
    AgendaItem, Attachment, AttendanceState, BrandingAssets, FontSet, MeetingRecord, Participant,
    Template, UnitRecord, UserRecord, compose,
};

/// A solid PNG as a data URL.
pub fn png_data_url(width: u32, height: u32, color: [u8; 4]) -> String {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgba(color));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    let encoded = base64::engine::general_purpose::STANDARD.encode(buf.into_inner());
    format!("data:image/png;base64,{encoded}")
}

pub fn jpeg_data_url(width: u32, height: u32) -> String {
    let img: ImageBuffer<image::Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(width, height, image::Rgb([30, 60, 90]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    let encoded = base64::engine::general_purpose::STANDARD.encode(buf.into_inner());
    format!("data:image/jpeg;base64,{encoded}")
}

pub fn signature() -> String {
    png_data_url(120, 40, [0, 0, 0, 255])
}

pub fn present(id: &str, name: &str) -> Participant {
    Participant {
        user_id: id.into(),
        display_name: name.into(),
        cached_unit_label: None,
        attendance_state: AttendanceState::Present,
        signature_image: None,
    }
}

pub fn absent(id: &str, name: &str) -> Participant {
    Participant {
        attendance_state: AttendanceState::Absent,
        ..present(id, name)
    }
}

pub fn unit(id: &str, name: &str, abbreviation: Option<&str>) -> UnitRecord {
    UnitRecord {
        id: id.into(),
        name: name.into(),
        abbreviation: abbreviation.map(Into::into),
    }
}

pub fn user(id: &str, unit_id: Option<&str>) -> UserRecord {
    UserRecord {
        id: id.into(),
        unit_id: unit_id.map(Into::into),
    }
}

pub fn item(topic: &str, decision: &str) -> AgendaItem {
    AgendaItem {
        topic: topic.into(),
        decision: decision.into(),
        action: "Tindak lanjut".into(),
        executor: "Tim IT".into(),
        monitoring_note: "Mingguan".into(),
    }
}

pub fn attachment(file_name: &str, payload: &str) -> Attachment {
    Attachment {
        file_name: file_name.into(),
        payload: payload.into(),
        uploaded_at: "2025-01-10T08:00:00Z".into(),
    }
}

/// A meeting with `n` present participants named `Peserta 1..=n`.
pub fn meeting(n: usize) -> MeetingRecord {
    MeetingRecord {
        title: "Rapat Koordinasi Bulanan".into(),
        date: "2024-03-15".into(),
        time: "09:00".into(),
        location: "Ruang Rapat Utama".into(),
        responsible_party_id: "u-pic".into(),
        responsible_party_name: "Budi Santoso".into(),
        agenda_items: vec![item("Laporan kegiatan", "<p>Disetujui</p>")],
        participants: (1..=n)
            .map(|i| present(&format!("u{i}"), &format!("Peserta {i}")))
            .collect(),
        ..MeetingRecord::default()
    }
}

pub fn layout_with(
    meeting: &MeetingRecord,
    users: &[UserRecord],
    units: &[UnitRecord],
    branding: &BrandingAssets,
) -> Layout {
    let assets = resolve_assets_blocking(meeting, branding);
    compose(
        meeting,
        users,
        units,
        &assets,
        &Template::default(),
        &FontSet::builtin(),
    )
}

pub fn layout(meeting: &MeetingRecord) -> Layout {
    layout_with(meeting, &[], &[], &BrandingAssets::default())
}

pub fn page_texts(page: &Page) -> Vec<&str> {
    page.texts().map(|t| t.text.as_str()).collect()
}

/// Count page objects in PDF bytes (`/Type /Page` but not `/Type /Pages`).
pub fn pdf_page_count(bytes: &[u8]) -> usize {
    let needle = b"/Type /Page";
    bytes
        .windows(needle.len() + 1)
        .filter(|w| &w[..needle.len()] == needle && w[needle.len()] != b's')
        .count()
}
