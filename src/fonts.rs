use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::error::{Error, Result};
use crate::template::FontFiles;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 3] = [FontStyle::Regular, FontStyle::Bold, FontStyle::Italic];

    fn base14_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "Times-Roman",
            FontStyle::Bold => "Times-Bold",
            FontStyle::Italic => "Times-Italic",
        }
    }

    fn base14_ascii_widths(self) -> &'static [u16; 95] {
        match self {
            FontStyle::Regular => &TIMES_ROMAN,
            FontStyle::Bold => &TIMES_BOLD,
            FontStyle::Italic => &TIMES_ITALIC,
        }
    }
}

/// Width of text in points. Layout code only depends on this, so the
/// builders can run against any back end that agrees on metrics.
pub trait TextMeasure {
    fn text_width(&self, text: &str, style: FontStyle, size: f32) -> f32;

    /// Distance from the top of a line box to its baseline, in points.
    fn ascent(&self, style: FontStyle, size: f32) -> f32;
}

// Times AFM advance widths for ASCII 32..=126, 1000 units/em.
#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 333, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 333, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 333, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

const TIMES_ASCENDER: f32 = 0.683;

/// Approximate widths for the WinAnsi upper half (Latin-1 and typographic marks).
fn upper_winansi_width(byte: u8) -> f32 {
    match byte {
        0x85 | 0x89 | 0x97 => 1000.0, // ellipsis, per mille, em dash
        0x91 | 0x92 | 0x8B | 0x9B => 333.0,
        0x93 | 0x94 => 444.0,
        0x95 => 350.0,
        0xA0 => 250.0,
        0xC0..=0xDE => 722.0,
        _ => 500.0,
    }
}

fn base14_widths(style: FontStyle) -> Vec<f32> {
    let ascii = style.base14_ascii_widths();
    (32u8..=255u8)
        .map(|b| {
            if b <= 126 {
                ascii[(b - 32) as usize] as f32
            } else {
                upper_winansi_width(b)
            }
        })
        .collect()
}

struct FontProgram {
    source: PathBuf,
    ps_name: String,
    data: Vec<u8>,
    face_index: u32,
    char_widths_1000: HashMap<char, f32>,
}

/// One face of the document font: either a TrueType program to embed, or a
/// base-14 Times face with built-in metrics.
pub struct FontFace {
    style: FontStyle,
    widths_1000: Vec<f32>,
    ascender_ratio: f32,
    program: Option<FontProgram>,
}

impl FontFace {
    pub fn builtin(style: FontStyle) -> Self {
        Self {
            style,
            widths_1000: base14_widths(style),
            ascender_ratio: TIMES_ASCENDER,
            program: None,
        }
    }

    pub fn from_file(path: &Path, style: FontStyle) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::Font {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_bytes(data, style, path).map_err(|message| Error::Font {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_bytes(
        data: Vec<u8>,
        style: FontStyle,
        source: &Path,
    ) -> std::result::Result<Self, String> {
        let face = Face::parse(&data, 0).map_err(|e| e.to_string())?;
        let units = face.units_per_em() as f32;

        let mut char_widths_1000 = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|s| s.is_unicode()) {
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else {
                        return;
                    };
                    if let Some(adv) = face
                        .glyph_index(ch)
                        .and_then(|gid| face.glyph_hor_advance(gid))
                    {
                        char_widths_1000.insert(ch, adv as f32 / units * 1000.0);
                    }
                });
            }
        }
        if char_widths_1000.is_empty() {
            return Err("font has no usable Unicode cmap".into());
        }

        let ps_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| style.base14_name().replace('-', ""));
        let ascender_ratio = face.ascender() as f32 / units;

        Ok(Self {
            style,
            widths_1000: base14_widths(style),
            ascender_ratio,
            program: Some(FontProgram {
                source: source.to_path_buf(),
                ps_name,
                data,
                face_index: 0,
                char_widths_1000,
            }),
        })
    }

    pub fn is_embedded(&self) -> bool {
        self.program.is_some()
    }

    /// Width of a single character in 1000-units.
    pub fn char_width_1000(&self, ch: char) -> f32 {
        if let Some(ref program) = self.program {
            return program.char_widths_1000.get(&ch).copied().unwrap_or(0.0);
        }
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub fn ascender_ratio(&self) -> f32 {
        self.ascender_ratio
    }
}

pub struct FontSet {
    regular: FontFace,
    bold: FontFace,
    italic: FontFace,
}

impl Default for FontSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FontSet {
    pub fn builtin() -> Self {
        Self {
            regular: FontFace::builtin(FontStyle::Regular),
            bold: FontFace::builtin(FontStyle::Bold),
            italic: FontFace::builtin(FontStyle::Italic),
        }
    }

    /// Load the configured TrueType files. Faces without a file use base-14 Times.
    pub fn load(files: &FontFiles) -> Result<Self> {
        let load = |path: &Option<PathBuf>, style: FontStyle| -> Result<FontFace> {
            let Some(p) = path else {
                return Ok(FontFace::builtin(style));
            };
            let face = FontFace::from_file(p, style)?;
            log::debug!("Loaded {style:?} face from {}", p.display());
            Ok(face)
        };
        Ok(Self {
            regular: load(&files.regular, FontStyle::Regular)?,
            bold: load(&files.bold, FontStyle::Bold)?,
            italic: load(&files.italic, FontStyle::Italic)?,
        })
    }

    pub fn face(&self, style: FontStyle) -> &FontFace {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

impl TextMeasure for FontSet {
    fn text_width(&self, text: &str, style: FontStyle, size: f32) -> f32 {
        self.face(style).text_width(text, size)
    }

    fn ascent(&self, style: FontStyle, size: f32) -> f32 {
        self.face(style).ascender_ratio() * size
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes, dropping
/// characters the encoding cannot represent.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b >= 32)
        .collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// A face written into a PDF, ready to encode text for content streams.
pub(crate) struct WrittenFont {
    pub(crate) font_ref: Ref,
    char_to_gid: Option<HashMap<char, u16>>,
}

impl WrittenFont {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// Write `face` into `pdf`, subsetting an embedded program to `used_chars`.
///
/// Layout was measured with the face's own widths, so a program that cannot
/// be embedded is an error rather than a silent switch to base-14 Times.
pub(crate) fn write_font(
    pdf: &mut Pdf,
    face: &FontFace,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<WrittenFont> {
    let font_ref = alloc();
    let char_to_gid = match &face.program {
        Some(program) => Some(
            embed_truetype(pdf, font_ref, program, used_chars, alloc).map_err(|message| {
                Error::Font {
                    path: program.source.clone(),
                    message,
                }
            })?,
        ),
        None => {
            pdf.type1_font(font_ref)
                .base_font(Name(face.style.base14_name().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            None
        }
    };

    Ok(WrittenFont {
        font_ref,
        char_to_gid,
    })
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with Identity-H encoding.
/// The font data is subsetted to only include glyphs for `used_chars`.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    program: &FontProgram,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> std::result::Result<HashMap<char, u16>, String> {
    let face = Face::parse(&program.data, program.face_index).map_err(|e| e.to_string())?;
    let descriptor_ref = alloc();
    let data_ref = alloc();

    let units = face.units_per_em() as f32;
    let to_1000 = |v: f32| v / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| to_1000(h as f32))
        .unwrap_or(700.0);
    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        to_1000(bb.x_min as f32),
        to_1000(bb.y_min as f32),
        to_1000(bb.x_max as f32),
        to_1000(bb.y_max as f32),
    );

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    let mut chars: Vec<char> = used_chars.iter().copied().collect();
    chars.sort_unstable();
    for ch in chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| to_1000(adv as f32))
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset_data = subsetter::subset(&program.data, program.face_index, &remapper)
        .unwrap_or_else(|e| {
            log::warn!(
                "Font subsetting failed for {}: {e}, embedding full font",
                program.ps_name
            );
            program.data.clone()
        });

    let data_len =
        i32::try_from(subset_data.len()).map_err(|_| "font program too large".to_string())?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = program.ps_name.replace(' ', "");

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(face.italic_angle())
        .ascent(to_1000(face.ascender() as f32))
        .descent(to_1000(face.descender() as f32))
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = || pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };

    let cid_font_ref = alloc();
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), system_info());
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Ok(char_to_gid)
}
