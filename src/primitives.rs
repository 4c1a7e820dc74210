//! Geometry and text helpers shared by the report and roster builders.

use chrono::{Datelike, NaiveDate, Weekday};

/// Placement of an image inside a box, relative to the box's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fit {
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
}

/// Scale `natural_w` × `natural_h` uniformly to fit inside the box and center it.
/// Degenerate sizes produce an empty fit at the box center.
pub fn fit_box(natural_w: f32, natural_h: f32, box_w: f32, box_h: f32) -> Fit {
    let box_w = if box_w.is_finite() { box_w.max(0.0) } else { 0.0 };
    let box_h = if box_h.is_finite() { box_h.max(0.0) } else { 0.0 };
    let valid = |v: f32| v.is_finite() && v > 0.0;

    let scale = if valid(natural_w) && valid(natural_h) {
        (box_w / natural_w).min(box_h / natural_h)
    } else {
        0.0
    };
    // Clamp rounding overshoot so the drawn region never leaves the box.
    let width = (natural_w * scale).min(box_w);
    let height = (natural_h * scale).min(box_h);
    let (width, height) = if scale > 0.0 { (width, height) } else { (0.0, 0.0) };

    Fit {
        width,
        height,
        offset_x: (box_w - width) / 2.0,
        offset_y: (box_h - height) / 2.0,
        scale,
    }
}

/// Greedy word wrap. Newlines are hard breaks; a word wider than `max_width`
/// gets its own line unbroken.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let space_w = measure(" ");
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_w = 0.0f32;
        for word in paragraph.split_whitespace() {
            let ww = measure(word);
            if current.is_empty() {
                current.push_str(word);
                current_w = ww;
            } else if current_w + space_w + ww <= max_width {
                current.push(' ');
                current.push_str(word);
                current_w += space_w + ww;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_w = ww;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

pub const ELLIPSIS: &str = "...";

/// Cut `text` to `max_chars` characters and append `...` when it is longer.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Tags that end a line of text content.
const BLOCK_TAGS: &[&str] = &[
    "br", "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
];

/// Plain text of an HTML fragment. Never fails: an unterminated tag drops
/// the rest of the input, unknown entities are kept literally.
pub fn strip_markup(rich: &str) -> String {
    let mut out = String::with_capacity(rich.len());
    let mut rest = rich;

    while let Some(lt) = rest.find('<') {
        push_decoded(&mut out, &rest[..lt]);
        let after = &rest[lt + 1..];
        let Some(gt) = after.find('>') else {
            rest = "";
            break;
        };
        let tag = after[..gt].trim_start_matches('/');
        let name: String = tag
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if BLOCK_TAGS.contains(&name.as_str()) {
            out.push('\n');
        }
        rest = &after[gt + 1..];
    }
    push_decoded(&mut out, rest);

    out.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_decoded(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&after[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

const MONTHS_ID: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

/// Indonesian weekday name for a `YYYY-MM-DD` date, empty when unparseable.
pub fn weekday_label(date: &str) -> String {
    let Some(d) = parse_date(date) else {
        return String::new();
    };
    match d.weekday() {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
    .to_string()
}

/// `D Mon YYYY` with Indonesian month abbreviations, `-` when unparseable.
pub fn date_label(date: &str) -> String {
    match parse_date(date) {
        Some(d) => format!("{} {} {}", d.day(), MONTHS_ID[d.month0() as usize], d.year()),
        None => "-".to_string(),
    }
}

/// `<weekday> / <date>`, or `-` alone when the date does not parse.
pub fn day_date_label(date: &str) -> String {
    if parse_date(date).is_none() {
        return "-".to_string();
    }
    format!("{} / {}", weekday_label(date), date_label(date))
}

pub fn time_label(time: &str, zone: &str) -> String {
    let time = time.trim();
    let time = if time.is_empty() { "-" } else { time };
    if zone.is_empty() {
        time.to_string()
    } else {
        format!("{time} {zone}")
    }
}
