//! Image payloads: decoding, classification and dimension probing.
//!
//! Resolution runs before layout. [`resolve_assets`] decodes on blocking
//! workers and reassembles results in input order; [`resolve_assets_blocking`]
//! produces the same [`ResolvedAssets`] on the calling thread.

use std::sync::Arc;

use base64::Engine;
use image::{DynamicImage, ImageFormat};

use crate::error::{Error, Result};
use crate::model::{AttendanceState, BrandingAssets, MeetingRecord};

#[derive(Debug)]
pub enum PixelData {
    /// Original JPEG stream, embedded with DCTDecode.
    Jpeg { data: Vec<u8>, gray: bool },
    /// Uncompressed 8-bit samples (gray or RGB) with an optional alpha plane.
    Raw {
        samples: Vec<u8>,
        gray: bool,
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug)]
pub struct ImageAsset {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub pixels: PixelData,
}

/// What an attachment turned out to be once its payload was inspected.
#[derive(Clone, Debug)]
pub enum AttachmentAsset {
    /// Opaque file: listed by name only.
    Document,
    Image(Arc<ImageAsset>),
    /// Looked like an image but could not be decoded.
    Failed,
}

#[derive(Clone, Debug)]
pub struct ResolvedAttachment {
    pub file_name: String,
    pub asset: AttachmentAsset,
}

/// Every image the layout needs, already decoded. Vectors are index-aligned
/// with the meeting's `attachments` and `participants`.
#[derive(Clone, Debug, Default)]
pub struct ResolvedAssets {
    pub logo: Option<Arc<ImageAsset>>,
    pub pic_signature: Option<Arc<ImageAsset>>,
    pub attachments: Vec<ResolvedAttachment>,
    pub participant_signatures: Vec<Option<Arc<ImageAsset>>>,
}

struct DataUrl {
    mime: String,
    /// `None` when the base64 body is invalid.
    data: Option<Vec<u8>>,
}

fn parse_data_url(uri: &str) -> Option<DataUrl> {
    let rest = uri.trim().strip_prefix("data:")?;
    let (header, body) = rest.split_once(',')?;
    let mime = header
        .split(';')
        .next()
        .unwrap_or("application/octet-stream")
        .to_ascii_lowercase();
    let data = if header.contains("base64") {
        let cleaned: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD.decode(cleaned).ok()
    } else {
        Some(body.as_bytes().to_vec())
    };
    Some(DataUrl { mime, data })
}

/// Recognize an image by its leading bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Decode `bytes` fully and prepare them for embedding.
pub fn probe_image(bytes: &[u8]) -> std::result::Result<ImageAsset, image::ImageError> {
    let format = image::guess_format(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, format)?;
    let (pixel_width, pixel_height) = (decoded.width(), decoded.height());

    let color = decoded.color();
    if format == ImageFormat::Jpeg
        && matches!(color, image::ColorType::L8 | image::ColorType::Rgb8)
    {
        return Ok(ImageAsset {
            pixel_width,
            pixel_height,
            pixels: PixelData::Jpeg {
                data: bytes.to_vec(),
                gray: color == image::ColorType::L8,
            },
        });
    }

    Ok(ImageAsset {
        pixel_width,
        pixel_height,
        pixels: raw_pixels(decoded),
    })
}

fn raw_pixels(decoded: DynamicImage) -> PixelData {
    let color = decoded.color();
    let gray = matches!(
        color,
        image::ColorType::L8 | image::ColorType::L16 | image::ColorType::La8 | image::ColorType::La16
    );

    if color.has_alpha() {
        let rgba = decoded.to_rgba8();
        let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
        let alpha = has_alpha.then(|| rgba.pixels().map(|p| p.0[3]).collect());
        let samples = if gray {
            rgba.pixels().map(|p| p.0[0]).collect()
        } else {
            rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect()
        };
        return PixelData::Raw {
            samples,
            gray,
            alpha,
        };
    }

    let samples = if gray {
        decoded.to_luma8().into_raw()
    } else {
        decoded.to_rgb8().into_raw()
    };
    PixelData::Raw {
        samples,
        gray,
        alpha: None,
    }
}

/// Decode a logo or signature. Accepts a data URL or bare base64.
/// Anything undecodable yields `None`.
pub fn decode_image_source(source: &str) -> Option<ImageAsset> {
    let source = source.trim();
    if source.is_empty() {
        return None;
    }
    let bytes = match parse_data_url(source) {
        Some(url) => url.data?,
        None => base64::engine::general_purpose::STANDARD
            .decode(source)
            .ok()?,
    };
    match probe_image(&bytes) {
        Ok(asset) => Some(asset),
        Err(e) => {
            log::warn!("Ignoring undecodable image ({} bytes): {e}", bytes.len());
            None
        }
    }
}

/// Classify an attachment payload. Image detection uses the payload's
/// magic bytes; a declared `image/*` type without a recognizable image
/// body counts as a failed image rather than a document.
pub fn attachment_asset(file_name: &str, payload: &str) -> AttachmentAsset {
    let Some(url) = parse_data_url(payload) else {
        return AttachmentAsset::Document;
    };
    let declared_image = url.mime.starts_with("image/");
    let recognized = url.data.as_deref().filter(|d| sniff_image(d).is_some());

    match recognized {
        Some(bytes) => match probe_image(bytes) {
            Ok(asset) => AttachmentAsset::Image(Arc::new(asset)),
            Err(e) => {
                log::warn!("Failed to decode attachment image {file_name}: {e}");
                AttachmentAsset::Failed
            }
        },
        None if declared_image => {
            log::warn!("Attachment {file_name} is declared {} but has no image data", url.mime);
            AttachmentAsset::Failed
        }
        None => AttachmentAsset::Document,
    }
}

fn signature_sources(meeting: &MeetingRecord) -> Vec<Option<String>> {
    meeting
        .participants
        .iter()
        .map(|p| match p.attendance_state {
            AttendanceState::Present => p.signature_image.clone(),
            AttendanceState::Absent => None,
        })
        .collect()
}

pub fn resolve_assets_blocking(meeting: &MeetingRecord, branding: &BrandingAssets) -> ResolvedAssets {
    let decode = |s: &Option<String>| s.as_deref().and_then(decode_image_source).map(Arc::new);
    ResolvedAssets {
        logo: decode(&branding.document_logo),
        pic_signature: decode(&meeting.responsible_party_signature),
        attachments: meeting
            .attachments
            .iter()
            .map(|a| ResolvedAttachment {
                file_name: a.file_name.clone(),
                asset: attachment_asset(&a.file_name, &a.payload),
            })
            .collect(),
        participant_signatures: signature_sources(meeting).iter().map(decode).collect(),
    }
}

/// Run `decode` for every present input on a blocking worker. The output is
/// in input order however the workers are scheduled.
async fn decode_in_order<I, T>(inputs: Vec<Option<I>>, decode: fn(I) -> Option<T>) -> Result<Vec<Option<T>>>
where
    I: Send + 'static,
    T: Send + 'static,
{
    let tasks = inputs.into_iter().map(|input| async move {
        match input {
            Some(input) => tokio::task::spawn_blocking(move || decode(input))
                .await
                .map_err(|e| Error::Render(format!("image worker failed: {e}"))),
            None => Ok(None),
        }
    });
    futures::future::join_all(tasks).await.into_iter().collect()
}

fn decode_owned(source: String) -> Option<Arc<ImageAsset>> {
    decode_image_source(&source).map(Arc::new)
}

fn classify_owned((file_name, payload): (String, String)) -> Option<ResolvedAttachment> {
    let asset = attachment_asset(&file_name, &payload);
    Some(ResolvedAttachment { file_name, asset })
}

/// Decode all images concurrently. Must run inside a tokio runtime.
pub async fn resolve_assets(meeting: &MeetingRecord, branding: &BrandingAssets) -> Result<ResolvedAssets> {
    let singles = vec![
        branding.document_logo.clone(),
        meeting.responsible_party_signature.clone(),
    ];
    let attachments = meeting
        .attachments
        .iter()
        .map(|a| Some((a.file_name.clone(), a.payload.clone())))
        .collect();

    let (singles, attachments, signatures) = futures::try_join!(
        decode_in_order(singles, decode_owned),
        decode_in_order(attachments, classify_owned),
        decode_in_order(signature_sources(meeting), decode_owned),
    )?;

    let mut singles = singles.into_iter();
    Ok(ResolvedAssets {
        logo: singles.next().flatten(),
        pic_signature: singles.next().flatten(),
        attachments: attachments.into_iter().flatten().collect(),
        participant_signatures: signatures,
    })
}
