pub mod assets;
pub mod compose;
mod error;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod primitives;
pub mod resolve;
mod source;
pub mod template;

pub use compose::compose;
pub use error::{Error, Result};
pub use fonts::{FontSet, TextMeasure};
pub use layout::{Layout, Renderer};
pub use model::{
    AgendaItem, Attachment, AttendanceState, BrandingAssets, MeetingRecord, MinuteStatus,
    Participant, UnitRecord, UserRecord,
};
pub use pdf::PdfRenderer;
pub use source::{JsonDirSource, ReferenceSource, StaticSource};
pub use template::Template;

use std::time::Instant;

use assets::ResolvedAssets;

/// Everything that stays fixed across render calls.
#[derive(Default)]
pub struct RenderOptions {
    pub template: Template,
    pub fonts: FontSet,
}

impl RenderOptions {
    /// Validate `template` and load the font files it names.
    pub fn new(template: Template) -> Result<Self> {
        template.validate()?;
        let fonts = FontSet::load(&template.fonts)?;
        Ok(Self { template, fonts })
    }
}

#[derive(Clone, Debug)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub page_count: usize,
}

/// `<prefix>-<slug>.pdf`, where the slug is the title with every run of
/// non-alphanumeric characters replaced by `-`.
pub fn suggested_file_name(title: &str, prefix: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "notulen" } else { slug };
    format!("{prefix}-{slug}.pdf")
}

/// Render the minutes report and attendance roster for `meeting`.
///
/// Images are decoded on the calling thread.
pub fn render(
    meeting: &MeetingRecord,
    users: &[UserRecord],
    units: &[UnitRecord],
    branding: &BrandingAssets,
    options: &RenderOptions,
) -> Result<RenderedDocument> {
    options.template.validate()?;
    let t0 = Instant::now();
    let assets = assets::resolve_assets_blocking(meeting, branding);
    log_resolved(&assets, t0);
    finish(meeting, users, units, &assets, options, t0)
}

/// Fetch reference data from `source`, then render. Images are decoded on
/// blocking workers. Must run inside a tokio runtime.
///
/// # Errors
///
/// Any failed fetch is reported as [`Error::ReferenceData`] and nothing is
/// rendered.
pub async fn render_from_source(
    meeting: &MeetingRecord,
    source: &dyn ReferenceSource,
    options: &RenderOptions,
) -> Result<RenderedDocument> {
    options.template.validate()?;
    let t0 = Instant::now();
    let (users, units, branding) = futures::try_join!(
        async { source.users().await.map_err(reference_error("users")) },
        async { source.units().await.map_err(reference_error("units")) },
        async { source.branding().await.map_err(reference_error("branding")) },
    )?;
    log::info!(
        "Fetched {} users, {} units in {:.1}ms",
        users.len(),
        units.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    let t1 = Instant::now();
    let assets = assets::resolve_assets(meeting, &branding).await?;
    log_resolved(&assets, t1);
    finish(meeting, &users, &units, &assets, options, t1)
}

fn reference_error(what: &'static str) -> impl FnOnce(Error) -> Error {
    move |err| match err {
        err @ Error::ReferenceData { .. } => err,
        other => Error::ReferenceData {
            what,
            message: other.to_string(),
        },
    }
}

fn log_resolved(assets: &ResolvedAssets, t0: Instant) {
    let signatures = assets.participant_signatures.iter().flatten().count();
    log::info!(
        "Resolved assets in {:.1}ms: logo={}, pic_signature={}, attachments={}, signatures={}",
        t0.elapsed().as_secs_f64() * 1000.0,
        assets.logo.is_some(),
        assets.pic_signature.is_some(),
        assets.attachments.len(),
        signatures,
    );
}

fn finish(
    meeting: &MeetingRecord,
    users: &[UserRecord],
    units: &[UnitRecord],
    assets: &ResolvedAssets,
    options: &RenderOptions,
    t0: Instant,
) -> Result<RenderedDocument> {
    let t_resolve = t0.elapsed();
    let layout = compose(meeting, users, units, assets, &options.template, &options.fonts);
    let t_compose = t0.elapsed();

    let bytes = PdfRenderer::new(&options.fonts).render(&layout)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: compose={:.1}ms, render={:.1}ms, total={:.1}ms ({} report + {} roster pages, {} bytes)",
        (t_compose - t_resolve).as_secs_f64() * 1000.0,
        (t_total - t_compose).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        layout.report_pages().count(),
        layout.roster_pages().count(),
        bytes.len(),
    );

    Ok(RenderedDocument {
        bytes,
        file_name: suggested_file_name(&meeting.title, &options.template.file_prefix),
        page_count: layout.pages.len(),
    })
}
