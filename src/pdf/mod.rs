mod content;

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use pdf_writer::{Filter, Name, Pdf, Rect, Ref};

use crate::assets::{ImageAsset, PixelData};
use crate::error::Result;
use crate::fonts::{FontSet, FontStyle, WrittenFont, write_font};
use crate::layout::{Layout, Op, Renderer};

use content::PageResources;

/// Writes a [`Layout`] as a PDF document.
pub struct PdfRenderer<'a> {
    fonts: &'a FontSet,
}

impl<'a> PdfRenderer<'a> {
    pub fn new(fonts: &'a FontSet) -> Self {
        Self { fonts }
    }
}

impl Renderer for PdfRenderer<'_> {
    type Output = Vec<u8>;

    fn render(&self, layout: &Layout) -> Result<Vec<u8>> {
        render(layout, self.fonts)
    }
}

fn font_resource_name(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Regular => "F1",
        FontStyle::Bold => "F2",
        FontStyle::Italic => "F3",
    }
}

fn used_chars(layout: &Layout) -> HashMap<FontStyle, HashSet<char>> {
    let mut used: HashMap<FontStyle, HashSet<char>> = HashMap::new();
    for page in &layout.pages {
        for run in page.texts() {
            used.entry(run.style).or_default().extend(run.text.chars());
        }
    }
    used
}

fn render(layout: &Layout, fonts: &FontSet) -> Result<Vec<u8>> {
    let t0 = Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    // Phase 1: fonts, only for styles that occur
    let used = used_chars(layout);
    let mut written: HashMap<FontStyle, WrittenFont> = HashMap::new();
    for style in FontStyle::ALL {
        if let Some(chars) = used.get(&style) {
            let font = write_font(&mut pdf, fonts.face(style), chars, &mut alloc)?;
            written.insert(style, font);
        }
    }
    let t_fonts = t0.elapsed();

    // Phase 2: images, in layout order
    let image_refs: Vec<Ref> = layout
        .images
        .iter()
        .map(|image| embed_image(&mut pdf, image, &mut alloc))
        .collect();
    let t_images = t0.elapsed();

    // Phase 3: one content stream per page
    let resources = PageResources {
        fonts: &written,
        page_height: layout.page_height,
    };
    let mut page_ids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let page_id = alloc();
        let content_id = alloc();
        let raw = content::page_content(page, &resources);
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
        pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

        let page_images: Vec<usize> = {
            let mut ids: Vec<usize> = page
                .ops
                .iter()
                .filter_map(|op| match op {
                    Op::Image { id, .. } => Some(id.0),
                    _ => None,
                })
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };

        {
            let mut pdf_page = pdf.page(page_id);
            pdf_page
                .media_box(Rect::new(0.0, 0.0, layout.page_width, layout.page_height))
                .parent(pages_id)
                .contents(content_id);
            let mut res = pdf_page.resources();
            {
                let mut font_dict = res.fonts();
                for style in FontStyle::ALL {
                    if let Some(font) = written.get(&style) {
                        font_dict.pair(Name(font_resource_name(style).as_bytes()), font.font_ref);
                    }
                }
            }
            if !page_images.is_empty() {
                let mut xobjects = res.x_objects();
                for idx in page_images {
                    if let Some(r) = image_refs.get(idx) {
                        xobjects.pair(Name(content::image_name(idx).as_bytes()), *r);
                    }
                }
            }
        }
        page_ids.push(page_id);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);
    let t_pages = t0.elapsed();

    let bytes = pdf.finish();
    log::info!(
        "PDF phases: fonts={:.1}ms, images={:.1}ms, pages={:.1}ms ({} pages, {} images, {} bytes)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_images - t_fonts).as_secs_f64() * 1000.0,
        (t_pages - t_images).as_secs_f64() * 1000.0,
        layout.pages.len(),
        layout.images.len(),
        bytes.len(),
    );
    Ok(bytes)
}

fn embed_image(pdf: &mut Pdf, image: &ImageAsset, alloc: &mut impl FnMut() -> Ref) -> Ref {
    let xobj_ref = alloc();
    let (w, h) = (image.pixel_width as i32, image.pixel_height as i32);

    match &image.pixels {
        PixelData::Jpeg { data, gray } => {
            let mut xobj = pdf.image_xobject(xobj_ref, data);
            xobj.filter(Filter::DctDecode);
            xobj.width(w);
            xobj.height(h);
            if *gray {
                xobj.color_space().device_gray();
            } else {
                xobj.color_space().device_rgb();
            }
            xobj.bits_per_component(8);
        }
        PixelData::Raw {
            samples,
            gray,
            alpha,
        } => {
            let smask_ref = alpha.as_ref().map(|alpha| {
                let compressed = miniz_oxide::deflate::compress_to_vec_zlib(alpha, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed);
                mask.filter(Filter::FlateDecode);
                mask.width(w);
                mask.height(h);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                mask_ref
            });

            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(samples, 6);
            let mut xobj = pdf.image_xobject(xobj_ref, &compressed);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w);
            xobj.height(h);
            if *gray {
                xobj.color_space().device_gray();
            } else {
                xobj.color_space().device_rgb();
            }
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }
    }
    xobj_ref
}
