mod page;
mod xobject;

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_writer::{Content, Name, Str};

use crate::error::Error;
use crate::model::{Color, Point, Rect, StandardFont, Stroke};

pub use page::PageRef;
use page::{Overlay, PageSlot};

/// Bezier control-point factor for approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Drawing primitives in top-left page space.
///
/// `TemplateDocument` is the real implementation; the renderer and the
/// calibration helpers only talk to this trait.
pub trait Surface {
    fn page_count(&self) -> usize;

    fn page(&self, index: usize) -> Result<PageRef, Error>;

    /// Place a glyph run with `at` as the left end of its baseline.
    fn draw_text(
        &mut self,
        page: PageRef,
        at: Point,
        text: &str,
        font: StandardFont,
        font_size: f32,
        color: Color,
    ) -> Result<(), Error>;

    /// Scale a PNG or JPEG to exactly fill `rect`.
    fn draw_image(&mut self, page: PageRef, rect: Rect, image: &[u8]) -> Result<(), Error>;

    fn draw_line(&mut self, page: PageRef, from: Point, to: Point, stroke: Stroke) -> Result<(), Error>;

    fn draw_rect(
        &mut self,
        page: PageRef,
        rect: Rect,
        stroke: Option<Stroke>,
        fill: Option<Color>,
    ) -> Result<(), Error>;

    fn draw_circle(
        &mut self,
        page: PageRef,
        center: Point,
        radius: f32,
        stroke: Option<Stroke>,
        fill: Option<Color>,
    ) -> Result<(), Error>;
}

/// An opened template plus everything drawn on it so far.
///
/// Drawing only touches in-memory state; nothing reaches disk until
/// [`TemplateDocument::save`]. The template file itself is never written.
pub struct TemplateDocument {
    doc: Document,
    pages: Vec<PageSlot>,
    fonts: BTreeMap<StandardFont, ObjectId>,
}

impl TemplateDocument {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound
            | std::io::ErrorKind::PermissionDenied
            | std::io::ErrorKind::IsADirectory => Error::TemplateNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let handle = Self::open_bytes(&bytes)?;
        log::debug!("Opened template {} ({} pages)", path.display(), handle.pages.len());
        Ok(handle)
    }

    pub fn open_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| Error::CorruptTemplate(format!("failed to parse PDF: {e}")))?;

        // get_pages is keyed by 1-based page number, already in order
        let mut pages = Vec::new();
        for (number, id) in doc.get_pages() {
            let rotate = page::rotation(&doc, id);
            if rotate % 360 != 0 {
                log::warn!("Page {} is rotated by {rotate}°; coordinates assume an upright page", number - 1);
            }
            pages.push(PageSlot {
                id,
                geometry: page::Geometry::new(page::media_box(&doc, id)?),
                overlay: None,
            });
        }
        if pages.is_empty() {
            return Err(Error::CorruptTemplate("document has no pages".into()));
        }

        Ok(Self {
            doc,
            pages,
            fonts: BTreeMap::new(),
        })
    }

    /// True once anything has been drawn on any page.
    pub fn is_modified(&self) -> bool {
        self.pages.iter().any(|p| p.overlay.is_some())
    }

    /// Serialize the document with all overlays applied.
    pub fn to_bytes(mut self) -> Result<Vec<u8>, Error> {
        self.flush()?;
        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| Error::Serialize(e.to_string()))?;
        Ok(out)
    }

    /// Write the filled document to `path`, consuming the handle.
    pub fn save(self, path: &Path) -> Result<usize, Error> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(bytes.len())
    }

    fn geometry(&self, page: PageRef) -> Result<page::Geometry, Error> {
        self.pages
            .get(page.index())
            .map(|slot| slot.geometry)
            .ok_or(Error::PageOutOfRange {
                index: page.index(),
                count: self.pages.len(),
            })
    }

    /// Overlay for `page`, created on first use.
    fn overlay(&mut self, page: PageRef) -> Result<&mut Overlay, Error> {
        let Self { doc, pages, .. } = self;
        let count = pages.len();
        let slot = pages.get_mut(page.index()).ok_or(Error::PageOutOfRange {
            index: page.index(),
            count,
        })?;
        let id = slot.id;
        Ok(slot
            .overlay
            .get_or_insert_with(|| Overlay::new(page::taken_names(doc, id))))
    }

    fn font_object(&mut self, font: StandardFont) -> ObjectId {
        if let Some(id) = self.fonts.get(&font) {
            return *id;
        }
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        dict.set("BaseFont", Object::Name(font.base_font().to_vec()));
        if font.uses_winansi() {
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        }
        let id = self.doc.add_object(Object::Dictionary(dict));
        self.fonts.insert(font, id);
        id
    }

    fn flush(&mut self) -> Result<(), Error> {
        if !self.is_modified() {
            return Ok(());
        }

        let mut prefix = Content::new();
        prefix.save_state();
        let prefix_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), prefix.finish().as_slice().to_vec()));

        for index in 0..self.pages.len() {
            let Some(overlay) = self.pages[index].overlay.take() else {
                continue;
            };
            let fonts: Vec<(String, ObjectId)> = overlay
                .fonts()
                .map(|(font, name)| (name.to_string(), self.font_object(font)))
                .collect();
            let images = overlay.images().to_vec();

            let raw = overlay.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
            let mut dict = Dictionary::new();
            dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            let overlay_id = self.doc.add_object(Stream::new(dict, compressed));

            page::attach_overlay(
                &mut self.doc,
                self.pages[index].id,
                prefix_id,
                overlay_id,
                &fonts,
                &images,
            )?;
            log::debug!(
                "Page {index}: overlay {} bytes, {} fonts, {} images",
                raw.len(),
                fonts.len(),
                images.len()
            );
        }
        Ok(())
    }
}

fn path_stroke(content: &mut Content, stroke: Option<Stroke>, fill: Option<Color>) {
    if let Some(s) = stroke {
        content.set_line_width(s.width);
        content.set_stroke_rgb(s.color.r, s.color.g, s.color.b);
    }
    if let Some(c) = fill {
        content.set_fill_rgb(c.r, c.g, c.b);
    }
    match (stroke.is_some(), fill.is_some()) {
        (true, true) => {
            content.fill_nonzero_and_stroke();
        }
        (true, false) => {
            content.stroke();
        }
        (false, true) => {
            content.fill_nonzero();
        }
        (false, false) => {
            content.end_path();
        }
    }
}

impl Surface for TemplateDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<PageRef, Error> {
        self.pages
            .get(index)
            .map(|slot| slot.geometry.page_ref(index))
            .ok_or(Error::PageOutOfRange {
                index,
                count: self.pages.len(),
            })
    }

    fn draw_text(
        &mut self,
        page: PageRef,
        at: Point,
        text: &str,
        font: StandardFont,
        font_size: f32,
        color: Color,
    ) -> Result<(), Error> {
        let (x, y) = self.geometry(page)?.to_pdf(at);
        let bytes = font.encode(text);
        let overlay = self.overlay(page)?;
        let name = overlay.font_name(font);
        overlay
            .content
            .set_fill_rgb(color.r, color.g, color.b)
            .begin_text()
            .set_font(Name(name.as_bytes()), font_size)
            .next_line(x, y)
            .show(Str(&bytes))
            .end_text();
        Ok(())
    }

    fn draw_image(&mut self, page: PageRef, rect: Rect, image: &[u8]) -> Result<(), Error> {
        let (x, y) = self.geometry(page)?.rect_origin(rect);
        let xobject = xobject::embed_image(&mut self.doc, image)?;
        let overlay = self.overlay(page)?;
        let name = overlay.image_name(xobject);
        overlay
            .content
            .save_state()
            .transform([rect.width, 0.0, 0.0, rect.height, x, y])
            .x_object(Name(name.as_bytes()))
            .restore_state();
        Ok(())
    }

    fn draw_line(&mut self, page: PageRef, from: Point, to: Point, stroke: Stroke) -> Result<(), Error> {
        let geometry = self.geometry(page)?;
        let (x0, y0) = geometry.to_pdf(from);
        let (x1, y1) = geometry.to_pdf(to);
        let content = &mut self.overlay(page)?.content;
        content.move_to(x0, y0).line_to(x1, y1);
        path_stroke(content, Some(stroke), None);
        Ok(())
    }

    fn draw_rect(
        &mut self,
        page: PageRef,
        rect: Rect,
        stroke: Option<Stroke>,
        fill: Option<Color>,
    ) -> Result<(), Error> {
        let (x, y) = self.geometry(page)?.rect_origin(rect);
        let content = &mut self.overlay(page)?.content;
        content.rect(x, y, rect.width, rect.height);
        path_stroke(content, stroke, fill);
        Ok(())
    }

    fn draw_circle(
        &mut self,
        page: PageRef,
        center: Point,
        radius: f32,
        stroke: Option<Stroke>,
        fill: Option<Color>,
    ) -> Result<(), Error> {
        let (cx, cy) = self.geometry(page)?.to_pdf(center);
        let (r, k) = (radius, radius * KAPPA);
        let content = &mut self.overlay(page)?.content;
        content
            .move_to(cx + r, cy)
            .cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r)
            .cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy)
            .cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r)
            .cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy)
            .close_path();
        path_stroke(content, stroke, fill);
        Ok(())
    }
}
