use std::collections::{BTreeMap, BTreeSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdf_writer::Content;

use crate::error::Error;
use crate::model::{Point, Rect, StandardFont};

/// Parents walked before giving up on an inherited page attribute.
const MAX_TREE_DEPTH: usize = 32;

/// US Letter, used when neither the page nor its ancestors declare a MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// A page of an open template, in top-left page space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageRef {
    index: usize,
    width: f32,
    height: f32,
}

impl PageRef {
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self { index, width, height }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

pub(crate) struct PageSlot {
    pub(crate) id: ObjectId,
    pub(crate) geometry: Geometry,
    pub(crate) overlay: Option<Overlay>,
}

/// Maps top-left page space onto a page's MediaBox.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Geometry {
    media_box: [f32; 4],
}

impl Geometry {
    pub(crate) fn new(media_box: [f32; 4]) -> Self {
        Self { media_box }
    }

    pub(crate) fn page_ref(&self, index: usize) -> PageRef {
        PageRef::new(
            index,
            self.media_box[2] - self.media_box[0],
            self.media_box[3] - self.media_box[1],
        )
    }

    /// Top-left page space to PDF user space.
    pub(crate) fn to_pdf(&self, p: Point) -> (f32, f32) {
        (self.media_box[0] + p.x, self.media_box[3] - p.y)
    }

    /// Lower-left corner of a top-left anchored rectangle, in PDF user space.
    pub(crate) fn rect_origin(&self, r: Rect) -> (f32, f32) {
        self.to_pdf(Point::new(r.x, r.y + r.height))
    }
}

/// Operators and resources drawn onto one page since the template was opened.
pub(crate) struct Overlay {
    pub(crate) content: Content,
    taken: BTreeSet<String>,
    fonts: BTreeMap<StandardFont, String>,
    images: Vec<(String, ObjectId)>,
}

impl Overlay {
    pub(crate) fn new(taken: BTreeSet<String>) -> Self {
        let mut content = Content::new();
        // Closes the `q` pushed in front of the template's own content.
        content.restore_state();
        content.save_state();
        Self {
            content,
            taken,
            fonts: BTreeMap::new(),
            images: Vec::new(),
        }
    }

    pub(crate) fn font_name(&mut self, font: StandardFont) -> String {
        if let Some(name) = self.fonts.get(&font) {
            return name.clone();
        }
        let name = self.fresh_name(font.resource_stem());
        self.fonts.insert(font, name.clone());
        name
    }

    pub(crate) fn image_name(&mut self, xobject: ObjectId) -> String {
        let name = self.fresh_name(&format!("FsIm{}", self.images.len() + 1));
        self.images.push((name.clone(), xobject));
        name
    }

    fn fresh_name(&mut self, stem: &str) -> String {
        let mut name = stem.to_string();
        let mut n = 1;
        while self.taken.contains(&name) {
            name = format!("{stem}_{n}");
            n += 1;
        }
        self.taken.insert(name.clone());
        name
    }

    pub(crate) fn fonts(&self) -> impl Iterator<Item = (StandardFont, &str)> {
        self.fonts.iter().map(|(f, n)| (*f, n.as_str()))
    }

    pub(crate) fn images(&self) -> &[(String, ObjectId)] {
        &self.images
    }

    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.content.restore_state();
        let raw = self.content.finish();
        raw.as_slice().to_vec()
    }
}

pub(crate) fn object_to_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up a page attribute, walking up /Parent for inheritable keys.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value));
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4], Error> {
    let Some(obj) = inherited(doc, page_id, b"MediaBox") else {
        log::warn!("Page {page_id:?} has no MediaBox; assuming US Letter");
        return Ok(DEFAULT_MEDIA_BOX);
    };
    let values: Vec<f32> = obj
        .as_array()
        .map_err(|e| Error::CorruptTemplate(format!("MediaBox is not an array: {e}")))?
        .iter()
        .filter_map(|o| object_to_f32(resolve(doc, o)))
        .collect();
    if values.len() != 4 {
        return Err(Error::CorruptTemplate(format!(
            "MediaBox of page {page_id:?} has {} numbers, expected 4",
            values.len()
        )));
    }
    // Normalize so [0], [1] are the lower-left corner.
    Ok([
        values[0].min(values[2]),
        values[1].min(values[3]),
        values[0].max(values[2]),
        values[1].max(values[3]),
    ])
}

pub(crate) fn rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited(doc, page_id, b"Rotate")
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(0)
}

/// Effective resources of a page as an owned dictionary, following references and inheritance.
pub(crate) fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    inherited(doc, page_id, b"Resources")
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

fn sub_dictionary(doc: &Document, resources: &Dictionary, key: &[u8]) -> Dictionary {
    resources
        .get(key)
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

/// Resource names already used by the page's fonts and XObjects.
pub(crate) fn taken_names(doc: &Document, page_id: ObjectId) -> BTreeSet<String> {
    let resources = effective_resources(doc, page_id);
    [&b"Font"[..], &b"XObject"[..]]
        .into_iter()
        .flat_map(|key| {
            sub_dictionary(doc, &resources, key)
                .iter()
                .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// The page's existing content streams as a flat list, splicing in arrays that
/// sit behind an indirect reference.
fn content_streams(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Some(contents) = doc.get_dictionary(page_id).ok().and_then(|d| d.get(b"Contents").ok()) else {
        return Vec::new();
    };
    let entries = match resolve(doc, contents) {
        Object::Array(items) => items.as_slice(),
        Object::Stream(_) => std::slice::from_ref(contents),
        _ => {
            log::warn!("Page {page_id:?} has unusable /Contents; dropping it");
            return Vec::new();
        }
    };
    entries
        .iter()
        .flat_map(|entry| match resolve(doc, entry) {
            Object::Array(nested) => nested.clone(),
            _ => vec![entry.clone()],
        })
        .collect()
}

/// Merge an overlay into its page: wrap the existing content in q/Q, append the
/// overlay stream and give the page its own copy of the resources it needs.
pub(crate) fn attach_overlay(
    doc: &mut Document,
    page_id: ObjectId,
    prefix_id: ObjectId,
    overlay_id: ObjectId,
    fonts: &[(String, ObjectId)],
    images: &[(String, ObjectId)],
) -> Result<(), Error> {
    let mut resources = effective_resources(doc, page_id);
    let mut font_dict = sub_dictionary(doc, &resources, b"Font");
    for (name, id) in fonts {
        font_dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
    }
    resources.set("Font", Object::Dictionary(font_dict));
    if !images.is_empty() {
        let mut xobjects = sub_dictionary(doc, &resources, b"XObject");
        for (name, id) in images {
            xobjects.set(name.as_bytes().to_vec(), Object::Reference(*id));
        }
        resources.set("XObject", Object::Dictionary(xobjects));
    }

    let mut contents = vec![Object::Reference(prefix_id)];
    contents.extend(content_streams(doc, page_id));
    contents.push(Object::Reference(overlay_id));

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| Error::CorruptTemplate(format!("page {page_id:?} is not a dictionary: {e}")))?;

    page.set("Contents", Object::Array(contents));
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}
