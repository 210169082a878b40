#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use formstamp::{Color, Error, PageRef, Point, Rect, StandardFont, Stroke, Surface};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Output directory: tests/output/<suite>/
pub fn output_dir(suite: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output").join(suite);
    fs::create_dir_all(&dir).expect("create output dir");
    dir
}

/// A template with one page per `(width, height)`, each carrying a line of
/// printed text and a page-level Helvetica resource named `F1`.
pub fn template_bytes(pages: &[(f32, f32)]) -> Vec<u8> {
    template_with_font_name(pages, "F1")
}

/// Same as [`template_bytes`] but the page's own font resource is called `font_name`.
pub fn template_with_font_name(pages: &[(f32, f32)], font_name: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for (i, &(width, height)) in pages.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(font_name.as_bytes().to_vec()), 12i64.into()]),
                Operation::new("Td", vec![36i64.into(), (height - 48.0).into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Printed form page {}", i + 1))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode template content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0i64.into(), 0i64.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { font_name => font_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("serialize template");
    out
}

/// Same as [`template_bytes`] but each page's `/Contents` points at an indirect
/// array of streams, as incremental editors tend to write it.
pub fn template_with_indirect_contents(pages: &[(f32, f32)]) -> Vec<u8> {
    let mut doc = Document::load_mem(&template_bytes(pages)).expect("parse template");
    let page_ids: Vec<_> = doc.get_pages().into_values().collect();
    for page_id in page_ids {
        let stream = doc
            .get_dictionary(page_id)
            .and_then(|d| d.get(b"Contents"))
            .cloned()
            .expect("page has contents");
        let array_id = doc.add_object(Object::Array(vec![stream]));
        doc.get_dictionary_mut(page_id)
            .expect("page dict")
            .set("Contents", array_id);
    }
    let mut out = Vec::new();
    doc.save_to(&mut out).expect("serialize template");
    out
}

pub fn write_template(suite: &str, pages: &[(f32, f32)]) -> PathBuf {
    let path = output_dir(suite).join("template.pdf");
    fs::write(&path, template_bytes(pages)).expect("write template");
    path
}

pub fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128, alpha])
    });
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("encode png");
    out
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, _| image::Rgb([(x % 256) as u8, 90, 200]));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    out
}

pub fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, png_bytes(24, 32, 255)).expect("write png");
    path
}

#[derive(Clone, Debug, PartialEq)]
pub enum Mark {
    Text {
        page: usize,
        at: Point,
        text: String,
        font: StandardFont,
        size: f32,
        color: Color,
    },
    Image {
        page: usize,
        rect: Rect,
    },
    Line {
        page: usize,
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Rect {
        page: usize,
        rect: Rect,
    },
    Circle {
        page: usize,
        center: Point,
        radius: f32,
    },
}

/// A surface that records every draw call instead of producing a PDF.
pub struct RecordingSurface {
    pages: Vec<(f32, f32)>,
    pub marks: Vec<Mark>,
}

impl RecordingSurface {
    pub fn new(pages: &[(f32, f32)]) -> Self {
        Self {
            pages: pages.to_vec(),
            marks: Vec::new(),
        }
    }

    /// Text runs in draw order as `(x, y, text)`.
    pub fn texts(&self) -> Vec<(f32, f32, String)> {
        self.marks
            .iter()
            .filter_map(|m| match m {
                Mark::Text { at, text, .. } => Some((at.x, at.y, text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn text_string(&self) -> String {
        self.texts().into_iter().map(|(_, _, t)| t).collect()
    }

    fn check(&self, page: PageRef) -> Result<(), Error> {
        if page.index() < self.pages.len() {
            Ok(())
        } else {
            Err(Error::PageOutOfRange {
                index: page.index(),
                count: self.pages.len(),
            })
        }
    }
}

impl Surface for RecordingSurface {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<PageRef, Error> {
        let &(w, h) = self.pages.get(index).ok_or(Error::PageOutOfRange {
            index,
            count: self.pages.len(),
        })?;
        Ok(PageRef::new(index, w, h))
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
        self.check(page)?;
        self.marks.push(Mark::Text {
            page: page.index(),
            at,
            text: text.to_string(),
            font,
            size: font_size,
            color,
        });
        Ok(())
    }

    fn draw_image(&mut self, page: PageRef, rect: Rect, data: &[u8]) -> Result<(), Error> {
        self.check(page)?;
        image::load_from_memory(data).map_err(|e| Error::ImageDecode(e.to_string()))?;
        self.marks.push(Mark::Image {
            page: page.index(),
            rect,
        });
        Ok(())
    }

    fn draw_line(&mut self, page: PageRef, from: Point, to: Point, stroke: Stroke) -> Result<(), Error> {
        self.check(page)?;
        self.marks.push(Mark::Line {
            page: page.index(),
            from,
            to,
            stroke,
        });
        Ok(())
    }

    fn draw_rect(
        &mut self,
        page: PageRef,
        rect: Rect,
        _stroke: Option<Stroke>,
        _fill: Option<Color>,
    ) -> Result<(), Error> {
        self.check(page)?;
        self.marks.push(Mark::Rect {
            page: page.index(),
            rect,
        });
        Ok(())
    }

    fn draw_circle(
        &mut self,
        page: PageRef,
        center: Point,
        radius: f32,
        _stroke: Option<Stroke>,
        _fill: Option<Color>,
    ) -> Result<(), Error> {
        self.check(page)?;
        self.marks.push(Mark::Circle {
            page: page.index(),
            center,
            radius,
        });
        Ok(())
    }
}

pub fn num(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        other => panic!("not a number: {other:?}"),
    }
}

/// Decoded content operations of one page, all streams concatenated in order.
pub fn page_operations(pdf: &[u8], page: usize) -> Vec<Operation> {
    let doc = Document::load_mem(pdf).expect("parse output");
    let page_id = *doc.get_pages().values().nth(page).expect("page exists");
    let dict = doc.get_dictionary(page_id).expect("page dict");
    let ids: Vec<_> = match dict.get(b"Contents").expect("page has contents") {
        Object::Reference(id) => vec![*id],
        Object::Array(items) => items.iter().map(|o| o.as_reference().expect("content ref")).collect(),
        other => panic!("unexpected Contents: {other:?}"),
    };
    let mut bytes = Vec::new();
    for id in ids {
        let stream = doc.get_object(id).and_then(Object::as_stream).expect("content stream");
        let data = if stream.dict.get(b"Filter").is_ok() {
            stream.decompressed_content().expect("decompress")
        } else {
            stream.content.clone()
        };
        bytes.extend_from_slice(&data);
        bytes.push(b'\n');
    }
    Content::decode(&bytes).expect("decode content").operations
}

/// A `Tj` drawn by the overlay: font resource, size, PDF-space origin and string bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct ShownText {
    pub font: String,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub bytes: Vec<u8>,
}

/// Text shown in fonts whose resource name starts with `prefix`.
pub fn shown_text(ops: &[Operation], prefix: &str) -> Vec<ShownText> {
    let mut out = Vec::new();
    let (mut font, mut size, mut x, mut y) = (String::new(), 0.0, 0.0, 0.0);
    for op in ops {
        match op.operator.as_str() {
            "BT" => {
                x = 0.0;
                y = 0.0;
            }
            "Tf" => {
                font = String::from_utf8_lossy(op.operands[0].as_name().expect("font name")).into_owned();
                size = num(&op.operands[1]);
            }
            "Td" => {
                x += num(&op.operands[0]);
                y += num(&op.operands[1]);
            }
            "Tj" if font.starts_with(prefix) => {
                let bytes = match &op.operands[0] {
                    Object::String(b, _) => b.clone(),
                    other => panic!("unexpected Tj operand: {other:?}"),
                };
                out.push(ShownText {
                    font: font.clone(),
                    size,
                    x,
                    y,
                    bytes,
                });
            }
            _ => {}
        }
    }
    out
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}
