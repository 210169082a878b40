mod date;
mod report;

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::catalog::Catalog;
use crate::error::Error;
use crate::fonts::{CHECK_GLYPH, char_to_winansi, check_origin_offset, helvetica_text_width};
use crate::model::{
    BoxedField, CheckboxField, Color, DateField, DateSlot, FieldKind, FieldSpec, ImageField,
    Point, StandardFont, TextField,
};
use crate::pdf::{PageRef, Surface};
use crate::record::Record;

pub use date::{DateParts, split_date};
pub use report::{FieldOutcome, FieldStatus, RenderReport, SkipReason};

#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub ink: Color,
    pub check_size: f32,
    /// Base directory for relative image paths; the working directory if unset.
    pub image_root: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            ink: Color::BLACK,
            check_size: 10.0,
            image_root: None,
        }
    }
}

/// Render `record` with default options.
pub fn render<S: Surface>(surface: &mut S, record: &Record, catalog: &Catalog) -> Result<RenderReport, Error> {
    FieldRenderer::new(catalog).render(surface, record)
}

/// Walks a catalog page by page and draws each field's value onto a surface.
pub struct FieldRenderer<'a> {
    catalog: &'a Catalog,
    options: RenderOptions,
}

impl<'a> FieldRenderer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render<S: Surface>(&self, surface: &mut S, record: &Record) -> Result<RenderReport, Error> {
        let start = Instant::now();
        let mut report = RenderReport::default();
        let page_count = surface.page_count();

        for index in 0..page_count {
            let page = surface.page(index)?;
            for kind in FieldKind::ALL {
                for (name, spec) in self.catalog.fields(kind).filter(|(_, s)| s.page() == index) {
                    let status = match record.get(name) {
                        None => FieldStatus::Skipped(SkipReason::Absent),
                        Some(value) => self.draw_field(surface, page, name, spec, value)?,
                    };
                    note(name, &status);
                    report.push(name, kind, index, status);
                }
            }
        }

        for kind in FieldKind::ALL {
            for (name, spec) in self.catalog.fields(kind).filter(|(_, s)| s.page() >= page_count) {
                let reason = SkipReason::PageOutOfRange {
                    page: spec.page(),
                    page_count,
                };
                let status = FieldStatus::Skipped(reason);
                note(name, &status);
                report.push(name, kind, spec.page(), status);
            }
        }

        log::info!(
            "Rendered {} marks for {} of {} fields in {:.1}ms",
            report.marks_drawn(),
            report.drawn().count(),
            report.outcomes().len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(report)
    }

    fn draw_field<S: Surface>(
        &self,
        surface: &mut S,
        page: PageRef,
        name: &str,
        spec: &FieldSpec,
        value: &str,
    ) -> Result<FieldStatus, Error> {
        match spec {
            FieldSpec::Text(f) => self.draw_text(surface, page, name, f, value),
            FieldSpec::Boxed(f) => self.draw_boxed(surface, page, f, value),
            FieldSpec::Date(f) => self.draw_date(surface, page, f, value),
            FieldSpec::Image(f) => self.draw_image(surface, page, f, value),
            FieldSpec::Checkbox(f) => self.draw_checkbox(surface, page, f, value),
        }
    }

    fn draw_text<S: Surface>(
        &self,
        surface: &mut S,
        page: PageRef,
        name: &str,
        field: &TextField,
        value: &str,
    ) -> Result<FieldStatus, Error> {
        let text = value.to_uppercase();
        if !text.chars().any(|ch| char_to_winansi(ch).is_some()) {
            return Ok(FieldStatus::Skipped(SkipReason::Empty));
        }
        let width = helvetica_text_width(&text, field.font_size);
        if width > field.max_width {
            log::debug!(
                "{name}: text is {width:.1}pt wide, calibrated width is {:.1}pt",
                field.max_width
            );
        }
        surface.draw_text(
            page,
            Point::new(field.x, field.y),
            &text,
            StandardFont::Helvetica,
            field.font_size,
            self.options.ink,
        )?;
        Ok(FieldStatus::Drawn { marks: 1 })
    }

    fn draw_boxed<S: Surface>(
        &self,
        surface: &mut S,
        page: PageRef,
        field: &BoxedField,
        value: &str,
    ) -> Result<FieldStatus, Error> {
        let text: String = value.to_uppercase().chars().take(field.max_chars).collect();
        if text.is_empty() {
            return Ok(FieldStatus::Skipped(SkipReason::Empty));
        }
        match self.draw_run(surface, page, &field.slot(), field.font_size, &text)? {
            0 => Ok(FieldStatus::Skipped(SkipReason::Empty)),
            marks => Ok(FieldStatus::Drawn { marks }),
        }
    }

    fn draw_date<S: Surface>(
        &self,
        surface: &mut S,
        page: PageRef,
        field: &DateField,
        value: &str,
    ) -> Result<FieldStatus, Error> {
        let Some(parts) = split_date(value) else {
            return Ok(FieldStatus::Skipped(SkipReason::InvalidDate {
                value: value.to_string(),
            }));
        };
        let mut marks = 0;
        for (slot, part) in [(&field.dd, &parts.dd), (&field.mm, &parts.mm), (&field.yyyy, &parts.yyyy)] {
            marks += self.draw_run(surface, page, slot, field.font_size, part)?;
        }
        Ok(FieldStatus::Drawn { marks })
    }

    /// One glyph per character, each at its own cell.
    fn draw_run<S: Surface>(
        &self,
        surface: &mut S,
        page: PageRef,
        slot: &DateSlot,
        font_size: f32,
        text: &str,
    ) -> Result<usize, Error> {
        let mut buf = [0u8; 4];
        let mut marks = 0;
        for (i, ch) in text.chars().enumerate() {
            if char_to_winansi(ch).is_none() {
                log::debug!("No WinAnsi code for {ch:?}; cell {i} left blank");
                continue;
            }
            surface.draw_text(
                page,
                Point::new(slot.cell_x(i), slot.y),
                ch.encode_utf8(&mut buf),
                StandardFont::Helvetica,
                font_size,
                self.options.ink,
            )?;
            marks += 1;
        }
        Ok(marks)
    }

    fn draw_image<S: Surface>(
        &self,
        surface: &mut S,
        page: PageRef,
        field: &ImageField,
        value: &str,
    ) -> Result<FieldStatus, Error> {
        let path = self.resolve_image(value);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FieldStatus::Skipped(SkipReason::ImageNotFound { path }));
            }
            Err(e) => {
                return Ok(FieldStatus::Failed {
                    reason: format!("failed to read {}: {e}", path.display()),
                });
            }
        };
        match surface.draw_image(page, field.rect(), &bytes) {
            Ok(()) => Ok(FieldStatus::Drawn { marks: 1 }),
            Err(Error::ImageDecode(reason)) => Ok(FieldStatus::Failed { reason }),
            Err(e) => Err(e),
        }
    }

    fn resolve_image(&self, value: &str) -> PathBuf {
        let path = Path::new(value.trim());
        match &self.options.image_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn draw_checkbox<S: Surface>(
        &self,
        surface: &mut S,
        page: PageRef,
        field: &CheckboxField,
        value: &str,
    ) -> Result<FieldStatus, Error> {
        let Some(option) = field.option(value) else {
            return Ok(FieldStatus::Skipped(SkipReason::UnknownOption {
                value: value.to_string(),
            }));
        };
        draw_check(surface, page, option.point(), self.options.check_size, self.options.ink)?;
        Ok(FieldStatus::Drawn { marks: 1 })
    }
}

/// Draw a check glyph centered on `center`.
pub(crate) fn draw_check<S: Surface>(
    surface: &mut S,
    page: PageRef,
    center: Point,
    size: f32,
    color: Color,
) -> Result<(), Error> {
    let (dx, dy) = check_origin_offset(size);
    surface.draw_text(
        page,
        Point::new(center.x + dx, center.y + dy),
        CHECK_GLYPH,
        StandardFont::ZapfDingbats,
        size,
        color,
    )
}

fn note(name: &str, status: &FieldStatus) {
    match status {
        FieldStatus::Drawn { marks } => log::debug!("{name}: drew {marks} marks"),
        FieldStatus::Skipped(reason) if reason.is_notable() => log::warn!("{name}: skipped, {reason}"),
        FieldStatus::Skipped(reason) => log::debug!("{name}: skipped, {reason}"),
        FieldStatus::Failed { reason } => log::warn!("{name}: failed, {reason}"),
    }
}
