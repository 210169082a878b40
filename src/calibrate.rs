//! Calibration renders: coordinate grids and field markers.
//!
//! These draw through the same [`Surface`] as the renderer, so a marker render shows
//! exactly where a fill would land.

use crate::catalog::Catalog;
use crate::error::Error;
use crate::fonts::char_to_winansi;
use crate::model::{Color, DateSlot, FieldSpec, Point, Rect, StandardFont, Stroke};
use crate::pdf::{PageRef, Surface};
use crate::render::{FieldStatus, SkipReason, draw_check, split_date};

pub const DEFAULT_GRID_STEP: f32 = 20.0;

const MAJOR_EVERY: usize = 5;
const LABEL_SIZE: f32 = 6.0;

const MINOR_LINE: Stroke = Stroke::new(Color::rgb(0.85, 0.85, 0.85), 0.15);
const MAJOR_LINE: Stroke = Stroke::new(Color::rgb(0.7, 0.7, 0.7), 0.3);
const X_LABEL: Color = Color::rgb(0.5, 0.0, 0.0);
const Y_LABEL: Color = Color::rgb(0.0, 0.0, 0.5);

const MARKER_INK: Color = Color::RED;
const OPTION_MARK: Color = Color::GREY;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSummary {
    pub index: usize,
    pub width: f32,
    pub height: f32,
}

pub fn inspect<S: Surface>(doc: &S) -> Result<Vec<PageSummary>, Error> {
    (0..doc.page_count())
        .map(|index| {
            let page = doc.page(index)?;
            Ok(PageSummary {
                index,
                width: page.width(),
                height: page.height(),
            })
        })
        .collect()
}

/// Overlay a labelled coordinate grid on every page.
///
/// Lines every `step` points, heavier every fifth with its coordinate printed
/// along the top (X) and left (Y) edges. Corner circles mark page orientation.
pub fn draw_grid<S: Surface>(doc: &mut S, step: f32) -> Result<(), Error> {
    let step = if step.is_finite() && step > 0.0 {
        step
    } else {
        log::warn!("Grid step {step} is not positive, using {DEFAULT_GRID_STEP}");
        DEFAULT_GRID_STEP
    };
    for index in 0..doc.page_count() {
        let page = doc.page(index)?;
        let (width, height) = (page.width(), page.height());

        let mut i = 0;
        loop {
            let x = i as f32 * step;
            if x > width {
                break;
            }
            let major = i % MAJOR_EVERY == 0;
            let stroke = if major { MAJOR_LINE } else { MINOR_LINE };
            doc.draw_line(page, Point::new(x, 0.0), Point::new(x, height), stroke)?;
            if major {
                label(doc, page, Point::new(x + 2.0, 10.0), &format!("{}", x as i64), X_LABEL)?;
            }
            i += 1;
        }

        let mut i = 0;
        loop {
            let y = i as f32 * step;
            if y > height {
                break;
            }
            let major = i % MAJOR_EVERY == 0;
            let stroke = if major { MAJOR_LINE } else { MINOR_LINE };
            doc.draw_line(page, Point::new(0.0, y), Point::new(width, y), stroke)?;
            if major {
                label(doc, page, Point::new(2.0, y + 7.0), &format!("{}", y as i64), Y_LABEL)?;
            }
            i += 1;
        }

        let corners = [
            (Point::new(0.0, 0.0), Color::RED),
            (Point::new(width, 0.0), Color::rgb(0.0, 1.0, 0.0)),
            (Point::new(0.0, height), Color::BLUE),
            (Point::new(width, height), Color::rgb(1.0, 1.0, 0.0)),
        ];
        for (center, color) in corners {
            doc.draw_circle(page, center, 10.0, Some(Stroke::new(color, 2.0)), None)?;
        }
        log::debug!("Page {index}: grid {width}x{height} at {step}pt");
    }
    Ok(())
}

/// Draw `value` in red at `field`'s calibrated position with crosshair markers.
///
/// The returned status mirrors a fill: `Drawn` with the glyph count, or
/// `Skipped` for a malformed date or a label that isn't one of the options.
pub fn probe_field<S: Surface>(
    doc: &mut S,
    catalog: &Catalog,
    field: &str,
    value: &str,
) -> Result<FieldStatus, Error> {
    let spec = catalog
        .get(field)
        .ok_or_else(|| Error::UnknownField(field.to_string()))?;
    let page = doc.page(spec.page())?;

    let status = match spec {
        FieldSpec::Text(f) => {
            let at = Point::new(f.x, f.y);
            doc.draw_text(page, at, &value.to_uppercase(), StandardFont::Helvetica, f.font_size, MARKER_INK)?;
            crosshair(doc, page, at, Color::BLUE, 10.0)?;
            label(doc, page, Point::new(f.x, f.y - 15.0), &format!("({}, {})", f.x, f.y), Color::BLUE)?;
            FieldStatus::Drawn { marks: 1 }
        }
        FieldSpec::Boxed(f) => {
            let marks = mark_run(doc, page, &f.slot(), f.font_size, &value.to_uppercase())?;
            FieldStatus::Drawn { marks }
        }
        FieldSpec::Date(f) => match split_date(value) {
            Some(parts) => {
                let mut marks = 0;
                for (slot, part) in [(&f.dd, &parts.dd), (&f.mm, &parts.mm), (&f.yyyy, &parts.yyyy)] {
                    marks += mark_run(doc, page, slot, f.font_size, part)?;
                }
                FieldStatus::Drawn { marks }
            }
            None => FieldStatus::Skipped(SkipReason::InvalidDate {
                value: value.to_string(),
            }),
        },
        FieldSpec::Image(f) => {
            let rect = f.rect();
            doc.draw_rect(page, rect, Some(Stroke::new(MARKER_INK, 0.5)), None)?;
            crosshair(doc, page, Point::new(rect.x, rect.y), Color::BLUE, 10.0)?;
            label(doc, page, Point::new(rect.x, rect.y - 15.0), &rect_label(&rect), Color::BLUE)?;
            FieldStatus::Drawn { marks: 1 }
        }
        FieldSpec::Checkbox(f) => match f.option(value) {
            Some(selected) => {
                for option in &f.options {
                    crosshair(doc, page, option.point(), OPTION_MARK, 8.0)?;
                    let text = format!("{}({},{})", option.label, option.x, option.y);
                    doc.draw_text(
                        page,
                        Point::new(option.x, option.y - 12.0),
                        &text,
                        StandardFont::Helvetica,
                        5.0,
                        Color::BLUE,
                    )?;
                }
                draw_check(doc, page, selected.point(), 10.0, MARKER_INK)?;
                FieldStatus::Drawn { marks: 1 }
            }
            None => FieldStatus::Skipped(SkipReason::UnknownOption {
                value: value.to_string(),
            }),
        },
    };
    log::info!("Marked {field} on page {}: {status:?}", spec.page());
    Ok(status)
}

fn rect_label(r: &Rect) -> String {
    format!("({}, {}) {}x{}", r.x, r.y, r.width, r.height)
}

/// Mark a boxed run without truncation, so overflow past the printed boxes shows.
fn mark_run<S: Surface>(
    doc: &mut S,
    page: PageRef,
    slot: &DateSlot,
    font_size: f32,
    text: &str,
) -> Result<usize, Error> {
    let mut buf = [0u8; 4];
    let mut marks = 0;
    for (i, ch) in text.chars().enumerate() {
        let at = Point::new(slot.cell_x(i), slot.y);
        if char_to_winansi(ch).is_some() {
            doc.draw_text(page, at, ch.encode_utf8(&mut buf), StandardFont::Helvetica, font_size, MARKER_INK)?;
            marks += 1;
        }
        crosshair(doc, page, at, Color::BLUE, 5.0)?;
    }
    let text = format!("start({}, {}) dx={}", slot.x_start, slot.y, slot.dx);
    label(doc, page, Point::new(slot.x_start, slot.y - 15.0), &text, Color::BLUE)?;
    Ok(marks)
}

fn crosshair<S: Surface>(doc: &mut S, page: PageRef, at: Point, color: Color, size: f32) -> Result<(), Error> {
    let stroke = Stroke::new(color, 0.5);
    doc.draw_line(page, Point::new(at.x - size, at.y), Point::new(at.x + size, at.y), stroke)?;
    doc.draw_line(page, Point::new(at.x, at.y - size), Point::new(at.x, at.y + size), stroke)?;
    doc.draw_circle(page, at, 1.0, None, Some(color))
}

fn label<S: Surface>(doc: &mut S, page: PageRef, at: Point, text: &str, color: Color) -> Result<(), Error> {
    doc.draw_text(page, at, text, StandardFont::Helvetica, LABEL_SIZE, color)
}
