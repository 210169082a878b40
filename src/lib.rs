pub mod calibrate;
pub mod catalog;
mod error;
mod fonts;
pub mod model;
mod pdf;
mod record;
pub mod render;

pub use catalog::{Catalog, CatalogBuilder, FieldEntry};
pub use error::Error;
pub use model::{
    BoxedField, CheckOption, CheckboxField, Color, DateField, DateSlot, FieldKind, FieldSpec,
    ImageField, Point, Rect, StandardFont, Stroke, TextField,
};
pub use pdf::{PageRef, Surface, TemplateDocument};
pub use record::Record;
pub use render::{
    FieldOutcome, FieldRenderer, FieldStatus, RenderOptions, RenderReport, SkipReason, render,
};

use std::path::Path;
use std::time::Instant;

/// Open `template`, draw `record` per `catalog`, and write the result to `output`.
pub fn fill_template(
    template: &Path,
    record: &Record,
    catalog: &Catalog,
    output: &Path,
) -> Result<RenderReport, Error> {
    fill_template_with(template, record, FieldRenderer::new(catalog), output)
}

pub fn fill_template_with(
    template: &Path,
    record: &Record,
    renderer: FieldRenderer<'_>,
    output: &Path,
) -> Result<RenderReport, Error> {
    let t0 = Instant::now();

    let mut doc = TemplateDocument::open(template)?;
    let t_open = t0.elapsed();

    let report = renderer.render(&mut doc, record)?;
    let t_render = t0.elapsed();

    let size = doc.save(output)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: open={:.1}ms, render={:.1}ms, save={:.1}ms, total={:.1}ms (output {} bytes)",
        t_open.as_secs_f64() * 1000.0,
        (t_render - t_open).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        size,
    );
    log::info!(
        "Filled {}: {} drawn, {} skipped, {} failed",
        output.display(),
        report.drawn().count(),
        report.skipped().count(),
        report.failed().count(),
    );

    Ok(report)
}
