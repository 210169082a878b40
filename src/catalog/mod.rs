mod builtin;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{
    BoxedField, CheckOption, CheckboxField, DateField, DateSlot, FieldKind, FieldSpec, ImageField,
    TextField,
};

pub use builtin::{PAGE_HEIGHT, PAGE_WIDTH, builtin};

/// A named field declaration, as stored in catalog files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    #[serde(flatten)]
    pub spec: FieldSpec,
}

#[derive(Serialize, Deserialize)]
struct CatalogFile {
    fields: Vec<FieldEntry>,
}

/// Immutable field layout for one template.
///
/// Names are unique across all shapes. Within a shape, entries keep their
/// insertion order, which is also the order they are drawn in.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    entries: Vec<FieldEntry>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    fn from_entries(entries: Vec<FieldEntry>) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.name.is_empty() {
                return Err(Error::InvalidCatalog("field with an empty name".into()));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate field name '{}'",
                    entry.name
                )));
            }
            if let FieldSpec::Checkbox(cb) = &entry.spec {
                validate_checkbox(&entry.name, cb)?;
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| Error::InvalidCatalog(e.to_string()))?;
        Self::from_entries(file.fields)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path).map_err(Error::Io)?;
        let catalog = Self::from_json_str(&json)?;
        log::debug!("Loaded {} fields from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        let file = CatalogFile {
            fields: self.entries.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| Error::InvalidCatalog(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.spec)
    }

    /// One shape's sub-table, in insertion order.
    pub fn fields(&self, kind: FieldKind) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.entries
            .iter()
            .filter(move |e| e.spec.kind() == kind)
            .map(|e| (e.name.as_str(), &e.spec))
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_checkbox(name: &str, cb: &CheckboxField) -> Result<(), Error> {
    if cb.options.is_empty() {
        return Err(Error::InvalidCatalog(format!("checkbox '{name}' has no options")));
    }
    let mut labels = HashSet::new();
    for option in &cb.options {
        if !labels.insert(option.label.as_str()) {
            return Err(Error::InvalidCatalog(format!(
                "checkbox '{name}' repeats option '{}'",
                option.label
            )));
        }
    }
    Ok(())
}

#[derive(Default)]
pub struct CatalogBuilder {
    entries: Vec<FieldEntry>,
}

impl CatalogBuilder {
    pub fn field(mut self, name: &str, spec: FieldSpec) -> Self {
        self.entries.push(FieldEntry {
            name: name.to_string(),
            spec,
        });
        self
    }

    pub fn text(self, name: &str, page: usize, x: f32, y: f32, max_width: f32, font_size: f32) -> Self {
        self.field(
            name,
            FieldSpec::Text(TextField {
                page,
                x,
                y,
                max_width,
                font_size,
            }),
        )
    }

    pub fn boxed(
        self,
        name: &str,
        page: usize,
        x_start: f32,
        y: f32,
        dx: f32,
        font_size: f32,
        max_chars: usize,
    ) -> Self {
        self.field(
            name,
            FieldSpec::Boxed(BoxedField {
                page,
                x_start,
                y,
                dx,
                font_size,
                max_chars,
            }),
        )
    }

    pub fn date(self, name: &str, page: usize, font_size: f32, dd: DateSlot, mm: DateSlot, yyyy: DateSlot) -> Self {
        self.field(
            name,
            FieldSpec::Date(DateField {
                page,
                font_size,
                dd,
                mm,
                yyyy,
            }),
        )
    }

    pub fn image(self, name: &str, page: usize, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.field(
            name,
            FieldSpec::Image(ImageField {
                page,
                x,
                y,
                width,
                height,
            }),
        )
    }

    pub fn checkbox(self, name: &str, page: usize, options: &[(&str, f32, f32)]) -> Self {
        let options = options
            .iter()
            .map(|&(label, x, y)| CheckOption {
                label: label.to_string(),
                x,
                y,
            })
            .collect();
        self.field(name, FieldSpec::Checkbox(CheckboxField { page, options }))
    }

    pub fn build(self) -> Result<Catalog, Error> {
        Catalog::from_entries(self.entries)
    }

    /// Skip validation; only for tables whose names are fixed in source.
    pub(crate) fn assemble(self) -> Catalog {
        Catalog {
            entries: self.entries,
        }
    }
}
