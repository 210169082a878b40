use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::model::FieldKind;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// No value, or an empty one.
    Absent,
    /// Nothing left to draw once truncated to the field's box count.
    Empty,
    InvalidDate { value: String },
    UnknownOption { value: String },
    ImageNotFound { path: PathBuf },
    PageOutOfRange { page: usize, page_count: usize },
}

impl SkipReason {
    /// Absent values are routine; everything else deserves a look.
    pub fn is_notable(&self) -> bool {
        !matches!(self, SkipReason::Absent)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Absent => write!(f, "no value"),
            SkipReason::Empty => write!(f, "nothing to draw"),
            SkipReason::InvalidDate { value } => {
                write!(f, "invalid date {value:?} (expected DD/MM/YYYY)")
            }
            SkipReason::UnknownOption { value } => write!(f, "{value:?} is not an option"),
            SkipReason::ImageNotFound { path } => write!(f, "image not found at {}", path.display()),
            SkipReason::PageOutOfRange { page, page_count } => {
                write!(f, "page {page} is beyond the template's {page_count} pages")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldStatus {
    /// `marks` counts individual draw calls (glyph runs, images).
    Drawn { marks: usize },
    Skipped(SkipReason),
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldOutcome {
    pub field: String,
    pub kind: FieldKind,
    pub page: usize,
    #[serde(flatten)]
    pub status: FieldStatus,
}

/// What happened to every catalog field during one render, in visit order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RenderReport {
    outcomes: Vec<FieldOutcome>,
}

impl RenderReport {
    pub(crate) fn push(&mut self, field: &str, kind: FieldKind, page: usize, status: FieldStatus) {
        self.outcomes.push(FieldOutcome {
            field: field.to_string(),
            kind,
            page,
            status,
        });
    }

    pub fn outcomes(&self) -> &[FieldOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, field: &str) -> Option<&FieldOutcome> {
        self.outcomes.iter().find(|o| o.field == field)
    }

    pub fn drawn(&self) -> impl Iterator<Item = &FieldOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FieldStatus::Drawn { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&FieldOutcome, &SkipReason)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            FieldStatus::Skipped(reason) => Some((o, reason)),
            _ => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&FieldOutcome, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            FieldStatus::Failed { reason } => Some((o, reason.as_str())),
            _ => None,
        })
    }

    pub fn marks_drawn(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                FieldStatus::Drawn { marks } => marks,
                _ => 0,
            })
            .sum()
    }

    /// True when no field failed and none was skipped for anything but a missing value.
    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none() && self.skipped().all(|(_, r)| !r.is_notable())
    }
}
