use serde::{Deserialize, Serialize};

/// Page-space point, top-left origin, Y grows downward, in points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Top-left anchored rectangle in page space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const GREY: Color = Color::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32, // points
}

impl Stroke {
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Base-14 fonts the handle can reference without embedding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    ZapfDingbats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Boxed,
    Date,
    Image,
    Checkbox,
}

impl FieldKind {
    /// Order in which the renderer visits the sub-tables on each page.
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Text,
        FieldKind::Boxed,
        FieldKind::Date,
        FieldKind::Image,
        FieldKind::Checkbox,
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextField {
    pub page: usize,
    pub x: f32,
    pub y: f32, // baseline
    pub max_width: f32,
    #[serde(default = "default_text_font_size")]
    pub font_size: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxedField {
    pub page: usize,
    pub x_start: f32,
    pub y: f32,
    pub dx: f32,
    #[serde(default = "default_boxed_font_size")]
    pub font_size: f32,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl BoxedField {
    /// X of the i-th cell. Multiplied rather than accumulated so long rows don't drift.
    pub fn cell_x(&self, i: usize) -> f32 {
        self.x_start + i as f32 * self.dx
    }

    pub fn slot(&self) -> DateSlot {
        DateSlot {
            x_start: self.x_start,
            y: self.y,
            dx: self.dx,
        }
    }
}

/// One run of single-character boxes: a date component, or a boxed field's row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DateSlot {
    pub x_start: f32,
    pub y: f32,
    pub dx: f32,
}

impl DateSlot {
    pub fn cell_x(&self, i: usize) -> f32 {
        self.x_start + i as f32 * self.dx
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DateField {
    pub page: usize,
    #[serde(default = "default_text_font_size")]
    pub font_size: f32,
    pub dd: DateSlot,
    pub mm: DateSlot,
    pub yyyy: DateSlot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageField {
    pub page: usize,
    pub x: f32,
    pub y: f32, // top edge
    pub width: f32,
    pub height: f32,
}

impl ImageField {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckOption {
    pub label: String,
    pub x: f32,
    pub y: f32,
}

impl CheckOption {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckboxField {
    pub page: usize,
    pub options: Vec<CheckOption>,
}

impl CheckboxField {
    /// Exact, case-sensitive label lookup.
    pub fn option(&self, label: &str) -> Option<&CheckOption> {
        self.options.iter().find(|o| o.label == label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldSpec {
    Text(TextField),
    Boxed(BoxedField),
    Date(DateField),
    Image(ImageField),
    Checkbox(CheckboxField),
}

impl FieldSpec {
    pub fn page(&self) -> usize {
        match self {
            FieldSpec::Text(f) => f.page,
            FieldSpec::Boxed(f) => f.page,
            FieldSpec::Date(f) => f.page,
            FieldSpec::Image(f) => f.page,
            FieldSpec::Checkbox(f) => f.page,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSpec::Text(_) => FieldKind::Text,
            FieldSpec::Boxed(_) => FieldKind::Boxed,
            FieldSpec::Date(_) => FieldKind::Date,
            FieldSpec::Image(_) => FieldKind::Image,
            FieldSpec::Checkbox(_) => FieldKind::Checkbox,
        }
    }
}

fn default_text_font_size() -> f32 {
    9.0
}

fn default_boxed_font_size() -> f32 {
    10.0
}

fn default_max_chars() -> usize {
    10
}
