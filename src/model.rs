use eframe::egui;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ColorParseError;

// ── Geometry ────────────────────────────────────────────────────────────────

/// A position in surface-local pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box with a top-left origin. Stored boxes always have
/// non-negative width and height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    /// Builds the normalized box spanned by an anchor and a signed extent.
    pub fn from_signed(anchor: Point, width: f32, height: f32) -> Self {
        Self {
            x: anchor.x.min(anchor.x + width),
            y: anchor.y.min(anchor.y + height),
            width: width.abs(),
            height: height.abs(),
        }
    }

    pub fn to_egui(self, origin: egui::Pos2) -> egui::Rect {
        egui::Rect::from_min_size(
            origin + egui::vec2(self.x, self.y),
            egui::vec2(self.width, self.height),
        )
    }
}

// ── Colors ──────────────────────────────────────────────────────────────────

/// An opaque RGB color that reads and writes as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const WHITE: HexColor = HexColor::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_egui(self) -> egui::Color32 {
        egui::Color32::from_rgb(self.r, self.g, self.b)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError(s.to_string()))?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Vocabularies ────────────────────────────────────────────────────────────

/// Object classes a region can be tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectLabel {
    Person,
    Car,
    Cat,
    Dog,
    Bird,
    Bicycle,
    Motorcycle,
    Bus,
    Truck,
    Boat,
    Airplane,
    Chair,
    Table,
    Book,
    Phone,
    Laptop,
    Tv,
    Bottle,
    Cup,
}

impl ObjectLabel {
    pub const ALL: [ObjectLabel; 19] = [
        ObjectLabel::Person,
        ObjectLabel::Car,
        ObjectLabel::Cat,
        ObjectLabel::Dog,
        ObjectLabel::Bird,
        ObjectLabel::Bicycle,
        ObjectLabel::Motorcycle,
        ObjectLabel::Bus,
        ObjectLabel::Truck,
        ObjectLabel::Boat,
        ObjectLabel::Airplane,
        ObjectLabel::Chair,
        ObjectLabel::Table,
        ObjectLabel::Book,
        ObjectLabel::Phone,
        ObjectLabel::Laptop,
        ObjectLabel::Tv,
        ObjectLabel::Bottle,
        ObjectLabel::Cup,
    ];

    /// The tag drawn on the canvas and sent with queries.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectLabel::Person => "person",
            ObjectLabel::Car => "car",
            ObjectLabel::Cat => "cat",
            ObjectLabel::Dog => "dog",
            ObjectLabel::Bird => "bird",
            ObjectLabel::Bicycle => "bicycle",
            ObjectLabel::Motorcycle => "motorcycle",
            ObjectLabel::Bus => "bus",
            ObjectLabel::Truck => "truck",
            ObjectLabel::Boat => "boat",
            ObjectLabel::Airplane => "airplane",
            ObjectLabel::Chair => "chair",
            ObjectLabel::Table => "table",
            ObjectLabel::Book => "book",
            ObjectLabel::Phone => "phone",
            ObjectLabel::Laptop => "laptop",
            ObjectLabel::Tv => "tv",
            ObjectLabel::Bottle => "bottle",
            ObjectLabel::Cup => "cup",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ObjectLabel::Person => "Person",
            ObjectLabel::Car => "Car",
            ObjectLabel::Cat => "Cat",
            ObjectLabel::Dog => "Dog",
            ObjectLabel::Bird => "Bird",
            ObjectLabel::Bicycle => "Bicycle",
            ObjectLabel::Motorcycle => "Motorcycle",
            ObjectLabel::Bus => "Bus",
            ObjectLabel::Truck => "Truck",
            ObjectLabel::Boat => "Boat",
            ObjectLabel::Airplane => "Airplane",
            ObjectLabel::Chair => "Chair",
            ObjectLabel::Table => "Table",
            ObjectLabel::Book => "Book",
            ObjectLabel::Phone => "Phone",
            ObjectLabel::Laptop => "Laptop",
            ObjectLabel::Tv => "Television",
            ObjectLabel::Bottle => "Bottle",
            ObjectLabel::Cup => "Cup",
        }
    }
}

impl fmt::Display for ObjectLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Image, MediaType::Video, MediaType::Audio];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MediaType::Image => "Image",
            MediaType::Video => "Video",
            MediaType::Audio => "Audio",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            MediaType::Image => "🖼",
            MediaType::Video => "🎥",
            MediaType::Audio => "🔊",
        }
    }

    /// Whether results of this type carry a playback duration.
    pub fn is_timed(self) -> bool {
        matches!(self, MediaType::Video | MediaType::Audio)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataset {
    #[default]
    #[serde(rename = "v3c1")]
    V3c1,
    #[serde(rename = "lsc20")]
    Lsc20,
    #[serde(rename = "mvk21")]
    Mvk21,
    #[serde(rename = "msr-vtt")]
    MsrVtt,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [Dataset::V3c1, Dataset::Lsc20, Dataset::Mvk21, Dataset::MsrVtt];

    pub fn id(self) -> &'static str {
        match self {
            Dataset::V3c1 => "v3c1",
            Dataset::Lsc20 => "lsc20",
            Dataset::Mvk21 => "mvk21",
            Dataset::MsrVtt => "msr-vtt",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Dataset::V3c1 => "V3C1 Dataset",
            Dataset::Lsc20 => "LSC20 Dataset",
            Dataset::Mvk21 => "MVK21 Dataset",
            Dataset::MsrVtt => "MSR-VTT Dataset",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ── Query / Result ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRegion {
    #[serde(flatten)]
    pub rect: Rectangle,
    pub object: ObjectLabel,
}

/// Which retrieval channels the query should use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchToggles {
    pub text: bool,
    pub ocr: bool,
    pub asr: bool,
    pub object: bool,
}

impl Default for SearchToggles {
    fn default() -> Self {
        Self {
            text: true,
            ocr: false,
            asr: false,
            object: false,
        }
    }
}

pub const TOP_K_MIN: u32 = 10;
pub const TOP_K_MAX: u32 = 100;
pub const TOP_K_STEP: u32 = 10;
pub const TOP_K_DEFAULT: u32 = 80;

/// Snaps a requested result count onto the slider's range and step.
pub fn snap_top_k(value: u32) -> u32 {
    let clamped = value.clamp(TOP_K_MIN, TOP_K_MAX);
    let steps = (clamped - TOP_K_MIN + TOP_K_STEP / 2) / TOP_K_STEP;
    (TOP_K_MIN + steps * TOP_K_STEP).min(TOP_K_MAX)
}

/// Snapshot of the form taken at submit time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub media_type: MediaType,
    pub dataset: Dataset,
    pub regions: Vec<AnnotatedRegion>,
    pub colors: Vec<HexColor>,
    pub toggles: SearchToggles,
    pub top_k: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub thumbnail: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub score: f32,
}
