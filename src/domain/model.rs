use crate::utils::error::{GraphError, Result};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = GraphError;

    /// Accepts `rgb(r, g, b)` or `#rrggbb`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| GraphError::InvalidConfigValueError {
            field: "palette.colors".to_string(),
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(invalid("Hex colors must look like #rrggbb"));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid("Invalid hex digit"))
            };
            return Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let inner = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| invalid("Expected rgb(r, g, b) or #rrggbb"))?;

        let channels = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(|_| invalid("Channels must be integers between 0 and 255"))?;

        match channels.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(invalid("Expected exactly three channels")),
        }
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

pub const DEFAULT_PALETTE: [Rgb; 5] = [
    Rgb::new(49, 171, 95),
    Rgb::new(49, 110, 171),
    Rgb::new(212, 109, 57),
    Rgb::new(148, 62, 154),
    Rgb::new(54, 176, 165),
];

/// Ordered bar colors. Bar `i` takes `colors[i % len]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self> {
        if colors.is_empty() {
            return Err(GraphError::InvalidConfigValueError {
                field: "palette.colors".to_string(),
                value: "[]".to_string(),
                reason: "Palette needs at least one color".to_string(),
            });
        }
        Ok(Self { colors })
    }

    pub fn color_at(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.to_vec(),
        }
    }
}

/// Library name to measurement, in bar order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSeries {
    entries: Vec<(String, f64)>,
}

impl MetricSeries {
    pub fn new<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut series = Self::default();
        for (label, value) in entries {
            series.push(label.into(), value)?;
        }
        Ok(series)
    }

    pub(crate) fn push(&mut self, label: String, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(GraphError::DataError {
                message: format!("Value for '{}' must be a non-negative number, got {}", label, value),
            });
        }
        if self.entries.iter().any(|(existing, _)| *existing == label) {
            return Err(GraphError::DataError {
                message: format!("Duplicate library '{}' in series", label),
            });
        }
        self.entries.push((label, value));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(label, value)| (label.as_str(), *value))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, value)| *value)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.entries.iter().map(|(_, value)| *value).reduce(f64::max)
    }
}

impl Serialize for MetricSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            // integral measurements stay integers in exported JSON
            if value.fract() == 0.0 && *value < u64::MAX as f64 {
                map.serialize_entry(label, &(*value as u64))?;
            } else {
                map.serialize_entry(label, value)?;
            }
        }
        map.end()
    }
}

struct MetricSeriesVisitor;

impl<'de> Visitor<'de> for MetricSeriesVisitor {
    type Value = MetricSeries;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of library name to non-negative number")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<MetricSeries, A::Error> {
        let mut series = MetricSeries::default();
        while let Some((label, value)) = access.next_entry::<String, f64>()? {
            series.push(label, value).map_err(de::Error::custom)?;
        }
        Ok(series)
    }
}

impl<'de> Deserialize<'de> for MetricSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(MetricSeriesVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "select_all")]
    SelectAll,
    #[serde(rename = "select_subset")]
    SelectSubset,
    #[serde(rename = "select_complex")]
    SelectComplex,
    #[serde(rename = "insert")]
    Insert,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "delete")]
    Delete,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::SelectAll,
        OperationKind::SelectSubset,
        OperationKind::SelectComplex,
        OperationKind::Insert,
        OperationKind::Update,
        OperationKind::Delete,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            OperationKind::SelectAll => "SelectAll",
            OperationKind::SelectSubset => "SelectSubset",
            OperationKind::SelectComplex => "SelectComplex",
            OperationKind::Insert => "Insert",
            OperationKind::Update => "Update",
            OperationKind::Delete => "Delete",
        }
    }

    pub fn file_key(&self) -> &'static str {
        match self {
            OperationKind::SelectAll => "select_all",
            OperationKind::SelectSubset => "select_subset",
            OperationKind::SelectComplex => "select_complex",
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }

    /// Matches the suffix of a Go benchmark name, e.g. `SelectAll`.
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.display_name() == name)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "nsop")]
    NsPerOp,
    #[serde(rename = "bop")]
    BytesPerOp,
    #[serde(rename = "aop")]
    AllocsPerOp,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::NsPerOp, Metric::BytesPerOp, Metric::AllocsPerOp];

    pub fn file_key(&self) -> &'static str {
        match self {
            Metric::NsPerOp => "nsop",
            Metric::BytesPerOp => "bop",
            Metric::AllocsPerOp => "aop",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::NsPerOp => "Speed",
            Metric::BytesPerOp => "Memory",
            Metric::AllocsPerOp => "Allocations",
        }
    }

    /// Unit as printed by `go test -benchmem`, also used as the y axis label.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::NsPerOp => "ns/op",
            Metric::BytesPerOp => "B/op",
            Metric::AllocsPerOp => "allocs/op",
        }
    }

    pub fn from_unit(unit: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|metric| metric.unit() == unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageFormat::Png),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            other => Err(GraphError::InvalidConfigValueError {
                field: "chart.format".to_string(),
                value: other.to_string(),
                reason: "Supported formats: png, svg".to_string(),
            }),
        }
    }
}

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 400;
pub const DEFAULT_X_AXIS_LABEL: &str = "ORM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLayout {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_axis_label: String,
    pub y_axis_label: String,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            x_axis_label: DEFAULT_X_AXIS_LABEL.to_string(),
            y_axis_label: String::new(),
        }
    }
}

/// One render request.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub output_path: PathBuf,
    pub layout: ChartLayout,
    pub series: MetricSeries,
}

impl ChartSpec {
    pub fn new(
        output_path: impl Into<PathBuf>,
        title: impl Into<String>,
        y_axis_label: impl Into<String>,
        series: MetricSeries,
    ) -> Self {
        Self {
            output_path: output_path.into(),
            layout: ChartLayout {
                title: title.into(),
                y_axis_label: y_axis_label.into(),
                ..ChartLayout::default()
            },
            series,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.layout.width = width;
        self.layout.height = height;
        self
    }

    pub fn with_x_axis_label(mut self, label: impl Into<String>) -> Self {
        self.layout.x_axis_label = label.into();
        self
    }
}
