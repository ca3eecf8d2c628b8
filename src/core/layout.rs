use crate::domain::model::{MetricSeries, Palette, Rgb};

const HEADROOM: f64 = 1.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub index: usize,
    pub label: String,
    pub value: f64,
    pub color: Rgb,
}

/// Bars in series order plus the top of the y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub bars: Vec<Bar>,
    pub y_max: f64,
}

impl BarLayout {
    pub fn new(series: &MetricSeries, palette: &Palette) -> Self {
        let bars: Vec<Bar> = series
            .iter()
            .enumerate()
            .map(|(index, (label, value))| Bar {
                index,
                label: label.to_string(),
                value,
                color: palette.color_at(index),
            })
            .collect();

        let y_max = match series.max_value() {
            Some(max) if max > 0.0 => max * HEADROOM,
            _ => 1.0,
        };

        Self { bars, y_max }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.bars.get(index).map(|bar| bar.label.as_str())
    }
}
