use crate::core::layout::BarLayout;
use crate::domain::model::{ChartLayout, ChartSpec, ImageFormat, Palette};
use crate::domain::ports::ChartRenderer;
use crate::utils::error::{GraphError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};

const BAR_GAP: u32 = 6;

/// Bar chart renderer backed by plotters. PNG goes through the bitmap
/// backend, SVG through the SVG backend; the output extension decides.
#[derive(Debug, Clone, Default)]
pub struct PlottersRenderer {
    palette: Palette,
}

impl PlottersRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<()> {
        let path = &spec.output_path;

        if spec.series.is_empty() {
            return Err(GraphError::DataError {
                message: format!("Cannot render {} from an empty series", path.display()),
            });
        }

        let format = ImageFormat::from_path(path).ok_or_else(|| GraphError::RenderError {
            path: path.clone(),
            message: "Unsupported image extension, expected .png or .svg".to_string(),
        })?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(GraphError::OutputDirMissing {
                path: parent.to_path_buf(),
            });
        }

        let bars = BarLayout::new(&spec.series, &self.palette);
        let size = (spec.layout.width, spec.layout.height);

        // draw next to the target and move into place only once complete
        let suffix = format!(".{}", format.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix(".bench-graph-").suffix(&suffix);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o644));
        }
        let staging = builder.tempfile_in(parent).map_err(|e| render_error(path, e))?;

        match format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(staging.path(), size).into_drawing_area();
                draw_bar_chart(root, &spec.layout, &bars).map_err(|e| render_error(path, e))?;
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(staging.path(), size).into_drawing_area();
                draw_bar_chart(root, &spec.layout, &bars).map_err(|e| render_error(path, e))?;
            }
        }

        staging.persist(path).map_err(|e| render_error(path, e.error))?;

        tracing::debug!(
            "Rendered {} bars to {} ({}x{})",
            bars.len(),
            path.display(),
            spec.layout.width,
            spec.layout.height
        );
        Ok(())
    }
}

fn render_error(path: &Path, error: impl Display) -> GraphError {
    GraphError::RenderError {
        path: PathBuf::from(path),
        message: error.to_string(),
    }
}

fn draw_bar_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    layout: &ChartLayout,
    bars: &BarLayout,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let bar_count = bars.len() as u32;
    let mut chart = ChartBuilder::on(&root)
        .caption(layout.title.as_str(), ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..bar_count).into_segmented(), 0f64..bars.y_max)?;

    let x_label = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(index) => bars.label_at(*index as usize).unwrap_or_default().to_string(),
        _ => String::new(),
    };
    let y_label = |value: &f64| axis_value(*value);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(layout.x_axis_label.as_str())
        .y_desc(layout.y_axis_label.as_str())
        .x_labels(bars.len())
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .draw()?;

    chart.draw_series(bars.bars.iter().map(|bar| {
        let x = bar.index as u32;
        let color = RGBColor(bar.color.r, bar.color.g, bar.color.b);
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(x), 0.0), (SegmentValue::Exact(x + 1), bar.value)],
            color.filled(),
        );
        rect.set_margin(0, 0, BAR_GAP, BAR_GAP);
        rect
    }))?;

    root.present()?;
    Ok(())
}

fn axis_value(value: f64) -> String {
    if value.abs() >= 10.0 || value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MetricSeries;
    use tempfile::TempDir;

    fn series() -> MetricSeries {
        MetricSeries::new([("Makroud", 3698.0), ("SQLX", 12555.0), ("GORM", 11101.0)]).unwrap()
    }

    #[test]
    fn test_missing_directory_is_a_filesystem_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("delete_nsop.png");
        let spec = ChartSpec::new(&path, "Delete Speed", "ns/op", series());

        let err = PlottersRenderer::default().render(&spec).unwrap_err();
        assert!(matches!(err, GraphError::OutputDirMissing { .. }));
        assert!(!path.exists());
        assert!(!temp_dir.path().join("missing").exists());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("delete_nsop.gif");
        let spec = ChartSpec::new(&path, "Delete Speed", "ns/op", series());

        let err = PlottersRenderer::default().render(&spec).unwrap_err();
        assert!(matches!(err, GraphError::RenderError { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_series_is_rejected_before_drawing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("delete_nsop.png");
        let spec = ChartSpec::new(&path, "Delete Speed", "ns/op", MetricSeries::default());

        let err = PlottersRenderer::default().render(&spec).unwrap_err();
        assert!(matches!(err, GraphError::DataError { .. }));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unwritable_target_names_the_chart() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("delete_nsop.png");
        std::fs::create_dir(&path).unwrap();
        let spec = ChartSpec::new(&path, "Delete Speed", "ns/op", series());

        let err = PlottersRenderer::default().render(&spec).unwrap_err();
        match &err {
            GraphError::RenderError { path: failed, .. } => assert_eq!(failed, &path),
            other => panic!("expected a render error, got {:?}", other),
        }
        assert!(err.user_friendly_message().contains("delete_nsop.png"));
        assert!(std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .all(|entry| !entry.file_name().to_string_lossy().starts_with(".bench-graph-")));
    }

    #[test]
    fn test_axis_value_formatting() {
        assert_eq!(axis_value(150000.0), "150000");
        assert_eq!(axis_value(2.0), "2");
        assert_eq!(axis_value(0.5), "0.5");
    }
}
