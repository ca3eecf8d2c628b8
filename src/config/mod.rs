pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::engine::FailurePolicy;
use crate::core::engine::RenderOptions;
use crate::core::source::DataSource;
#[cfg(feature = "cli")]
use crate::domain::model::ImageFormat;
use crate::domain::model::Palette;
use crate::utils::error::{GraphError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

pub use toml_config::GraphConfig;

const MIN_CANVAS: u32 = 64;
const MAX_CANVAS: u32 = 8192;

/// Everything a run needs once file and flags are merged.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub options: RenderOptions,
    pub palette: Palette,
    pub source: DataSource,
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        let options = &self.options;

        let output_dir = options.output_dir.to_str().ok_or_else(|| GraphError::InvalidConfigValueError {
            field: "output.directory".to_string(),
            value: options.output_dir.display().to_string(),
            reason: "Path is not valid UTF-8".to_string(),
        })?;
        validate_path("output.directory", output_dir)?;
        validate_positive_number("output.jobs", options.jobs, 1)?;
        validate_range("chart.width", options.width, MIN_CANVAS, MAX_CANVAS)?;
        validate_range("chart.height", options.height, MIN_CANVAS, MAX_CANVAS)?;
        validate_non_empty_string("chart.x_axis_label", &options.x_axis_label)?;

        if let DataSource::Json(path) = &self.source {
            validate_file_extension("source.data_file", &path.to_string_lossy(), &["json"])?;
        }

        if self.palette.is_empty() {
            return Err(GraphError::MissingConfigError {
                field: "palette.colors".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "bench-graph")]
#[command(about = "Render ORM benchmark results as per-metric bar charts")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// JSON file with benchmark results (defaults to the builtin table)
    #[arg(long, conflicts_with = "bench_output")]
    pub data: Option<String>,

    /// Raw `go test -bench . -benchmem` output to chart
    #[arg(long)]
    pub bench_output: Option<String>,

    /// Directory the charts are written to
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Image format: png or svg
    #[arg(long)]
    pub format: Option<ImageFormat>,

    /// Number of charts rendered in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Keep going when a chart fails to render
    #[arg(long)]
    pub skip_failures: bool,

    /// Write the loaded benchmark table as JSON to this file
    #[arg(long)]
    pub export_data: Option<String>,

    /// Show what would be rendered without writing any chart
    #[arg(long)]
    pub dry_run: bool,

    /// Log process memory while rendering
    #[arg(long)]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Config file (if any) first, then command line overrides.
    pub fn resolve(&self) -> Result<Settings> {
        let base = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                GraphConfig::from_file(path)?
            }
            None => GraphConfig::default(),
        };

        let mut settings = base.to_settings()?;
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(path) = &self.data {
            settings.source = DataSource::Json(PathBuf::from(path));
        }
        if let Some(path) = &self.bench_output {
            settings.source = DataSource::GoBench(PathBuf::from(path));
        }
        if let Some(dir) = &self.output_dir {
            settings.options.output_dir = PathBuf::from(dir);
        }
        if let Some(format) = self.format {
            settings.options.format = format;
        }
        if let Some(jobs) = self.jobs {
            settings.options.jobs = jobs;
        }
        if self.skip_failures {
            settings.options.on_render_error = FailurePolicy::Skip;
        }
    }
}
