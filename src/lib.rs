pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{GraphConfig, Settings};

pub use crate::adapters::plotters_renderer::PlottersRenderer;
pub use crate::core::engine::{FailurePolicy, RenderEngine, RenderOptions, RenderReport};
pub use crate::core::source::DataSource;
pub use crate::domain::model::{ChartSpec, ImageFormat, Metric, MetricSeries, OperationKind, Palette, Rgb};
pub use crate::domain::ports::ChartRenderer;
pub use crate::domain::table::BenchmarkTable;
pub use crate::utils::error::{GraphError, Result};
