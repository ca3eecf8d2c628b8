pub mod engine;
pub mod layout;
pub mod source;

pub use crate::domain::model::{ChartSpec, Metric, MetricSeries, OperationKind, Palette};
pub use crate::domain::ports::ChartRenderer;
pub use crate::domain::table::BenchmarkTable;
pub use crate::utils::error::Result;
