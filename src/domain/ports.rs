use crate::domain::model::ChartSpec;
use crate::utils::error::Result;

/// Turns one chart spec into one file on disk.
///
/// Implementations must not create the parent directory of
/// `spec.output_path` and must leave no file behind when they fail.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, spec: &ChartSpec) -> Result<()>;
}

