use crate::adapters::gobench;
use crate::domain::table::BenchmarkTable;
use crate::utils::error::Result;
use std::fmt;
use std::path::PathBuf;

/// Where the benchmark table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    Builtin,
    /// JSON file keyed by operation, metric and library.
    Json(PathBuf),
    /// Raw `go test -bench . -benchmem` output.
    GoBench(PathBuf),
}

impl DataSource {
    pub fn load(&self) -> Result<BenchmarkTable> {
        let table = match self {
            DataSource::Builtin => BenchmarkTable::builtin(),
            DataSource::Json(path) => BenchmarkTable::from_json_file(path)?,
            DataSource::GoBench(path) => gobench::parse_file(path)?,
        };
        tracing::info!("📥 Loaded {} series from {}", table.len(), self);
        Ok(table)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Builtin => f.write_str("builtin results"),
            DataSource::Json(path) => write!(f, "{}", path.display()),
            DataSource::GoBench(path) => write!(f, "{} (go test output)", path.display()),
        }
    }
}
