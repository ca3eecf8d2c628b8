use crate::domain::model::{Metric, MetricSeries, OperationKind};
use crate::utils::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

type RawSeries = [(&'static str, u64); 5];
type RawOperation = (OperationKind, [(Metric, RawSeries); 3]);

/// Measurements compiled into the binary.
const BUILTIN_RESULTS: [RawOperation; 6] = [
    (
        OperationKind::SelectAll,
        [
            (
                Metric::NsPerOp,
                [("Makroud", 15292), ("SQLX", 162435), ("GORM", 62021), ("GORP", 29564), ("XORM", 56527)],
            ),
            (
                Metric::BytesPerOp,
                [("Makroud", 6288), ("SQLX", 4767), ("GORM", 26367), ("GORP", 8944), ("XORM", 16332)],
            ),
            (
                Metric::AllocsPerOp,
                [("Makroud", 62), ("SQLX", 45), ("GORM", 418), ("GORP", 362), ("XORM", 405)],
            ),
        ],
    ),
    (
        OperationKind::SelectSubset,
        [
            (
                Metric::NsPerOp,
                [("Makroud", 16003), ("SQLX", 164521), ("GORM", 64113), ("GORP", 29786), ("XORM", 53138)],
            ),
            (
                Metric::BytesPerOp,
                [("Makroud", 6480), ("SQLX", 4767), ("GORM", 27615), ("GORP", 8944), ("XORM", 16044)],
            ),
            (
                Metric::AllocsPerOp,
                [("Makroud", 64), ("SQLX", 45), ("GORM", 431), ("GORP", 362), ("XORM", 401)],
            ),
        ],
    ),
    (
        OperationKind::SelectComplex,
        [
            (
                Metric::NsPerOp,
                [("Makroud", 17167), ("SQLX", 331660), ("GORM", 74538), ("GORP", 30402), ("XORM", 58262)],
            ),
            (
                Metric::BytesPerOp,
                [("Makroud", 6937), ("SQLX", 4887), ("GORM", 34215), ("GORP", 9256), ("XORM", 17644)],
            ),
            (
                Metric::AllocsPerOp,
                [("Makroud", 74), ("SQLX", 48), ("GORM", 519), ("GORP", 368), ("XORM", 445)],
            ),
        ],
    ),
    (
        OperationKind::Insert,
        [
            (
                Metric::NsPerOp,
                [("Makroud", 15536), ("SQLX", 34789), ("GORM", 16785), ("GORP", 4350), ("XORM", 12657)],
            ),
            (
                Metric::BytesPerOp,
                [("Makroud", 5673), ("SQLX", 2831), ("GORM", 7184), ("GORP", 1592), ("XORM", 5872)],
            ),
            (
                Metric::AllocsPerOp,
                [("Makroud", 109), ("SQLX", 49), ("GORM", 146), ("GORP", 37), ("XORM", 130)],
            ),
        ],
    ),
    (
        OperationKind::Update,
        [
            (
                Metric::NsPerOp,
                [("Makroud", 16924), ("SQLX", 28036), ("GORM", 33415), ("GORP", 3577), ("XORM", 18940)],
            ),
            (
                Metric::BytesPerOp,
                [("Makroud", 5849), ("SQLX", 2463), ("GORM", 12712), ("GORP", 1536), ("XORM", 7704)],
            ),
            (
                Metric::AllocsPerOp,
                [("Makroud", 104), ("SQLX", 43), ("GORM", 287), ("GORP", 35), ("XORM", 197)],
            ),
        ],
    ),
    (
        OperationKind::Delete,
        [
            (
                Metric::NsPerOp,
                [("Makroud", 3698), ("SQLX", 12555), ("GORM", 11101), ("GORP", 1505), ("XORM", 20893)],
            ),
            (
                Metric::BytesPerOp,
                [("Makroud", 1392), ("SQLX", 1215), ("GORM", 4728), ("GORP", 352), ("XORM", 9344)],
            ),
            (
                Metric::AllocsPerOp,
                [("Makroud", 32), ("SQLX", 22), ("GORM", 95), ("GORP", 13), ("XORM", 202)],
            ),
        ],
    ),
];

/// Operation kind -> metric -> series, always iterated in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkTable {
    operations: BTreeMap<OperationKind, BTreeMap<Metric, MetricSeries>>,
}

impl BenchmarkTable {
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (operation, metrics) in BUILTIN_RESULTS {
            for (metric, raw) in metrics {
                let series = raw.iter().map(|(label, value)| (*label, *value as f64));
                let series =
                    MetricSeries::new(series).expect("builtin results hold unique non-negative values");
                table.insert(operation, metric, series);
            }
        }
        table
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(content)?;
        if table.is_empty() {
            return Err(GraphError::DataError {
                message: "Benchmark data contains no series".to_string(),
            });
        }
        Ok(table)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        tracing::debug!("Loaded benchmark data from {}", path.as_ref().display());
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn insert(&mut self, operation: OperationKind, metric: Metric, series: MetricSeries) {
        self.operations
            .entry(operation)
            .or_default()
            .insert(metric, series);
    }

    pub fn get(&self, operation: OperationKind, metric: Metric) -> Option<&MetricSeries> {
        self.operations.get(&operation)?.get(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OperationKind, Metric, &MetricSeries)> + '_ {
        self.operations.iter().flat_map(|(operation, metrics)| {
            metrics
                .iter()
                .map(move |(metric, series)| (*operation, *metric, series))
        })
    }

    /// Number of (operation, metric) pairs.
    pub fn len(&self) -> usize {
        self.operations.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
