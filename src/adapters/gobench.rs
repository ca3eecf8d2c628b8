//! Reader for `go test -bench . -benchmem` output.
//!
//! A result line looks like
//! `BenchmarkMakroud_SelectAll/makroud-8   100000   15292 ns/op   6288 B/op   62 allocs/op`.
//! The library is the part of the benchmark name before the underscore and the
//! operation kind the part after it. Sub-benchmark names and the GOMAXPROCS
//! suffix are ignored.

use crate::domain::model::{Metric, MetricSeries, OperationKind};
use crate::domain::table::BenchmarkTable;
use crate::utils::error::{GraphError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Benchmark(?P<library>[A-Za-z0-9]+)_(?P<operation>[A-Za-z0-9]+)(?:/\S*?)?(?:-\d+)?$")
            .expect("benchmark name pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkLine {
    pub library: String,
    pub operation: OperationKind,
    pub iterations: u64,
    pub measurements: Vec<(Metric, f64)>,
}

/// Parses one line. `Ok(None)` for lines that carry no result.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<BenchmarkLine>> {
    let mut tokens = line.split_whitespace();
    let name = match tokens.next() {
        Some(name) if name.starts_with("Benchmark") => name,
        _ => return Ok(None),
    };

    // parent benchmarks of b.Run print their name without results
    let iterations = match tokens.next() {
        Some(token) => match token.parse::<u64>() {
            Ok(iterations) => iterations,
            Err(_) => {
                tracing::debug!("Skipping benchmark line {}: {}", line_number, line.trim());
                return Ok(None);
            }
        },
        None => return Ok(None),
    };

    let parse_error = |message: String| GraphError::ParseError {
        line: line_number,
        message,
    };

    let captures = name_pattern()
        .captures(name)
        .ok_or_else(|| parse_error(format!("Unrecognized benchmark name '{}'", name)))?;
    let library = captures["library"].to_string();
    let operation = OperationKind::from_display_name(&captures["operation"]).ok_or_else(|| {
        parse_error(format!("Unknown operation '{}' in '{}'", &captures["operation"], name))
    })?;

    let rest: Vec<&str> = tokens.collect();
    if rest.len() % 2 != 0 {
        return Err(parse_error("Measurements must come in value/unit pairs".to_string()));
    }

    let mut measurements = Vec::new();
    for pair in rest.chunks(2) {
        let value: f64 = pair[0]
            .parse()
            .map_err(|_| parse_error(format!("Invalid measurement '{}'", pair[0])))?;
        if let Some(metric) = Metric::from_unit(pair[1]) {
            measurements.push((metric, value));
        }
    }

    Ok(Some(BenchmarkLine {
        library,
        operation,
        iterations,
        measurements,
    }))
}

#[derive(Default)]
struct Accumulator {
    // library order is first appearance
    samples: Vec<(String, f64, u32)>,
}

impl Accumulator {
    fn add(&mut self, library: &str, value: f64) {
        match self.samples.iter_mut().find(|(name, _, _)| name == library) {
            Some((_, sum, count)) => {
                *sum += value;
                *count += 1;
            }
            None => self.samples.push((library.to_string(), value, 1)),
        }
    }

    fn into_series(self) -> Result<MetricSeries> {
        MetricSeries::new(
            self.samples
                .into_iter()
                .map(|(library, sum, count)| (library, sum / f64::from(count))),
        )
    }
}

/// Builds a table from raw benchmark output. Repeated runs of the same
/// benchmark (`-count N`) are averaged.
pub fn parse(output: &str) -> Result<BenchmarkTable> {
    let mut accumulators: BTreeMap<(OperationKind, Metric), Accumulator> = BTreeMap::new();
    let mut parsed_lines = 0usize;

    for (index, line) in output.lines().enumerate() {
        let Some(result) = parse_line(line, index + 1)? else {
            continue;
        };
        parsed_lines += 1;
        for (metric, value) in &result.measurements {
            accumulators
                .entry((result.operation, *metric))
                .or_default()
                .add(&result.library, *value);
        }
    }

    let mut table = BenchmarkTable::default();
    for ((operation, metric), accumulator) in accumulators {
        table.insert(operation, metric, accumulator.into_series()?);
    }

    if table.is_empty() {
        return Err(GraphError::DataError {
            message: "No benchmark results found in output".to_string(),
        });
    }

    tracing::debug!(
        "Parsed {} benchmark lines into {} series",
        parsed_lines,
        table.len()
    );
    Ok(table)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<BenchmarkTable> {
    let content = std::fs::read_to_string(&path)?;
    tracing::debug!("Reading benchmark output from {}", path.as_ref().display());
    parse(&content)
}
