use crate::domain::model::{
    ChartSpec, ImageFormat, Metric, OperationKind, DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_X_AXIS_LABEL,
};
use crate::domain::ports::ChartRenderer;
use crate::domain::table::BenchmarkTable;
use crate::utils::error::{GraphError, Result};
use crate::utils::monitor::RenderMonitor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};

/// What to do when a single chart fails to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop scheduling new charts and return the first error.
    #[default]
    Abort,
    /// Record the failure and keep going.
    Skip,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub output_dir: PathBuf,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub x_axis_label: String,
    pub jobs: usize,
    pub on_render_error: FailurePolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("images"),
            format: ImageFormat::Png,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            x_axis_label: DEFAULT_X_AXIS_LABEL.to_string(),
            jobs: 1,
            on_render_error: FailurePolicy::Abort,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderJob {
    pub operation: OperationKind,
    pub metric: Metric,
    pub spec: ChartSpec,
}

impl RenderJob {
    pub fn output_path(&self) -> &Path {
        &self.spec.output_path
    }
}

#[derive(Debug, Default)]
pub struct RenderReport {
    pub rendered: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, GraphError)>,
}

impl RenderReport {
    pub fn total(&self) -> usize {
        self.rendered.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

type JobOutcome = (usize, PathBuf, Result<()>);

/// Drives one render per (operation, metric) pair of a table.
pub struct RenderEngine<R: ChartRenderer + 'static> {
    renderer: Arc<R>,
    options: RenderOptions,
    monitor: RenderMonitor,
}

impl<R: ChartRenderer + 'static> RenderEngine<R> {
    pub fn new(renderer: R, options: RenderOptions) -> Self {
        Self::new_with_monitoring(renderer, options, false)
    }

    pub fn new_with_monitoring(renderer: R, options: RenderOptions, monitor_enabled: bool) -> Self {
        Self {
            renderer: Arc::new(renderer),
            options,
            monitor: RenderMonitor::new(monitor_enabled),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn output_path(&self, operation: OperationKind, metric: Metric) -> PathBuf {
        self.options.output_dir.join(format!(
            "{}_{}.{}",
            operation.file_key(),
            metric.file_key(),
            self.options.format.extension()
        ))
    }

    /// Jobs in canonical table order.
    pub fn plan(&self, table: &BenchmarkTable) -> Vec<RenderJob> {
        table
            .iter()
            .map(|(operation, metric, series)| {
                let title = format!("{} {}", operation.display_name(), metric.title());
                let spec = ChartSpec::new(
                    self.output_path(operation, metric),
                    title,
                    metric.unit(),
                    series.clone(),
                )
                .with_size(self.options.width, self.options.height)
                .with_x_axis_label(self.options.x_axis_label.as_str());

                RenderJob {
                    operation,
                    metric,
                    spec,
                }
            })
            .collect()
    }

    /// Creates the output directory. Runs once before any render.
    pub fn prepare_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.options.output_dir)?;
        tracing::debug!("Output directory ready: {}", self.options.output_dir.display());
        Ok(())
    }

    pub async fn run(&self, table: &BenchmarkTable) -> Result<RenderReport> {
        let jobs = self.plan(table);
        let total = jobs.len();
        tracing::info!(
            "Rendering {} charts into {} ({} parallel)",
            total,
            self.options.output_dir.display(),
            self.options.jobs.max(1)
        );

        self.prepare_output_dir()?;
        self.monitor.log_stats("Before rendering");

        let limit = self.options.jobs.max(1);
        let mut tasks: JoinSet<JobOutcome> = JoinSet::new();
        let mut rendered: Vec<(usize, PathBuf)> = Vec::with_capacity(total);
        let mut report = RenderReport::default();
        let mut first_error: Option<GraphError> = None;

        for (index, job) in jobs.into_iter().enumerate() {
            while tasks.len() >= limit {
                if let Some(outcome) = tasks.join_next().await {
                    self.record(outcome, &mut rendered, &mut report, &mut first_error);
                }
            }
            if first_error.is_some() {
                break;
            }

            let renderer = Arc::clone(&self.renderer);
            tasks.spawn_blocking(move || {
                tracing::debug!("Rendering {} {} chart", job.operation, job.metric.unit());
                let result = renderer.render(&job.spec);
                (index, job.spec.output_path, result)
            });
        }

        while let Some(outcome) = tasks.join_next().await {
            self.record(outcome, &mut rendered, &mut report, &mut first_error);
        }

        rendered.sort_by_key(|(index, _)| *index);
        report.rendered = rendered.into_iter().map(|(_, path)| path).collect();
        self.monitor.log_final_stats(report.rendered.len());

        if let Some(error) = first_error {
            return Err(error);
        }

        tracing::info!(
            "Rendered {} of {} charts ({} failed)",
            report.rendered.len(),
            total,
            report.failed.len()
        );
        Ok(report)
    }

    fn record(
        &self,
        outcome: std::result::Result<JobOutcome, JoinError>,
        rendered: &mut Vec<(usize, PathBuf)>,
        report: &mut RenderReport,
        first_error: &mut Option<GraphError>,
    ) {
        let (index, path, result) = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("❌ Render task did not complete: {}", e);
                first_error.get_or_insert(GraphError::TaskError {
                    message: e.to_string(),
                });
                return;
            }
        };

        match result {
            Ok(()) => {
                tracing::info!("🖼️  {}", path.display());
                rendered.push((index, path));
            }
            Err(e) => {
                tracing::error!("❌ Failed to render {}: {}", path.display(), e);
                match self.options.on_render_error {
                    FailurePolicy::Abort => {
                        first_error.get_or_insert(e);
                    }
                    FailurePolicy::Skip => report.failed.push((path, e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MetricSeries;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRenderer {
        specs: Mutex<Vec<ChartSpec>>,
        fail_on: Option<String>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, spec: &ChartSpec) -> Result<()> {
            if let Some(name) = &self.fail_on {
                if spec.output_path.ends_with(name) {
                    return Err(GraphError::RenderError {
                        path: spec.output_path.clone(),
                        message: "backend unavailable".to_string(),
                    });
                }
            }
            std::fs::write(&spec.output_path, spec.layout.title.as_bytes())?;
            self.specs.lock().unwrap().push(spec.clone());
            Ok(())
        }
    }

    fn options(dir: &Path) -> RenderOptions {
        RenderOptions {
            output_dir: dir.join("images"),
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_plan_names_titles_and_labels() {
        let engine = RenderEngine::new(RecordingRenderer::default(), RenderOptions::default());
        let jobs = engine.plan(&BenchmarkTable::builtin());
        assert_eq!(jobs.len(), 18);

        let first = &jobs[0];
        assert_eq!(first.output_path(), Path::new("images/select_all_nsop.png"));
        assert_eq!(first.spec.layout.title, "SelectAll Speed");
        assert_eq!(first.spec.layout.y_axis_label, "ns/op");
        assert_eq!(first.spec.layout.x_axis_label, "ORM");
        assert_eq!((first.spec.layout.width, first.spec.layout.height), (400, 400));

        let last = &jobs[17];
        assert_eq!(last.output_path(), Path::new("images/delete_aop.png"));
        assert_eq!(last.spec.layout.title, "Delete Allocations");
        assert_eq!(last.spec.layout.y_axis_label, "allocs/op");

        let unique: HashSet<&Path> = jobs.iter().map(RenderJob::output_path).collect();
        assert_eq!(unique.len(), 18);
    }

    #[test]
    fn test_plan_uses_configured_format() {
        let engine = RenderEngine::new(
            RecordingRenderer::default(),
            RenderOptions {
                format: ImageFormat::Svg,
                ..RenderOptions::default()
            },
        );
        let jobs = engine.plan(&BenchmarkTable::builtin());
        assert_eq!(jobs[4].output_path(), Path::new("images/select_subset_bop.svg"));
    }

    #[tokio::test]
    async fn test_run_creates_directory_and_renders_everything() {
        let temp_dir = TempDir::new().unwrap();
        let engine = RenderEngine::new(RecordingRenderer::default(), options(temp_dir.path()));

        let report = engine.run(&BenchmarkTable::builtin()).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.rendered.len(), 18);
        assert_eq!(report.rendered[0], temp_dir.path().join("images/select_all_nsop.png"));
        assert_eq!(std::fs::read_dir(temp_dir.path().join("images")).unwrap().count(), 18);
    }

    #[tokio::test]
    async fn test_parallel_run_keeps_plan_order_in_report() {
        let temp_dir = TempDir::new().unwrap();
        let engine = RenderEngine::new(
            RecordingRenderer::default(),
            RenderOptions {
                jobs: 4,
                ..options(temp_dir.path())
            },
        );

        let table = BenchmarkTable::builtin();
        let expected: Vec<PathBuf> = engine
            .plan(&table)
            .iter()
            .map(|job| job.output_path().to_path_buf())
            .collect();
        let report = engine.run(&table).await.unwrap();
        assert_eq!(report.rendered, expected);
    }

    #[tokio::test]
    async fn test_abort_stops_after_first_failure() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = RecordingRenderer {
            fail_on: Some("select_all_bop.png".to_string()),
            ..RecordingRenderer::default()
        };
        let engine = RenderEngine::new(renderer, options(temp_dir.path()));

        let err = engine.run(&BenchmarkTable::builtin()).await.unwrap_err();
        assert!(err.to_string().contains("select_all_bop.png"));

        // sequential: only the chart before the failure exists
        let written = std::fs::read_dir(temp_dir.path().join("images")).unwrap().count();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn test_skip_records_failure_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = RecordingRenderer {
            fail_on: Some("update_nsop.png".to_string()),
            ..RecordingRenderer::default()
        };
        let engine = RenderEngine::new(
            renderer,
            RenderOptions {
                on_render_error: FailurePolicy::Skip,
                ..options(temp_dir.path())
            },
        );

        let report = engine.run(&BenchmarkTable::builtin()).await.unwrap();
        assert_eq!(report.rendered.len(), 17);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("update_nsop.png"));
        assert_eq!(report.total(), 18);
    }

    #[tokio::test]
    async fn test_partial_table_renders_only_present_pairs() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = BenchmarkTable::default();
        table.insert(
            OperationKind::Insert,
            Metric::NsPerOp,
            MetricSeries::new([("GORP", 4350.0)]).unwrap(),
        );
        let engine = RenderEngine::new(RecordingRenderer::default(), options(temp_dir.path()));

        let report = engine.run(&table).await.unwrap();
        assert_eq!(report.rendered, vec![temp_dir.path().join("images/insert_nsop.png")]);
    }
}
