use bench_graph::adapters::gobench;
use bench_graph::{
    BenchmarkTable, DataSource, FailurePolicy, ImageFormat, PlottersRenderer, RenderEngine, RenderOptions,
};
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn options(output_dir: PathBuf) -> RenderOptions {
    RenderOptions {
        output_dir,
        ..RenderOptions::default()
    }
}

#[tokio::test]
async fn test_full_loop_writes_eighteen_distinct_files() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("images");
    let engine = RenderEngine::new(PlottersRenderer::default(), options(output_dir.clone()));

    let report = engine.run(&BenchmarkTable::builtin()).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.rendered.len(), 18);

    let names: HashSet<String> = std::fs::read_dir(&output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 18);

    for operation in ["select_all", "select_subset", "select_complex", "insert", "update", "delete"] {
        for metric in ["nsop", "bop", "aop"] {
            let name = format!("{}_{}.png", operation, metric);
            assert!(names.contains(&name), "missing {}", name);
        }
    }
}

#[tokio::test]
async fn test_parallel_svg_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("charts");
    let engine = RenderEngine::new(
        PlottersRenderer::default(),
        RenderOptions {
            format: ImageFormat::Svg,
            jobs: 4,
            ..options(output_dir.clone())
        },
    );

    let report = engine.run(&BenchmarkTable::builtin()).await.unwrap();
    assert_eq!(report.rendered.len(), 18);
    assert!(report
        .rendered
        .iter()
        .all(|path| path.extension().and_then(|e| e.to_str()) == Some("svg")));
    assert_eq!(std::fs::read_dir(&output_dir).unwrap().count(), 18);
}

#[tokio::test]
async fn test_go_bench_output_to_charts() {
    let mut bench = NamedTempFile::new().unwrap();
    write!(
        bench,
        "goos: linux\n\
         BenchmarkMakroud_Delete-8   300000   3698 ns/op   1392 B/op   32 allocs/op\n\
         BenchmarkSQLX_Delete-8      100000  12555 ns/op   1215 B/op   22 allocs/op\n\
         BenchmarkGORP_Delete-8     1000000   1505 ns/op    352 B/op   13 allocs/op\n\
         PASS\n"
    )
    .unwrap();

    let table = DataSource::GoBench(bench.path().to_path_buf()).load().unwrap();
    assert_eq!(table.len(), 3);

    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("images");
    let engine = RenderEngine::new(PlottersRenderer::default(), options(output_dir.clone()));
    let report = engine.run(&table).await.unwrap();

    assert_eq!(
        report.rendered,
        vec![
            output_dir.join("delete_nsop.png"),
            output_dir.join("delete_bop.png"),
            output_dir.join("delete_aop.png"),
        ]
    );
}

#[tokio::test]
async fn test_unwritable_target_is_skipped_and_reported() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("images");
    std::fs::create_dir_all(&output_dir).unwrap();

    // a directory squatting on a chart path makes that one render fail
    std::fs::create_dir(output_dir.join("insert_nsop.png")).unwrap();

    let engine = RenderEngine::new(
        PlottersRenderer::default(),
        RenderOptions {
            on_render_error: FailurePolicy::Skip,
            ..options(output_dir.clone())
        },
    );

    let report = engine.run(&BenchmarkTable::builtin()).await.unwrap();
    assert_eq!(report.rendered.len(), 17);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, output_dir.join("insert_nsop.png"));
}

#[test]
fn test_exported_builtin_table_loads_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("results.json");
    std::fs::write(&path, BenchmarkTable::builtin().to_json_pretty().unwrap()).unwrap();

    let table = DataSource::Json(path).load().unwrap();
    assert_eq!(table, BenchmarkTable::builtin());
}

#[test]
fn test_go_bench_parse_rejects_unknown_operation() {
    let err = gobench::parse("BenchmarkSQLX_Upsert-8  100  12 ns/op\n").unwrap_err();
    assert!(err.to_string().contains("line 1"));
}
