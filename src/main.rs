use anyhow::Context;
use bench_graph::core::engine::RenderEngine;
use bench_graph::utils::error::{ErrorSeverity, GraphError};
use bench_graph::utils::{logger, validation::Validate};
use bench_graph::{BenchmarkTable, CliConfig, PlottersRenderer, Settings};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting bench-graph");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let settings = match cli.resolve().and_then(|settings| {
        settings.validate()?;
        Ok(settings)
    }) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    display_settings_summary(&settings, &cli);

    let table = match settings.source.load() {
        Ok(table) => table,
        Err(e) => exit_with(&e),
    };

    if let Some(path) = &cli.export_data {
        let json = table.to_json_pretty()?;
        std::fs::write(path, json).with_context(|| format!("Failed to export data to {}", path))?;
        tracing::info!("💾 Benchmark data exported to: {}", path);
    }

    let renderer = PlottersRenderer::new(settings.palette.clone());
    let engine = RenderEngine::new_with_monitoring(renderer, settings.options.clone(), cli.monitor);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No charts will be written");
        perform_dry_run(&engine, &table);
        return Ok(());
    }

    match engine.run(&table).await {
        Ok(report) if report.is_success() => {
            println!("✅ Rendered {} charts", report.rendered.len());
            println!("📁 Output saved to: {}", settings.options.output_dir.display());
        }
        Ok(report) => {
            for (path, e) in &report.failed {
                eprintln!("❌ {}: {}", path.display(), e.user_friendly_message());
            }
            let e = GraphError::PartialFailure {
                failed: report.failed.len(),
                total: report.total(),
            };
            exit_with(&e);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &GraphError) -> ! {
    tracing::error!(
        "❌ bench-graph failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2, // 部分圖表失敗
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn display_settings_summary(settings: &Settings, cli: &CliConfig) {
    let options = &settings.options;
    println!("📋 Configuration Summary:");
    println!("  Source: {}", settings.source);
    println!("  Output: {}", options.output_dir.display());
    println!("  Format: {}", options.format.extension());
    println!("  Size: {}x{}", options.width, options.height);
    println!("  X Axis: {}", options.x_axis_label);
    println!("  Palette: {} colors", settings.palette.len());
    println!("  Jobs: {}", options.jobs);
    println!("  On Error: {:?}", options.on_render_error);

    if cli.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(engine: &RenderEngine<PlottersRenderer>, table: &BenchmarkTable) {
    let jobs = engine.plan(table);
    println!("🔍 Dry Run Analysis: {} charts", jobs.len());
    for job in &jobs {
        println!(
            "  {} <- \"{}\" ({} bars, y: {})",
            job.output_path().display(),
            job.spec.layout.title,
            job.spec.series.len(),
            job.spec.layout.y_axis_label
        );
    }
    println!();
    println!("✅ Dry run analysis complete.");
}
