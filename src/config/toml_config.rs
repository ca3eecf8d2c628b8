use crate::config::Settings;
use crate::core::engine::FailurePolicy;
use crate::core::source::DataSource;
use crate::domain::model::{ImageFormat, Palette, Rgb};
use crate::utils::error::{GraphError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    pub chart: Option<ChartSection>,
    pub palette: Option<PaletteSection>,
    pub output: Option<OutputSection>,
    pub source: Option<SourceSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartSection {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub x_axis_label: Option<String>,
    pub format: Option<ImageFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaletteSection {
    pub colors: Vec<Rgb>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub directory: Option<String>,
    pub jobs: Option<usize>,
    pub on_render_error: Option<FailurePolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    pub data_file: Option<String>,
    pub bench_output: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

impl GraphConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GraphError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| GraphError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RESULTS_DIR})；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn palette(&self) -> Result<Palette> {
        match &self.palette {
            Some(section) => Palette::new(section.colors.clone()),
            None => Ok(Palette::default()),
        }
    }

    pub fn data_source(&self) -> Result<DataSource> {
        let Some(source) = &self.source else {
            return Ok(DataSource::Builtin);
        };
        match (&source.data_file, &source.bench_output) {
            (Some(_), Some(_)) => Err(GraphError::ConfigValidationError {
                field: "source".to_string(),
                message: "data_file and bench_output are mutually exclusive".to_string(),
            }),
            (Some(file), None) => Ok(DataSource::Json(PathBuf::from(file))),
            (None, Some(file)) => Ok(DataSource::GoBench(PathBuf::from(file))),
            (None, None) => Ok(DataSource::Builtin),
        }
    }

    /// Defaults overlaid with whatever the file sets.
    pub fn to_settings(&self) -> Result<Settings> {
        let mut settings = Settings {
            palette: self.palette()?,
            source: self.data_source()?,
            ..Settings::default()
        };

        let options = &mut settings.options;
        if let Some(chart) = &self.chart {
            if let Some(width) = chart.width {
                options.width = width;
            }
            if let Some(height) = chart.height {
                options.height = height;
            }
            if let Some(label) = &chart.x_axis_label {
                options.x_axis_label = label.clone();
            }
            if let Some(format) = chart.format {
                options.format = format;
            }
        }
        if let Some(output) = &self.output {
            if let Some(directory) = &output.directory {
                options.output_dir = PathBuf::from(directory);
            }
            if let Some(jobs) = output.jobs {
                options.jobs = jobs;
            }
            if let Some(policy) = output.on_render_error {
                options.on_render_error = policy;
            }
        }

        Ok(settings)
    }
}

impl Validate for GraphConfig {
    fn validate(&self) -> Result<()> {
        self.to_settings()?.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r##"
[chart]
width = 640
height = 480
x_axis_label = "Library"
format = "svg"

[palette]
colors = ["rgb(49,171,95)", "#316EAB"]

[output]
directory = "charts"
jobs = 4
on_render_error = "skip"

[source]
bench_output = "bench.txt"
"##;

        let config = GraphConfig::from_toml_str(toml_content).unwrap();
        let settings = config.to_settings().unwrap();

        assert_eq!(settings.options.width, 640);
        assert_eq!(settings.options.height, 480);
        assert_eq!(settings.options.x_axis_label, "Library");
        assert_eq!(settings.options.format, ImageFormat::Svg);
        assert_eq!(settings.options.output_dir, PathBuf::from("charts"));
        assert_eq!(settings.options.jobs, 4);
        assert_eq!(settings.options.on_render_error, FailurePolicy::Skip);
        assert_eq!(settings.palette.colors(), &[Rgb::new(49, 171, 95), Rgb::new(49, 110, 171)]);
        assert_eq!(settings.source, DataSource::GoBench(PathBuf::from("bench.txt")));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = GraphConfig::from_toml_str("").unwrap().to_settings().unwrap();
        assert_eq!(settings.options.width, 400);
        assert_eq!(settings.options.height, 400);
        assert_eq!(settings.options.x_axis_label, "ORM");
        assert_eq!(settings.options.output_dir, PathBuf::from("images"));
        assert_eq!(settings.palette, Palette::default());
        assert_eq!(settings.source, DataSource::Builtin);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(GraphConfig::from_toml_str("[chart]\ncolour = \"red\"\n").is_err());
        assert!(GraphConfig::from_toml_str("[legend]\nshow = true\n").is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BENCH_GRAPH_TEST_OUTPUT", "/tmp/bench-images");

        let toml_content = r#"
[output]
directory = "${BENCH_GRAPH_TEST_OUTPUT}"
"#;

        let config = GraphConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.output.unwrap().directory.as_deref(),
            Some("/tmp/bench-images")
        );

        std::env::remove_var("BENCH_GRAPH_TEST_OUTPUT");
    }

    #[test]
    fn test_config_validation() {
        let zero_jobs = GraphConfig::from_toml_str("[output]\njobs = 0\n").unwrap();
        assert!(zero_jobs.validate().is_err());

        let tiny = GraphConfig::from_toml_str("[chart]\nwidth = 10\n").unwrap();
        assert!(tiny.validate().is_err());

        let both_sources = GraphConfig::from_toml_str(
            "[source]\ndata_file = \"a.json\"\nbench_output = \"b.txt\"\n",
        )
        .unwrap();
        assert!(both_sources.validate().is_err());

        let empty_palette = GraphConfig::from_toml_str("[palette]\ncolors = []\n").unwrap();
        assert!(empty_palette.validate().is_err());

        assert!(GraphConfig::from_toml_str("[palette]\ncolors = [\"teal\"]\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[source]\ndata_file = \"results.json\"\n")
            .unwrap();

        let config = GraphConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.data_source().unwrap(),
            DataSource::Json(PathBuf::from("results.json"))
        );
    }
}
