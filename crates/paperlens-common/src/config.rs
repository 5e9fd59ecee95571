//! Configuration loading for paperlens.
//!
//! Every heuristic threshold of the figure pipeline is a field here rather than
//! a constant, so dataset-specific tuning can happen in `config.toml`.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::AnalysisError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file as TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<ConfigError> for AnalysisError {
    fn from(err: ConfigError) -> Self {
        AnalysisError::Config(err.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub heuristics: HeuristicsConfig,
    pub text: TextConfig,
    pub ocr: OcrConfig,
    pub models: ModelsConfig,
    pub fact_check: FactCheckConfig,
    pub cache: CacheConfig,
}

/// Thresholds for caption matching, grid detection, table parsing and
/// complexity scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// Max |caption.left - image.left| in PDF points
    pub caption_max_horizontal_offset: f32,
    /// Side of the adaptive-threshold neighbourhood (odd)
    pub adaptive_block_size: u32,
    /// Foreground when inverted pixel > local mean + offset
    pub adaptive_offset: i16,
    /// Length of the rectangular line kernel
    pub line_kernel_length: u32,
    pub morph_iterations: u32,
    /// Grid needs strictly more horizontal line contours than this
    pub horizontal_line_threshold: usize,
    /// Grid needs strictly more vertical line contours than this
    pub vertical_line_threshold: usize,
    pub numeric_min_chars: usize,
    pub numeric_digit_ratio: f64,
    pub cell_binarize_threshold: u8,
    pub cell_dilate_iterations: u8,
    pub cell_min_size: u32,
    pub cell_max_width_ratio: f32,
    pub row_gap_factor: f32,
    pub complexity_word_divisor: f32,
    pub complexity_contour_divisor: f32,
    pub complexity_max: f32,
    pub canny_low: f32,
    pub canny_high: f32,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            caption_max_horizontal_offset: 100.0,
            adaptive_block_size: 15,
            adaptive_offset: 2,
            line_kernel_length: 40,
            morph_iterations: 2,
            horizontal_line_threshold: 10,
            vertical_line_threshold: 15,
            numeric_min_chars: 10,
            numeric_digit_ratio: 0.3,
            cell_binarize_threshold: 180,
            cell_dilate_iterations: 2,
            cell_min_size: 20,
            cell_max_width_ratio: 0.8,
            row_gap_factor: 0.5,
            complexity_word_divisor: 15.0,
            complexity_contour_divisor: 300.0,
            complexity_max: 10.0,
            canny_low: 100.0,
            canny_high: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Only the first `max_words` words are sent to the models
    pub max_words: usize,
    pub perplexity_stride: usize,
    /// Overrides the language model's own context length
    pub max_context: Option<usize>,
    pub detector_max_tokens: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_words: 500,
            perplexity_stride: 512,
            max_context: None,
            detector_max_tokens: 512,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language codes (e.g., "eng", "eng+fra")
    pub language: String,
    /// Tesseract PSM used for whole figures
    pub page_segmentation_mode: u32,
    /// Tesseract PSM used for individual table cells
    pub cell_segmentation_mode: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_segmentation_mode: 3,
            cell_segmentation_mode: 6,
        }
    }
}

/// Where to find one model's files, locally or on the Hugging Face hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Hub repository used when the files are not present locally
    pub repo: Option<String>,
    /// Subdirectory of `models.model_dir`
    pub dir_name: String,
    pub model_file: String,
    pub tokenizer_file: Option<String>,
    pub config_file: Option<String>,
}

impl ModelSpec {
    fn new(repo: &str, dir_name: &str, model_file: &str, tokenizer: bool, config: bool) -> Self {
        Self {
            repo: Some(repo.to_string()),
            dir_name: dir_name.to_string(),
            model_file: model_file.to_string(),
            tokenizer_file: tokenizer.then(|| "tokenizer.json".to_string()),
            config_file: config.then(|| "config.json".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub model_dir: PathBuf,
    /// Never reach the hub; only local files are used
    pub offline: bool,
    pub image_detector: ModelSpec,
    pub text_detector: ModelSpec,
    pub language_model: ModelSpec,
    pub sentence_embedder: ModelSpec,
    /// Token-classification model for keywords; the built-in lexicon tagger
    /// is used when absent
    pub pos_tagger: Option<ModelSpec>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            offline: false,
            image_detector: ModelSpec::new(
                "umm-maybe/AI-image-detector",
                "ai-image-detector",
                "model.onnx",
                false,
                true,
            ),
            text_detector: ModelSpec::new(
                "openai-community/roberta-base-openai-detector",
                "roberta-openai-detector",
                "model.onnx",
                true,
                true,
            ),
            language_model: ModelSpec::new(
                "Xenova/gpt2",
                "gpt2",
                "onnx/decoder_model.onnx",
                true,
                true,
            ),
            sentence_embedder: ModelSpec::new(
                "Xenova/all-MiniLM-L6-v2",
                "all-minilm-l6-v2",
                "onnx/model.onnx",
                true,
                false,
            ),
            pos_tagger: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactCheckConfig {
    /// MediaWiki action API endpoint
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: concat!(
                "paperlens/",
                env!("CARGO_PKG_VERSION"),
                " (https://github.com/paperlens/paperlens)"
            )
            .to_string(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Defaults to the platform cache directory
    pub directory: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn resolved_directory(&self) -> Option<PathBuf> {
        self.directory.clone().or_else(|| {
            ProjectDirs::from("", "", "paperlens").map(|dirs| dirs.cache_dir().join("figures"))
        })
    }
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Ok(path) => path,
                Err(_) => return Ok(Self::default()),
            },
        };
        load_config(&path)
    }
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("", "", "paperlens").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}
