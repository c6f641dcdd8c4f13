//! TOML configuration.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) yields a working configuration that calls the Hugging Face
//! Inference API with `facebook/bart-large-cnn`.
//!
//! ```toml
//! [chunking]
//! max_chunk_size = 1024
//! min_substance_chars = 100
//! separator = "\n\n"
//!
//! [model]
//! provider = "huggingface"
//! model = "google/flan-t5-large"
//! task = "text2text-generation"
//!
//! [presets]
//! default = "balanced"
//! concise = { max_length = 80, min_length = 40 }
//!
//! [cache]
//! ttl_secs = 3600
//! ```

use anyhow::{bail, Context, Result};
use condense_core::aggregate::{AggregateOptions, DEFAULT_MIN_SUBSTANCE_CHARS, DEFAULT_SEPARATOR};
use condense_core::chunk::DEFAULT_MAX_CHUNK_SIZE;
use condense_core::pipeline::{PipelineOptions, DEFAULT_MIN_INPUT_CHARS};
use condense_core::prompt::PromptTemplate;
use condense_core::LengthParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub presets: PresetsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    #[serde(default = "default_min_substance_chars")]
    pub min_substance_chars: usize,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub divide_length_budget: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            min_substance_chars: default_min_substance_chars(),
            separator: default_separator(),
            divide_length_budget: false,
        }
    }
}

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}
fn default_min_substance_chars() -> usize {
    DEFAULT_MIN_SUBSTANCE_CHARS
}
fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Hard minimum; shorter input is rejected.
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    /// Soft minimum; shorter input gets a warning but is still summarized.
    #[serde(default = "default_recommended_chars")]
    pub recommended_chars: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            recommended_chars: default_recommended_chars(),
        }
    }
}

fn default_min_chars() -> usize {
    DEFAULT_MIN_INPUT_CHARS
}
fn default_recommended_chars() -> usize {
    100
}

/// Which hosted pipeline the model runs behind.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ModelTask {
    /// Returns `summary_text`; takes the raw chunk.
    Summarization,
    /// Returns `generated_text`; takes the chunk wrapped in a prompt.
    Text2textGeneration,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_task")]
    pub task: ModelTask,
    #[serde(default = "default_url")]
    pub url: String,
    /// Name of the environment variable holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Per-call timeout. Unset means calls may block indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Custom prompt with a `{text}` placeholder.
    #[serde(default)]
    pub prompt: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            task: default_task(),
            url: default_url(),
            token_env: default_token_env(),
            timeout_secs: None,
            prompt: None,
        }
    }
}

fn default_provider() -> String {
    "huggingface".to_string()
}
fn default_model() -> String {
    "facebook/bart-large-cnn".to_string()
}
fn default_task() -> ModelTask {
    ModelTask::Summarization
}
fn default_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}
fn default_token_env() -> String {
    "HF_API_TOKEN".to_string()
}

impl ModelConfig {
    /// The prompt applied to each chunk, if any.
    ///
    /// A configured `prompt` always wins. Otherwise text-to-text models get
    /// the default instruction and summarization models get none.
    pub fn prompt_template(&self) -> Result<Option<PromptTemplate>> {
        match (&self.prompt, self.task) {
            (Some(p), _) => Ok(Some(PromptTemplate::new(p.clone())?)),
            (None, ModelTask::Text2textGeneration) => Ok(Some(PromptTemplate::default())),
            (None, ModelTask::Summarization) => Ok(None),
        }
    }
}

/// Named summary length preset.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Concise,
    Balanced,
    Detailed,
}

impl Density {
    pub const ALL: [Density; 3] = [Density::Concise, Density::Balanced, Density::Detailed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Density::Concise => "concise",
            Density::Balanced => "balanced",
            Density::Detailed => "detailed",
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PresetsConfig {
    #[serde(default = "default_density")]
    pub default: Density,
    #[serde(default = "default_concise")]
    pub concise: LengthParams,
    #[serde(default = "default_balanced")]
    pub balanced: LengthParams,
    #[serde(default = "default_detailed")]
    pub detailed: LengthParams,
}

impl Default for PresetsConfig {
    fn default() -> Self {
        Self {
            default: default_density(),
            concise: default_concise(),
            balanced: default_balanced(),
            detailed: default_detailed(),
        }
    }
}

fn default_density() -> Density {
    Density::Balanced
}
fn default_concise() -> LengthParams {
    LengthParams::new(80, 40)
}
fn default_balanced() -> LengthParams {
    LengthParams::new(150, 90)
}
fn default_detailed() -> LengthParams {
    LengthParams::new(300, 200)
}

impl PresetsConfig {
    pub fn params(&self, density: Density) -> LengthParams {
        match density {
            Density::Concise => self.concise,
            Density::Balanced => self.balanced,
            Density::Detailed => self.detailed,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}
fn default_ttl_secs() -> u64 {
    3600
}
fn default_max_entries() -> usize {
    256
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

impl Config {
    /// Options for the core pipeline, derived from `[chunking]` and `[input]`.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            max_chunk_size: self.chunking.max_chunk_size,
            min_input_chars: self.input.min_chars,
            aggregate: AggregateOptions {
                separator: self.chunking.separator.clone(),
                min_substance_chars: self.chunking.min_substance_chars,
                divide_length_budget: self.chunking.divide_length_budget,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.chunking.max_chunk_size == 0 {
            bail!("chunking.max_chunk_size must be > 0");
        }

        for density in Density::ALL {
            let p = self.presets.params(density);
            if p.max_length == 0 {
                bail!("presets.{}.max_length must be > 0", density);
            }
            if p.min_length > p.max_length {
                bail!(
                    "presets.{}.min_length ({}) must not exceed max_length ({})",
                    density,
                    p.min_length,
                    p.max_length
                );
            }
        }

        match self.model.provider.as_str() {
            "huggingface" | "lead" | "disabled" => {}
            other => bail!(
                "Unknown model provider: '{}'. Must be huggingface, lead, or disabled.",
                other
            ),
        }

        if self.model.provider == "huggingface" && self.model.model.trim().is_empty() {
            bail!("model.model must be specified when provider is 'huggingface'");
        }

        if self.model.timeout_secs == Some(0) {
            bail!("model.timeout_secs must be > 0 when set");
        }

        self.model
            .prompt_template()
            .context("Invalid model.prompt")?;

        if self.cache.enabled && self.cache.max_entries == 0 {
            bail!("cache.max_entries must be > 0 when the cache is enabled");
        }

        Ok(())
    }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Read, parse, and validate a configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Like [`load_config`], but a missing file yields the defaults unless the
/// path was given explicitly.
pub fn load_config_or_default(path: &Path, explicit: bool) -> Result<Config> {
    if !explicit && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load_config(path)
}
