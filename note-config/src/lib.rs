//! Shared configuration loader for the notes toolchain.
//!
//! `defaults/notes.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`NotesConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use note_babel::formats::markdown::MarkdownOptions;
use note_babel::import::SplitRules;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/notes.default.toml");

/// Top-level configuration consumed by notes applications.
#[derive(Debug, Clone, Deserialize)]
pub struct NotesConfig {
    pub import: ImportConfig,
    pub markdown: MarkdownConfig,
}

/// Mirrors the knobs of the multi-note splitter.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub blank_lines_between_notes: usize,
    pub max_plain_text_chars: usize,
    pub max_markdown_chars: usize,
    pub append_file_name: bool,
}

impl From<&ImportConfig> for SplitRules {
    fn from(config: &ImportConfig) -> Self {
        SplitRules {
            blank_lines_between_notes: config.blank_lines_between_notes,
            max_plain_text_chars: config.max_plain_text_chars,
            max_markdown_chars: config.max_markdown_chars,
            append_file_name: config.append_file_name,
        }
    }
}

impl From<ImportConfig> for SplitRules {
    fn from(config: ImportConfig) -> Self {
        SplitRules::from(&config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub replace_data_url_images: bool,
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        MarkdownOptions {
            replace_data_url_images: config.replace_data_url_images,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<NotesConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<NotesConfig, ConfigError> {
    Loader::new().build()
}
