use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_FILENAME, CONFIG_SECTION, PYPROJECT_FILENAME};

/// Error raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid TOML or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// A configuration file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The `[incrfmt]` section.
    pub incrfmt: IncrFmtConfig,
    /// The file this was loaded from, `None` for defaults or parsed strings.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

/// Options for collapsing and line translation.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct IncrFmtConfig {
    /// Line diff used to translate ranges between two versions of a file.
    #[serde(default)]
    pub diff_algorithm: DiffAlgorithm,
    /// Whether to collapse whole unchanged statements before going line by
    /// line. Turning it off gives the same result, only slower.
    #[serde(default = "default_top_level_pass")]
    pub top_level_pass: bool,
}

fn default_top_level_pass() -> bool {
    true
}

impl Default for IncrFmtConfig {
    fn default() -> Self {
        Self {
            diff_algorithm: DiffAlgorithm::default(),
            top_level_pass: default_top_level_pass(),
        }
    }
}

/// Line diff algorithm, forwarded to `similar`.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// Myers' O(ND) diff.
    #[default]
    Myers,
    /// Patience diff, anchored on unique lines.
    Patience,
    /// Classic longest common subsequence table.
    Lcs,
}

impl From<DiffAlgorithm> for similar::Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => Self::Myers,
            DiffAlgorithm::Patience => Self::Patience,
            DiffAlgorithm::Lcs => Self::Lcs,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct Document {
    #[serde(default)]
    incrfmt: Option<IncrFmtConfig>,
    #[serde(default)]
    tool: Option<ToolConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct ToolConfig {
    #[serde(default)]
    incrfmt: Option<IncrFmtConfig>,
}

impl Document {
    fn section(self) -> Option<IncrFmtConfig> {
        self.incrfmt
            .or_else(|| self.tool.and_then(|tool| tool.incrfmt))
    }
}

impl Config {
    /// Parse configuration from a TOML document.
    ///
    /// Both a dedicated file with an `[incrfmt]` table and a `pyproject.toml`
    /// with `[tool.incrfmt]` are accepted; the dedicated table wins when both
    /// are present. Unrelated tables are ignored.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let document: Document = toml::from_str(content)?;
        match document.section() {
            Some(incrfmt) => Ok(Self {
                incrfmt,
                config_file_path: None,
            }),
            None => {
                tracing::debug!(
                    section = CONFIG_SECTION,
                    "no configuration section, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Find configuration starting at `path` and walking up.
    ///
    /// In each directory a `.incrfmt.toml` is used as is; a `pyproject.toml`
    /// only counts when it has a `[tool.incrfmt]` table. Defaults are
    /// returned when nothing is found.
    ///
    /// # Errors
    /// Fails when a candidate file cannot be read or is not valid TOML.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let dedicated = current.join(CONFIG_FILENAME);
            if dedicated.is_file() {
                let mut config = Self::from_toml_str(&read(&dedicated)?)?;
                config.config_file_path = Some(dedicated);
                return Ok(config);
            }

            let pyproject = current.join(PYPROJECT_FILENAME);
            if pyproject.is_file() {
                let document: Document = toml::from_str(&read(&pyproject)?)?;
                if let Some(incrfmt) = document.tool.and_then(|tool| tool.incrfmt) {
                    return Ok(Self {
                        incrfmt,
                        config_file_path: Some(pyproject),
                    });
                }
            }

            if !current.pop() {
                break;
            }
        }

        Ok(Self::default())
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
