use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ArchDiagramError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Source scanning configuration
    pub scanning: ScanningConfig,

    /// Description resolution settings
    pub descriptions: DescriptionConfig,

    /// Diagram output settings
    pub diagram: DiagramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name shown in progress output
    pub name: String,

    /// Directory holding the modules to analyze
    pub source_dir: PathBuf,

    /// Diagram file to (over)write
    pub output_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// File extension of candidate modules, without the dot
    pub extension: String,

    /// Files whose name starts with this prefix are skipped
    pub exclude_prefix: String,

    /// Function names kept per module
    pub max_functions: usize,

    /// Class names kept per module
    pub max_classes: usize,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionConfig {
    /// Leading lines inspected for a docstring marker
    pub search_lines: usize,

    /// Characters kept before the description is cut with "..."
    pub max_length: usize,

    /// Extra module name -> description entries, layered over the built-in table
    pub fallbacks: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub mode: DiagramMode,
}

/// What the emitted diagram is built from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiagramMode {
    /// The fixed conceptual architecture template
    #[default]
    Static,
    /// Nodes and edges built from the scanned modules
    Discovered,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "CLI_Chat".to_string(),
            source_dir: PathBuf::from("src"),
            output_file: PathBuf::from("architecture_diagram.md"),
        }
    }
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            extension: "py".to_string(),
            exclude_prefix: "__".to_string(),
            max_functions: 3,
            max_classes: 2,
            max_file_size: 1024 * 1024, // 1MB
        }
    }
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            search_lines: 5,
            max_length: 40,
            fallbacks: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ArchDiagramError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ArchDiagramError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Err(ArchDiagramError::Config(format!(
                        "config file not found: {}",
                        p.as_ref().display()
                    )))
                }
            }
            None => {
                let candidates = ["archdiagram.toml", ".archdiagram.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
