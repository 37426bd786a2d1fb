use clap::Parser;
use std::path::PathBuf;
use anyhow::Result;
use tracing::debug;

use crate::config::{Config, DiagramMode};
use crate::core::Engine;

/// Running with no arguments performs the full scan-and-write cycle with the
/// configured (or default) settings.
#[derive(Parser)]
#[command(name = "archdiagram")]
#[command(about = "Scans a Python source tree and regenerates its architecture diagram")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Source directory to analyze
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Diagram file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Build the diagram from the fixed template or from the scanned modules
    #[arg(long, value_enum)]
    pub mode: Option<DiagramMode>,

    /// Print the module summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the effective configuration to archdiagram.toml and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    /// Loaded configuration with command-line overrides applied
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;

        if let Some(source) = &self.source {
            config.project.source_dir = source.clone();
        }
        if let Some(output) = &self.output {
            config.project.output_file = output.clone();
        }
        if let Some(mode) = self.mode {
            config.diagram.mode = mode;
        }

        Ok(config)
    }

    pub fn execute(self, config: Config) -> Result<()> {
        if self.init_config {
            let path = PathBuf::from("archdiagram.toml");
            config.save(&path)?;
            println!("Wrote {}", path.display());
            return Ok(());
        }

        let mut engine = Engine::new(config)?;
        let stdout = std::io::stdout();
        let report = engine.update_diagram(&mut stdout.lock(), self.json)?;

        debug!(
            "{} modules, {} {}",
            report.modules.len(),
            report.output_file.display(),
            report.diff.as_str()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_uses_defaults() {
        let cli = Cli::parse_from(["archdiagram"]);
        assert!(cli.config.is_none());
        assert!(cli.mode.is_none());
        assert!(!cli.json);
        assert!(!cli.init_config);
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::parse_from([
            "archdiagram",
            "--source",
            "app",
            "--output",
            "docs/arch.md",
            "--mode",
            "discovered",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.project.source_dir, PathBuf::from("app"));
        assert_eq!(config.project.output_file, PathBuf::from("docs/arch.md"));
        assert_eq!(config.diagram.mode, DiagramMode::Discovered);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["archdiagram", "--mode", "dynamic"]).is_err());
    }
}
