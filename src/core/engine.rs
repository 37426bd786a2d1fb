// src/core/engine.rs
use std::io::Write;
use std::path::PathBuf;
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use super::{ContentDiff, ContentDiffer, DiagramGenerator, ModuleMap, SourceScanner};

/// What one scan-and-write cycle produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub modules: ModuleMap,
    pub output_file: PathBuf,
    pub diff: ContentDiff,
}

/// Main orchestration engine: scan, render, write, summarize
pub struct Engine {
    config: Config,
    scanner: SourceScanner,
    generator: DiagramGenerator,
    differ: ContentDiffer,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        debug!("Loaded configuration: {:?}", config);

        let scanner = SourceScanner::new(&config.scanning, &config.descriptions)?;
        let generator = DiagramGenerator::new(&config.diagram)?;

        Ok(Self {
            config,
            scanner,
            generator,
            differ: ContentDiffer::new(),
        })
    }

    /// Scan the configured source directory
    pub fn analyze(&mut self) -> ModuleMap {
        self.scanner.scan_directory(&self.config.project.source_dir)
    }

    /// Run the full cycle, printing progress and the module summary to `out`.
    ///
    /// Only a failed output write is fatal.
    pub fn update_diagram<W: Write>(&mut self, out: &mut W, json_summary: bool) -> Result<RunReport> {
        writeln!(out, "🔍 Analyzing {} codebase...", self.config.project.name)?;

        let modules = self.analyze();
        writeln!(out, "📊 Found {} modules", modules.len())?;

        debug!("Rendering diagram in {:?} mode", self.generator.mode());
        let diagram = self.generator.render(&modules, &self.config.project.source_dir)?;

        let output_file = self.config.project.output_file.clone();
        let existing = std::fs::read_to_string(&output_file).ok();
        let diff = self.differ.diff_content(existing.as_deref(), &diagram);

        std::fs::write(&output_file, &diagram)
            .with_context(|| format!("Failed to write {}", output_file.display()))?;
        info!(
            "{} {} ({})",
            output_file.display(),
            diff.as_str(),
            self.differ.calculate_hash(&diagram)
        );

        writeln!(out, "✅ Architecture diagram updated: {}", output_file.display())?;

        if json_summary {
            let records: Vec<_> = modules
                .iter()
                .map(|(name, info)| serde_json::json!({ "name": name, "module": info }))
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
        } else {
            writeln!(out, "\n📋 Modules analyzed:")?;
            for (name, info) in &modules {
                writeln!(out, "  - {}: {}", name, info.description)?;
            }
        }

        Ok(RunReport {
            modules,
            output_file,
            diff,
        })
    }
}
