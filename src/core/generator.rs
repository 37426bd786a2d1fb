use std::collections::HashMap;
use std::path::Path;
use regex::Regex;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::{DiagramConfig, DiagramMode};
use crate::error::Result;
use super::scanner::ModuleMap;

/// Conceptual architecture of the chat application, emitted verbatim
const STATIC_ARCHITECTURE: &str = include_str!("templates/static_architecture.md");

const DISCOVERED_TEMPLATE_NAME: &str = "discovered_architecture.mmd";
const DISCOVERED_TEMPLATE: &str = include_str!("templates/discovered_architecture.md");

#[derive(Debug, Serialize)]
struct DiagramNode {
    id: String,
    label: String,
    items: Vec<DiagramItem>,
}

#[derive(Debug, Serialize)]
struct DiagramItem {
    id: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct DiagramEdge {
    source: String,
    target: String,
}

/// Renders the Mermaid architecture diagram
pub struct DiagramGenerator {
    mode: DiagramMode,
    tera: Tera,
    id_pattern: Regex,
}

impl DiagramGenerator {
    pub fn new(config: &DiagramConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(DISCOVERED_TEMPLATE_NAME, DISCOVERED_TEMPLATE)?;

        Ok(Self {
            mode: config.mode,
            tera,
            id_pattern: Regex::new(r"[^A-Za-z0-9_]").expect("Invalid node id regex"),
        })
    }

    pub fn mode(&self) -> DiagramMode {
        self.mode
    }

    /// Produce the fenced diagram block.
    ///
    /// In static mode the scanned modules do not influence the output at all.
    pub fn render(&self, modules: &ModuleMap, source_dir: &Path) -> Result<String> {
        match self.mode {
            DiagramMode::Static => Ok(STATIC_ARCHITECTURE.to_string()),
            DiagramMode::Discovered => self.render_discovered(modules, source_dir),
        }
    }

    fn render_discovered(&self, modules: &ModuleMap, source_dir: &Path) -> Result<String> {
        let mut nodes = Vec::new();
        let mut class_ids = Vec::new();
        let mut function_ids = Vec::new();
        let ids = self.node_ids(modules);

        for (name, info) in modules {
            let id = ids[name.as_str()].clone();
            let mut items = Vec::new();

            for (index, class_name) in info.classes.iter().enumerate() {
                let item_id = format!("{}_cls{}", id, index + 1);
                class_ids.push(item_id.clone());
                items.push(DiagramItem {
                    id: item_id,
                    label: escape_label(&format!("class {}", class_name)),
                });
            }
            for (index, function_name) in info.functions.iter().enumerate() {
                let item_id = format!("{}_fn{}", id, index + 1);
                function_ids.push(item_id.clone());
                items.push(DiagramItem {
                    id: item_id,
                    label: escape_label(&format!("{}()", function_name)),
                });
            }

            let label = if info.description.is_empty() {
                format!("{}<br/>{}", name, info.file_path)
            } else {
                format!("{}<br/>{}<br/>{}", name, info.file_path, info.description)
            };

            nodes.push(DiagramNode {
                id,
                label: escape_label(&label),
                items,
            });
        }

        let module_ids: Vec<&str> = nodes.iter().map(|node| node.id.as_str()).collect();

        let mut context = Context::new();
        context.insert("source_dir", &source_dir.display().to_string());
        context.insert("modules", &nodes);
        context.insert("edges", &self.import_edges(modules, &ids));
        context.insert("module_ids", &module_ids);
        context.insert("class_ids", &class_ids);
        context.insert("function_ids", &function_ids);

        Ok(self.tera.render(DISCOVERED_TEMPLATE_NAME, &context)?)
    }

    /// One edge per (importer, imported) pair where the import's last path
    /// segment names another scanned module
    fn import_edges(&self, modules: &ModuleMap, ids: &HashMap<&str, String>) -> Vec<DiagramEdge> {
        let mut edges = Vec::new();

        for (name, info) in modules {
            let mut targets: Vec<&str> = info
                .imports
                .iter()
                .filter_map(|path| path.rsplit('.').next())
                .filter(|target| *target != name.as_str() && modules.contains_key(*target))
                .collect();
            targets.sort_unstable();
            targets.dedup();

            edges.extend(targets.into_iter().map(|target| DiagramEdge {
                source: ids[name.as_str()].clone(),
                target: ids[target].clone(),
            }));
        }

        edges
    }

    /// `m<position>_<sanitized name>`; the position prefix keeps ids unique
    /// even when sanitizing maps two names together, and item ids extend
    /// their own module's id so they cannot match another module's
    fn node_ids<'a>(&self, modules: &'a ModuleMap) -> HashMap<&'a str, String> {
        modules
            .keys()
            .enumerate()
            .map(|(index, name)| {
                let id = format!("m{}_{}", index + 1, self.id_pattern.replace_all(name, "_"));
                (name.as_str(), id)
            })
            .collect()
    }
}

/// Mermaid labels are double-quoted; inner quotes use the entity form
fn escape_label(text: &str) -> String {
    text.replace('"', "#quot;")
}
