use std::collections::HashMap;

use crate::config::DescriptionConfig;

/// Descriptions for the application's known modules
const BUILTIN_DESCRIPTIONS: [(&str, &str); 7] = [
    ("cli", "CLI with argument parsing"),
    ("config", "Configuration & environment"),
    ("data_loader", "Data ingestion & parsing"),
    ("index_manager", "Vector indexing & storage"),
    ("ageny", "AI agent & query engines"),
    ("google_llm_init", "Google Gemini LLM setup"),
    ("custom_console", "Console UI & formatting"),
];

const DOCSTRING_MARKERS: [&str; 2] = ["\"\"\"", "'''"];

/// Resolves the one-line description shown for a module.
///
/// This is a line heuristic rather than a docstring parse: the first of the
/// leading lines that contains a triple-quote marker wins, whatever the
/// quotes are used for.
pub struct DescriptionResolver {
    search_lines: usize,
    max_length: usize,
    fallbacks: HashMap<String, String>,
}

impl DescriptionResolver {
    pub fn new(config: &DescriptionConfig) -> Self {
        let mut fallbacks: HashMap<String, String> = BUILTIN_DESCRIPTIONS
            .iter()
            .map(|(name, description)| (name.to_string(), description.to_string()))
            .collect();
        fallbacks.extend(config.fallbacks.clone());

        Self {
            search_lines: config.search_lines,
            max_length: config.max_length,
            fallbacks,
        }
    }

    pub fn resolve(&self, content: &str, module_name: &str) -> String {
        self.docstring_line(content)
            .unwrap_or_else(|| self.fallback(module_name))
    }

    fn docstring_line(&self, content: &str) -> Option<String> {
        content
            .split('\n')
            .take(self.search_lines)
            .map(str::trim)
            .find(|line| DOCSTRING_MARKERS.iter().any(|marker| line.contains(marker)))
            .map(|line| {
                let stripped = DOCSTRING_MARKERS
                    .iter()
                    .fold(line.to_string(), |text, marker| text.replace(marker, ""));
                self.truncate(stripped.trim())
            })
    }

    fn truncate(&self, text: &str) -> String {
        if text.chars().count() > self.max_length {
            let kept: String = text.chars().take(self.max_length).collect();
            format!("{}...", kept)
        } else {
            text.to_string()
        }
    }

    fn fallback(&self, module_name: &str) -> String {
        self.fallbacks
            .get(module_name)
            .cloned()
            .unwrap_or_else(|| format!("{} module", module_name))
    }
}
