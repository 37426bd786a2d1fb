use tree_sitter::{Node, Parser};

use crate::error::{ArchDiagramError, Result};
use super::{ExtractedDefinitions, LanguageParser};

/// Python-specific parser using Tree-sitter
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let python_language = tree_sitter_python::language();
        parser.set_language(&python_language)
            .map_err(|e| ArchDiagramError::Parser(format!("Failed to set Python language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl LanguageParser for PythonParser {
    fn extract_definitions(&mut self, content: &str) -> Result<ExtractedDefinitions> {
        let tree = self.parser.parse(content, None)
            .ok_or_else(|| ArchDiagramError::Parser("Failed to parse Python code".to_string()))?;

        let root_node = tree.root_node();
        if root_node.has_error() {
            return Err(ArchDiagramError::Parser(describe_syntax_error(root_node)));
        }
        if let Some(statement) = first_legacy_statement(root_node) {
            let position = statement.start_position();
            return Err(ArchDiagramError::Parser(format!(
                "Python 2 `{}` statement at line {}, column {}",
                statement.kind().trim_end_matches("_statement"),
                position.row + 1,
                position.column + 1
            )));
        }

        let mut definitions = ExtractedDefinitions::default();
        self.walk_python_items(root_node, content, &mut definitions);
        Ok(definitions)
    }

    fn file_extensions(&self) -> &[&str] {
        &["py"]
    }

    fn language_name(&self) -> &str {
        "python"
    }
}

impl PythonParser {
    /// Pre-order walk over the whole tree, nested definitions included
    fn walk_python_items(&self, node: Node, source: &str, definitions: &mut ExtractedDefinitions) {
        match node.kind() {
            "function_definition" if !is_async(node) => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    definitions.functions.push(self.node_text(name_node, source));
                }
            }
            "class_definition" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    definitions.classes.push(self.node_text(name_node, source));
                }
            }
            "import_statement" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    let path_node = if name.kind() == "aliased_import" {
                        name.child_by_field_name("name")
                    } else {
                        Some(name)
                    };
                    if let Some(path_node) = path_node {
                        self.record_import(self.node_text(path_node, source), definitions);
                    }
                }
            }
            "import_from_statement" => {
                self.collect_from_import(node, source, definitions);
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_python_items(child, source, definitions);
        }
    }

    /// `from a.b import c` records `a.b`; `from . import c, d` records `c` and `d`
    fn collect_from_import(&self, node: Node, source: &str, definitions: &mut ExtractedDefinitions) {
        let module_path = node
            .child_by_field_name("module_name")
            .map(|module| self.node_text(module, source))
            .unwrap_or_default();
        let module_path = module_path.trim_start_matches('.').to_string();

        if !module_path.is_empty() {
            self.record_import(module_path, definitions);
            return;
        }

        let mut cursor = node.walk();
        let names: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let path_node = if name.kind() == "aliased_import" {
                name.child_by_field_name("name")
            } else {
                Some(name)
            };
            if let Some(path_node) = path_node {
                self.record_import(self.node_text(path_node, source), definitions);
            }
        }
    }

    fn record_import(&self, path: String, definitions: &mut ExtractedDefinitions) {
        if !path.is_empty() && !definitions.imports.contains(&path) {
            definitions.imports.push(path);
        }
    }

    /// Extract text content of a node
    fn node_text(&self, node: Node, source: &str) -> String {
        source[node.byte_range()].to_string()
    }
}

/// Point at the first ERROR or MISSING node below `root`
fn describe_syntax_error(root: Node) -> String {
    match first_error_node(root) {
        Some(node) => {
            let position = node.start_position();
            if node.is_missing() {
                format!(
                    "syntax error: missing `{}` at line {}, column {}",
                    node.kind(),
                    position.row + 1,
                    position.column + 1
                )
            } else {
                format!(
                    "invalid syntax at line {}, column {}",
                    position.row + 1,
                    position.column + 1
                )
            }
        }
        None => "invalid syntax".to_string(),
    }
}

/// `async def` is a separate definition kind and not counted as a function
fn is_async(node: Node) -> bool {
    node.child(0).map_or(false, |first| first.kind() == "async")
}

/// The grammar still accepts `print x` and `exec code`, which Python 3 rejects
fn first_legacy_statement(node: Node) -> Option<Node> {
    match node.kind() {
        "print_statement" if !is_call_shaped(node) => return Some(node),
        "exec_statement" => return Some(node),
        _ => {}
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_legacy_statement)
}

/// `print(x)` and `print(a, b)` are valid in both dialects
fn is_call_shaped(print_statement: Node) -> bool {
    print_statement.named_child_count() == 1
        && print_statement
            .named_child(0)
            .map_or(false, |argument| matches!(argument.kind(), "parenthesized_expression" | "tuple"))
}

fn first_error_node(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> ExtractedDefinitions {
        let mut parser = PythonParser::new().unwrap();
        parser.extract_definitions(source).unwrap()
    }

    #[test]
    fn test_functions_and_classes_in_source_order() {
        let source = r#"
import os

class Loader:
    def load(self):
        pass

def build_index(docs):
    def helper():
        return docs
    return helper

class Store:
    pass
"#;
        let defs = extract(source);
        assert_eq!(defs.functions, vec!["load", "build_index", "helper"]);
        assert_eq!(defs.classes, vec!["Loader", "Store"]);
    }

    #[test]
    fn test_decorated_functions_found_async_skipped() {
        let source = r#"
@cache
def cached():
    return 1

async def fetch():
    def inner():
        return 2
    return inner()

def after():
    pass
"#;
        let defs = extract(source);
        assert_eq!(defs.functions, vec!["cached", "inner", "after"]);
    }

    #[test]
    fn test_python2_statements_are_rejected() {
        let mut parser = PythonParser::new().unwrap();

        let err = parser.extract_definitions("print \"hello\"\n").unwrap_err();
        match err {
            ArchDiagramError::Parser(message) => assert!(message.contains("print")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parser.extract_definitions("def run():\n    exec \"x = 1\"\n").is_err());
    }

    #[test]
    fn test_python3_print_calls_are_accepted() {
        let defs = extract("def show():\n    print(\"a\")\n    print(\"a\", \"b\")\n    print()\n");
        assert_eq!(defs.functions, vec!["show"]);
    }

    #[test]
    fn test_names_are_not_deduplicated() {
        let source = r#"
class A:
    def run(self):
        pass

class B:
    def run(self):
        pass
"#;
        let defs = extract(source);
        assert_eq!(defs.functions, vec!["run", "run"]);
    }

    #[test]
    fn test_import_paths() {
        let source = r#"
import os.path
import numpy as np
from src.config import YEARS
from .index_manager import load_indices
from . import custom_console, ageny as agent
from src.config import DATA_DIR
"#;
        let defs = extract(source);
        assert_eq!(
            defs.imports,
            vec!["os.path", "numpy", "src.config", "index_manager", "custom_console", "ageny"]
        );
    }

    #[test]
    fn test_syntax_error_is_reported_with_position() {
        let mut parser = PythonParser::new().unwrap();
        let err = parser
            .extract_definitions("def broken(:\n    return 1\n")
            .unwrap_err();
        match err {
            ArchDiagramError::Parser(message) => assert!(message.contains("line")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_source_has_no_definitions() {
        assert_eq!(extract(""), ExtractedDefinitions::default());
    }
}
