//! Language-specific parsers
//!
//! Each language gets its own module behind the [`LanguageParser`] trait, so
//! the scanner only deals with the definitions it extracts.

mod python;

pub use python::PythonParser;

use crate::error::Result;

/// Definition names pulled out of one source file, in traversal order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDefinitions {
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub imports: Vec<String>,
}

/// Trait that all language parsers must implement
pub trait LanguageParser {
    /// Parse source code and collect definition names.
    ///
    /// Source that does not parse cleanly is an error, not a partial result.
    fn extract_definitions(&mut self, content: &str) -> Result<ExtractedDefinitions>;

    /// Get the file extensions this parser handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}
