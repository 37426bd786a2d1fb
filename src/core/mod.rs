mod engine;
mod scanner;
mod describer;
mod generator;
mod differ;

// Language-specific parsers
mod languages;

pub use scanner::{ModuleMap, SourceScanner};
pub use generator::DiagramGenerator;
pub use differ::{ContentDiff, ContentDiffer};

// Export the main engine
pub use engine::Engine;
