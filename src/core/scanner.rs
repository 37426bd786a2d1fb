use std::collections::BTreeMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{DescriptionConfig, ScanningConfig};
use crate::error::{ArchDiagramError, Result};
use super::describer::DescriptionResolver;
use super::languages::{LanguageParser, PythonParser};

/// Metadata for one discovered source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Source directory joined with the file name
    pub file_path: String,

    /// Short human-readable description
    pub description: String,

    /// First function names in traversal order
    pub functions: Vec<String>,

    /// First class names in traversal order
    pub classes: Vec<String>,

    /// Imported module paths, relative dots stripped
    pub imports: Vec<String>,
}

/// Discovered modules keyed by file stem
pub type ModuleMap = BTreeMap<String, ModuleInfo>;

/// Flat (non-recursive) directory scanner
pub struct SourceScanner {
    config: ScanningConfig,
    language_parser: Box<dyn LanguageParser>,
    resolver: DescriptionResolver,
}

impl SourceScanner {
    pub fn new(scanning: &ScanningConfig, descriptions: &DescriptionConfig) -> Result<Self> {
        let language_parser: Box<dyn LanguageParser> = Box::new(PythonParser::new()?);

        Ok(Self {
            config: scanning.clone(),
            language_parser,
            resolver: DescriptionResolver::new(descriptions),
        })
    }

    /// Scan every candidate file directly inside `dir`.
    ///
    /// A missing directory or a file that cannot be read or parsed produces a
    /// warning; the rest of the scan carries on.
    pub fn scan_directory<P: AsRef<Path>>(&mut self, dir: P) -> ModuleMap {
        let dir = dir.as_ref();
        let mut modules = ModuleMap::new();

        if !dir.is_dir() {
            warn!("{} directory not found", dir.display());
            return modules;
        }

        debug!(
            "Scanning {} for {} sources",
            dir.display(),
            self.language_parser.language_name()
        );

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Could not read directory entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();

            if !entry.file_type().is_file() || !self.should_scan_file(path) {
                continue;
            }

            match self.analyze_file(dir, path) {
                Ok((module_name, info)) => {
                    debug!(
                        "Analyzed {}: {} functions, {} classes",
                        module_name,
                        info.functions.len(),
                        info.classes.len()
                    );
                    modules.insert(module_name, info);
                }
                Err(e) => warn!("Could not analyze {}: {}", path.display(), e),
            }
        }

        modules
    }

    /// Read, parse and describe a single file
    pub fn analyze_file(&mut self, dir: &Path, path: &Path) -> Result<(String, ModuleInfo)> {
        let module_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .ok_or_else(|| ArchDiagramError::FileSystem(format!("No file stem: {}", path.display())))?;

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > self.config.max_file_size as u64 {
            return Err(ArchDiagramError::Parser(format!(
                "File {} exceeds maximum size limit",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let mut definitions = self.language_parser.extract_definitions(&content)?;
        definitions.functions.truncate(self.config.max_functions);
        definitions.classes.truncate(self.config.max_classes);

        let file_name = path.file_name().unwrap_or_default();
        let info = ModuleInfo {
            file_path: dir.join(file_name).to_string_lossy().to_string(),
            description: self.resolver.resolve(&content, &module_name),
            functions: definitions.functions,
            classes: definitions.classes,
            imports: definitions.imports,
        };

        Ok((module_name, info))
    }

    /// Extension matches and the name does not carry the excluded prefix
    fn should_scan_file(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        if !self.config.exclude_prefix.is_empty() && file_name.starts_with(&self.config.exclude_prefix) {
            return false;
        }

        let extension = path.extension().and_then(|ext| ext.to_str());
        extension == Some(self.config.extension.as_str())
            && self.language_parser.file_extensions().contains(&self.config.extension.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn scanner() -> SourceScanner {
        SourceScanner::new(&ScanningConfig::default(), &DescriptionConfig::default()).unwrap()
    }

    #[test]
    fn test_missing_directory_gives_empty_map() {
        let dir = tempdir().unwrap();
        let modules = scanner().scan_directory(dir.path().join("does_not_exist"));
        assert!(modules.is_empty());
    }

    #[test]
    fn test_invalid_and_excluded_files_are_omitted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("__init__.py"), "").unwrap();
        fs::write(dir.path().join("good.py"), "def ok():\n    return 1\n").unwrap();
        fs::write(dir.path().join("also_good.py"), "class Fine:\n    pass\n").unwrap();
        fs::write(dir.path().join("broken.py"), "def broken(:\n    return 1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "def not_python(): pass\n").unwrap();

        let modules = scanner().scan_directory(dir.path());

        // 4 python files, 1 invalid, 1 excluded
        assert_eq!(modules.len(), 2);
        assert!(modules.contains_key("good"));
        assert!(modules.contains_key("also_good"));
        assert!(!modules.contains_key("broken"));
        assert!(!modules.contains_key("__init__"));
    }

    #[test]
    fn test_non_utf8_file_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("latin.py"), [0x23, 0x20, 0xff, 0xfe, 0x0a]).unwrap();
        fs::write(dir.path().join("cli.py"), "import sys\n").unwrap();

        let modules = scanner().scan_directory(dir.path());
        assert_eq!(modules.keys().collect::<Vec<_>>(), vec!["cli"]);
    }

    #[test]
    fn test_python2_file_counts_as_invalid() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("old.py"), "print \"hello\"\n").unwrap();
        fs::write(dir.path().join("new.py"), "print(\"hello\")\n").unwrap();

        let modules = scanner().scan_directory(dir.path());
        assert_eq!(modules.keys().collect::<Vec<_>>(), vec!["new"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_module_is_scanned() {
        let dir = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(target.path().join("real.py"), "def linked_fn():\n    pass\n").unwrap();
        std::os::unix::fs::symlink(target.path().join("real.py"), dir.path().join("linked.py")).unwrap();
        std::os::unix::fs::symlink(target.path().join("gone.py"), dir.path().join("dangling.py")).unwrap();

        let modules = scanner().scan_directory(dir.path());
        assert_eq!(modules.keys().collect::<Vec<_>>(), vec!["linked"]);
        assert_eq!(modules["linked"].functions, vec!["linked_fn"]);
    }

    #[test]
    fn test_subdirectories_are_not_scanned() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg").join("inner.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("top.py"), "x = 1\n").unwrap();

        let modules = scanner().scan_directory(dir.path());
        assert_eq!(modules.keys().collect::<Vec<_>>(), vec!["top"]);
    }

    #[test]
    fn test_module_info_is_truncated_and_described() {
        let dir = tempdir().unwrap();
        let source = r#""""Loads the SEC filings"""
class A:
    pass

class B:
    pass

class C:
    pass

def one(): pass
def two(): pass
def three(): pass
def four(): pass
"#;
        fs::write(dir.path().join("data_loader.py"), source).unwrap();

        let modules = scanner().scan_directory(dir.path());
        let info = &modules["data_loader"];
        assert_eq!(info.description, "Loads the SEC filings");
        assert_eq!(info.functions, vec!["one", "two", "three"]);
        assert_eq!(info.classes, vec!["A", "B"]);
        assert!(info.file_path.ends_with("data_loader.py"));
    }

    #[test]
    fn test_oversized_file_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("big.py"), "x = 1\n".repeat(10)).unwrap();

        let scanning = ScanningConfig { max_file_size: 8, ..ScanningConfig::default() };
        let mut scanner = SourceScanner::new(&scanning, &DescriptionConfig::default()).unwrap();
        assert!(scanner.scan_directory(dir.path()).is_empty());
    }
}
