use sha2::{Digest, Sha256};

/// Outcome of comparing a freshly rendered file with what is on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentDiff {
    Created,
    Updated,
    Unchanged,
}

impl ContentDiff {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentDiff::Created => "created",
            ContentDiff::Updated => "updated",
            ContentDiff::Unchanged => "unchanged",
        }
    }
}

/// Content-hash comparison for generated output
pub struct ContentDiffer;

impl ContentDiffer {
    pub fn new() -> Self {
        Self
    }

    /// SHA256 of the content, hex encoded
    pub fn calculate_hash(&self, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn diff_content(&self, existing: Option<&str>, new_content: &str) -> ContentDiff {
        match existing {
            None => ContentDiff::Created,
            Some(old) if old == new_content => ContentDiff::Unchanged,
            Some(_) => ContentDiff::Updated,
        }
    }
}

impl Default for ContentDiffer {
    fn default() -> Self {
        Self::new()
    }
}
