//! On-disk layout of the pipeline data.

use std::path::{Path, PathBuf};

/// Paths of every stage's input and output under one data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `root`, usually `data/`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `raw/wealth_data`
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw").join("wealth_data")
    }

    /// Downloaded filings as plain text.
    pub fn sec_filings_dir(&self) -> PathBuf {
        self.raw_dir().join("sec_filings")
    }

    /// Indicator JSON and the combined economic context.
    pub fn fred_data_dir(&self) -> PathBuf {
        self.raw_dir().join("fred_data")
    }

    /// Policy uncertainty CSV, context and download summary.
    pub fn policy_dir(&self) -> PathBuf {
        self.raw_dir().join("policy_uncertainty")
    }

    /// Prepared training corpus.
    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed").join("wealth_data")
    }

    /// Fine-tuned models.
    pub fn models_dir(&self) -> PathBuf {
        self.root.join("finetuned_models")
    }

    /// Directory of the model called `name`.
    pub fn model_dir(&self, name: &str) -> PathBuf {
        self.models_dir().join(name)
    }

    /// Create every directory of the layout.
    pub fn create_all(&self) -> std::io::Result<()> {
        for dir in [
            self.sec_filings_dir(),
            self.fred_data_dir(),
            self.policy_dir(),
            self.processed_dir(),
            self.models_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::new("data")
    }
}

/// Count files in `dir` whose extension is one of `extensions`. A missing
/// directory counts as empty.
pub fn count_files(dir: &Path, extensions: &[&str]) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = DataLayout::new("/tmp/d");
        assert_eq!(
            layout.sec_filings_dir(),
            PathBuf::from("/tmp/d/raw/wealth_data/sec_filings")
        );
        assert_eq!(
            layout.processed_dir(),
            PathBuf::from("/tmp/d/processed/wealth_data")
        );
        assert_eq!(
            layout.model_dir("financial_llm"),
            PathBuf::from("/tmp/d/finetuned_models/financial_llm")
        );
    }

    #[test]
    fn test_count_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        layout.create_all().unwrap();
        let fred = layout.fred_data_dir();
        std::fs::write(fred.join("gdp_data.json"), "{}").unwrap();
        std::fs::write(fred.join("combined_economic_context.txt"), "x").unwrap();
        std::fs::write(fred.join("notes.md"), "x").unwrap();

        assert_eq!(count_files(&fred, &["json", "txt"]), 2);
        assert_eq!(count_files(&fred, &["csv"]), 0);
        assert_eq!(count_files(&dir.path().join("missing"), &["txt"]), 0);
    }
}
