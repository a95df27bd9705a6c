use crate::error::{Error, Result};
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Recursive source discovery for a project directory.
///
/// `SourceScanner` walks the project tree and collects every `.rs` file,
/// skipping build output (`target/`) and hidden directories. The file
/// list is returned sorted by path so downstream stages see declarations
/// in a stable order regardless of filesystem enumeration.
///
/// # Example
///
/// ```no_run
/// use routegen::scanner::SourceScanner;
/// use std::path::PathBuf;
///
/// let scanner = SourceScanner::new(PathBuf::from("./my-service"));
/// let scan = scanner.scan().unwrap();
/// println!("found {} Rust files", scan.files.len());
/// ```
pub struct SourceScanner {
    root: PathBuf,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Paths of all discovered `.rs` files, sorted.
    pub files: Vec<PathBuf>,
    /// Entries that could not be read; the scan keeps going past them.
    pub warnings: Vec<String>,
}

impl SourceScanner {
    /// Creates a scanner rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Walks the tree and collects `.rs` files.
    ///
    /// Skips the `target` directory and any directory starting with `.`.
    /// Unreadable entries become warnings rather than failures so one bad
    /// permission bit cannot hide the rest of the project.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "project root {} is not a directory",
                self.root.display()
            )));
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root).into_iter().filter_entry(|e| {
            if e.path() == self.root {
                return true;
            }

            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && name != "target"
        }) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        // Declaration-encounter order starts here: path order, not
        // readdir order.
        files.sort();

        Ok(ScanResult { files, warnings })
    }
}
