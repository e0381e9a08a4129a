//! Source tree discovery.
//!
//! ## Directory Structure
//!
//! ```text
//! content/sketches/        # Source root
//! ├── A/                   # Collection "A"
//! │   ├── cat.jpg          # Item
//! │   ├── dog.JPG          # Item (extension match is case-insensitive)
//! │   ├── notes.txt        # Ignored
//! │   └── drafts/          # Ignored (no recursion inside collections)
//! └── B/                   # Collection "B" (empty collections are kept)
//! ```
//!
//! Both listings preserve the order the filesystem returns. Any sorting is
//! applied later by the collection processor according to config.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to list {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ScanError {
    fn read_dir(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| ScanError::ReadDir {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A discovered collection directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDir {
    pub name: String,
    pub path: PathBuf,
}

/// Immediate subdirectories of `root`, one collection each, in listing order.
pub async fn discover_collections(root: &Path) -> Result<Vec<CollectionDir>, ScanError> {
    let mut entries = fs::read_dir(root).await.map_err(ScanError::read_dir(root))?;
    let mut collections = Vec::new();

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(ScanError::read_dir(root))?
    {
        let path = entry.path();
        let is_dir = fs::metadata(&path).await.is_ok_and(|m| m.is_dir());
        if is_dir {
            collections.push(CollectionDir {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }
    }

    Ok(collections)
}

/// Regular files in `dir` whose extension equals `extension`
/// (case-insensitive), as file names in listing order.
pub async fn list_source_files(dir: &Path, extension: &str) -> Result<Vec<String>, ScanError> {
    let mut entries = fs::read_dir(dir).await.map_err(ScanError::read_dir(dir))?;
    let mut files = Vec::new();

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(ScanError::read_dir(dir))?
    {
        let path = entry.path();
        if !has_extension(&path, extension) {
            continue;
        }
        if fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[tokio::test]
    async fn discover_collections_finds_subdirectories_only() {
        let tmp = TempDir::new().unwrap();
        std_fs::create_dir(tmp.path().join("A")).unwrap();
        std_fs::create_dir(tmp.path().join("B")).unwrap();
        std_fs::write(tmp.path().join("stray.jpg"), b"x").unwrap();

        let collections = discover_collections(tmp.path()).await.unwrap();
        let names = sorted(collections.iter().map(|c| c.name.clone()).collect());
        assert_eq!(names, vec!["A", "B"]);
        for c in &collections {
            assert_eq!(c.path, tmp.path().join(&c.name));
        }
    }

    #[tokio::test]
    async fn discover_collections_does_not_recurse() {
        let tmp = TempDir::new().unwrap();
        std_fs::create_dir_all(tmp.path().join("A/nested")).unwrap();

        let collections = discover_collections(tmp.path()).await.unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].name, "A");
    }

    #[tokio::test]
    async fn discover_collections_empty_root() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_collections(tmp.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn discover_collections_missing_root_errors() {
        let tmp = TempDir::new().unwrap();
        let err = discover_collections(&tmp.path().join("nope"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn list_source_files_filters_by_extension() {
        let tmp = TempDir::new().unwrap();
        for name in ["cat.jpg", "dog.JPG", "notes.txt", "scan.jpeg", "jpg"] {
            std_fs::write(tmp.path().join(name), b"x").unwrap();
        }

        let files = list_source_files(tmp.path(), "jpg").await.unwrap();
        assert_eq!(sorted(files), vec!["cat.jpg", "dog.JPG"]);
    }

    #[tokio::test]
    async fn list_source_files_ignores_directories() {
        let tmp = TempDir::new().unwrap();
        std_fs::create_dir(tmp.path().join("folder.jpg")).unwrap();
        std_fs::write(tmp.path().join("real.jpg"), b"x").unwrap();

        let files = list_source_files(tmp.path(), "jpg").await.unwrap();
        assert_eq!(files, vec!["real.jpg"]);
    }

    #[tokio::test]
    async fn list_source_files_accepts_dotted_extension() {
        let tmp = TempDir::new().unwrap();
        std_fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        let files = list_source_files(tmp.path(), ".jpg").await.unwrap();
        assert_eq!(files, vec!["a.jpg"]);
    }

    #[tokio::test]
    async fn list_source_files_missing_dir_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(list_source_files(&tmp.path().join("gone"), "jpg").await.is_err());
    }
}
