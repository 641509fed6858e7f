use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// File system access used during analysis.
///
/// Every read goes through this trait so a whole library can be analyzed from
/// memory in tests.
pub trait FileSystem: Send + Sync {
    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Read a file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real file system implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory file system for tests and embedding.
///
/// Paths are normalized lexically on insert and lookup.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files
            .insert(normalize_path(path.as_ref()), contents.into());
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.add_file(path, contents);
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

/// Resolve `.` and `..` segments without touching the disk.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_collapses_segments() {
        assert_eq!(
            normalize_path(Path::new("/lib/a/./b/../c.d.ts")),
            PathBuf::from("/lib/a/c.d.ts")
        );
    }

    #[test]
    fn test_memory_fs_lookup_is_normalized() {
        let fs = MemoryFileSystem::new().with_file("/lib/index.d.ts", "export {};");
        assert!(fs.exists(Path::new("/lib/./components/../index.d.ts")));
        assert!(fs.read_to_string(Path::new("/lib/missing.d.ts")).is_err());
    }
}
