//! Source roots used to turn absolute package directories into import
//! paths. The list is ordered; the first matching root wins.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRoots {
    roots: Vec<PathBuf>,
}

impl SourceRoots {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Roots from a GOPATH-style list: each entry contributes `<entry>/src`.
    pub fn from_gopath(value: &OsStr) -> Self {
        let roots = std::env::split_paths(value)
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.join("src"))
            .collect();
        Self { roots }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }
}

impl From<Vec<PathBuf>> for SourceRoots {
    fn from(roots: Vec<PathBuf>) -> Self {
        Self::new(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gopath_entries_gain_src() {
        let joined = std::env::join_paths(["/home/a/go", "/opt/go"]).unwrap();
        let roots = SourceRoots::from_gopath(&joined);
        let got: Vec<_> = roots.iter().collect();
        assert_eq!(got, [Path::new("/home/a/go/src"), Path::new("/opt/go/src")]);
    }

    #[test]
    fn empty_gopath_has_no_roots() {
        let roots = SourceRoots::from_gopath(OsStr::new(""));
        assert!(roots.is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let roots = SourceRoots::from(vec![PathBuf::from("/b"), PathBuf::from("/a")]);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots.iter().next(), Some(Path::new("/b")));
    }
}
