//! Locating declaration files under a directory and picking the
//! interfaces to mock from them.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::GenerateError;
use crate::model::Contract;
use crate::schema::{parse_declarations, resolve_declarations};

/// Extensions recognized as declaration files.
pub const DECLARATION_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Which interfaces to mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Named(String),
}

impl Selection {
    fn matches(&self, contract: &Contract) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => contract.name == *name,
        }
    }
}

fn is_declaration_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DECLARATION_EXTENSIONS.contains(&ext))
}

/// Declaration files in `dir`, sorted by path. Hidden directories and
/// `vendor` trees are not descended into.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] if a directory cannot be read.
pub fn declaration_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, GenerateError> {
    let mut files = Vec::new();
    collect(dir, recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<(), GenerateError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            let skip = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.') || n == "vendor");
            if recursive && !skip {
                collect(&path, recursive, files)?;
            }
        } else if is_declaration_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Interfaces loaded from a set of declaration files, plus the files
/// that could not be loaded.
#[derive(Debug, Default)]
pub struct Loaded {
    pub contracts: Vec<Contract>,
    /// One [`GenerateError::Declaration`] per file that failed.
    pub skipped: Vec<GenerateError>,
}

fn load_file(path: &Path) -> Result<Vec<Contract>, GenerateError> {
    let file = parse_declarations(path)?;
    resolve_declarations(&file, Some(path))
}

/// Parse and resolve every interface declared in `files`, in order.
///
/// A file that fails to parse or resolve is recorded in
/// [`Loaded::skipped`] so one malformed file does not hide the
/// interfaces declared elsewhere.
pub fn load_contracts(files: &[PathBuf]) -> Loaded {
    let mut loaded = Loaded::default();
    for path in files {
        match load_file(path) {
            Ok(resolved) => {
                debug!(path = %path.display(), interfaces = resolved.len(), "loaded declarations");
                loaded.contracts.extend(resolved);
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping declaration file");
                loaded.skipped.push(GenerateError::Declaration {
                    path: path.clone(),
                    source: Box::new(err),
                });
            }
        }
    }
    loaded
}

/// Find the contracts under `dir` matching `selection`.
///
/// # Errors
///
/// Returns [`GenerateError::UnknownInterface`] if a named interface is
/// not declared in any loadable file under `dir`, or an I/O error if
/// `dir` cannot be listed.
pub fn discover(dir: &Path, recursive: bool, selection: &Selection) -> Result<Loaded, GenerateError> {
    let files = declaration_files(dir, recursive)?;
    let mut loaded = load_contracts(&files);
    loaded.contracts.retain(|c| selection.matches(c));
    match selection {
        Selection::Named(name) if loaded.contracts.is_empty() => {
            Err(GenerateError::UnknownInterface(name.clone()))
        }
        _ => Ok(loaded),
    }
}
