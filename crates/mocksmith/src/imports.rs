//! Import registry: per-synthesis mapping between package paths and
//! the short aliases generated code uses to reference them.
//!
//! A registry lives for exactly one synthesis pass. Aliases are bound
//! on first use and reused afterwards; a suggested alias that is taken
//! is replaced by one built from the path's trailing segments, and only
//! then by a numbered variant.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::{debug, warn};

use crate::naming::{default_package_name, sanitize_identifier};
use crate::roots::SourceRoots;

/// Directory name whose prefix is stripped from vendored paths.
pub const VENDOR_SEGMENT: &str = "vendor";

#[derive(Debug, Clone, Default)]
pub struct ImportRegistry {
    roots: SourceRoots,
    localization_cache: HashMap<String, String>,
    path_to_alias: BTreeMap<String, String>,
    alias_to_path: BTreeMap<String, String>,
}

impl ImportRegistry {
    pub fn new(roots: SourceRoots) -> Self {
        Self {
            roots,
            ..Self::default()
        }
    }

    /// Alias for `path`, binding a fresh non-conflicting one if needed.
    pub fn bind(&mut self, path: &str, suggested: &str) -> String {
        let path = self.localize(path);
        if let Some(existing) = self.path_to_alias.get(&path) {
            return existing.clone();
        }

        let alias = self.non_conflicting_alias(&path, suggested);
        debug!(%path, %alias, "bound import alias");
        self.path_to_alias.insert(path.clone(), alias.clone());
        self.alias_to_path.insert(alias.clone(), path);
        alias
    }

    fn non_conflicting_alias(&self, path: &str, suggested: &str) -> String {
        let suggested = if suggested.is_empty() {
            default_package_name(path)
        } else {
            suggested.to_string()
        };
        if !self.contains_alias(&suggested) {
            return suggested;
        }

        // Localized paths always use '/', whatever the host.
        let segments: Vec<String> = path.split('/').map(sanitize_identifier).collect();
        for take in 1..=segments.len() {
            let candidate = segments[segments.len() - take..].concat();
            if !candidate.is_empty() && !self.contains_alias(&candidate) {
                return candidate;
            }
        }

        let mut n: u64 = 2;
        loop {
            let candidate = format!("{suggested}{n}");
            if !self.contains_alias(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Normalize a package location into an import path.
    ///
    /// Drops a trailing `.go` file, strips everything up to the last
    /// `vendor` segment, and rewrites absolute paths relative to the
    /// first source root that contains them. The result always uses
    /// `/` separators.
    pub fn localize(&mut self, path: &str) -> String {
        if let Some(hit) = self.localization_cache.get(path) {
            return hit.clone();
        }
        let localized = self.compute_localized(path);
        self.localization_cache
            .insert(path.to_string(), localized.clone());
        localized
    }

    fn compute_localized(&self, raw: &str) -> String {
        let dir = if raw.ends_with(".go") {
            raw.rfind(['/', '\\']).map_or("", |idx| &raw[..idx])
        } else {
            raw
        };

        let segments: Vec<&str> = dir.split(['/', '\\']).collect();
        if let Some(idx) = segments.iter().rposition(|s| *s == VENDOR_SEGMENT) {
            return segments[idx + 1..]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("/");
        }

        if is_absolute(dir)
            && let Some(relative) = self.relative_to_roots(dir)
        {
            return to_slash(&relative);
        }
        to_slash(dir)
    }

    fn relative_to_roots(&self, path: &str) -> Option<String> {
        for root in self.roots.iter() {
            if !path.starts_with(root.to_string_lossy().as_ref()) {
                continue;
            }
            match Path::new(path).strip_prefix(root) {
                Ok(relative) => return Some(relative.to_string_lossy().into_owned()),
                Err(err) => {
                    warn!(path, root = %root.display(), %err, "unable to localize path");
                }
            }
        }
        None
    }

    /// All bound aliases in lexicographic order.
    pub fn sorted_aliases(&self) -> Vec<&str> {
        self.alias_to_path.keys().map(String::as_str).collect()
    }

    /// `(alias, path)` pairs ordered by alias.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.alias_to_path
            .iter()
            .map(|(alias, path)| (alias.as_str(), path.as_str()))
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.alias_to_path.contains_key(alias)
    }

    pub fn path_of(&self, alias: &str) -> Option<&str> {
        self.alias_to_path.get(alias).map(String::as_str)
    }

    /// Alias bound to an already-localized path.
    pub fn alias_of(&self, path: &str) -> Option<&str> {
        self.path_to_alias.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.alias_to_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alias_to_path.is_empty()
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || Path::new(path).is_absolute()
}

fn to_slash(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    match slashed.trim_end_matches('/') {
        "" if slashed.starts_with('/') => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn registry() -> ImportRegistry {
        ImportRegistry::new(SourceRoots::default())
    }

    #[test]
    fn free_alias_is_used_verbatim() {
        let mut r = registry();
        assert_eq!(r.bind("net/http", "http"), "http");
        assert_eq!(r.path_of("http"), Some("net/http"));
        assert_eq!(r.alias_of("net/http"), Some("http"));
    }

    #[test]
    fn rebinding_same_path_is_idempotent() {
        let mut r = registry();
        let first = r.bind("a/http", "http");
        let second = r.bind("a/http", "http");
        assert_eq!(first, second);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn collision_uses_tail_segments() {
        let mut r = registry();
        assert_eq!(r.bind("a/http", "http"), "http");
        assert_eq!(r.bind("b/http", "http"), "bhttp");
    }

    #[test]
    fn collision_sanitizes_segments() {
        let mut r = registry();
        r.bind("net/http", "http");
        assert_eq!(r.bind("github.com/x-y/http", "http"), "x_yhttp");
    }

    #[test]
    fn longer_tails_are_tried_in_order() {
        let mut r = registry();
        assert_eq!(r.bind("x/http", "http"), "http");
        assert_eq!(r.bind("y/http", "http"), "yhttp");
        assert_eq!(r.bind("z/y/http", "http"), "zyhttp");
        assert_eq!(r.bind("other", "http"), "other");
    }

    #[test]
    fn numeric_suffix_when_all_tails_taken() {
        let mut r = registry();
        r.bind("one", "http");
        r.bind("two", "bhttp");
        r.bind("three", "b");
        assert_eq!(r.bind("b/http", "http"), "http2");
        r.bind("four", "http3");
        let mut r2 = r.clone();
        assert_eq!(r2.bind("c/b/http", "http"), "cbhttp");
        r.bind("five", "cbhttp");
        assert_eq!(r.bind("c/b/http", "http"), "http4");
    }

    #[test]
    fn sorted_aliases_are_lexicographic() {
        let mut r = registry();
        r.bind("github.com/stretchr/testify/mock", "mock");
        r.bind("net/http", "http");
        r.bind("context", "context");
        assert_eq!(r.sorted_aliases(), ["context", "http", "mock"]);
    }

    #[test]
    fn empty_suggestion_uses_path_name() {
        let mut r = registry();
        assert_eq!(r.bind("gopkg.in/yaml.v3", ""), "yaml");
    }

    #[test]
    fn localize_strips_vendor_prefix() {
        let mut r = registry();
        assert_eq!(
            r.localize("/home/u/go/src/app/vendor/github.com/pkg/errors"),
            "github.com/pkg/errors"
        );
        assert_eq!(r.localize("app/vendor/a/vendor/b/c"), "b/c");
    }

    #[test]
    fn localize_drops_go_file() {
        let mut r = registry();
        assert_eq!(r.localize("github.com/acme/fetch/fetch.go"), "github.com/acme/fetch");
    }

    #[test]
    fn localize_relative_to_first_matching_root() {
        let roots = SourceRoots::new(vec![
            PathBuf::from("/nowhere/src"),
            PathBuf::from("/home/u/go/src"),
            PathBuf::from("/home/u/go"),
        ]);
        let mut r = ImportRegistry::new(roots);
        assert_eq!(r.localize("/home/u/go/src/github.com/acme/fetch"), "github.com/acme/fetch");
    }

    #[test]
    fn localize_requires_whole_component_prefix() {
        let roots = SourceRoots::new(vec![PathBuf::from("/go/src")]);
        let mut r = ImportRegistry::new(roots);
        assert_eq!(r.localize("/go/src2/acme"), "/go/src2/acme");
    }

    #[test]
    fn localize_unmatched_absolute_path_is_kept() {
        let mut r = registry();
        assert_eq!(r.localize("/opt/code/acme/"), "/opt/code/acme");
    }

    #[test]
    fn localize_normalizes_backslashes() {
        let mut r = registry();
        assert_eq!(r.localize("acme\\fetch"), "acme/fetch");
    }

    #[test]
    fn bind_localizes_before_lookup() {
        let mut r = registry();
        let a = r.bind("app/vendor/github.com/pkg/errors", "errors");
        let b = r.bind("github.com/pkg/errors", "errors");
        assert_eq!(a, b);
        assert_eq!(r.len(), 1);
    }
}
