use crate::VERSION;

use super::Generator;

impl Generator<'_> {
    /// Generated-code marker plus the optional user note.
    pub(super) fn prologue_note(&mut self) {
        self.buf.push_str(&format!(
            "// Code generated by mocksmith v{VERSION}. DO NOT EDIT.\n"
        ));
        if !self.config.note.is_empty() {
            self.buf.push('\n');
            for line in self.config.note.split("\\n") {
                self.buf.push_str(&format!("// {line}\n"));
            }
        }
        self.buf.push('\n');
    }

    /// Package clause and one import per bound alias, sorted by alias.
    /// In-package mocks never import their own package.
    pub(super) fn prologue(&mut self) {
        let clause = self.package_clause().to_string();
        self.buf.push_str(&format!("package {clause}\n\n"));

        let own = self
            .config
            .in_package
            .then(|| self.imports.localize(&self.contract.package.path));
        for (alias, path) in self.imports.entries() {
            if own.as_deref() == Some(path) {
                continue;
            }
            self.buf.push_str(&format!("import {alias} \"{path}\"\n"));
        }
        self.buf.push('\n');
    }
}
