//! Finishing passes applied to synthesized text before it is written.
//!
//! [`ImportCleanup`] is the built-in pass: it checks that the text is
//! structurally sound, drops imports the body never references and
//! regroups the rest into one sorted block. [`ExternalFormatter`] pipes
//! the text through a formatter process such as `gofmt`. Any failure
//! carries the unfinished text so it can be shown to the user.

use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::GenerateError;
use crate::naming::{default_package_name, is_identifier};

/// One step of post-processing over a complete source file.
pub trait FinishingPass {
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Returns [`GenerateError::Finish`] holding `text` unchanged when
    /// the pass rejects it.
    fn finish(&self, text: &str) -> Result<String, GenerateError>;
}

/// Passes applied in order.
#[derive(Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn FinishingPass>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import cleanup only.
    pub fn standard() -> Self {
        Self::new().with(ImportCleanup)
    }

    #[must_use]
    pub fn with(mut self, pass: impl FinishingPass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn run(&self, text: String) -> Result<String, GenerateError> {
        self.passes.iter().try_fold(text, |text, pass| {
            debug!(pass = pass.name(), "finishing");
            pass.finish(&text)
        })
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.passes.iter().map(|p| p.name()))
            .finish()
    }
}

/// Built-in import minimization and structural validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportCleanup;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportSpec {
    alias: Option<String>,
    path: String,
}

impl ImportSpec {
    fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        let (alias, quoted) = match spec.split_once(char::is_whitespace) {
            Some((alias, rest)) if !spec.starts_with('"') => (Some(alias.to_string()), rest.trim()),
            _ => (None, spec),
        };
        let path = quoted.strip_prefix('"')?.strip_suffix('"')?;
        Some(Self {
            alias,
            path: path.to_string(),
        })
    }

    /// Name the body refers to the package by.
    fn local_name(&self) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| default_package_name(&self.path))
    }

    fn is_std(&self) -> bool {
        self.path
            .split('/')
            .next()
            .is_some_and(|first| !first.contains('.'))
    }
}

impl fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alias {
            Some(ref alias) => write!(f, "{alias} \"{}\"", self.path),
            None => write!(f, "\"{}\"", self.path),
        }
    }
}

impl FinishingPass for ImportCleanup {
    fn name(&self) -> &str {
        "import-cleanup"
    }

    fn finish(&self, text: &str) -> Result<String, GenerateError> {
        let fail = |message: String| GenerateError::Finish {
            message,
            text: text.to_string(),
        };

        let code = code_only(text);
        check_delimiters(&code).map_err(fail)?;

        let mut header = Vec::new();
        let mut package = None;
        let mut imports: Vec<ImportSpec> = Vec::new();
        let mut body = Vec::new();
        let mut in_block = false;

        for (line_no, (line, code_line)) in text.lines().zip(code.lines()).enumerate() {
            let code_line = code_line.trim();
            if package.is_none() {
                if code_line.is_empty() {
                    header.push(line);
                    continue;
                }
                let name = code_line
                    .strip_prefix("package ")
                    .map(str::trim)
                    .ok_or_else(|| fail(format!("line {}: expected package clause", line_no + 1)))?;
                if !is_identifier(name) {
                    return Err(fail(format!("line {}: invalid package name `{name}`", line_no + 1)));
                }
                package = Some(name.to_string());
                continue;
            }

            let spec_text = if in_block {
                if code_line == ")" {
                    in_block = false;
                    continue;
                }
                if code_line.is_empty() {
                    continue;
                }
                line
            } else if code_line.starts_with("import (") || code_line.starts_with("import(") {
                in_block = true;
                continue;
            } else if let Some(rest) = line.trim().strip_prefix("import ") {
                rest
            } else {
                body.push(line);
                continue;
            };

            let spec = ImportSpec::parse(spec_text)
                .ok_or_else(|| fail(format!("line {}: malformed import `{}`", line_no + 1, line.trim())))?;
            if !imports.iter().any(|i| i.path == spec.path) {
                imports.push(spec);
            }
        }

        let Some(package) = package else {
            return Err(fail("missing package clause".to_string()));
        };

        let body_code = code_only(&body.join("\n"));
        let (used, unused): (Vec<_>, Vec<_>) = imports
            .into_iter()
            .partition(|spec| uses_name(&body_code, &spec.local_name()));
        for spec in &unused {
            debug!(path = %spec.path, "dropping unused import");
        }

        let mut out: Vec<String> = header.iter().map(|l| l.to_string()).collect();
        out.push(String::new());
        out.push(format!("package {package}"));
        out.push(String::new());
        out.extend(import_block(used));
        out.push(String::new());
        out.extend(body.iter().map(|l| l.to_string()));
        Ok(normalize_blank_lines(&out))
    }
}

fn import_block(mut specs: Vec<ImportSpec>) -> Vec<String> {
    specs.sort_by(|a, b| a.path.cmp(&b.path));
    match specs.as_slice() {
        [] => Vec::new(),
        [single] => vec![format!("import {single}")],
        _ => {
            let (std, other): (Vec<_>, Vec<_>) = specs.iter().partition(|s| s.is_std());
            let mut lines = vec!["import (".to_string()];
            lines.extend(std.iter().map(|s| format!("\t{s}")));
            if !std.is_empty() && !other.is_empty() {
                lines.push(String::new());
            }
            lines.extend(other.iter().map(|s| format!("\t{s}")));
            lines.push(")".to_string());
            lines
        }
    }
}

/// Trim trailing whitespace, collapse blank runs, and drop leading
/// and trailing blank lines.
fn normalize_blank_lines(lines: &[String]) -> String {
    let mut out = String::new();
    let mut pending_blank = false;
    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// True if `code` contains a qualified reference `name.X` that is not
/// itself a field selector. A variadic ellipsis in front of the name
/// (`...name.X`) still counts as a reference.
fn uses_name(code: &str, name: &str) -> bool {
    let needle = format!("{name}.");
    code.match_indices(&needle).any(|(idx, _)| {
        let before = &code[..idx];
        match before.chars().next_back() {
            None => true,
            Some('.') => before.ends_with("..."),
            Some(c) => !(c.is_alphanumeric() || c == '_'),
        }
    })
}

/// The text with comments removed and literal contents blanked. Line
/// breaks are preserved so line numbers stay aligned.
fn code_only(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                while chars.next_if(|&n| n != '\n').is_some() {}
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            '"' | '\'' => {
                out.push(c);
                let mut escaped = false;
                while let Some(n) = chars.next_if(|&n| n != '\n') {
                    if escaped {
                        escaped = false;
                    } else if n == '\\' {
                        escaped = true;
                    } else if n == c {
                        break;
                    }
                }
                out.push(c);
            }
            '`' => {
                out.push('`');
                for n in chars.by_ref() {
                    if n == '`' {
                        break;
                    }
                    if n == '\n' {
                        out.push('\n');
                    }
                }
                out.push('`');
            }
            _ => out.push(c),
        }
    }
    out
}

fn check_delimiters(code: &str) -> Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    for (line_no, line) in code.lines().enumerate() {
        for c in line.chars() {
            let open = match c {
                '(' | '[' | '{' => {
                    stack.push((c, line_no + 1));
                    continue;
                }
                ')' => '(',
                ']' => '[',
                '}' => '{',
                _ => continue,
            };
            match stack.pop() {
                Some((found, _)) if found == open => {}
                Some((found, opened)) => {
                    return Err(format!(
                        "line {}: `{c}` closes `{found}` opened on line {opened}",
                        line_no + 1
                    ));
                }
                None => return Err(format!("line {}: unmatched `{c}`", line_no + 1)),
            }
        }
    }
    match stack.pop() {
        Some((open, line)) => Err(format!("`{open}` opened on line {line} is never closed")),
        None => Ok(()),
    }
}

/// Pipes text through an external formatter over stdin/stdout.
#[derive(Debug, Clone)]
pub struct ExternalFormatter {
    program: String,
    args: Vec<String>,
}

impl ExternalFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl FinishingPass for ExternalFormatter {
    fn name(&self) -> &str {
        &self.program
    }

    fn finish(&self, text: &str) -> Result<String, GenerateError> {
        let fail = |message: String| GenerateError::Finish {
            message,
            text: text.to_string(),
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fail(format!("failed to run `{}`: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| fail(format!("`{}` has no stdin", self.program)))?;
        let input = text.to_string();
        // Writing from a second thread keeps a full stdout pipe from
        // stalling the child while it still waits on stdin.
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|e| fail(format!("`{}` did not finish: {e}", self.program)))?;
        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(fail(format!("writing to `{}` failed: {e}", self.program))),
            Err(_) => return Err(fail(format!("writer for `{}` panicked", self.program))),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| fail(format!("`{}` produced invalid UTF-8: {e}", self.program)))
    }
}
