//! Output placement and batch generation to disk.
//!
//! Each contract gets its own generator, so one failing interface is
//! recorded and the batch moves on to the next.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::GenerateError;
use crate::finish::Pipeline;
use crate::model::Contract;
use crate::naming::underscore_case;
use crate::synth::{GeneratorConfig, synthesize};

/// File-name casing for generated mocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileCase {
    /// Interface name as declared.
    #[default]
    Camel,
    Snake,
    Underscore,
}

impl fmt::Display for FileCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camel => write!(f, "camel"),
            Self::Snake => write!(f, "snake"),
            Self::Underscore => write!(f, "underscore"),
        }
    }
}

impl FromStr for FileCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camel" => Ok(Self::Camel),
            "snake" => Ok(Self::Snake),
            "underscore" => Ok(Self::Underscore),
            other => Err(format!(
                "unknown case `{other}` (expected camel, snake or underscore)"
            )),
        }
    }
}

/// Where and under which names mock files are written.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Directory for out-of-package mocks.
    pub output_dir: PathBuf,
    pub case: FileCase,
    /// Name files `*_test.go`.
    pub test_only: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./mocks"),
            case: FileCase::Camel,
            test_only: false,
        }
    }
}

/// File name for the mock of `interface`.
pub fn file_name(interface: &str, case: FileCase, in_package: bool, test_only: bool) -> String {
    let stem = match case {
        FileCase::Camel => interface.to_string(),
        FileCase::Snake | FileCase::Underscore => underscore_case(interface),
    };
    let prefix = if in_package { "mock_" } else { "" };
    let suffix = if test_only { "_test.go" } else { ".go" };
    format!("{prefix}{stem}{suffix}")
}

/// Full path of the mock file. In-package mocks sit next to the
/// declaration file they came from.
pub fn target_path(contract: &Contract, config: &GeneratorConfig, options: &OutputOptions) -> PathBuf {
    let name = file_name(&contract.name, options.case, config.in_package, options.test_only);
    let dir = match contract.source.as_deref().and_then(Path::parent) {
        Some(dir) if config.in_package => dir,
        _ => options.output_dir.as_path(),
    };
    dir.join(name)
}

/// Synthesize and finish the mock for one contract.
pub fn render_mock(
    contract: &Contract,
    config: &GeneratorConfig,
    pipeline: &Pipeline,
) -> Result<String, GenerateError> {
    let raw = synthesize(contract, config)?;
    pipeline.run(raw)
}

/// Manifest of one batch run.
#[derive(Debug, Default)]
pub struct GeneratedFiles {
    /// Files that were written.
    pub files: Vec<GeneratedFile>,
    /// Interfaces that could not be generated.
    pub failures: Vec<GenerationFailure>,
}

impl GeneratedFiles {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A single written mock.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub interface: String,
    /// File name, relative to the directory it was written to.
    pub relative_path: PathBuf,
    /// Path the file was written to.
    pub absolute_path: PathBuf,
    /// Number of bytes written.
    pub bytes: usize,
}

#[derive(Debug)]
pub struct GenerationFailure {
    pub interface: String,
    pub error: GenerateError,
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.interface, self.error)
    }
}

/// Generate and write a mock for every contract.
///
/// Output directories are created as needed. Failures are collected
/// rather than returned, one per interface.
pub fn generate_all(
    contracts: &[Contract],
    config: &GeneratorConfig,
    options: &OutputOptions,
    pipeline: &Pipeline,
) -> GeneratedFiles {
    let mut result = GeneratedFiles::default();
    for contract in contracts {
        match write_mock(contract, config, options, pipeline) {
            Ok(file) => {
                info!(path = %file.absolute_path.display(), bytes = file.bytes, "wrote mock");
                result.files.push(file);
            }
            Err(error) => {
                warn!(interface = %contract.name, %error, "mock generation failed");
                result.failures.push(GenerationFailure {
                    interface: contract.name.clone(),
                    error,
                });
            }
        }
    }
    result
}

fn write_mock(
    contract: &Contract,
    config: &GeneratorConfig,
    options: &OutputOptions,
    pipeline: &Pipeline,
) -> Result<GeneratedFile, GenerateError> {
    let content = render_mock(contract, config, pipeline)?;
    let path = target_path(contract, config, options);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &content)?;
    Ok(GeneratedFile {
        interface: contract.name.clone(),
        relative_path: path.file_name().map(PathBuf::from).unwrap_or_default(),
        absolute_path: path,
        bytes: content.len(),
    })
}
