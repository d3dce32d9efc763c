use std::path::PathBuf;

use clap::Args;
use mocksmith::discover::{Selection, discover};
use mocksmith::error::GenerateError;
use mocksmith::finish::{ExternalFormatter, Pipeline};
use mocksmith::model::Contract;
use mocksmith::output::{FileCase, OutputOptions, generate_all, render_mock};
use mocksmith::roots::SourceRoots;
use mocksmith::synth::{DEFAULT_PACKAGE, GeneratorConfig};
use tracing::debug;

/// Flags for `mocksmith generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Name of the interface to mock
    #[arg(long, required_unless_present = "all", conflicts_with = "all")]
    pub name: Option<String>,
    /// Mock every interface found
    #[arg(long)]
    pub all: bool,
    /// Directory to search for declaration files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
    /// Descend into subdirectories of --dir
    #[arg(long)]
    pub recursive: bool,
    /// Directory to write mocks to
    #[arg(long, default_value = "./mocks")]
    pub output: PathBuf,
    /// Print the generated code to stdout instead of writing files
    #[arg(long)]
    pub print: bool,
    /// Generate the mock inside the interface's own package
    #[arg(long)]
    pub inpkg: bool,
    /// Name generated files `*_test.go`
    #[arg(long)]
    pub testonly: bool,
    /// File-name casing: camel (default), snake, or underscore
    #[arg(long, default_value = "camel")]
    pub case: String,
    /// Extra note for the file header; a literal \n starts a new line
    #[arg(long, default_value = "")]
    pub note: String,
    /// Source root for localizing package paths (repeatable, default $GOPATH/src)
    #[arg(long)]
    pub source_root: Vec<PathBuf>,
    /// Formatter program the generated code is piped through, e.g. "gofmt -s"
    #[arg(long)]
    pub formatter: Option<String>,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let case: FileCase = args.case.parse()?;
    let selection = match &args.name {
        Some(name) => Selection::Named(name.clone()),
        None => Selection::All,
    };
    let loaded = discover(&args.dir, args.recursive, &selection)?;
    for skipped in &loaded.skipped {
        eprintln!("skipped: {skipped}");
    }
    // Under --all a skipped file is a set of interfaces that were not generated.
    let skipped = if args.all { loaded.skipped.len() } else { 0 };
    let contracts = loaded.contracts;
    debug!(dir = %args.dir.display(), interfaces = contracts.len(), "discovered interfaces");
    if contracts.is_empty() {
        println!("No interfaces declared in {}", args.dir.display());
        return exit_status(0, skipped);
    }

    let config = GeneratorConfig {
        package_name: DEFAULT_PACKAGE.to_string(),
        in_package: args.inpkg,
        note: args.note.clone(),
        source_roots: source_roots(&args.source_root),
    };
    let pipeline = pipeline(args.formatter.as_deref())?;

    let failed = if args.print {
        print_mocks(&contracts, &config, &pipeline)
    } else {
        let options = OutputOptions {
            output_dir: args.output.clone(),
            case,
            test_only: args.testonly,
        };
        write_mocks(&contracts, &config, &options, &pipeline)
    };

    exit_status(failed, skipped)
}

fn exit_status(failed: usize, skipped: usize) -> Result<(), Box<dyn std::error::Error>> {
    match (failed, skipped) {
        (0, 0) => Ok(()),
        (0, files) => Err(format!("{files} declaration file(s) could not be loaded").into()),
        (n, 0) => Err(format!("{n} interface(s) could not be generated").into()),
        (n, files) => Err(format!(
            "{n} interface(s) could not be generated, {files} declaration file(s) could not be loaded"
        )
        .into()),
    }
}

fn source_roots(explicit: &[PathBuf]) -> SourceRoots {
    if !explicit.is_empty() {
        return SourceRoots::new(explicit.to_vec());
    }
    std::env::var_os("GOPATH")
        .map(|gopath| SourceRoots::from_gopath(&gopath))
        .unwrap_or_default()
}

fn pipeline(formatter: Option<&str>) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let pipeline = Pipeline::standard();
    let Some(command) = formatter else {
        return Ok(pipeline);
    };
    let mut words = command.split_whitespace();
    let program = words.next().ok_or("--formatter needs a program name")?;
    let formatter = words.fold(ExternalFormatter::new(program), |f, arg| f.arg(arg));
    Ok(pipeline.with(formatter))
}

fn print_mocks(contracts: &[Contract], config: &GeneratorConfig, pipeline: &Pipeline) -> usize {
    let mut failed = 0;
    for contract in contracts {
        match render_mock(contract, config, pipeline) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                report_failure(&contract.name, &e);
                failed += 1;
            }
        }
    }
    failed
}

fn write_mocks(
    contracts: &[Contract],
    config: &GeneratorConfig,
    options: &OutputOptions,
    pipeline: &Pipeline,
) -> usize {
    let result = generate_all(contracts, config, options, pipeline);

    if !result.files.is_empty() {
        println!("Generated {} files:", result.files.len());
    }
    for f in &result.files {
        println!(
            "  {} ({}, {} bytes)",
            f.absolute_path.display(),
            f.interface,
            f.bytes
        );
    }
    for failure in &result.failures {
        report_failure(&failure.interface, &failure.error);
    }
    result.failures.len()
}

fn report_failure(interface: &str, error: &GenerateError) {
    eprintln!("error: {interface}: {error}");
    if let Some(text) = error.generated_text() {
        let ruler = "-".repeat(72);
        eprintln!("{ruler}");
        eprint!("{text}");
        if !text.ends_with('\n') {
            eprintln!();
        }
        eprintln!("{ruler}");
    }
}
