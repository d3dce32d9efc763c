//! Declaration synthesizer: emits the mock type for one interface.
//!
//! The output is a Go source file holding the mock struct, its
//! expectation builder, and for every interface method a forwarding
//! method on the mock plus an expectation method on the builder. Both
//! sides hand arguments to the testify call ledger in the same shape,
//! so expectations match calls value by value even for variadic
//! methods.
//!
//! A [`Generator`] owns exactly one [`ImportRegistry`] and one text
//! buffer, and [`Generator::generate`] consumes it. Synthesizing the
//! same contract twice therefore yields byte-identical text.

mod expectation;
mod forwarding;
mod params;
mod prologue;

use tracing::debug;

use crate::error::GenerateError;
use crate::imports::ImportRegistry;
use crate::model::{Contract, Method, TypeExpr};
use crate::naming::mock_type_name;
use crate::render::TypeRenderer;
use crate::roots::SourceRoots;

/// Import path of the call ledger the generated code records into.
pub const LEDGER_PATH: &str = "github.com/stretchr/testify/mock";
/// Alias the ledger package is always bound to.
pub const LEDGER_ALIAS: &str = "mock";
/// Package clause used for mocks generated outside the interface's package.
pub const DEFAULT_PACKAGE: &str = "mocks";

/// Per-run settings shared by every generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Package clause for out-of-package mocks.
    pub package_name: String,
    /// Generate into the interface's own package.
    pub in_package: bool,
    /// Extra header note. A literal `\n` starts a new comment line.
    pub note: String,
    pub source_roots: SourceRoots,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE.to_string(),
            in_package: false,
            note: String::new(),
            source_roots: SourceRoots::default(),
        }
    }
}

/// Builds a [`Generator`]; see [`Generator::builder`].
#[derive(Debug, Default)]
pub struct GeneratorBuilder<'c> {
    contract: Option<&'c Contract>,
    config: GeneratorConfig,
}

impl<'c> GeneratorBuilder<'c> {
    #[must_use]
    pub fn contract(mut self, contract: &'c Contract) -> Self {
        self.contract = Some(contract);
        self
    }

    #[must_use]
    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn package_name(mut self, name: impl Into<String>) -> Self {
        self.config.package_name = name.into();
        self
    }

    #[must_use]
    pub fn in_package(mut self, in_package: bool) -> Self {
        self.config.in_package = in_package;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.config.note = note.into();
        self
    }

    #[must_use]
    pub fn source_roots(mut self, roots: SourceRoots) -> Self {
        self.config.source_roots = roots;
        self
    }

    /// # Errors
    ///
    /// Returns [`GenerateError::NotSetup`] when no contract was given.
    pub fn build(self) -> Result<Generator<'c>, GenerateError> {
        let contract = self.contract.ok_or(GenerateError::NotSetup)?;
        Ok(Generator::new(contract, self.config))
    }
}

/// One synthesis pass over one contract.
#[derive(Debug)]
pub struct Generator<'c> {
    contract: &'c Contract,
    config: GeneratorConfig,
    imports: ImportRegistry,
    buf: String,
}

impl<'c> Generator<'c> {
    pub fn builder() -> GeneratorBuilder<'c> {
        GeneratorBuilder::default()
    }

    fn new(contract: &'c Contract, config: GeneratorConfig) -> Self {
        let mut imports = ImportRegistry::new(config.source_roots.clone());
        imports.bind(LEDGER_PATH, LEDGER_ALIAS);
        Self {
            contract,
            config,
            imports,
            buf: String::new(),
        }
    }

    pub fn mock_name(&self) -> String {
        mock_type_name(&self.contract.name, self.config.in_package)
    }

    /// Package clause of the generated file.
    pub fn package_clause(&self) -> &str {
        if self.config.in_package {
            &self.contract.package.name
        } else {
            &self.config.package_name
        }
    }

    /// Run the pass and return the raw, unfinished source text.
    ///
    /// # Errors
    ///
    /// Fails with [`GenerateError::Render`] when a method mentions a
    /// non-empty inline interface and with
    /// [`GenerateError::BadVariadic`] when a variadic method's final
    /// parameter is not a slice.
    pub fn generate(mut self) -> Result<String, GenerateError> {
        debug!(
            interface = %self.contract.name,
            package = %self.contract.package.path,
            in_package = self.config.in_package,
            "synthesizing mock"
        );
        self.populate_imports()?;
        self.prologue_note();
        self.prologue();
        self.declarations()?;
        Ok(self.buf)
    }

    /// Bind every package the file will mention before anything is
    /// written, so argument renaming sees the final alias set.
    fn populate_imports(&mut self) -> Result<(), GenerateError> {
        let contract = self.contract;
        for method in &contract.methods {
            for slot in method.params.iter().chain(&method.results) {
                self.render(method, &slot.ty)?;
            }
        }
        let own = TypeExpr::named(Some(contract.package.clone()), contract.name.clone());
        TypeRenderer::new(&mut self.imports, &contract.package, self.config.in_package)
            .render(&own)
            .map_err(|source| GenerateError::Render {
                contract: contract.name.clone(),
                method: String::new(),
                source,
            })?;
        Ok(())
    }

    fn render(&mut self, method: &Method, ty: &TypeExpr) -> Result<String, GenerateError> {
        TypeRenderer::new(&mut self.imports, &self.contract.package, self.config.in_package)
            .render(ty)
            .map_err(|source| GenerateError::Render {
                contract: self.contract.name.clone(),
                method: method.name.clone(),
                source,
            })
    }

    fn declarations(&mut self) -> Result<(), GenerateError> {
        let contract = self.contract;
        let mock = self.mock_name();
        let expectation = format!("{mock}Expectation");

        self.buf.push_str(&format!(
            "// {mock} is an autogenerated mock type for the {} type\n",
            contract.name
        ));
        self.buf
            .push_str(&format!("type {mock} struct {{\n\t{LEDGER_ALIAS}.Mock\n}}\n\n"));
        self.buf.push_str(&format!(
            "type {expectation} struct {{\n\tmock *{LEDGER_ALIAS}.Mock\n}}\n\n"
        ));
        self.buf.push_str(&format!(
            "func (_m *{mock}) Expect() *{expectation} {{\n\treturn &{expectation}{{mock: &_m.Mock}}\n}}\n"
        ));

        for method in &contract.methods {
            self.buf.push('\n');
            let params = self.param_list(method, &method.params, method.variadic)?;
            let returns = self.param_list(method, &method.results, false)?;
            self.mock_method(&mock, &method.name, &params, &returns);
            self.mock_method_expectation(&mock, &method.name, &params, &returns);
        }
        Ok(())
    }
}

/// Synthesize the raw mock source for `contract` with a fresh generator.
pub fn synthesize(contract: &Contract, config: &GeneratorConfig) -> Result<String, GenerateError> {
    Generator::builder()
        .contract(contract)
        .config(config.clone())
        .build()?
        .generate()
}
