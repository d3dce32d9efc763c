//! # mocksmith
//!
//! Interface declarations to testify mocks.
//!
//! A Rust library for synthesizing mock implementations of Go
//! interfaces. Interfaces are described in YAML declaration files,
//! resolved into a type model, and rendered as Go source that records
//! calls in the `github.com/stretchr/testify/mock` ledger.
//!
//! ## Modules
//!
//! - [`schema`]: Parse, validate and resolve declaration files
//! - [`model`]: Contracts, methods and type expressions
//! - [`imports`]: Import alias binding with collision resolution
//! - [`render`]: Go spelling of type expressions
//! - [`synth`]: Mock struct, forwarding methods and expectation builder
//! - [`finish`]: Import cleanup and external formatters
//! - [`output`]: File placement and batch generation to disk
//! - [`discover`]: Finding declaration files and selecting interfaces
//! - [`roots`]: Source roots for localizing absolute package paths
//! - [`naming`]: Identifier and file-name helpers

pub mod discover;
pub mod error;
pub mod finish;
pub mod imports;
pub mod model;
pub mod naming;
pub mod output;
pub mod render;
pub mod roots;
pub mod schema;
pub mod synth;

/// Version stamped into generated file headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
