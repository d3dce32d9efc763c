use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A declaration file: the interfaces of one Go package.
///
/// Type strings use Go syntax with fully qualified package paths
/// (`net/http.Request`). Unqualified non-builtin names belong to the
/// declared package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationFile {
    pub package: PackageDecl,
    /// Short-name overrides keyed by import path, for packages whose
    /// name differs from their last path segment.
    #[serde(default)]
    pub packages: BTreeMap<String, String>,
    /// Underlying forms of named types, keyed by qualified name.
    #[serde(default)]
    pub types: BTreeMap<String, String>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDecl {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub returns: Vec<ParamDecl>,
    /// The last parameter is variadic. Also implied by a `...T` type.
    #[serde(default)]
    pub variadic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
}
