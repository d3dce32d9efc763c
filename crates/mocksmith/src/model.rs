//! Type model: the read-only view over an interface's method set.
//!
//! A [`Contract`] is one Go interface: its name, the package it lives
//! in, and its methods in declaration order. Parameter and result types
//! are [`TypeExpr`] trees. Named types are referenced by identity; their
//! underlying form is attached once so that nilability can be decided
//! structurally without unfolding recursive definitions.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::naming::default_package_name;

/// A Go package: canonical import path plus short name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Package {
    pub path: String,
    pub name: String,
}

impl Package {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Package whose short name is derived from the last path segment.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = default_package_name(&path);
        Self { path, name }
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    Both,
    Recv,
    Send,
}

/// A reference to a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedType {
    /// Owning package; `None` for universe names and bare local names.
    pub package: Option<Package>,
    pub name: String,
    /// Underlying form, when known. Used only for classification.
    #[serde(skip)]
    pub underlying: Option<Box<TypeExpr>>,
}

/// A field of an anonymous struct. `name: None` marks an embedded field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

/// A function signature. When `variadic` is set the last parameter's
/// type is a slice whose element is the variadic element type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub variadic: bool,
}

/// A type expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    /// Predeclared basic type such as `string` or `int64`.
    Basic { name: String },
    Named(NamedType),
    Pointer { elem: Box<TypeExpr> },
    Array { len: u64, elem: Box<TypeExpr> },
    Slice { elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func(Signature),
    Struct { fields: Vec<Field> },
    /// Inline interface. An empty method list is `interface{}`.
    Interface { methods: Vec<String> },
}

impl TypeExpr {
    pub fn basic(name: impl Into<String>) -> Self {
        Self::Basic { name: name.into() }
    }

    /// A named type with no known underlying form.
    pub fn named(package: Option<Package>, name: impl Into<String>) -> Self {
        Self::Named(NamedType {
            package,
            name: name.into(),
            underlying: None,
        })
    }

    /// A named type together with its underlying form.
    pub fn named_with(package: Option<Package>, name: impl Into<String>, underlying: TypeExpr) -> Self {
        Self::Named(NamedType {
            package,
            name: name.into(),
            underlying: Some(Box::new(underlying)),
        })
    }

    /// The predeclared `error` interface.
    pub fn error() -> Self {
        Self::named_with(
            None,
            "error",
            Self::Interface {
                methods: vec!["Error() string".to_string()],
            },
        )
    }

    pub fn empty_interface() -> Self {
        Self::Interface {
            methods: Vec::new(),
        }
    }

    pub fn pointer(elem: TypeExpr) -> Self {
        Self::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: TypeExpr) -> Self {
        Self::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn array(len: u64, elem: TypeExpr) -> Self {
        Self::Array {
            len,
            elem: Box::new(elem),
        }
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan(dir: ChanDir, elem: TypeExpr) -> Self {
        Self::Chan {
            dir,
            elem: Box::new(elem),
        }
    }

    /// True for the predeclared `error` type.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Named(n) if n.package.is_none() && n.name == "error")
    }

    /// True for `interface{}`.
    pub fn is_empty_interface(&self) -> bool {
        matches!(self, Self::Interface { methods } if methods.is_empty())
    }
}

/// Fully qualified Go spelling, used in diagnostics. Package paths are
/// written out in full rather than aliased.
impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { name } => write!(f, "{name}"),
            Self::Named(n) => match n.package {
                Some(ref pkg) => write!(f, "{}.{}", pkg.path, n.name),
                None => write!(f, "{}", n.name),
            },
            Self::Pointer { elem } => write!(f, "*{elem}"),
            Self::Array { len, elem } => write!(f, "[{len}]{elem}"),
            Self::Slice { elem } => write!(f, "[]{elem}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
            },
            Self::Func(sig) => {
                write!(f, "func(")?;
                write_params(f, &sig.params, sig.variadic)?;
                write!(f, ")")?;
                match sig.results.as_slice() {
                    [] => Ok(()),
                    [single] => write!(f, " {}", single.ty),
                    many => {
                        write!(f, " (")?;
                        write_params(f, many, false)?;
                        write!(f, ")")
                    }
                }
            }
            Self::Struct { fields } => {
                write!(f, "struct{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    match field.name {
                        Some(ref name) => write!(f, "{name} {}", field.ty)?,
                        None => write!(f, "{}", field.ty)?,
                    }
                }
                write!(f, "}}")
            }
            Self::Interface { methods } => write!(f, "interface{{{}}}", methods.join("; ")),
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[Param], variadic: bool) -> fmt::Result {
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match (&p.ty, variadic && i + 1 == params.len()) {
            (TypeExpr::Slice { elem }, true) => write!(f, "...{elem}")?,
            (ty, _) => write!(f, "{ty}")?,
        }
    }
    Ok(())
}

/// A parameter or result slot. An empty name means unnamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn unnamed(ty: TypeExpr) -> Self {
        Self::new("", ty)
    }
}

/// One interface method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// The final parameter is variadic; its type must be a slice.
    pub variadic: bool,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            results: Vec::new(),
            variadic: false,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeExpr) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    pub fn returns(mut self, ty: TypeExpr) -> Self {
        self.results.push(Param::unnamed(ty));
        self
    }

    /// Mark the last parameter variadic.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

/// The interface being mocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contract {
    pub name: String,
    pub package: Package,
    pub methods: Vec<Method>,
    /// Declaration file the contract was loaded from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl Contract {
    pub fn new(name: impl Into<String>, package: Package) -> Self {
        Self {
            name: name.into(),
            package,
            methods: Vec::new(),
            source: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Exported by Go's naming rule (leading upper-case letter).
    pub fn is_exported(&self) -> bool {
        crate::naming::is_exported(&self.name)
    }
}
