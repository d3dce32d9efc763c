//! Turn a parsed [`DeclarationFile`] into resolved [`Contract`]s.
//!
//! Unqualified named types are placed in the declared package, package
//! short-name overrides are applied, and named types listed in the
//! `types` table get their underlying form attached. Underlying forms
//! that refer back to a type already being resolved are cut off, so
//! recursive definitions stay finite.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::GenerateError;
use crate::model::{Contract, Field, Method, NamedType, Package, Param, Signature, TypeExpr};
use crate::naming::default_package_name;
use crate::schema::type_parser::{parse_param_type, parse_type};
use crate::schema::types::{DeclarationFile, InterfaceDecl, MethodDecl};

/// The declared package, with its name defaulted from the path.
pub fn declared_package(file: &DeclarationFile) -> Package {
    let name = file
        .package
        .name
        .clone()
        .unwrap_or_else(|| default_package_name(&file.package.path));
    Package::new(file.package.path.clone(), name)
}

/// Parse a `types` table key, which must name a type.
pub fn parse_type_key(key: &str) -> Result<(Option<Package>, String), GenerateError> {
    match parse_type(key)? {
        TypeExpr::Named(NamedType {
            package,
            name,
            underlying: None,
        }) => Ok((package, name)),
        _ => Err(GenerateError::TypeSyntax {
            input: key.to_string(),
            offset: 0,
            message: "type table keys must be named types".to_string(),
        }),
    }
}

/// Resolve every interface in `file`, in declaration order.
///
/// # Errors
///
/// Returns [`GenerateError::TypeSyntax`] for any malformed type string
/// or for `...` on a parameter other than the last.
pub fn resolve_declarations(
    file: &DeclarationFile,
    source: Option<&Path>,
) -> Result<Vec<Contract>, GenerateError> {
    let resolver = Resolver::new(file)?;
    file.interfaces
        .iter()
        .map(|iface| {
            let mut contract = resolver.interface(iface)?;
            contract.source = source.map(Path::to_path_buf);
            Ok(contract)
        })
        .collect()
}

type TypeKey = (String, String);

struct Resolver<'a> {
    own: Package,
    overrides: &'a std::collections::BTreeMap<String, String>,
    underlying: HashMap<TypeKey, TypeExpr>,
}

impl<'a> Resolver<'a> {
    fn new(file: &'a DeclarationFile) -> Result<Self, GenerateError> {
        let own = declared_package(file);
        let mut underlying = HashMap::with_capacity(file.types.len());
        for (key, form) in &file.types {
            let (package, name) = parse_type_key(key)?;
            let path = package.map_or_else(|| own.path.clone(), |p| p.path);
            underlying.insert((path, name), parse_type(form)?);
        }
        Ok(Self {
            own,
            overrides: &file.packages,
            underlying,
        })
    }

    fn interface(&self, decl: &InterfaceDecl) -> Result<Contract, GenerateError> {
        let mut contract = Contract::new(decl.name.clone(), self.own.clone());
        for method in &decl.methods {
            contract = contract.method(self.method(method)?);
        }
        debug!(
            interface = %decl.name,
            methods = contract.methods.len(),
            "resolved interface"
        );
        Ok(contract)
    }

    fn method(&self, decl: &MethodDecl) -> Result<Method, GenerateError> {
        let mut method = Method::new(decl.name.clone());
        method.variadic = decl.variadic;
        let last = decl.params.len().saturating_sub(1);
        for (i, p) in decl.params.iter().enumerate() {
            let (ty, dotted) = parse_param_type(&p.ty)?;
            if dotted && i != last {
                return Err(GenerateError::TypeSyntax {
                    input: p.ty.clone(),
                    offset: 0,
                    message: "only the final parameter may be variadic".to_string(),
                });
            }
            method.variadic |= dotted;
            let name = p.name.clone().unwrap_or_default();
            method.params.push(Param::new(name, self.resolve(ty)));
        }
        for r in &decl.returns {
            let ty = self.resolve(parse_type(&r.ty)?);
            method.results.push(Param::new(r.name.clone().unwrap_or_default(), ty));
        }
        Ok(method)
    }

    fn resolve(&self, ty: TypeExpr) -> TypeExpr {
        self.resolve_inner(ty, &mut Vec::new())
    }

    fn resolve_inner(&self, ty: TypeExpr, visiting: &mut Vec<TypeKey>) -> TypeExpr {
        match ty {
            TypeExpr::Named(named) if named.underlying.is_some() => TypeExpr::Named(named),
            TypeExpr::Named(NamedType { package, name, .. }) => {
                let package = match package {
                    Some(pkg) => self.with_override(pkg),
                    None => self.own.clone(),
                };
                let key = (package.path.clone(), name.clone());
                match self.underlying.get(&key) {
                    Some(form) if !visiting.contains(&key) => {
                        visiting.push(key);
                        let form = self.resolve_inner(form.clone(), visiting);
                        visiting.pop();
                        TypeExpr::named_with(Some(package), name, form)
                    }
                    _ => TypeExpr::named(Some(package), name),
                }
            }
            TypeExpr::Pointer { elem } => TypeExpr::pointer(self.resolve_inner(*elem, visiting)),
            TypeExpr::Array { len, elem } => TypeExpr::array(len, self.resolve_inner(*elem, visiting)),
            TypeExpr::Slice { elem } => TypeExpr::slice(self.resolve_inner(*elem, visiting)),
            TypeExpr::Map { key, value } => TypeExpr::map(
                self.resolve_inner(*key, visiting),
                self.resolve_inner(*value, visiting),
            ),
            TypeExpr::Chan { dir, elem } => TypeExpr::chan(dir, self.resolve_inner(*elem, visiting)),
            TypeExpr::Func(sig) => TypeExpr::Func(Signature {
                params: self.resolve_params(sig.params, visiting),
                results: self.resolve_params(sig.results, visiting),
                variadic: sig.variadic,
            }),
            TypeExpr::Struct { fields } => TypeExpr::Struct {
                fields: fields
                    .into_iter()
                    .map(|f| Field {
                        name: f.name,
                        ty: self.resolve_inner(f.ty, visiting),
                    })
                    .collect(),
            },
            other @ (TypeExpr::Basic { .. } | TypeExpr::Interface { .. }) => other,
        }
    }

    fn resolve_params(&self, params: Vec<Param>, visiting: &mut Vec<TypeKey>) -> Vec<Param> {
        params
            .into_iter()
            .map(|p| Param::new(p.name, self.resolve_inner(p.ty, visiting)))
            .collect()
    }

    fn with_override(&self, mut pkg: Package) -> Package {
        if pkg.path == self.own.path {
            pkg.name.clone_from(&self.own.name);
        } else if let Some(name) = self.overrides.get(&pkg.path) {
            pkg.name.clone_from(name);
        }
        pkg
    }
}
