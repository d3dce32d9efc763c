//! Type renderer: turns [`TypeExpr`] trees into Go source text.
//!
//! Foreign named types are qualified with an alias obtained from the
//! [`ImportRegistry`], so rendering has the side effect of binding every
//! package the rendered text refers to. Given the same registry state
//! the output is byte-for-byte reproducible.

use thiserror::Error;

use crate::imports::ImportRegistry;
use crate::model::{ChanDir, NamedType, Package, Param, TypeExpr};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("unable to mock inline interfaces with methods: interface{{{}}}", methods.join("; "))]
    InlineInterface { methods: Vec<String> },
}

pub struct TypeRenderer<'a> {
    imports: &'a mut ImportRegistry,
    package: &'a Package,
    in_package: bool,
}

impl<'a> TypeRenderer<'a> {
    /// `package` is the interface's own package; with `in_package` set,
    /// its types render unqualified.
    pub fn new(imports: &'a mut ImportRegistry, package: &'a Package, in_package: bool) -> Self {
        Self {
            imports,
            package,
            in_package,
        }
    }

    pub fn render(&mut self, ty: &TypeExpr) -> Result<String, RenderError> {
        Ok(match ty {
            TypeExpr::Basic { name } => name.clone(),
            TypeExpr::Named(named) => self.render_named(named),
            TypeExpr::Pointer { elem } => format!("*{}", self.render(elem)?),
            TypeExpr::Array { len, elem } => format!("[{len}]{}", self.render(elem)?),
            TypeExpr::Slice { elem } => format!("[]{}", self.render(elem)?),
            TypeExpr::Map { key, value } => {
                let key = self.render(key)?;
                let value = self.render(value)?;
                format!("map[{key}]{value}")
            }
            TypeExpr::Chan { dir, elem } => {
                let elem = self.render(elem)?;
                match dir {
                    ChanDir::Both => format!("chan {elem}"),
                    ChanDir::Recv => format!("<-chan {elem}"),
                    ChanDir::Send => format!("chan<- {elem}"),
                }
            }
            TypeExpr::Func(sig) => {
                let params = self.render_tuple(&sig.params, sig.variadic)?;
                match sig.results.as_slice() {
                    [] => format!("func({params})"),
                    [single] => format!("func({params}) {}", self.render(&single.ty)?),
                    many => format!("func({params})({})", self.render_tuple(many, false)?),
                }
            }
            TypeExpr::Struct { fields } => {
                let mut rendered = Vec::with_capacity(fields.len());
                for field in fields {
                    let ty = self.render(&field.ty)?;
                    rendered.push(match field.name {
                        Some(ref name) => format!("{name} {ty}"),
                        None => ty,
                    });
                }
                format!("struct{{{}}}", rendered.join(";"))
            }
            TypeExpr::Interface { methods } => {
                if !methods.is_empty() {
                    return Err(RenderError::InlineInterface {
                        methods: methods.clone(),
                    });
                }
                "interface{}".to_string()
            }
        })
    }

    /// Element types joined with `" , "`. A variadic tuple renders its
    /// last slice element as `...T`.
    pub fn render_tuple(&mut self, params: &[Param], variadic: bool) -> Result<String, RenderError> {
        let mut parts = Vec::with_capacity(params.len());
        for (i, p) in params.iter().enumerate() {
            let part = match (&p.ty, variadic && i + 1 == params.len()) {
                (TypeExpr::Slice { elem }, true) => format!("...{}", self.render(elem)?),
                (ty, _) => self.render(ty)?,
            };
            parts.push(part);
        }
        Ok(parts.join(" , "))
    }

    fn render_named(&mut self, named: &NamedType) -> String {
        match named.package {
            Some(ref pkg) if !self.is_local(pkg) => {
                let alias = self.imports.bind(&pkg.path, &pkg.name);
                format!("{alias}.{}", named.name)
            }
            _ => named.name.clone(),
        }
    }

    fn is_local(&self, pkg: &Package) -> bool {
        pkg.name == "main" || (self.in_package && pkg.path == self.package.path)
    }
}

/// True if the type has a representable absent (nil) state.
///
/// Named types are classified by their underlying form; a named type
/// whose underlying form is unknown counts as a value type.
pub fn is_nilable(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Pointer { .. }
        | TypeExpr::Array { .. }
        | TypeExpr::Map { .. }
        | TypeExpr::Interface { .. }
        | TypeExpr::Func(_)
        | TypeExpr::Chan { .. }
        | TypeExpr::Slice { .. } => true,
        TypeExpr::Named(named) => named.underlying.as_deref().is_some_and(is_nilable),
        TypeExpr::Basic { .. } | TypeExpr::Struct { .. } => false,
    }
}
