use crate::error::GenerateError;
use crate::model::{Method, Param, TypeExpr};
use crate::naming::is_reserved;
use crate::render::is_nilable;

use super::Generator;

/// Rendered parameter (or result) list of one method. Built right
/// before the method is emitted and dropped right after.
#[derive(Debug, Default)]
pub(super) struct ParamList {
    pub names: Vec<String>,
    /// Rendered types; a variadic last entry is spelled `...T`.
    pub types: Vec<String>,
    pub nilable: Vec<bool>,
    /// Slot holds the predeclared `error` type.
    pub error: Vec<bool>,
    pub variadic: bool,
    /// Variadic element is `interface{}` and needs no copying.
    pub variadic_interface: bool,
}

impl ParamList {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `name type` pairs joined for a Go parameter list.
    pub fn declarations(&self) -> String {
        self.names
            .iter()
            .zip(&self.types)
            .map(|(name, ty)| format!("{name} {ty}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Argument list forwarding every parameter, the variadic one
    /// expanded with `...`.
    pub fn call_arguments(&self) -> String {
        let last = self.names.len().saturating_sub(1);
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if self.variadic && i == last {
                    format!("{name}...")
                } else {
                    name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn type_list(&self) -> String {
        self.types.join(", ")
    }

    /// Name of the variadic parameter, if any.
    pub fn variadic_name(&self) -> Option<&str> {
        if !self.variadic {
            return None;
        }
        self.names.last().map(String::as_str)
    }

    /// Names of every parameter before the variadic one.
    pub fn leading_names(&self) -> &[String] {
        match self.names.split_last() {
            Some((_, leading)) if self.variadic => leading,
            _ => &self.names,
        }
    }
}

impl Generator<'_> {
    /// Render `slots` and settle their names. Unnamed and blank slots,
    /// and names that would shadow an import alias, the package clause
    /// or a generated local, become `_a<index>`.
    pub(super) fn param_list(
        &mut self,
        method: &Method,
        slots: &[Param],
        variadic: bool,
    ) -> Result<ParamList, GenerateError> {
        if variadic && slots.is_empty() {
            return Err(GenerateError::BadVariadic {
                contract: self.contract.name.clone(),
                method: method.name.clone(),
                param: String::new(),
                found: "no parameters".to_string(),
            });
        }

        let mut list = ParamList::default();
        let last = slots.len().saturating_sub(1);
        for (i, slot) in slots.iter().enumerate() {
            let mut rendered = self.render(method, &slot.ty)?;
            if variadic && i == last {
                let TypeExpr::Slice { ref elem } = slot.ty else {
                    return Err(GenerateError::BadVariadic {
                        contract: self.contract.name.clone(),
                        method: method.name.clone(),
                        param: slot.name.clone(),
                        found: slot.ty.to_string(),
                    });
                };
                rendered = format!("...{}", self.render(method, elem)?);
                list.variadic = true;
                list.variadic_interface = elem.is_empty_interface();
            }

            let name = if self.name_collides(&slot.name) {
                format!("_a{i}")
            } else {
                slot.name.clone()
            };
            list.names.push(name);
            list.types.push(rendered);
            list.nilable.push(is_nilable(&slot.ty));
            list.error.push(slot.ty.is_error());
        }
        Ok(list)
    }

    fn name_collides(&self, name: &str) -> bool {
        name.is_empty()
            || name == "_"
            || is_reserved(name)
            || name == self.package_clause()
            || self.imports.contains_alias(name)
    }
}
