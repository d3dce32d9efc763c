use std::collections::HashSet;

use crate::error::{Severity, Violation};
use crate::model::TypeExpr;
use crate::naming::is_identifier;
use crate::schema::resolve::parse_type_key;
use crate::schema::type_parser::{parse_param_type, parse_type};
use crate::schema::types::{DeclarationFile, InterfaceDecl, MethodDecl};

/// Validate a parsed declaration file for completeness and consistency.
///
/// Returns a list of violations. If any violation has
/// [`Severity::Error`], at least one interface in the file cannot be
/// mocked.
pub fn validate_declarations(file: &DeclarationFile) -> Vec<Violation> {
    let mut violations = Vec::new();

    validate_package(file, &mut violations);
    validate_type_table(file, &mut violations);
    validate_interfaces(file, &mut violations);

    violations
}

fn error(rule: &str, message: String, location: String) -> Violation {
    Violation {
        severity: Severity::Error,
        rule: rule.to_string(),
        message,
        location: Some(location),
    }
}

fn warning(rule: &str, message: String, location: String) -> Violation {
    Violation {
        severity: Severity::Warning,
        rule: rule.to_string(),
        message,
        location: Some(location),
    }
}

fn validate_package(file: &DeclarationFile, violations: &mut Vec<Violation>) {
    if file.package.path.trim().is_empty() {
        violations.push(error(
            "DECL-001",
            "package.path must not be empty".to_string(),
            "package.path".to_string(),
        ));
    }
    if let Some(ref name) = file.package.name
        && !is_identifier(name)
    {
        violations.push(error(
            "DECL-002",
            format!("package.name `{name}` is not a valid identifier"),
            "package.name".to_string(),
        ));
    }
}

fn validate_type_table(file: &DeclarationFile, violations: &mut Vec<Violation>) {
    for (key, form) in &file.types {
        if let Err(e) = parse_type_key(key) {
            violations.push(error("DECL-010", e.to_string(), format!("types.{key}")));
        }
        if let Err(e) = parse_type(form) {
            violations.push(error("DECL-006", e.to_string(), format!("types.{key}")));
        }
    }
}

fn validate_interfaces(file: &DeclarationFile, violations: &mut Vec<Violation>) {
    let mut names = HashSet::new();
    for iface in &file.interfaces {
        let location = format!("interfaces.{}", iface.name);
        if !is_identifier(&iface.name) {
            violations.push(error(
                "DECL-002",
                format!("interface name `{}` is not a valid identifier", iface.name),
                location.clone(),
            ));
        }
        if !names.insert(iface.name.as_str()) {
            violations.push(error(
                "DECL-003",
                format!("Duplicate interface: {}", iface.name),
                location.clone(),
            ));
        }
        if iface.methods.is_empty() {
            violations.push(warning(
                "DECL-005",
                format!("{} declares no methods; its mock only records nothing", iface.name),
                location.clone(),
            ));
        }
        validate_methods(iface, &location, violations);
    }
}

fn validate_methods(iface: &InterfaceDecl, location: &str, violations: &mut Vec<Violation>) {
    let mut names = HashSet::new();
    for method in &iface.methods {
        let location = format!("{location}.{}", method.name);
        if !is_identifier(&method.name) {
            violations.push(error(
                "DECL-002",
                format!("method name `{}` is not a valid identifier", method.name),
                location.clone(),
            ));
        }
        if !names.insert(method.name.as_str()) {
            violations.push(error(
                "DECL-004",
                format!("Duplicate method: {}.{}", iface.name, method.name),
                location.clone(),
            ));
        }
        validate_signature(method, &location, violations);
    }
}

fn validate_signature(method: &MethodDecl, location: &str, violations: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    let mut last_param = None;
    let last = method.params.len().saturating_sub(1);

    for (i, p) in method.params.iter().enumerate() {
        let location = format!("{location}.params[{i}]");
        if let Some(ref name) = p.name
            && name != "_"
            && !seen.insert(name.as_str())
        {
            violations.push(warning(
                "DECL-009",
                format!("Duplicate parameter name: {name}"),
                location.clone(),
            ));
        }
        match parse_param_type(&p.ty) {
            Ok((ty, dotted)) => {
                if dotted && i != last {
                    violations.push(error(
                        "DECL-007",
                        format!("`{}` is variadic but not the final parameter", p.ty),
                        location.clone(),
                    ));
                }
                check_inline_interface(&ty, &location, violations);
                if i == last {
                    last_param = Some((ty, dotted));
                }
            }
            Err(e) => violations.push(error("DECL-006", e.to_string(), location)),
        }
    }

    if method.variadic {
        match last_param {
            Some((TypeExpr::Slice { .. }, _)) => {}
            Some((ty, _)) => violations.push(error(
                "DECL-007",
                format!("variadic parameter must be a slice, found {ty}"),
                format!("{location}.params[{last}]"),
            )),
            None if method.params.is_empty() => violations.push(error(
                "DECL-007",
                "variadic method declares no parameters".to_string(),
                location.to_string(),
            )),
            // The last parameter failed to parse and was already reported.
            None => {}
        }
    }

    for (i, r) in method.returns.iter().enumerate() {
        let location = format!("{location}.returns[{i}]");
        match parse_type(&r.ty) {
            Ok(ty) => check_inline_interface(&ty, &location, violations),
            Err(e) => violations.push(error("DECL-006", e.to_string(), location)),
        }
    }
}

fn check_inline_interface(ty: &TypeExpr, location: &str, violations: &mut Vec<Violation>) {
    if let Some(methods) = inline_interface(ty) {
        violations.push(error(
            "DECL-008",
            format!(
                "inline interfaces with methods cannot be mocked: interface{{{}}}",
                methods.join("; ")
            ),
            location.to_string(),
        ));
    }
}

/// First non-empty inline interface in `ty`. Named types are not
/// unfolded.
fn inline_interface(ty: &TypeExpr) -> Option<&[String]> {
    match ty {
        TypeExpr::Interface { methods } if !methods.is_empty() => Some(methods),
        TypeExpr::Pointer { elem }
        | TypeExpr::Array { elem, .. }
        | TypeExpr::Slice { elem }
        | TypeExpr::Chan { elem, .. } => inline_interface(elem),
        TypeExpr::Map { key, value } => inline_interface(key).or_else(|| inline_interface(value)),
        TypeExpr::Func(sig) => sig
            .params
            .iter()
            .chain(&sig.results)
            .find_map(|p| inline_interface(&p.ty)),
        TypeExpr::Struct { fields } => fields.iter().find_map(|f| inline_interface(&f.ty)),
        TypeExpr::Basic { .. } | TypeExpr::Named(_) | TypeExpr::Interface { .. } => None,
    }
}
