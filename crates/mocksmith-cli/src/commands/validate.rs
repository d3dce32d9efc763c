use std::path::Path;

use mocksmith::error::{Severity, Violation};
use mocksmith::schema::{DeclarationFile, parse_declarations, validate_declarations};

/// Violations reported against one interface, or against the file
/// itself when `interface` is `None`.
#[derive(Debug)]
struct Group<'a> {
    interface: Option<&'a str>,
    violations: Vec<&'a Violation>,
}

impl Group<'_> {
    fn count(&self, severity: Severity) -> usize {
        self.violations.iter().filter(|v| v.severity == severity).count()
    }

    fn heading(&self) -> String {
        let name = match self.interface {
            None => "(file)",
            Some("") => "(unnamed interface)",
            Some(name) => name,
        };
        match (self.count(Severity::Error), self.count(Severity::Warning)) {
            (0, 0) => format!("{name}: ok"),
            (e, w) => format!("{name}: {e} error(s), {w} warning(s)"),
        }
    }
}

/// The interface a violation location points into, e.g. `Store` for
/// `interfaces.Store.Get.params[0]`.
fn interface_of(v: &Violation) -> Option<&str> {
    let rest = v.location.as_deref()?.strip_prefix("interfaces.")?;
    Some(rest.split_once('.').map_or(rest, |(name, _)| name))
}

/// File-level findings first, then one group per declared interface in
/// declaration order. Interfaces declared twice share a group.
fn group<'a>(file: &'a DeclarationFile, violations: &'a [Violation]) -> Vec<Group<'a>> {
    let mut names: Vec<&str> = Vec::new();
    for iface in &file.interfaces {
        if !names.contains(&iface.name.as_str()) {
            names.push(&iface.name);
        }
    }

    let file_level: Vec<&Violation> = violations
        .iter()
        .filter(|v| interface_of(v).is_none_or(|name| !names.contains(&name)))
        .collect();

    let mut groups = Vec::with_capacity(names.len() + 1);
    if !file_level.is_empty() {
        groups.push(Group {
            interface: None,
            violations: file_level,
        });
    }
    for name in names {
        groups.push(Group {
            interface: Some(name),
            violations: violations
                .iter()
                .filter(|v| interface_of(v) == Some(name))
                .collect(),
        });
    }
    groups
}

pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = parse_declarations(path)?;
    let violations = validate_declarations(&file);

    for g in group(&file, &violations) {
        println!("{}", g.heading());
        for v in &g.violations {
            println!("  {v}");
        }
    }

    let errors = violations.iter().filter(|v| v.severity == Severity::Error).count();
    let warnings = violations.iter().filter(|v| v.severity == Severity::Warning).count();
    println!(
        "\n{} interface(s), {errors} error(s), {warnings} warning(s)",
        file.interfaces.len()
    );

    if errors == 0 {
        println!("Declarations are valid.");
        Ok(())
    } else {
        Err(format!("Declarations have {errors} validation error(s)").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mocksmith::schema::parse_declarations_str;

    const DECLS: &str = r#"
package:
  path: github.com/acme/store
interfaces:
  - name: Store
    methods:
      - name: Get
        params: [{ name: key, type: "map[string" }]
  - name: Clean
    methods: [{ name: Ping }]
"#;

    fn violation(rule: &str, location: Option<&str>) -> Violation {
        Violation {
            severity: Severity::Error,
            rule: rule.to_string(),
            message: "bad".to_string(),
            location: location.map(str::to_string),
        }
    }

    #[test]
    fn interface_is_read_from_the_location() {
        assert_eq!(
            interface_of(&violation("R", Some("interfaces.Store.Get.params[0]"))),
            Some("Store")
        );
        assert_eq!(interface_of(&violation("R", Some("interfaces.Store"))), Some("Store"));
        assert_eq!(interface_of(&violation("R", Some("package.path"))), None);
        assert_eq!(interface_of(&violation("R", None)), None);
    }

    #[test]
    fn violations_are_grouped_per_interface() {
        let file = parse_declarations_str(DECLS).unwrap();
        let violations = validate_declarations(&file);
        let groups = group(&file, &violations);
        let names: Vec<_> = groups.iter().map(|g| g.interface).collect();
        assert_eq!(names, [Some("Store"), Some("Clean")]);
        assert!(groups[0].violations.iter().any(|v| v.rule == "DECL-006"));
        assert!(groups[0].heading().starts_with("Store: 1 error(s)"));
        assert_eq!(groups[1].heading(), "Clean: ok");
    }

    #[test]
    fn file_level_findings_come_first() {
        let file = parse_declarations_str(DECLS).unwrap();
        let violations = vec![
            violation("DECL-006", Some("interfaces.Clean.Ping.returns[0]")),
            violation("DECL-001", Some("package.path")),
            violation("DECL-002", Some("types.Key")),
        ];
        let groups = group(&file, &violations);
        assert_eq!(groups[0].interface, None);
        assert_eq!(groups[0].violations.len(), 2);
        assert_eq!(groups[0].heading(), "(file): 2 error(s), 0 warning(s)");
        assert!(groups[1].violations.is_empty());
        assert_eq!(groups[2].violations[0].rule, "DECL-006");
    }
}
