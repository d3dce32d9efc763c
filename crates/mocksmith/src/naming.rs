//! Shared naming helpers: identifier sanitizing, mock type names,
//! identifiers reserved by generated bodies, and file-name casing.

/// Replace every character that is not an ASCII letter, digit or
/// underscore with an underscore.
pub fn sanitize_identifier(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Go's export rule: the first character is an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// True if `name` is a usable Go identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Short package name implied by an import path.
///
/// Takes the last segment, skipping a trailing major-version segment
/// (`/v2`) and dropping a dotted suffix (`yaml.v3` → `yaml`).
pub fn default_package_name(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = match segments.as_slice() {
        [] => return String::new(),
        [.., prev, last] if is_major_version(last) => *prev,
        [.., last] => *last,
    };
    let stem = last.split('.').next().unwrap_or(last);
    sanitize_identifier(stem)
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Name of the generated mock type.
///
/// Outside the interface's package the mock reuses the interface name.
/// Inside it, exported interfaces get a `Mock` prefix and unexported
/// ones a `mock` prefix with the first letter capitalized.
pub fn mock_type_name(interface: &str, in_package: bool) -> String {
    if !in_package {
        return interface.to_string();
    }
    if is_exported(interface) {
        return format!("Mock{interface}");
    }
    let mut chars = interface.chars();
    match chars.next() {
        Some(first) => format!("mock{}{}", first.to_uppercase(), chars.as_str()),
        None => "mock".to_string(),
    }
}

/// Identifiers the generated method bodies declare or use.
const RESERVED: &[&str] = &["_m", "_e", "_ca", "_va", "_i", "ret", "rf", "ok"];

/// True if a parameter called `name` would shadow a generated local.
pub fn is_reserved(name: &str) -> bool {
    if RESERVED.contains(&name) {
        return true;
    }
    name.strip_prefix('r')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// `RequesterNS` → `requester_ns`, `HTTPServer` → `http_server`.
pub fn underscore_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && prev != '_' {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
