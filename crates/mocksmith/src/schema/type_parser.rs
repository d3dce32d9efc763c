//! Parser for Go type expressions written with qualified package
//! paths, e.g. `map[string][]*net/http.Cookie` or
//! `func(ctx context.Context, keys ...string) (int, error)`.

use crate::error::GenerateError;
use crate::model::{ChanDir, Field, Package, Param, Signature, TypeExpr};
use crate::naming::is_identifier;

/// Predeclared Go basic types.
pub const BASIC_TYPES: &[&str] = &[
    "bool", "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16",
    "uint32", "uint64", "uintptr", "byte", "rune", "float32", "float64", "complex64",
    "complex128",
];

const KEYWORDS: &[&str] = &["map", "chan", "func", "struct", "interface"];

/// Parse a complete type expression.
///
/// # Errors
///
/// Returns [`GenerateError::TypeSyntax`] with the byte offset of the
/// first problem.
pub fn parse_type(src: &str) -> Result<TypeExpr, GenerateError> {
    let mut p = TypeParser::new(src);
    let ty = p.parse_type()?;
    p.finish()?;
    Ok(ty)
}

/// Parse a parameter type that may carry a leading `...`.
///
/// A variadic type comes back as a slice of the element type, paired
/// with `true`.
pub fn parse_param_type(src: &str) -> Result<(TypeExpr, bool), GenerateError> {
    let mut p = TypeParser::new(src);
    p.skip_ws();
    let variadic = p.eat_str("...");
    let ty = p.parse_type()?;
    p.finish()?;
    if variadic {
        return Ok((TypeExpr::slice(ty), true));
    }
    Ok((ty, false))
}

struct TypeParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn finish(&mut self) -> Result<(), GenerateError> {
        self.skip_ws();
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(self.error(format!("unexpected trailing `{c}`"))),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace; true if a newline was crossed.
    fn skip_ws(&mut self) -> bool {
        let mut newline = false;
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            newline |= c == '\n';
            self.bump();
        }
        newline
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            return true;
        }
        false
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            return true;
        }
        false
    }

    fn expect(&mut self, c: char) -> Result<(), GenerateError> {
        self.skip_ws();
        if self.eat(c) {
            return Ok(());
        }
        Err(self.error(format!("expected `{c}`")))
    }

    fn error(&self, message: impl Into<String>) -> GenerateError {
        GenerateError::TypeSyntax {
            input: self.src.to_string(),
            offset: self.pos,
            message: message.into(),
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, GenerateError> {
        self.skip_ws();
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(TypeExpr::pointer(self.parse_type()?))
            }
            Some('[') => {
                self.bump();
                self.skip_ws();
                if self.eat(']') {
                    return Ok(TypeExpr::slice(self.parse_type()?));
                }
                let len = self.array_len()?;
                self.expect(']')?;
                Ok(TypeExpr::array(len, self.parse_type()?))
            }
            Some('(') => {
                self.bump();
                let ty = self.parse_type()?;
                self.expect(')')?;
                Ok(ty)
            }
            Some('<') => {
                if !self.eat_str("<-") {
                    return Err(self.error("expected `<-chan`"));
                }
                self.skip_ws();
                if self.word() != "chan" {
                    return Err(self.error("expected `chan` after `<-`"));
                }
                Ok(TypeExpr::chan(ChanDir::Recv, self.parse_type()?))
            }
            Some(c) if is_word_start(c) => {
                let start = self.pos;
                let word = self.word();
                self.keyword_or_name(word, start)
            }
            Some(c) => Err(self.error(format!("unexpected `{c}`"))),
            None => Err(self.error("expected a type")),
        }
    }

    fn keyword_or_name(&mut self, word: &'a str, start: usize) -> Result<TypeExpr, GenerateError> {
        match word {
            "map" => {
                self.expect('[')?;
                let key = self.parse_type()?;
                self.expect(']')?;
                Ok(TypeExpr::map(key, self.parse_type()?))
            }
            "chan" => {
                self.skip_ws();
                let dir = if self.eat_str("<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::chan(dir, self.parse_type()?))
            }
            "func" => self.signature().map(TypeExpr::Func),
            "struct" => self.struct_fields(),
            "interface" => self.interface_body(),
            _ => self.named(word, start),
        }
    }

    fn named(&self, word: &str, start: usize) -> Result<TypeExpr, GenerateError> {
        if let Some(idx) = word.rfind('.') {
            let (path, name) = (&word[..idx], &word[idx + 1..]);
            if path.is_empty() || !is_identifier(name) {
                return Err(GenerateError::TypeSyntax {
                    input: self.src.to_string(),
                    offset: start,
                    message: format!("invalid qualified name `{word}`"),
                });
            }
            return Ok(TypeExpr::named(Some(Package::from_path(path)), name));
        }
        if !is_identifier(word) {
            return Err(GenerateError::TypeSyntax {
                input: self.src.to_string(),
                offset: start,
                message: format!("invalid type name `{word}`"),
            });
        }
        Ok(match word {
            "error" => TypeExpr::error(),
            "any" => TypeExpr::empty_interface(),
            w if BASIC_TYPES.contains(&w) => TypeExpr::basic(w),
            w => TypeExpr::named(None, w),
        })
    }

    /// A run of identifier and import-path characters.
    fn word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_word_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// A plain identifier (no dots or slashes).
    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                self.bump();
            }
        }
        &self.src[start..self.pos]
    }

    fn array_len(&mut self) -> Result<u64, GenerateError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        self.src[start..self.pos]
            .parse()
            .map_err(|_| self.error("array length must be an integer literal"))
    }

    fn starts_type(&self) -> bool {
        match self.peek() {
            Some('*' | '[' | '(') => true,
            Some('<') => self.rest().starts_with("<-"),
            Some(c) => is_word_start(c),
            None => false,
        }
    }

    /// Consume `name ` in front of a type, if present. Leaves the
    /// position untouched when the identifier is itself the type.
    fn leading_name(&mut self) -> String {
        let save = self.pos;
        let ident = self.identifier();
        if ident.is_empty() || KEYWORDS.contains(&ident) {
            self.pos = save;
            return String::new();
        }
        if self.rest().starts_with("...") {
            return ident.to_string();
        }
        let had_ws = self.peek().is_some_and(char::is_whitespace);
        self.skip_ws();
        if had_ws && (self.starts_type() || self.rest().starts_with("...")) {
            return ident.to_string();
        }
        self.pos = save;
        String::new()
    }

    fn signature(&mut self) -> Result<Signature, GenerateError> {
        self.expect('(')?;
        let (params, variadic) = self.param_list()?;

        let save = self.pos;
        self.skip_ws();
        let results = if self.eat('(') {
            let (results, variadic_results) = self.param_list()?;
            if variadic_results {
                return Err(self.error("results cannot be variadic"));
            }
            results
        } else if self.starts_type() {
            vec![Param::unnamed(self.parse_type()?)]
        } else {
            self.pos = save;
            Vec::new()
        };

        Ok(Signature {
            params,
            results,
            variadic,
        })
    }

    /// Parameters up to and including the closing `)`.
    fn param_list(&mut self) -> Result<(Vec<Param>, bool), GenerateError> {
        let mut params = Vec::new();
        let mut variadic = false;
        loop {
            self.skip_ws();
            if self.eat(')') {
                break;
            }
            if variadic {
                return Err(self.error("only the final parameter may be variadic"));
            }
            let name = self.leading_name();
            self.skip_ws();
            let mut ty_is_variadic = false;
            if self.eat_str("...") {
                ty_is_variadic = true;
            }
            let mut ty = self.parse_type()?;
            if ty_is_variadic {
                ty = TypeExpr::slice(ty);
                variadic = true;
            }
            params.push(Param::new(name, ty));
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect(')')?;
            break;
        }
        Ok((params, variadic))
    }

    fn struct_fields(&mut self) -> Result<TypeExpr, GenerateError> {
        self.expect('{')?;
        let mut fields = Vec::new();
        loop {
            self.skip_ws();
            while self.eat(';') {
                self.skip_ws();
            }
            if self.eat('}') {
                break;
            }
            if self.peek().is_none() {
                return Err(self.error("unterminated struct"));
            }
            let name = self.leading_name();
            let ty = self.parse_type()?;
            fields.push(Field {
                name: (!name.is_empty()).then_some(name),
                ty,
            });
            let mut newline = self.skip_ws();
            if self.skip_tag()? {
                newline |= self.skip_ws();
            }
            match self.peek() {
                Some(';' | '}') => {}
                Some(_) if newline => {}
                _ => return Err(self.error("expected `;` or `}` after struct field")),
            }
        }
        Ok(TypeExpr::Struct { fields })
    }

    fn skip_tag(&mut self) -> Result<bool, GenerateError> {
        let close = match self.peek() {
            Some(c @ ('"' | '`')) => c,
            _ => return Ok(false),
        };
        self.bump();
        while let Some(c) = self.bump() {
            if c == '\\' && close == '"' {
                self.bump();
            } else if c == close {
                return Ok(true);
            }
        }
        Err(self.error("unterminated struct tag"))
    }

    fn interface_body(&mut self) -> Result<TypeExpr, GenerateError> {
        self.expect('{')?;
        let body_start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let body = &self.src[body_start..self.pos - 1];
                        let methods = body
                            .split([';', '\n'])
                            .map(str::trim)
                            .filter(|m| !m.is_empty())
                            .map(str::to_string)
                            .collect();
                        return Ok(TypeExpr::Interface { methods });
                    }
                }
                _ => {}
            }
        }
        Err(self.error("unterminated interface"))
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '/' | '-' | '~')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(path: &str) -> Option<Package> {
        Some(Package::from_path(path))
    }

    #[test]
    fn basics_and_builtins() {
        assert_eq!(parse_type("string").unwrap(), TypeExpr::basic("string"));
        assert_eq!(parse_type("  int64 ").unwrap(), TypeExpr::basic("int64"));
        assert!(parse_type("error").unwrap().is_error());
        assert!(parse_type("any").unwrap().is_empty_interface());
    }

    #[test]
    fn qualified_names_split_at_last_dot() {
        assert_eq!(
            parse_type("net/http.Response").unwrap(),
            TypeExpr::named(pkg("net/http"), "Response")
        );
        assert_eq!(
            parse_type("gopkg.in/yaml.v3.Node").unwrap(),
            TypeExpr::named(pkg("gopkg.in/yaml.v3"), "Node")
        );
        assert_eq!(
            parse_type("time.Duration").unwrap(),
            TypeExpr::named(pkg("time"), "Duration")
        );
    }

    #[test]
    fn local_names_have_no_package() {
        assert_eq!(parse_type("Item").unwrap(), TypeExpr::named(None, "Item"));
    }

    #[test]
    fn composites() {
        assert_eq!(
            parse_type("map[string][]*net/http.Cookie").unwrap(),
            TypeExpr::map(
                TypeExpr::basic("string"),
                TypeExpr::slice(TypeExpr::pointer(TypeExpr::named(pkg("net/http"), "Cookie")))
            )
        );
        assert_eq!(
            parse_type("[16]byte").unwrap(),
            TypeExpr::array(16, TypeExpr::basic("byte"))
        );
        assert_eq!(
            parse_type("[ ] ( int )").unwrap(),
            TypeExpr::slice(TypeExpr::basic("int"))
        );
    }

    #[test]
    fn channels() {
        let int = TypeExpr::basic("int");
        assert_eq!(parse_type("chan int").unwrap(), TypeExpr::chan(ChanDir::Both, int.clone()));
        assert_eq!(parse_type("<-chan int").unwrap(), TypeExpr::chan(ChanDir::Recv, int.clone()));
        assert_eq!(parse_type("chan<- int").unwrap(), TypeExpr::chan(ChanDir::Send, int.clone()));
        assert_eq!(
            parse_type("chan (<-chan int)").unwrap(),
            TypeExpr::chan(ChanDir::Both, TypeExpr::chan(ChanDir::Recv, int))
        );
    }

    #[test]
    fn function_types() {
        let TypeExpr::Func(sig) = parse_type("func(ctx context.Context, keys ...string) (int, error)").unwrap() else {
            panic!("not a func");
        };
        assert!(sig.variadic);
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[0].name, "ctx");
        assert_eq!(sig.params[0].ty, TypeExpr::named(pkg("context"), "Context"));
        assert_eq!(sig.params[1].name, "keys");
        assert_eq!(sig.params[1].ty, TypeExpr::slice(TypeExpr::basic("string")));
        assert_eq!(sig.results.len(), 2);
        assert!(sig.results[1].ty.is_error());
    }

    #[test]
    fn spaced_variadic_names_are_kept() {
        let TypeExpr::Func(sig) = parse_type("func(w  ...io.Writer)").unwrap() else {
            panic!("not a func");
        };
        assert!(sig.variadic);
        assert_eq!(sig.params[0].name, "w");
        assert_eq!(sig.params[0].ty, TypeExpr::slice(TypeExpr::named(pkg("io"), "Writer")));

        let (ty, variadic) = parse_param_type("func(format string, args ...interface{}) string").unwrap();
        assert!(!variadic);
        let TypeExpr::Func(sig) = ty else { panic!("not a func") };
        assert_eq!(sig.params[1].name, "args");
        assert!(sig.variadic);
    }

    #[test]
    fn function_result_forms() {
        let TypeExpr::Func(none) = parse_type("func()").unwrap() else { panic!() };
        assert!(none.params.is_empty() && none.results.is_empty());

        let TypeExpr::Func(one) = parse_type("func(int, string) error").unwrap() else { panic!() };
        assert_eq!(one.params.len(), 2);
        assert!(one.params.iter().all(|p| p.name.is_empty()));
        assert_eq!(one.results.len(), 1);

        let TypeExpr::Func(nested) = parse_type("func(func() int, chan int) <-chan int").unwrap() else {
            panic!()
        };
        assert_eq!(nested.params.len(), 2);
        assert_eq!(
            nested.results[0].ty,
            TypeExpr::chan(ChanDir::Recv, TypeExpr::basic("int"))
        );
    }

    #[test]
    fn func_inside_map_value() {
        let ty = parse_type("map[string]func(a int)").unwrap();
        let TypeExpr::Map { value, .. } = ty else { panic!() };
        let TypeExpr::Func(sig) = *value else { panic!() };
        assert_eq!(sig.params[0].name, "a");
        assert!(sig.results.is_empty());
    }

    #[test]
    fn anonymous_structs() {
        let ty = parse_type(r#"struct{ net/http.Client; Retries int `json:"retries"`; *Item }"#).unwrap();
        let TypeExpr::Struct { fields } = ty else { panic!() };
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, None);
        assert_eq!(fields[0].ty, TypeExpr::named(pkg("net/http"), "Client"));
        assert_eq!(fields[1].name.as_deref(), Some("Retries"));
        assert_eq!(fields[2].ty, TypeExpr::pointer(TypeExpr::named(None, "Item")));
    }

    #[test]
    fn struct_fields_on_separate_lines() {
        let ty = parse_type("struct {\n  A int\n  B string\n}").unwrap();
        let TypeExpr::Struct { fields } = ty else { panic!() };
        assert_eq!(fields.len(), 2);
        assert_eq!(parse_type("struct{}").unwrap(), TypeExpr::Struct { fields: vec![] });
    }

    #[test]
    fn interfaces() {
        assert!(parse_type("interface{}").unwrap().is_empty_interface());
        assert!(parse_type("interface { }").unwrap().is_empty_interface());
        assert_eq!(
            parse_type("interface{ Read(p []byte) (int, error); Close() error }").unwrap(),
            TypeExpr::Interface {
                methods: vec![
                    "Read(p []byte) (int, error)".to_string(),
                    "Close() error".to_string()
                ]
            }
        );
    }

    #[test]
    fn param_types_with_ellipsis() {
        let (ty, variadic) = parse_param_type("...string").unwrap();
        assert!(variadic);
        assert_eq!(ty, TypeExpr::slice(TypeExpr::basic("string")));
        let (ty, variadic) = parse_param_type("[]string").unwrap();
        assert!(!variadic);
        assert_eq!(ty, TypeExpr::slice(TypeExpr::basic("string")));
    }

    #[test]
    fn errors_report_offsets() {
        let err = parse_type("map[string").unwrap_err();
        let GenerateError::TypeSyntax { offset, input, .. } = err else { panic!() };
        assert_eq!(input, "map[string");
        assert_eq!(offset, 10);

        assert!(parse_type("").is_err());
        assert!(parse_type("int int").is_err());
        assert!(parse_type("[n]int").is_err());
        assert!(parse_type("net/http.").is_err());
        assert!(parse_type("func(...int, string)").is_err());
        assert!(parse_type("func() (...int)").is_err());
        assert!(parse_type("interface{ Close()").is_err());
        assert!(parse_type("...int").is_err());
    }
}
