mod parser;
mod resolve;
mod type_parser;
mod types;
mod validator;

pub use parser::{parse_declarations, parse_declarations_str};
pub use resolve::{declared_package, parse_type_key, resolve_declarations};
pub use type_parser::{BASIC_TYPES, parse_param_type, parse_type};
pub use types::*;
pub use validator::validate_declarations;
