//! Forwarding methods: the mock's implementation of each interface
//! method, recording the call in the ledger and producing the
//! configured results.

use super::params::ParamList;
use super::Generator;

impl Generator<'_> {
    pub(super) fn mock_method(&mut self, mock: &str, name: &str, params: &ParamList, returns: &ParamList) {
        if params.is_empty() {
            self.buf
                .push_str(&format!("// {name} provides a mock function with given fields:\n"));
        } else {
            self.buf.push_str(&format!(
                "// {name} provides a mock function with given fields: {}\n",
                params.names.join(", ")
            ));
        }
        self.buf.push_str(&format!(
            "func (_m *{mock}) {name}({}) ",
            params.declarations()
        ));
        match returns.types.as_slice() {
            [] => self.buf.push_str("{\n"),
            [single] => self.buf.push_str(&format!("{single} {{\n")),
            many => self.buf.push_str(&format!("({}) {{\n", many.join(", "))),
        }

        let args = self.ledger_arguments(params);
        let called = format!("_m.Called({args})");

        if returns.is_empty() {
            self.buf.push_str(&format!("\t{called}\n"));
            self.buf.push_str("}\n\n");
            return;
        }

        self.buf.push_str(&format!("\tret := {called}\n\n"));
        let forwarded = params.call_arguments();
        let param_types = params.type_list();
        let mut slots = Vec::with_capacity(returns.types.len());
        for (idx, ty) in returns.types.iter().enumerate() {
            self.buf.push_str(&format!("\tvar r{idx} {ty}\n"));
            self.buf.push_str(&format!(
                "\tif rf, ok := ret.Get({idx}).(func({param_types}) {ty}); ok {{\n"
            ));
            self.buf.push_str(&format!("\t\tr{idx} = rf({forwarded})\n"));
            self.buf.push_str("\t} else {\n");
            if returns.error[idx] {
                self.buf.push_str(&format!("\t\tr{idx} = ret.Error({idx})\n"));
            } else if returns.nilable[idx] {
                self.buf.push_str(&format!("\t\tif ret.Get({idx}) != nil {{\n"));
                self.buf
                    .push_str(&format!("\t\t\tr{idx} = ret.Get({idx}).({ty})\n"));
                self.buf.push_str("\t\t}\n");
            } else {
                self.buf.push_str(&format!("\t\tr{idx} = ret.Get({idx}).({ty})\n"));
            }
            self.buf.push_str("\t}\n\n");
            slots.push(format!("r{idx}"));
        }
        self.buf.push_str(&format!("\treturn {}\n", slots.join(", ")));
        self.buf.push_str("}\n\n");
    }

    /// Arguments handed to the ledger. Variadic values are flattened
    /// into one `[]interface{}`, with the statements that build it
    /// written to the buffer first.
    pub(super) fn ledger_arguments(&mut self, params: &ParamList) -> String {
        let Some(variadic) = params.variadic_name() else {
            return params.names.join(", ");
        };

        let source = if params.variadic_interface {
            variadic.to_string()
        } else {
            self.buf
                .push_str(&format!("\t_va := make([]interface{{}}, len({variadic}))\n"));
            self.buf.push_str(&format!(
                "\tfor _i := range {variadic} {{\n\t\t_va[_i] = {variadic}[_i]\n\t}}\n"
            ));
            "_va".to_string()
        };

        self.buf.push_str("\tvar _ca []interface{}\n");
        let leading = params.leading_names();
        if !leading.is_empty() {
            self.buf
                .push_str(&format!("\t_ca = append(_ca, {})\n", leading.join(", ")));
        }
        self.buf.push_str(&format!("\t_ca = append(_ca, {source}...)\n"));
        "_ca...".to_string()
    }
}
