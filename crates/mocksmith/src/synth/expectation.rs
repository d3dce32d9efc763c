//! Fluent expectation builder: `mock.Expect().Get("x").ToReturn(...)`.

use super::params::ParamList;
use super::{Generator, LEDGER_ALIAS};

impl Generator<'_> {
    pub(super) fn mock_method_expectation(
        &mut self,
        mock: &str,
        name: &str,
        params: &ParamList,
        returns: &ParamList,
    ) {
        let builder = format!("{mock}Expectation");
        let handle = format!("{mock}{name}Expectation");
        let call = format!("*{LEDGER_ALIAS}.Call");

        self.buf
            .push_str(&format!("type {handle} struct {{\n\tcall {call}\n}}\n\n"));
        self.buf.push_str(&format!(
            "func (_e *{builder}) {name}({}) *{handle} {{\n",
            params.declarations()
        ));
        let args = self.ledger_arguments(params);
        let on = if args.is_empty() {
            format!("_e.mock.On(\"{name}\")")
        } else {
            format!("_e.mock.On(\"{name}\", {args})")
        };
        self.buf
            .push_str(&format!("\treturn &{handle}{{\n\t\tcall: {on},\n\t}}\n"));
        self.buf.push_str("}\n\n");

        self.buf.push_str(&format!(
            "func (_e *{handle}) ToReturn({}) {call} {{\n\treturn _e.call.Return({})\n}}\n",
            returns.declarations(),
            returns.names.join(", ")
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Contract, Method, Package, TypeExpr};
    use crate::synth::{GeneratorConfig, synthesize};

    fn synth(method: Method) -> String {
        let contract = Contract::new("Svc", Package::from_path("example.com/svc")).method(method);
        synthesize(&contract, &GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn expectation_without_arguments() {
        let text = synth(Method::new("Ping"));
        assert!(text.contains("type SvcPingExpectation struct {\n\tcall *mock.Call\n}\n"));
        assert!(text.contains(
            "func (_e *SvcExpectation) Ping() *SvcPingExpectation {\n\
             \treturn &SvcPingExpectation{\n\t\tcall: _e.mock.On(\"Ping\"),\n\t}\n}\n"
        ));
        assert!(text.contains(
            "func (_e *SvcPingExpectation) ToReturn() *mock.Call {\n\treturn _e.call.Return()\n}\n"
        ));
    }

    #[test]
    fn expectation_registers_plain_arguments() {
        let text = synth(
            Method::new("Get")
                .param("path", TypeExpr::basic("string"))
                .returns(TypeExpr::basic("int"))
                .returns(TypeExpr::error()),
        );
        assert!(text.contains("call: _e.mock.On(\"Get\", path),"));
        assert!(text.contains(
            "func (_e *SvcGetExpectation) ToReturn(_a0 int, _a1 error) *mock.Call {\n\
             \treturn _e.call.Return(_a0, _a1)\n}\n"
        ));
    }

    #[test]
    fn named_results_keep_their_names() {
        let mut method = Method::new("Stat");
        method.results.push(crate::model::Param::new("size", TypeExpr::basic("int64")));
        method.results.push(crate::model::Param::new("err", TypeExpr::error()));
        let text = synth(method);
        assert!(text.contains("ToReturn(size int64, err error) *mock.Call"));
        assert!(text.contains("_e.call.Return(size, err)"));
    }

    #[test]
    fn variadic_expectation_mirrors_the_call_shape() {
        let text = synth(
            Method::new("M")
                .param("a", TypeExpr::basic("int"))
                .param("rest", TypeExpr::slice(TypeExpr::basic("string")))
                .variadic(),
        );
        let prep = "\t_va := make([]interface{}, len(rest))\n\
                    \tfor _i := range rest {\n\t\t_va[_i] = rest[_i]\n\t}\n\
                    \tvar _ca []interface{}\n\
                    \t_ca = append(_ca, a)\n\
                    \t_ca = append(_ca, _va...)\n";
        let expectation = format!(
            "func (_e *SvcExpectation) M(a int, rest ...string) *SvcMExpectation {{\n\
             {prep}\treturn &SvcMExpectation{{\n\t\tcall: _e.mock.On(\"M\", _ca...),\n\t}}\n}}\n"
        );
        assert!(text.contains(&expectation), "{text}");
        assert_eq!(text.matches(prep).count(), 2);
    }
}
