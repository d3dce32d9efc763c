//! End-to-end synthesis of the declaration fixtures.

use std::path::{Path, PathBuf};

use mocksmith::VERSION;
use mocksmith::discover::load_contracts;
use mocksmith::finish::Pipeline;
use mocksmith::model::{Contract, Method, Package, TypeExpr};
use mocksmith::output::render_mock;
use mocksmith::synth::{GeneratorConfig, synthesize};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures")
        .join(name)
}

fn contracts(name: &str) -> Vec<Contract> {
    let loaded = load_contracts(&[fixture(name)]);
    assert!(loaded.skipped.is_empty(), "{name}: {:?}", loaded.skipped);
    loaded.contracts
}

fn contract(file: &str, interface: &str) -> Contract {
    contracts(file)
        .into_iter()
        .find(|c| c.name == interface)
        .unwrap()
}

fn finished(contract: &Contract, config: &GeneratorConfig) -> String {
    render_mock(contract, config, &Pipeline::standard()).unwrap()
}

fn in_package() -> GeneratorConfig {
    GeneratorConfig {
        in_package: true,
        ..GeneratorConfig::default()
    }
}

// ================================================================
// golden output
// ================================================================

#[test]
fn requester_ns_matches_golden() {
    let golden = std::fs::read_to_string(fixture("golden/RequesterNS.go"))
        .unwrap()
        .replace("v0.1.0", &format!("v{VERSION}"));
    let c = contract("requester_ns.yaml", "RequesterNS");
    assert_eq!(finished(&c, &GeneratorConfig::default()), golden);
}

#[test]
fn own_package_import_is_dropped_when_unused() {
    let c = contract("requester_ns.yaml", "RequesterNS");
    let raw = synthesize(&c, &GeneratorConfig::default()).unwrap();
    assert!(raw.contains("import requester \"github.com/acme/requester\"\n"));
    assert!(!finished(&c, &GeneratorConfig::default()).contains("acme/requester"));
}

// ================================================================
// foreign return type with error slot
// ================================================================

#[test]
fn fetcher_binds_foreign_package() {
    let c = contract("fetcher.yaml", "Fetcher");
    let text = finished(&c, &GeneratorConfig::default());
    assert!(text.contains("\tpkg \"foreign/pkg\"\n"));
    assert!(text.contains("func (_m *Fetcher) Get(path string) (pkg.Response, error) {\n"));
    assert!(text.contains("\t\tr0 = ret.Get(0).(pkg.Response)\n"));
    assert!(text.contains("\t\tr1 = ret.Error(1)\n"));
    assert!(!text.contains(".(error)"));
}

#[test]
fn fetcher_close_has_a_bare_ledger_call() {
    let c = contract("fetcher.yaml", "Fetcher");
    let text = finished(&c, &GeneratorConfig::default());
    assert!(text.contains(
        "// Close provides a mock function with given fields:\n\
         func (_m *Fetcher) Close() {\n\t_m.Called()\n}\n"
    ));
    assert!(text.contains("call: _e.mock.On(\"Close\"),"));
    assert!(text.contains(
        "func (_e *FetcherCloseExpectation) ToReturn() *mock.Call {\n\treturn _e.call.Return()\n}\n"
    ));
}

// ================================================================
// variadic flattening
// ================================================================

#[test]
fn variadic_string_slice_is_copied() {
    let c = contract("variadic.yaml", "RequesterVariadic");
    let text = finished(&c, &GeneratorConfig::default());
    assert!(text.contains(
        "func (_m *RequesterVariadic) Get(values ...string) bool {\n\
         \t_va := make([]interface{}, len(values))\n\
         \tfor _i := range values {\n\t\t_va[_i] = values[_i]\n\t}\n\
         \tvar _ca []interface{}\n\
         \t_ca = append(_ca, _va...)\n\
         \tret := _m.Called(_ca...)\n"
    ));
    assert!(text.contains("\tif rf, ok := ret.Get(0).(func(...string) bool); ok {\n\t\tr0 = rf(values...)\n"));
}

#[test]
fn variadic_interface_slice_is_passed_directly() {
    let c = contract("variadic.yaml", "RequesterVariadic");
    let text = finished(&c, &GeneratorConfig::default());
    assert!(text.contains(
        "func (_m *RequesterVariadic) OneInterface(a ...interface{}) bool {\n\
         \tvar _ca []interface{}\n\
         \t_ca = append(_ca, a...)\n\
         \tret := _m.Called(_ca...)\n"
    ));
    assert!(text.contains(
        "func (_m *RequesterVariadic) Sprintf(format string, a ...interface{}) string {\n\
         \tvar _ca []interface{}\n\
         \t_ca = append(_ca, format)\n\
         \t_ca = append(_ca, a...)\n"
    ));
}

#[test]
fn variadic_named_interface_still_copies() {
    let c = contract("variadic.yaml", "RequesterVariadic");
    let text = finished(&c, &GeneratorConfig::default());
    assert!(text.contains(
        "func (_m *RequesterVariadic) MultiWriteToFile(filename string, w ...io.Writer) string {\n\
         \t_va := make([]interface{}, len(w))\n"
    ));
    assert!(text.contains("\tio \"io\"\n"));
}

#[test]
fn variadic_foreign_element_keeps_its_import() {
    let header = TypeExpr::named(Some(Package::from_path("net/http")), "Header");
    let c = Contract::new("Sink", Package::from_path("example.com/sink"))
        .method(Method::new("Put").param("hs", TypeExpr::slice(header)).variadic());
    let text = finished(&c, &GeneratorConfig::default());
    assert!(text.contains("func (_m *Sink) Put(hs ...http.Header) {\n"), "{text}");
    assert!(text.contains("\thttp \"net/http\"\n"), "{text}");
}

#[test]
fn expectation_flattens_like_the_call() {
    let c = contract("variadic.yaml", "RequesterVariadic");
    let text = finished(&c, &GeneratorConfig::default());
    assert!(text.contains(
        "func (_e *RequesterVariadicExpectation) Sprintf(format string, a ...interface{}) *RequesterVariadicSprintfExpectation {\n\
         \tvar _ca []interface{}\n\
         \t_ca = append(_ca, format)\n\
         \t_ca = append(_ca, a...)\n\
         \treturn &RequesterVariadicSprintfExpectation{\n\
         \t\tcall: _e.mock.On(\"Sprintf\", _ca...),\n\t}\n}\n"
    ));
    let copies = text.matches("_va := make([]interface{}, len(values))").count();
    assert_eq!(copies, 2, "forwarding and expectation both copy");
}

// ================================================================
// alias collisions
// ================================================================

#[test]
fn same_named_packages_get_distinct_aliases() {
    let c = contract("collisions.yaml", "Proxy");
    let text = finished(&c, &GeneratorConfig::default());
    assert!(text.contains("\thttp \"a/http\"\n"));
    assert!(text.contains("\tbhttp \"b/http\"\n"));
    assert!(text.contains(
        "func (_m *Proxy) Forward(req *http.Request, _a1 bhttp.Client) (*http.Response, error) {\n"
    ));
    assert!(text.contains("\tret := _m.Called(req, _a1)\n"));
    assert!(text.contains("\t\tif ret.Get(0) != nil {\n\t\t\tr0 = ret.Get(0).(*http.Response)\n"));
}

// ================================================================
// composite types and placement
// ================================================================

#[test]
fn composite_types_qualify_own_package() {
    let c = contract("complex.yaml", "Store");
    let text = finished(&c, &GeneratorConfig::default());
    assert!(text.contains("func (_m *Store) Get(key store.Key) (*store.Item, bool) {\n"));
    assert!(text.contains("func (_m *Store) Watch(ctx context.Context, _a1 chan<- store.Key) <-chan error {\n"));
    assert!(text.contains("func (_m *Store) Each(fn store.Handler) {\n"));
    assert!(text.contains("\tyaml \"gopkg.in/yaml.v2\"\n"));
    assert!(text.contains("node *yaml.Node"));
    assert!(text.contains("ToReturn(item *store.Item, found bool) *mock.Call {\n\treturn _e.call.Return(item, found)\n}\n"));
}

#[test]
fn named_reference_types_get_nil_checks() {
    let c = contract("complex.yaml", "Store");
    let text = finished(&c, &GeneratorConfig::default());
    // Index is declared as a map.
    assert!(text.contains("\t\tif ret.Get(0) != nil {\n\t\t\tr0 = ret.Get(0).(store.Index)\n"));
    assert!(text.contains("\t\tif ret.Get(1) != nil {\n\t\t\tr1 = ret.Get(1).([4]byte)\n"));
}

#[test]
fn in_package_mock_uses_bare_names() {
    let c = contract("complex.yaml", "Store");
    let text = finished(&c, &in_package());
    assert!(text.contains("package store\n"));
    assert!(text.contains("type MockStore struct {\n\tmock.Mock\n}\n"));
    assert!(text.contains("func (_m *MockStore) Get(key Key) (*Item, bool) {\n"));
    assert!(!text.contains("github.com/acme/store"));
}

#[test]
fn unexported_interface_mock_name() {
    let c = contract("complex.yaml", "internalCache");
    let outside = finished(&c, &GeneratorConfig::default());
    assert!(outside.contains("type internalCache struct {"));
    let inside = finished(&c, &in_package());
    assert!(inside.contains("type mockInternalCache struct {"));
    assert!(inside.contains("func (_m *mockInternalCache) Evict(keys ...Key) {\n"));
}

// ================================================================
// determinism
// ================================================================

#[test]
fn synthesis_is_deterministic() {
    for file in [
        "requester_ns.yaml",
        "fetcher.yaml",
        "variadic.yaml",
        "collisions.yaml",
        "complex.yaml",
    ] {
        for c in contracts(file) {
            for config in [GeneratorConfig::default(), in_package()] {
                let first = synthesize(&c, &config).unwrap();
                let second = synthesize(&c, &config).unwrap();
                assert_eq!(first, second, "{file}: {}", c.name);
            }
        }
    }
}

#[test]
fn every_fixture_survives_import_cleanup() {
    for file in [
        "requester_ns.yaml",
        "fetcher.yaml",
        "variadic.yaml",
        "collisions.yaml",
        "complex.yaml",
    ] {
        for c in contracts(file) {
            let text = finished(&c, &GeneratorConfig::default());
            assert!(text.starts_with("// Code generated by mocksmith"), "{file}");
            assert!(text.ends_with("}\n"), "{file}");
        }
    }
}
