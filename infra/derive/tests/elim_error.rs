#[test]
fn elim_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/elim_error_pass.rs");
    t.pass("tests/ui/elim_error_context.rs");
}
