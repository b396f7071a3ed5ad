use pallenec::driver::{self, CompileError, Config, StopAfter};
use pallenec::ir::{Cmd, Value};
use pallenec::optimizer::PassConfig;
use pallenec::parser::ast::{Exp, Stat, TopLevel};
use pallenec::typechecker::Type;

fn config(stop_after: StopAfter) -> Config {
    Config {
        stop_after,
        passes: PassConfig::all(),
    }
}

fn check_errors(source: &str) -> Vec<String> {
    match driver::compile_source("test.pln", source, &config(StopAfter::Check)) {
        Ok(_) => panic!("source should not check"),
        Err(error) => error.render(),
    }
}

#[test]
fn test_undeclared_type_message() {
    let errors = check_errors("function f(x: Foo) end");
    assert!(
        errors[0].contains("type 'Foo' is not declared"),
        "got: {errors:?}"
    );
}

#[test]
fn test_circular_typealias_is_reported() {
    let errors = check_errors("typealias A = B\ntypealias B = A\nlocal function f() end");
    assert!(
        errors.iter().any(|e| e.contains("circular typealias")),
        "got: {errors:?}"
    );
}

#[test]
fn test_mixed_arithmetic_inserts_promotion() {
    let artifacts = driver::compile_source(
        "test.pln",
        "function f(x: integer, y: float): float return x + y end",
        &config(StopAfter::Check),
    )
    .unwrap();
    let checked = artifacts.checked.unwrap();
    let TopLevel::Func(func) = &checked.program.toplevels[0] else {
        panic!("expected a function");
    };
    let Stat::Return { values, .. } = &func.body.stats[0] else {
        panic!("expected a return");
    };
    let Exp::Binop { lhs, rhs, info, .. } = &values[0] else {
        panic!("expected a binop");
    };
    // after checking, both operand slots are float
    assert!(matches!(lhs.as_ref(), Exp::ToFloat { .. }));
    assert_eq!(*lhs.info(), Type::Float);
    assert_eq!(*rhs.info(), Type::Float);
    assert_eq!(*info, Type::Float);
}

#[test]
fn test_division_always_produces_float() {
    let artifacts = driver::compile_source(
        "test.pln",
        "function f(x: integer): float return x / 2 end",
        &config(StopAfter::Check),
    )
    .unwrap();
    let checked = artifacts.checked.unwrap();
    let TopLevel::Func(func) = &checked.program.toplevels[0] else {
        panic!()
    };
    let Stat::Return { values, .. } = &func.body.stats[0] else {
        panic!()
    };
    assert_eq!(*values[0].info(), Type::Float);
}

#[test]
fn test_void_function_rejects_return_value() {
    let errors = check_errors("function f() return 1 end");
    assert!(
        errors[0].contains("return statement with a value"),
        "got: {errors:?}"
    );
}

#[test]
fn test_value_function_rejects_bare_return() {
    let errors = check_errors("function f(): integer return end");
    assert!(
        errors[0].contains("return statement returns 0 value(s)"),
        "got: {errors:?}"
    );
}

#[test]
fn test_errors_accumulate_in_source_order() {
    let errors = check_errors(
        "function f(): integer\n  local a: integer = true\n  local b: integer = nope\n  return a\nend",
    );
    assert!(errors.len() >= 2, "got: {errors:?}");
    assert!(errors[0].contains("test.pln:2:"), "got: {errors:?}");
    assert!(errors[1].contains("test.pln:3:"), "got: {errors:?}");
}

#[test]
fn test_initializer_list_needs_context() {
    let errors = check_errors("function f()\n  local xs = {1, 2}\nend");
    assert!(
        errors[0].contains("initializer list needs a type annotation"),
        "got: {errors:?}"
    );
}

#[test]
fn test_array_literal_with_context_checks_elements() {
    let errors = check_errors("function f()\n  local xs: { integer } = {1, true}\nend");
    assert!(
        errors[0].contains("expected integer but found boolean"),
        "got: {errors:?}"
    );
}

#[test]
fn test_lambda_cannot_capture_function_locals() {
    let errors =
        check_errors("function f()\n  local x: integer = 1\n  local g = function(): integer return x end\nend");
    assert!(
        errors[0].contains("cannot capture local variable 'x'"),
        "got: {errors:?}"
    );
}

#[test]
fn test_uninitialized_read_is_rejected() {
    let source = "function f(): integer\n  local x: integer\n  return x\nend";
    let result = driver::compile_source("test.pln", source, &config(StopAfter::Optimize));
    match result {
        Err(CompileError::Analysis(error)) => {
            assert!(error.message.contains("'x' may be used uninitialized"));
        }
        other => panic!("expected an analysis error, got {other:?}"),
    }
}

#[test]
fn test_branch_initialization_joins_by_intersection() {
    let source = "function f(c: boolean): integer\n  local x: integer\n  if c then x = 1 end\n  return x\nend";
    let result = driver::compile_source("test.pln", source, &config(StopAfter::Optimize));
    assert!(matches!(result, Err(CompileError::Analysis(_))));

    let source = "function f(c: boolean): integer\n  local x: integer\n  if c then x = 1 else x = 2 end\n  return x\nend";
    driver::compile_source("test.pln", source, &config(StopAfter::Optimize))
        .expect("both branches initialize x");
}

#[test]
fn test_pass_selection_skips_disabled_passes() {
    let source = "function f(): integer\n  local x: integer\n  return x\nend";
    let config = Config {
        stop_after: StopAfter::Optimize,
        passes: PassConfig::only(["constant_propagation"]),
    };
    // without the uninitialized pass the program goes through
    driver::compile_source("test.pln", source, &config).unwrap();
}

#[test]
fn test_constant_propagation_rewrites_returns() {
    let source = "function f(): integer\n  local x: integer = 10\n  return x\nend";
    let artifacts =
        driver::compile_source("test.pln", source, &config(StopAfter::Optimize)).unwrap();
    let module = artifacts.ir.unwrap();
    let f = &module.functions[0];
    assert_eq!(
        f.body,
        vec![Cmd::Return {
            values: vec![Value::Integer(10)]
        }]
    );
}

#[test]
fn test_constant_propagation_can_be_disabled() {
    let source = "function f(): integer\n  local x: integer = 10\n  return x\nend";
    let config = Config {
        stop_after: StopAfter::Optimize,
        passes: PassConfig::only(["uninitialized"]),
    };
    let artifacts = driver::compile_source("test.pln", source, &config).unwrap();
    let module = artifacts.ir.unwrap();
    let f = &module.functions[0];
    // the literal move is still in place
    assert!(f
        .body
        .iter()
        .any(|cmd| matches!(cmd, Cmd::Move { src: Value::Integer(10), .. })));
}

#[test]
fn test_constant_propagation_is_idempotent_on_the_module() {
    let source = "function f(): integer\n  local a: integer = 6\n  local b: integer = 7\n  return a * b\nend";
    let once =
        driver::compile_source("test.pln", source, &config(StopAfter::Optimize)).unwrap();
    let module = once.ir.unwrap();
    let again = pallenec::optimizer::optimize(module.clone(), &PassConfig::all()).unwrap();
    assert_eq!(module, again);
}

#[test]
fn test_short_circuit_lowering_produces_if() {
    let source = "function f(a: boolean, b: boolean): boolean return a and b end";
    let artifacts =
        driver::compile_source("test.pln", source, &config(StopAfter::Lower)).unwrap();
    let module = artifacts.ir.unwrap();
    let f = &module.functions[0];
    assert!(f.body.iter().any(|cmd| matches!(cmd, Cmd::If { .. })));
}

#[test]
fn test_for_loop_specializes_on_var_type() {
    let int_for = "function f()\n  for i = 1, 10 do end\nend";
    let float_for = "function f()\n  for x = 1.0, 10.0, 0.5 do end\nend";

    let artifacts =
        driver::compile_source("test.pln", int_for, &config(StopAfter::Lower)).unwrap();
    let body = &artifacts.ir.unwrap().functions[0].body;
    assert!(body.iter().any(|cmd| matches!(cmd, Cmd::ForNumInt { .. })));

    let artifacts =
        driver::compile_source("test.pln", float_for, &config(StopAfter::Lower)).unwrap();
    let body = &artifacts.ir.unwrap().functions[0].body;
    assert!(body.iter().any(|cmd| matches!(cmd, Cmd::ForNumFloat { .. })));
}

#[test]
fn test_gcd_constant_folds_to_its_answer() {
    // the recursive call itself cannot fold, but the seed values can
    let source = "function gcd(a: integer, b: integer): integer\n  if b == 0 then\n    return a\n  else\n    return gcd(b, a % b)\n  end\nend\nexport start: integer = 30 % 105\n";
    let artifacts =
        driver::compile_source("test.pln", source, &config(StopAfter::Optimize)).unwrap();
    let module = artifacts.ir.unwrap();
    assert!(module
        .init
        .body
        .iter()
        .any(|cmd| matches!(cmd, Cmd::SetGlobal { src: Value::Integer(30), .. })));
}

#[test]
fn test_module_name_replaces_slashes() {
    assert_eq!(driver::module_name_of("foo/bar.pln"), "foo_bar");
    assert_eq!(driver::module_name_of("baz.pln"), "baz");
}

#[test]
fn test_exports_in_declaration_order() {
    let source = "export function b() end\nexport n: integer = 1\nexport function a() end\n";
    let artifacts =
        driver::compile_source("test.pln", source, &config(StopAfter::Lower)).unwrap();
    let module = artifacts.ir.unwrap();
    let names: Vec<&str> = module.exports.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["b", "n", "a"]);
}

#[test]
fn test_emit_lua_writes_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mod.pln");
    std::fs::write(&input, "local xs: integer = 10\n").unwrap();

    let output =
        driver::compile_file(&input, driver::Mode::EmitLua, &Config::default()).unwrap();
    assert_eq!(output, dir.path().join("mod.lua"));
    assert_eq!(
        std::fs::read_to_string(output).unwrap(),
        "local xs          = 10\n"
    );
}

#[test]
fn test_extension_mismatch_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mod.lua");
    std::fs::write(&input, "").unwrap();

    let result = driver::compile_file(&input, driver::Mode::EmitLua, &Config::default());
    match result {
        Err(CompileError::Io(message)) => {
            assert!(message.contains(".pln"), "got: {message}")
        }
        other => panic!("expected an io error, got {other:?}"),
    }
}
