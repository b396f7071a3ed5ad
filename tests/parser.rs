use pallenec::parser::{self, ast::*};

fn parse_ok(source: &str) -> Program<()> {
    parser::parse("test.pln", source)
        .expect("program should parse")
        .program
}

fn parse_err(source: &str) -> Vec<parser::ParseError> {
    parser::parse("test.pln", source).expect_err("program should not parse")
}

#[test]
fn test_simple_function() {
    let program = parse_ok("function f(): integer return 10 end");
    assert_eq!(program.toplevels.len(), 1);
    let TopLevel::Func(func) = &program.toplevels[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(func.name, "f");
    assert_eq!(func.visibility, Visibility::Export);
    assert!(func.params.is_empty());
    assert!(matches!(func.ret_types[..], [TypeName::Integer(_)]));
    assert!(matches!(
        func.body.stats[..],
        [Stat::Return { ref values, .. }] if values.len() == 1
    ));
}

#[test]
fn test_missing_end_reports_catalog_message() {
    let errors = parse_err("function f(): integer return 10");
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0]
            .message
            .contains("Expected 'end' to close the function body."),
        "got: {}",
        errors[0].message
    );
}

#[test]
fn test_break_outside_loop() {
    let errors = parse_err("function f()\n  break\nend");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "break statement outside loop");
    assert_eq!(errors[0].loc.line, 2);
    assert_eq!(errors[0].loc.col, 3);
}

#[test]
fn test_break_inside_loop_is_fine() {
    parse_ok("function f()\n  while true do break end\nend");
    parse_ok("function f()\n  repeat break until true\nend");
    parse_ok("function f()\n  for i = 1, 10 do break end\nend");
}

#[test]
fn test_break_in_lambda_inside_loop_is_rejected() {
    let errors = parse_err(
        "function f()\n  while true do\n    local g = function() break end\n  end\nend",
    );
    assert_eq!(errors[0].message, "break statement outside loop");
}

#[test]
fn test_assignment_to_call_is_rejected() {
    let errors = parse_err("function f()\n  g() = 1\nend");
    assert_eq!(errors[0].message, "left side of assignment is not a variable");
}

#[test]
fn test_operator_precedence() {
    let program = parse_ok("local x = 1 + 2 * 3");
    let TopLevel::Var(var) = &program.toplevels[0] else {
        panic!("expected a variable");
    };
    // multiplication binds tighter: 1 + (2 * 3)
    let Exp::Binop { op, lhs, rhs, .. } = &var.value else {
        panic!("expected a binop");
    };
    assert_eq!(*op, Binop::Add);
    assert!(matches!(**lhs, Exp::Integer { value: 1, .. }));
    assert!(matches!(**rhs, Exp::Binop { op: Binop::Mul, .. }));
}

#[test]
fn test_power_is_right_associative() {
    let program = parse_ok("local x = 2.0 ^ 3.0 ^ 2.0");
    let TopLevel::Var(var) = &program.toplevels[0] else {
        panic!("expected a variable");
    };
    let Exp::Binop { op, rhs, .. } = &var.value else {
        panic!("expected a binop");
    };
    assert_eq!(*op, Binop::Pow);
    assert!(matches!(**rhs, Exp::Binop { op: Binop::Pow, .. }));
}

#[test]
fn test_concat_runs_flatten() {
    let program = parse_ok("local x = a .. b .. c");
    let TopLevel::Var(var) = &program.toplevels[0] else {
        panic!("expected a variable");
    };
    let Exp::Concat { parts, .. } = &var.value else {
        panic!("expected a concat");
    };
    assert_eq!(parts.len(), 3);
}

#[test]
fn test_integer_and_float_literals_stay_distinct() {
    let program = parse_ok("local a = 1\nlocal b = 1.0");
    let TopLevel::Var(a) = &program.toplevels[0] else {
        panic!()
    };
    let TopLevel::Var(b) = &program.toplevels[1] else {
        panic!()
    };
    assert!(matches!(a.value, Exp::Integer { value: 1, .. }));
    assert!(matches!(b.value, Exp::Float { value, .. } if value == 1.0));
}

#[test]
fn test_cast_span_covers_as_and_type() {
    let source = "local x = 10 as float";
    let program = parse_ok(source);
    let TopLevel::Var(var) = &program.toplevels[0] else {
        panic!()
    };
    let Exp::Cast { span, .. } = &var.value else {
        panic!("expected a cast");
    };
    assert_eq!(&source[span.start..span.end], "as float");
}

#[test]
fn test_annotation_span_covers_colon_and_type() {
    let source = "local xs: integer = 10";
    let program = parse_ok(source);
    let TopLevel::Var(var) = &program.toplevels[0] else {
        panic!()
    };
    let span = var.annotation.expect("annotated variable");
    assert_eq!(&source[span.start..span.end], ": integer");
}

#[test]
fn test_tuple_return_annotation_includes_parens() {
    let source = "function f(): (integer, string) return 1, \"a\" end";
    let program = parse_ok(source);
    let TopLevel::Func(func) = &program.toplevels[0] else {
        panic!()
    };
    let span = func.ret_annotation.expect("annotated returns");
    assert_eq!(&source[span.start..span.end], ": (integer, string)");
    assert_eq!(func.ret_types.len(), 2);
}

#[test]
fn test_record_declaration() {
    let source = "record Point\n  x: float\n  y: float\nend";
    let program = parse_ok(source);
    let TopLevel::Record(record) = &program.toplevels[0] else {
        panic!("expected a record");
    };
    assert_eq!(record.name, "Point");
    assert_eq!(record.fields.len(), 2);
    assert_eq!(&source[record.span.start..record.span.end], source);
}

#[test]
fn test_import_declaration() {
    let program = parse_ok("local m = import(\"foo\")");
    let TopLevel::Import(import) = &program.toplevels[0] else {
        panic!("expected an import");
    };
    assert_eq!(import.name, "m");
    assert_eq!(import.module, "foo");
}

#[test]
fn test_module_return_parses() {
    let program = parse_ok("local function f() end\nreturn {\n    f = f,\n}\n");
    assert!(matches!(
        program.toplevels[1],
        TopLevel::ModuleReturn { .. }
    ));
}

#[test]
fn test_method_call() {
    let program = parse_ok("function f(o: any)\n  o:step(1)\nend");
    let TopLevel::Func(func) = &program.toplevels[0] else {
        panic!()
    };
    let Stat::Call { call, .. } = &func.body.stats[0] else {
        panic!("expected a call statement");
    };
    assert!(matches!(call, Exp::CallMethod { method, .. } if method == "step"));
}

#[test]
fn test_export_keyword_offset_recorded() {
    let source = "export function f() end";
    let program = parse_ok(source);
    let TopLevel::Func(func) = &program.toplevels[0] else {
        panic!()
    };
    assert_eq!(func.export_kw, Some(0));
    assert_eq!(&source[0..6], "export");
}
