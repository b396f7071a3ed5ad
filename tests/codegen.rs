use pallenec::driver::{self, Config};

fn emit_c(source: &str) -> String {
    driver::compile_source("test.pln", source, &Config::default())
        .expect("source should compile")
        .c_source
        .unwrap()
}

#[test]
fn test_module_entry_point_and_export_table() {
    let c = emit_c("function f(): integer return 10 end");
    assert!(c.contains("int luaopen_test(lua_State *L)"), "got:\n{c}");
    assert!(c.contains("lua_pushcfunction(L, test_f_entry);"));
    assert!(c.contains("lua_setfield(L, -2, \"f\");"));
}

#[test]
fn test_argument_validation_message() {
    let c = emit_c("function id_int(x: integer): integer return x end");
    assert!(
        c.contains(
            "wrong type for argument x at line 1, expected integer but found %s"
        ),
        "got:\n{c}"
    );
    assert!(c.contains("wrong number of arguments to function 'id_int'"));
}

#[test]
fn test_checked_array_access_messages() {
    let c = emit_c(
        "function get(arr: {integer}, i: integer): integer return arr[i] end",
    );
    assert!(c.contains("array index out of bounds at line 1"), "got:\n{c}");
    assert!(
        c.contains("wrong type for array element at line 1, expected integer but found %s")
    );
}

#[test]
fn test_static_call_path_skips_the_wrapper() {
    let c = emit_c(
        "function gcd(a: integer, b: integer): integer\n  if b == 0 then\n    return a\n  else\n    return gcd(b, a % b)\n  end\nend",
    );
    // the recursive call goes to the unchecked body, not the entry
    assert!(c.contains("lua_pushcfunction(L, test_gcd_c);"), "got:\n{c}");
    assert!(c.contains("static int test_gcd_entry(lua_State *L)"));
}

#[test]
fn test_integer_arithmetic_wraps_via_unsigned_math() {
    let c = emit_c("function add(a: integer, b: integer): integer return a + b end");
    assert!(
        c.contains("(uint64_t)(lua_tointeger(L, 1)) + (uint64_t)(lua_tointeger(L, 2))"),
        "got:\n{c}"
    );
}

#[test]
fn test_globals_are_initialized_at_load_time() {
    let c = emit_c("export counter: integer = 0\n");
    assert!(c.contains("static int test__init_c(lua_State *L)"), "got:\n{c}");
    assert!(c.contains("lua_pushcfunction(L, test__init_c);"));
}

#[test]
fn test_division_by_zero_stays_a_runtime_error() {
    let c = emit_c("function f(a: integer, b: integer): integer return a // b end");
    assert!(c.contains("attempt to perform 'n//0'"), "got:\n{c}");
}

#[test]
fn test_unbox_check_reports_the_cast_line() {
    let c = emit_c("function f(v: any): integer\n  return v as integer\nend");
    assert!(
        c.contains("wrong type for value at line 2, expected integer but found %s"),
        "got:\n{c}"
    );
}
