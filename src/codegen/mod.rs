//! C back end.
//!
//! Walks the IR and emits one C translation unit against the Lua C API.
//! Every IR function becomes a `lua_CFunction` whose locals live in
//! stack slots `1..=n`; the exported entry wrappers validate argument
//! count and tags with the runtime's message format before delegating to
//! the unchecked body, which is also the target of the direct-call path.
//! Integer arithmetic is emitted through unsigned intermediates so it
//! wraps in two's complement like the Lua runtime, and checked array
//! accesses emit the bounds and tag diagnostics the compiler promised.

use std::fmt::Write;

use crate::ir::{Cmd, Conversion, ExportItem, Function, IrBinop, IrUnop, Module, Value};
use crate::typechecker::Type;

pub fn emit(module: &Module) -> String {
    let mut gen = CodeGen {
        module,
        out: String::new(),
    };
    gen.emit_unit();
    gen.out
}

struct CodeGen<'a> {
    module: &'a Module,
    out: String,
}

/// Registry key under which the module keeps its globals table.
fn globals_key(module: &Module) -> String {
    format!("pallene_{}_globals", module.name)
}

fn c_name(module: &Module, name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}", module.name, sanitized)
}

fn c_string(bytes: &str) -> String {
    let mut out = String::from("\"");
    for &b in bytes.as_bytes() {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            // octal escapes cannot swallow following characters
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out.push('"');
    out
}

/// The runtime-facing name of a type, used in error messages.
fn type_name(typ: &Type) -> &'static str {
    match typ {
        Type::Nil => "nil",
        Type::Boolean => "boolean",
        Type::Integer => "integer",
        Type::Float => "float",
        Type::String => "string",
        Type::Any => "value",
        Type::Array(_) => "array",
        Type::Table(_) => "table",
        Type::Record(_) => "record",
        Type::Function { .. } => "function",
    }
}

/// C predicate matching a value of the given type at a stack index.
fn tag_predicate(typ: &Type, index: &str) -> Option<String> {
    let pred = match typ {
        Type::Any => return None,
        Type::Nil => format!("lua_isnil(L, {index})"),
        Type::Boolean => format!("lua_isboolean(L, {index})"),
        Type::Integer => format!("lua_isinteger(L, {index})"),
        Type::Float => format!(
            "(lua_type(L, {index}) == LUA_TNUMBER && !lua_isinteger(L, {index}))"
        ),
        Type::String => format!("(lua_type(L, {index}) == LUA_TSTRING)"),
        Type::Array(_) | Type::Table(_) | Type::Record(_) => {
            format!("lua_istable(L, {index})")
        }
        Type::Function { .. } => format!("lua_isfunction(L, {index})"),
    };
    Some(pred)
}

impl<'a> CodeGen<'a> {
    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn emit_unit(&mut self) {
        let module_name = self.module.name.clone();
        self.line(0, &format!("/* generated by pallenec: module {module_name} */"));
        self.line(0, "#include <lua.h>");
        self.line(0, "#include <lauxlib.h>");
        self.line(0, "#include <stdint.h>");
        self.line(0, "#include <string.h>");
        self.line(0, "#include <math.h>");
        self.line(0, "");
        self.emit_prelude();

        // forward declarations so any call order works
        let module = self.module;
        for function in &module.functions {
            let body = c_name(module, &function.name);
            self.line(0, &format!("static int {body}_c(lua_State *L);"));
            if function.exported {
                self.line(0, &format!("static int {body}_entry(lua_State *L);"));
            }
        }
        let init = c_name(module, "_init");
        self.line(0, &format!("static int {init}_c(lua_State *L);"));
        self.line(0, "");

        for function in &module.functions {
            self.emit_function(function);
            if function.exported {
                self.emit_entry(function);
            }
        }
        self.emit_init(&module.init);
        self.emit_luaopen();
    }

    fn emit_prelude(&mut self) {
        let prelude = r#"static double pallene_bits_to_double(uint64_t bits) {
    double d;
    memcpy(&d, &bits, sizeof d);
    return d;
}

static const char *pallene_typename(lua_State *L, int index) {
    if (lua_isinteger(L, index)) return "integer";
    if (lua_type(L, index) == LUA_TNUMBER) return "float";
    return luaL_typename(L, index);
}

static lua_Integer pallene_imod(lua_Integer a, lua_Integer b) {
    lua_Integer r;
    if (b == -1) return 0;
    r = a % b;
    if (r != 0 && (r ^ b) < 0) r += b;
    return r;
}

static lua_Integer pallene_idiv(lua_Integer a, lua_Integer b) {
    lua_Integer q;
    if (b == -1) return (lua_Integer)(0 - (uint64_t)a);
    q = a / b;
    if ((a ^ b) < 0 && q * b != a) q -= 1;
    return q;
}

static double pallene_fmod(double a, double b) {
    double r = fmod(a, b);
    if (r != 0.0 && (r < 0.0) != (b < 0.0)) r += b;
    return r;
}

static lua_Integer pallene_shl(lua_Integer a, lua_Integer b);

static lua_Integer pallene_shr(lua_Integer a, lua_Integer b) {
    if (b < 0) return pallene_shl(a, (lua_Integer)(0 - (uint64_t)b));
    if (b >= 64) return 0;
    return (lua_Integer)((uint64_t)a >> b);
}

static lua_Integer pallene_shl(lua_Integer a, lua_Integer b) {
    if (b < 0) return pallene_shr(a, (lua_Integer)(0 - (uint64_t)b));
    if (b >= 64) return 0;
    return (lua_Integer)((uint64_t)a << b);
}

static int pallene_d2i(double n, lua_Integer *out) {
    if (!(n >= -9223372036854775808.0 && n < 9223372036854775808.0)) return 0;
    if (n != floor(n)) return 0;
    *out = (lua_Integer)n;
    return 1;
}
"#;
        self.out.push_str(prelude);
        self.out.push('\n');
    }

    fn slot(index: usize) -> String {
        format!("{}", index + 1)
    }

    fn int_expr(&self, value: &Value) -> String {
        match value {
            Value::Integer(n) => {
                if *n == i64::MIN {
                    "(lua_Integer)INT64_MIN".to_string()
                } else {
                    format!("(lua_Integer){n}LL")
                }
            }
            Value::Local(index) => format!("lua_tointeger(L, {})", Self::slot(*index)),
            other => unreachable!("integer context for {other:?}"),
        }
    }

    fn num_expr(&self, value: &Value) -> String {
        match value {
            Value::Float(x) => format!(
                "pallene_bits_to_double(UINT64_C(0x{:016x}))",
                x.to_bits()
            ),
            Value::Integer(n) => format!("(lua_Number){n}.0", n = n),
            Value::Local(index) => format!("lua_tonumber(L, {})", Self::slot(*index)),
            other => unreachable!("float context for {other:?}"),
        }
    }

    fn bool_expr(&self, value: &Value) -> String {
        match value {
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Local(index) => format!("lua_toboolean(L, {})", Self::slot(*index)),
            other => unreachable!("boolean context for {other:?}"),
        }
    }

    /// Emit a statement pushing `value` onto the Lua stack.
    fn push_value(&mut self, indent: usize, value: &Value) {
        let stmt = match value {
            Value::Nil => "lua_pushnil(L);".to_string(),
            Value::Bool(b) => format!("lua_pushboolean(L, {});", i32::from(*b)),
            Value::Integer(_) => format!("lua_pushinteger(L, {});", self.int_expr(value)),
            Value::Float(_) => format!("lua_pushnumber(L, {});", self.num_expr(value)),
            Value::String(s) => format!(
                "lua_pushlstring(L, {}, {});",
                c_string(s),
                s.as_bytes().len()
            ),
            Value::Local(index) => format!("lua_pushvalue(L, {});", Self::slot(*index)),
            Value::Function(index) => {
                let name = c_name(self.module, &self.module.functions[*index].name);
                let target = if self.module.functions[*index].exported {
                    format!("{name}_entry")
                } else {
                    format!("{name}_c")
                };
                format!("lua_pushcfunction(L, {target});")
            }
        };
        self.line(indent, &stmt);
    }

    fn emit_tag_check(
        &mut self,
        indent: usize,
        typ: &Type,
        index: &str,
        what: &str,
        line: u32,
    ) {
        if let Some(pred) = tag_predicate(typ, index) {
            self.line(indent, &format!("if (!{pred})"));
            self.line(
                indent + 1,
                &format!(
                    "return luaL_error(L, \"wrong type for {what} at line {line}, \
                     expected {expected} but found %s\", pallene_typename(L, {index}));",
                    expected = type_name(typ)
                ),
            );
        }
    }

    fn emit_function(&mut self, function: &Function) {
        let name = c_name(self.module, &function.name);
        self.line(0, &format!("static int {name}_c(lua_State *L) {{"));
        self.line(
            1,
            &format!(
                "luaL_checkstack(L, {}, \"{}\");",
                function.locals.len() + 8,
                function.name
            ),
        );
        self.line(1, &format!("lua_settop(L, {});", function.locals.len()));
        self.emit_cmds(1, &function.body);
        self.line(1, "return 0;");
        self.line(0, "}");
        self.line(0, "");
    }

    /// The validating wrapper used by dynamic callers: checks argument
    /// count and tags, then runs the unchecked body in the same frame.
    fn emit_entry(&mut self, function: &Function) {
        let name = c_name(self.module, &function.name);
        let Type::Function { params, .. } = &function.typ else {
            unreachable!("IR functions carry function types")
        };
        let line = function.loc.line;

        self.line(0, &format!("static int {name}_entry(lua_State *L) {{"));
        self.line(
            1,
            &format!("if (lua_gettop(L) != {argc})", argc = params.len()),
        );
        self.line(
            2,
            &format!(
                "return luaL_error(L, \"wrong number of arguments to function '{}', \
                 expected {} but received %d\", lua_gettop(L));",
                function.name,
                params.len()
            ),
        );
        for (index, param_type) in params.iter().enumerate() {
            let what = format!("argument {}", function.locals[index].name);
            let slot = format!("{}", index + 1);
            self.emit_tag_check(1, param_type, &slot, &what, line);
        }
        self.line(1, &format!("return {name}_c(L);"));
        self.line(0, "}");
        self.line(0, "");
    }

    fn emit_init(&mut self, init: &Function) {
        let name = c_name(self.module, "_init");
        self.line(0, &format!("static int {name}_c(lua_State *L) {{"));
        self.line(
            1,
            &format!("luaL_checkstack(L, {}, \"init\");", init.locals.len() + 8),
        );
        self.line(1, &format!("lua_settop(L, {});", init.locals.len()));
        self.emit_cmds(1, &init.body);
        self.line(1, "return 0;");
        self.line(0, "}");
        self.line(0, "");
    }

    fn emit_luaopen(&mut self) {
        let module = self.module;
        let key = globals_key(module);
        let init = c_name(module, "_init");
        self.line(
            0,
            &format!("int luaopen_{}(lua_State *L) {{", module.name),
        );
        self.line(1, "lua_newtable(L);");
        self.line(1, &format!("lua_setfield(L, LUA_REGISTRYINDEX, \"{key}\");"));

        for (index, global) in module.globals.iter().enumerate() {
            if let Some(module) = &global.import {
                self.line(1, &format!("lua_getfield(L, LUA_REGISTRYINDEX, \"{key}\");"));
                self.line(1, "lua_getglobal(L, \"require\");");
                self.line(1, &format!("lua_pushstring(L, {});", c_string(module)));
                self.line(1, "lua_call(L, 1, 1);");
                self.line(1, &format!("lua_seti(L, -2, {index});"));
                self.line(1, "lua_pop(L, 1);");
            }
        }

        self.line(1, &format!("lua_pushcfunction(L, {init}_c);"));
        self.line(1, "lua_call(L, 0, 0);");

        self.line(
            1,
            &format!("lua_createtable(L, 0, {});", module.exports.len()),
        );
        for export in &module.exports {
            match export.item {
                ExportItem::Function(index) => {
                    let name = c_name(module, &module.functions[index].name);
                    self.line(1, &format!("lua_pushcfunction(L, {name}_entry);"));
                }
                ExportItem::Global(index) => {
                    self.line(
                        1,
                        &format!("lua_getfield(L, LUA_REGISTRYINDEX, \"{key}\");"),
                    );
                    self.line(1, &format!("lua_geti(L, -1, {index});"));
                    self.line(1, "lua_remove(L, -2);");
                }
            }
            self.line(
                1,
                &format!("lua_setfield(L, -2, {});", c_string(&export.name)),
            );
        }
        self.line(1, "return 1;");
        self.line(0, "}");
    }

    fn emit_cmds(&mut self, indent: usize, cmds: &[Cmd]) {
        for cmd in cmds {
            self.emit_cmd(indent, cmd);
        }
    }

    fn replace_dst(&mut self, indent: usize, dst: usize) {
        self.line(indent, &format!("lua_replace(L, {});", Self::slot(dst)));
    }

    fn emit_cmd(&mut self, indent: usize, cmd: &Cmd) {
        match cmd {
            Cmd::Move { dst, src } => {
                self.push_value(indent, src);
                self.replace_dst(indent, *dst);
            }
            Cmd::Unop { dst, op, src } => {
                self.emit_unop(indent, *op, src);
                self.replace_dst(indent, *dst);
            }
            Cmd::Binop { dst, op, lhs, rhs } => {
                self.emit_binop(indent, *op, lhs, rhs);
                self.replace_dst(indent, *dst);
            }
            Cmd::Concat { dst, srcs } => {
                for src in srcs {
                    self.push_value(indent, src);
                }
                self.line(indent, &format!("lua_concat(L, {});", srcs.len()));
                self.replace_dst(indent, *dst);
            }
            Cmd::Convert {
                dst,
                conv,
                src,
                line,
            } => {
                self.emit_convert(indent, conv, src, *line);
                self.replace_dst(indent, *dst);
            }
            Cmd::NewArray { dst, elems } => {
                self.line(
                    indent,
                    &format!("lua_createtable(L, {}, 0);", elems.len()),
                );
                for (offset, elem) in elems.iter().enumerate() {
                    self.push_value(indent, elem);
                    self.line(indent, &format!("lua_seti(L, -2, {});", offset + 1));
                }
                self.replace_dst(indent, *dst);
            }
            Cmd::NewTable { dst, fields } => {
                self.line(
                    indent,
                    &format!("lua_createtable(L, 0, {});", fields.len()),
                );
                for (field, value) in fields {
                    self.push_value(indent, value);
                    self.line(
                        indent,
                        &format!("lua_setfield(L, -2, {});", c_string(field)),
                    );
                }
                self.replace_dst(indent, *dst);
            }
            Cmd::GetArr {
                dst,
                arr,
                idx,
                elem,
                line,
            } => {
                self.push_value(indent, arr);
                let idx_expr = self.int_expr(idx);
                self.line(indent, "{");
                self.line(indent + 1, &format!("lua_Integer i = {idx_expr};"));
                self.line(
                    indent + 1,
                    "if (i < 1 || (lua_Unsigned)i > lua_rawlen(L, -1))",
                );
                self.line(
                    indent + 2,
                    &format!(
                        "return luaL_error(L, \"array index out of bounds at line {line}\");"
                    ),
                );
                self.line(indent + 1, "lua_geti(L, -1, i);");
                self.line(indent, "}");
                self.emit_tag_check(indent, elem, "-1", "array element", *line);
                self.line(indent, "lua_remove(L, -2);");
                self.replace_dst(indent, *dst);
            }
            Cmd::SetArr {
                arr,
                idx,
                src,
                elem: _,
                line,
            } => {
                self.push_value(indent, arr);
                let idx_expr = self.int_expr(idx);
                self.line(indent, "{");
                self.line(indent + 1, &format!("lua_Integer i = {idx_expr};"));
                // writing one slot past the end grows the array
                self.line(
                    indent + 1,
                    "if (i < 1 || (lua_Unsigned)i > lua_rawlen(L, -1) + 1)",
                );
                self.line(
                    indent + 2,
                    &format!(
                        "return luaL_error(L, \"array index out of bounds at line {line}\");"
                    ),
                );
                self.push_value(indent + 1, src);
                self.line(indent + 1, "lua_seti(L, -2, i);");
                self.line(indent, "}");
                self.line(indent, "lua_pop(L, 1);");
            }
            Cmd::GetField {
                dst,
                obj,
                field,
                typ,
                line,
            } => {
                self.push_value(indent, obj);
                self.line(
                    indent,
                    &format!("lua_getfield(L, -1, {});", c_string(field)),
                );
                let what = format!("field '{field}'");
                self.emit_tag_check(indent, typ, "-1", &what, *line);
                self.line(indent, "lua_remove(L, -2);");
                self.replace_dst(indent, *dst);
            }
            Cmd::SetField {
                obj, field, src, ..
            } => {
                self.push_value(indent, obj);
                self.push_value(indent, src);
                self.line(
                    indent,
                    &format!("lua_setfield(L, -2, {});", c_string(field)),
                );
                self.line(indent, "lua_pop(L, 1);");
            }
            Cmd::GetGlobal { dst, global } => {
                let key = globals_key(self.module);
                self.line(indent, &format!("lua_getfield(L, LUA_REGISTRYINDEX, \"{key}\");"));
                self.line(indent, &format!("lua_geti(L, -1, {global});"));
                self.line(indent, "lua_remove(L, -2);");
                self.replace_dst(indent, *dst);
            }
            Cmd::SetGlobal { global, src } => {
                let key = globals_key(self.module);
                self.line(indent, &format!("lua_getfield(L, LUA_REGISTRYINDEX, \"{key}\");"));
                self.push_value(indent, src);
                self.line(indent, &format!("lua_seti(L, -2, {global});"));
                self.line(indent, "lua_pop(L, 1);");
            }
            Cmd::CallStatic {
                dst, func, args, ..
            } => {
                let name = c_name(self.module, &self.module.functions[*func].name);
                self.line(indent, &format!("lua_pushcfunction(L, {name}_c);"));
                for arg in args {
                    self.push_value(indent, arg);
                }
                let nret = i32::from(dst.is_some());
                self.line(
                    indent,
                    &format!("lua_call(L, {}, {nret});", args.len()),
                );
                if let Some(dst) = dst {
                    self.replace_dst(indent, *dst);
                }
            }
            Cmd::CallDyn {
                dst,
                func,
                args,
                line,
            } => {
                self.push_value(indent, func);
                self.line(indent, "if (!lua_isfunction(L, -1))");
                self.line(
                    indent + 1,
                    &format!(
                        "return luaL_error(L, \"attempt to call a %s value at line {line}\", \
                         pallene_typename(L, -1));"
                    ),
                );
                for arg in args {
                    self.push_value(indent, arg);
                }
                let nret = i32::from(dst.is_some());
                self.line(
                    indent,
                    &format!("lua_call(L, {}, {nret});", args.len()),
                );
                if let Some(dst) = dst {
                    self.replace_dst(indent, *dst);
                }
            }
            Cmd::If {
                cond,
                then_cmds,
                else_cmds,
            } => {
                self.line(
                    indent,
                    &format!("if ({}) {{", self.bool_expr(cond)),
                );
                self.emit_cmds(indent + 1, then_cmds);
                if else_cmds.is_empty() {
                    self.line(indent, "}");
                } else {
                    self.line(indent, "} else {");
                    self.emit_cmds(indent + 1, else_cmds);
                    self.line(indent, "}");
                }
            }
            Cmd::Loop { body } => {
                self.line(indent, "while (1) {");
                self.emit_cmds(indent + 1, body);
                self.line(indent, "}");
            }
            Cmd::ForNumInt {
                var,
                start,
                limit,
                step,
                body,
            } => {
                let start = self.int_expr(start);
                let limit = self.int_expr(limit);
                let step = self.int_expr(step);
                self.line(indent, "{");
                self.line(indent + 1, &format!("lua_Integer start = {start};"));
                self.line(indent + 1, &format!("lua_Integer limit = {limit};"));
                self.line(indent + 1, &format!("lua_Integer step = {step};"));
                self.line(indent + 1, "if (step == 0)");
                self.line(indent + 2, "return luaL_error(L, \"'for' step is zero\");");
                self.line(
                    indent + 1,
                    "if (step > 0 ? start <= limit : start >= limit) {",
                );
                // iteration count in unsigned space: the loop variable
                // never wraps past the limit
                self.line(
                    indent + 2,
                    "uint64_t count = step > 0 \
                     ? ((uint64_t)limit - (uint64_t)start) / (uint64_t)step \
                     : ((uint64_t)start - (uint64_t)limit) / (0 - (uint64_t)step);",
                );
                self.line(indent + 2, "lua_Integer i = start;");
                self.line(indent + 2, "while (1) {");
                self.line(indent + 3, "lua_pushinteger(L, i);");
                self.line(
                    indent + 3,
                    &format!("lua_replace(L, {});", Self::slot(*var)),
                );
                self.emit_cmds(indent + 3, body);
                self.line(indent + 3, "if (count-- == 0) break;");
                self.line(
                    indent + 3,
                    "i = (lua_Integer)((uint64_t)i + (uint64_t)step);",
                );
                self.line(indent + 2, "}");
                self.line(indent + 1, "}");
                self.line(indent, "}");
            }
            Cmd::ForNumFloat {
                var,
                start,
                limit,
                step,
                body,
            } => {
                let start = self.num_expr(start);
                let limit = self.num_expr(limit);
                let step = self.num_expr(step);
                self.line(indent, "{");
                self.line(indent + 1, &format!("lua_Number limit = {limit};"));
                self.line(indent + 1, &format!("lua_Number step = {step};"));
                self.line(indent + 1, "if (step == 0.0)");
                self.line(indent + 2, "return luaL_error(L, \"'for' step is zero\");");
                self.line(
                    indent + 1,
                    &format!(
                        "for (lua_Number i = {start}; step > 0.0 ? i <= limit : i >= limit; i += step) {{"
                    ),
                );
                self.line(indent + 2, "lua_pushnumber(L, i);");
                self.line(
                    indent + 2,
                    &format!("lua_replace(L, {});", Self::slot(*var)),
                );
                self.emit_cmds(indent + 2, body);
                self.line(indent + 1, "}");
                self.line(indent, "}");
            }
            Cmd::Break => self.line(indent, "break;"),
            Cmd::Return { values } => {
                for value in values {
                    self.push_value(indent, value);
                }
                self.line(indent, &format!("return {};", values.len()));
            }
        }
    }

    fn emit_unop(&mut self, indent: usize, op: IrUnop, src: &Value) {
        match op {
            IrUnop::NegInt => {
                let a = self.int_expr(src);
                self.line(
                    indent,
                    &format!(
                        "lua_pushinteger(L, (lua_Integer)(0 - (uint64_t)({a})));"
                    ),
                );
            }
            IrUnop::NegFloat => {
                let a = self.num_expr(src);
                self.line(indent, &format!("lua_pushnumber(L, -({a}));"));
            }
            IrUnop::BitNot => {
                let a = self.int_expr(src);
                self.line(
                    indent,
                    &format!("lua_pushinteger(L, (lua_Integer)~(uint64_t)({a}));"),
                );
            }
            IrUnop::Not => {
                let a = self.bool_expr(src);
                self.line(indent, &format!("lua_pushboolean(L, !({a}));"));
            }
            IrUnop::LenArr | IrUnop::LenStr => {
                self.push_value(indent, src);
                self.line(
                    indent,
                    "lua_pushinteger(L, (lua_Integer)lua_rawlen(L, -1));",
                );
                self.line(indent, "lua_remove(L, -2);");
            }
        }
    }

    fn emit_binop(&mut self, indent: usize, op: IrBinop, lhs: &Value, rhs: &Value) {
        use IrBinop::*;
        match op {
            AddInt | SubInt | MulInt => {
                let c_op = match op {
                    AddInt => "+",
                    SubInt => "-",
                    _ => "*",
                };
                let a = self.int_expr(lhs);
                let b = self.int_expr(rhs);
                self.line(
                    indent,
                    &format!(
                        "lua_pushinteger(L, (lua_Integer)((uint64_t)({a}) {c_op} (uint64_t)({b})));"
                    ),
                );
            }
            ModInt | IntDivInt => {
                let helper = if op == ModInt {
                    "pallene_imod"
                } else {
                    "pallene_idiv"
                };
                let what = if op == ModInt { "n%%0" } else { "n//0" };
                let a = self.int_expr(lhs);
                let b = self.int_expr(rhs);
                self.line(indent, &format!("if (({b}) == 0)"));
                self.line(
                    indent + 1,
                    &format!("return luaL_error(L, \"attempt to perform '{what}'\");"),
                );
                self.line(
                    indent,
                    &format!("lua_pushinteger(L, {helper}({a}, {b}));"),
                );
            }
            AddFloat | SubFloat | MulFloat | DivFloat => {
                let c_op = match op {
                    AddFloat => "+",
                    SubFloat => "-",
                    MulFloat => "*",
                    _ => "/",
                };
                let a = self.num_expr(lhs);
                let b = self.num_expr(rhs);
                self.line(
                    indent,
                    &format!("lua_pushnumber(L, ({a}) {c_op} ({b}));"),
                );
            }
            ModFloat => {
                let a = self.num_expr(lhs);
                let b = self.num_expr(rhs);
                self.line(
                    indent,
                    &format!("lua_pushnumber(L, pallene_fmod({a}, {b}));"),
                );
            }
            IntDivFloat => {
                let a = self.num_expr(lhs);
                let b = self.num_expr(rhs);
                self.line(
                    indent,
                    &format!("lua_pushnumber(L, floor(({a}) / ({b})));"),
                );
            }
            PowFloat => {
                let a = self.num_expr(lhs);
                let b = self.num_expr(rhs);
                self.line(indent, &format!("lua_pushnumber(L, pow({a}, {b}));"));
            }
            EqInt | NeInt | LtInt | LeInt | GtInt | GeInt => {
                let c_op = match op {
                    EqInt => "==",
                    NeInt => "!=",
                    LtInt => "<",
                    LeInt => "<=",
                    GtInt => ">",
                    _ => ">=",
                };
                let a = self.int_expr(lhs);
                let b = self.int_expr(rhs);
                self.line(
                    indent,
                    &format!("lua_pushboolean(L, ({a}) {c_op} ({b}));"),
                );
            }
            EqFloat | NeFloat | LtFloat | LeFloat | GtFloat | GeFloat => {
                let c_op = match op {
                    EqFloat => "==",
                    NeFloat => "!=",
                    LtFloat => "<",
                    LeFloat => "<=",
                    GtFloat => ">",
                    _ => ">=",
                };
                let a = self.num_expr(lhs);
                let b = self.num_expr(rhs);
                self.line(
                    indent,
                    &format!("lua_pushboolean(L, ({a}) {c_op} ({b}));"),
                );
            }
            EqBool | NeBool => {
                let c_op = if op == EqBool { "==" } else { "!=" };
                let a = self.bool_expr(lhs);
                let b = self.bool_expr(rhs);
                self.line(
                    indent,
                    &format!("lua_pushboolean(L, ({a}) {c_op} ({b}));"),
                );
            }
            EqStr | NeStr | LtStr | LeStr | GtStr | GeStr | EqVal | NeVal => {
                // string and generic comparisons go through the host
                let (swap, c_op, negate) = match op {
                    EqStr | EqVal => (false, "LUA_OPEQ", false),
                    NeStr | NeVal => (false, "LUA_OPEQ", true),
                    LtStr => (false, "LUA_OPLT", false),
                    LeStr => (false, "LUA_OPLE", false),
                    GtStr => (true, "LUA_OPLT", false),
                    _ => (true, "LUA_OPLE", false),
                };
                let (first, second) = if swap { (rhs, lhs) } else { (lhs, rhs) };
                self.push_value(indent, first);
                self.push_value(indent, second);
                self.line(indent, "{");
                self.line(
                    indent + 1,
                    &format!("int c = lua_compare(L, -2, -1, {c_op});"),
                );
                self.line(indent + 1, "lua_pop(L, 2);");
                let expr = if negate { "!c" } else { "c" };
                self.line(indent + 1, &format!("lua_pushboolean(L, {expr});"));
                self.line(indent, "}");
            }
            BitAnd | BitOr | BitXor => {
                let c_op = match op {
                    BitAnd => "&",
                    BitOr => "|",
                    _ => "^",
                };
                let a = self.int_expr(lhs);
                let b = self.int_expr(rhs);
                self.line(
                    indent,
                    &format!(
                        "lua_pushinteger(L, (lua_Integer)((uint64_t)({a}) {c_op} (uint64_t)({b})));"
                    ),
                );
            }
            ShiftL | ShiftR => {
                let helper = if op == ShiftL {
                    "pallene_shl"
                } else {
                    "pallene_shr"
                };
                let a = self.int_expr(lhs);
                let b = self.int_expr(rhs);
                self.line(
                    indent,
                    &format!("lua_pushinteger(L, {helper}({a}, {b}));"),
                );
            }
        }
    }

    fn emit_convert(&mut self, indent: usize, conv: &Conversion, src: &Value, line: u32) {
        match conv {
            Conversion::IntToFloat => {
                let a = self.int_expr(src);
                self.line(
                    indent,
                    &format!("lua_pushnumber(L, (lua_Number)({a}));"),
                );
            }
            Conversion::FloatToInt => {
                let a = self.num_expr(src);
                self.line(indent, "{");
                self.line(indent + 1, &format!("lua_Number n = {a};"));
                self.line(indent + 1, "lua_Integer k;");
                self.line(indent + 1, "if (!pallene_d2i(n, &k))");
                self.line(
                    indent + 2,
                    "return luaL_error(L, \"number has no integer representation\");",
                );
                self.line(indent + 1, "lua_pushinteger(L, k);");
                self.line(indent, "}");
            }
            Conversion::Box(_) => {
                // every value is already a boxed Lua value in this
                // representation
                self.push_value(indent, src);
            }
            Conversion::Unbox(typ) => {
                self.push_value(indent, src);
                self.emit_tag_check(indent, typ, "-1", "value", line);
            }
        }
    }
}
