//! Constant propagation over the IR.
//!
//! A local qualifies when it is assigned exactly once and the assigned
//! value is a literal or folds from already-known constants. Folding
//! mirrors the Lua runtime exactly: integer arithmetic wraps in 64 bits,
//! shifts saturate to zero past the word width, and anything that can
//! trap at runtime (`//` or `%` by zero, a float-to-integer conversion
//! of a non-integral value) is left in place. The pass is idempotent:
//! a second run finds nothing new to rewrite.

use std::collections::HashMap;

use crate::ir::{Cmd, Conversion, Function, IrBinop, IrUnop, Module, Value};

use super::{Pass, PassError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantPropagation;

impl Pass for ConstantPropagation {
    fn name(&self) -> &'static str {
        "constant_propagation"
    }

    fn run(&self, module: Module) -> Result<Module, PassError> {
        let Module {
            name,
            functions,
            globals,
            init,
            exports,
        } = module;
        Ok(Module {
            name,
            functions: functions.into_iter().map(propagate_function).collect(),
            globals,
            init: propagate_function(init),
            exports,
        })
    }
}

fn propagate_function(mut function: Function) -> Function {
    let mut writes = vec![0usize; function.locals.len()];
    count_writes(&function.body, &mut writes);

    let mut constants: HashMap<usize, Value> = HashMap::new();
    walk(&mut function.body, &writes, &mut constants);
    remove_defining_moves(&mut function.body, &constants);
    function
}

fn count_writes(cmds: &[Cmd], writes: &mut Vec<usize>) {
    for cmd in cmds {
        if let Some(dst) = Function::local_write(cmd) {
            writes[dst] += 1;
        }
        match cmd {
            Cmd::If {
                then_cmds,
                else_cmds,
                ..
            } => {
                count_writes(then_cmds, writes);
                count_writes(else_cmds, writes);
            }
            Cmd::Loop { body }
            | Cmd::ForNumInt { body, .. }
            | Cmd::ForNumFloat { body, .. } => count_writes(body, writes),
            _ => {}
        }
    }
}

/// One program-order walk: substitute known constants into every read,
/// then record newly discovered constants.
fn walk(cmds: &mut [Cmd], writes: &[usize], constants: &mut HashMap<usize, Value>) {
    for cmd in cmds.iter_mut() {
        for_each_value_mut(cmd, &mut |value| {
            if let Value::Local(index) = value {
                if let Some(constant) = constants.get(index) {
                    *value = constant.clone();
                }
            }
        });

        match cmd {
            Cmd::Move { dst, src } if writes[*dst] == 1 && src.is_literal() => {
                constants.insert(*dst, src.clone());
            }
            Cmd::Unop { dst, op, src } if writes[*dst] == 1 => {
                if let Some(folded) = fold_unop(*op, src) {
                    constants.insert(*dst, folded);
                }
            }
            Cmd::Binop { dst, op, lhs, rhs } if writes[*dst] == 1 => {
                if let Some(folded) = fold_binop(*op, lhs, rhs) {
                    constants.insert(*dst, folded);
                }
            }
            Cmd::Convert { dst, conv, src, .. } if writes[*dst] == 1 => {
                if let Some(folded) = fold_convert(conv, src) {
                    constants.insert(*dst, folded);
                }
            }
            Cmd::If {
                then_cmds,
                else_cmds,
                ..
            } => {
                walk(then_cmds, writes, constants);
                walk(else_cmds, writes, constants);
            }
            Cmd::Loop { body }
            | Cmd::ForNumInt { body, .. }
            | Cmd::ForNumFloat { body, .. } => walk(body, writes, constants),
            _ => {}
        }
    }
}

/// Drop the pure defining commands of propagated locals; every read of
/// them was substituted during the walk.
fn remove_defining_moves(cmds: &mut Vec<Cmd>, constants: &HashMap<usize, Value>) {
    cmds.retain_mut(|cmd| {
        match cmd {
            Cmd::Move { dst, .. }
            | Cmd::Unop { dst, .. }
            | Cmd::Binop { dst, .. }
            | Cmd::Convert { dst, .. }
                if constants.contains_key(dst) =>
            {
                return false;
            }
            Cmd::If {
                then_cmds,
                else_cmds,
                ..
            } => {
                remove_defining_moves(then_cmds, constants);
                remove_defining_moves(else_cmds, constants);
            }
            Cmd::Loop { body }
            | Cmd::ForNumInt { body, .. }
            | Cmd::ForNumFloat { body, .. } => remove_defining_moves(body, constants),
            _ => {}
        }
        true
    });
}

fn for_each_value_mut(cmd: &mut Cmd, f: &mut impl FnMut(&mut Value)) {
    match cmd {
        Cmd::Move { src, .. } => f(src),
        Cmd::Unop { src, .. } => f(src),
        Cmd::Binop { lhs, rhs, .. } => {
            f(lhs);
            f(rhs);
        }
        Cmd::Concat { srcs, .. } => srcs.iter_mut().for_each(f),
        Cmd::Convert { src, .. } => f(src),
        Cmd::NewArray { elems, .. } => elems.iter_mut().for_each(f),
        Cmd::NewTable { fields, .. } => fields.iter_mut().for_each(|(_, v)| f(v)),
        Cmd::GetArr { arr, idx, .. } => {
            f(arr);
            f(idx);
        }
        Cmd::SetArr { arr, idx, src, .. } => {
            f(arr);
            f(idx);
            f(src);
        }
        Cmd::GetField { obj, .. } => f(obj),
        Cmd::SetField { obj, src, .. } => {
            f(obj);
            f(src);
        }
        Cmd::GetGlobal { .. } => {}
        Cmd::SetGlobal { src, .. } => f(src),
        Cmd::CallStatic { args, .. } => args.iter_mut().for_each(f),
        Cmd::CallDyn { func, args, .. } => {
            f(func);
            args.iter_mut().for_each(f);
        }
        Cmd::If { cond, .. } => f(cond),
        Cmd::Loop { .. } => {}
        Cmd::ForNumInt {
            start, limit, step, ..
        }
        | Cmd::ForNumFloat {
            start, limit, step, ..
        } => {
            f(start);
            f(limit);
            f(step);
        }
        Cmd::Break => {}
        Cmd::Return { values } => values.iter_mut().for_each(f),
    }
}

fn fold_unop(op: IrUnop, src: &Value) -> Option<Value> {
    Some(match (op, src) {
        (IrUnop::NegInt, Value::Integer(a)) => Value::Integer(a.wrapping_neg()),
        (IrUnop::NegFloat, Value::Float(a)) => Value::Float(-a),
        (IrUnop::BitNot, Value::Integer(a)) => Value::Integer(!a),
        (IrUnop::Not, Value::Bool(a)) => Value::Bool(!a),
        (IrUnop::LenStr, Value::String(s)) => Value::Integer(s.len() as i64),
        _ => return None,
    })
}

fn fold_binop(op: IrBinop, lhs: &Value, rhs: &Value) -> Option<Value> {
    use IrBinop::*;
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => {
            let (a, b) = (*a, *b);
            Some(match op {
                AddInt => Value::Integer(a.wrapping_add(b)),
                SubInt => Value::Integer(a.wrapping_sub(b)),
                MulInt => Value::Integer(a.wrapping_mul(b)),
                // division and modulo by zero trap at runtime; never fold
                ModInt if b != 0 => Value::Integer(lua_imod(a, b)),
                IntDivInt if b != 0 => Value::Integer(lua_idiv(a, b)),
                EqInt => Value::Bool(a == b),
                NeInt => Value::Bool(a != b),
                LtInt => Value::Bool(a < b),
                LeInt => Value::Bool(a <= b),
                GtInt => Value::Bool(a > b),
                GeInt => Value::Bool(a >= b),
                BitAnd => Value::Integer(a & b),
                BitOr => Value::Integer(a | b),
                BitXor => Value::Integer(a ^ b),
                ShiftL => Value::Integer(lua_shl(a, b)),
                ShiftR => Value::Integer(lua_shr(a, b)),
                _ => return None,
            })
        }
        (Value::Float(a), Value::Float(b)) => {
            let (a, b) = (*a, *b);
            Some(match op {
                AddFloat => Value::Float(a + b),
                SubFloat => Value::Float(a - b),
                MulFloat => Value::Float(a * b),
                DivFloat => Value::Float(a / b),
                ModFloat => Value::Float(lua_fmod(a, b)),
                IntDivFloat => Value::Float((a / b).floor()),
                PowFloat => Value::Float(a.powf(b)),
                EqFloat => Value::Bool(a == b),
                NeFloat => Value::Bool(a != b),
                LtFloat => Value::Bool(a < b),
                LeFloat => Value::Bool(a <= b),
                GtFloat => Value::Bool(a > b),
                GeFloat => Value::Bool(a >= b),
                _ => return None,
            })
        }
        (Value::Bool(a), Value::Bool(b)) => Some(match op {
            EqBool => Value::Bool(a == b),
            NeBool => Value::Bool(a != b),
            _ => return None,
        }),
        (Value::String(a), Value::String(b)) => Some(match op {
            EqStr => Value::Bool(a == b),
            NeStr => Value::Bool(a != b),
            LtStr => Value::Bool(a < b),
            LeStr => Value::Bool(a <= b),
            GtStr => Value::Bool(a > b),
            GeStr => Value::Bool(a >= b),
            _ => return None,
        }),
        _ => None,
    }
}

fn fold_convert(conv: &Conversion, src: &Value) -> Option<Value> {
    match (conv, src) {
        (Conversion::IntToFloat, Value::Integer(a)) => Some(Value::Float(*a as f64)),
        // float-to-integer traps on non-integral values; only fold the
        // exact cases
        (Conversion::FloatToInt, Value::Float(x)) => {
            if x.fract() == 0.0 && *x >= -(2f64.powi(63)) && *x < 2f64.powi(63) {
                Some(Value::Integer(*x as i64))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Lua's floor modulo: the result takes the sign of the divisor.
fn lua_imod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && (r ^ b) < 0 {
        r + b
    } else {
        r
    }
}

/// Lua's floor division, wrapping like the runtime on `i64::MIN // -1`.
fn lua_idiv(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    if (a ^ b) < 0 && q.wrapping_mul(b) != a {
        q - 1
    } else {
        q
    }
}

/// Lua's float modulo (floor-style, unlike C's fmod).
fn lua_fmod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

fn lua_shl(a: i64, b: i64) -> i64 {
    if b < 0 {
        lua_shr(a, b.wrapping_neg())
    } else if b >= 64 {
        0
    } else {
        ((a as u64) << b) as i64
    }
}

fn lua_shr(a: i64, b: i64) -> i64 {
    if b < 0 {
        lua_shl(a, b.wrapping_neg())
    } else if b >= 64 {
        0
    } else {
        ((a as u64) >> b) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Local;
    use crate::lexer::Loc;
    use crate::typechecker::Type;

    fn local(name: &str) -> Local {
        Local {
            name: name.into(),
            typ: Type::Integer,
            loc: Loc::dummy(),
        }
    }

    fn function(locals: Vec<Local>, body: Vec<Cmd>) -> Function {
        Function {
            name: "f".into(),
            loc: Loc::dummy(),
            typ: Type::Function {
                params: vec![],
                rets: vec![],
            },
            param_count: 0,
            locals,
            body,
            exported: false,
        }
    }

    #[test]
    fn test_literal_move_propagates_into_return() {
        let f = function(
            vec![local("x")],
            vec![
                Cmd::Move {
                    dst: 0,
                    src: Value::Integer(10),
                },
                Cmd::Return {
                    values: vec![Value::Local(0)],
                },
            ],
        );
        let f = propagate_function(f);
        assert_eq!(
            f.body,
            vec![Cmd::Return {
                values: vec![Value::Integer(10)]
            }]
        );
    }

    #[test]
    fn test_arithmetic_on_constants_folds() {
        let f = function(
            vec![local("x"), local("y")],
            vec![
                Cmd::Move {
                    dst: 0,
                    src: Value::Integer(6),
                },
                Cmd::Binop {
                    dst: 1,
                    op: IrBinop::MulInt,
                    lhs: Value::Local(0),
                    rhs: Value::Integer(7),
                },
                Cmd::Return {
                    values: vec![Value::Local(1)],
                },
            ],
        );
        let f = propagate_function(f);
        assert_eq!(
            f.body,
            vec![Cmd::Return {
                values: vec![Value::Integer(42)]
            }]
        );
    }

    #[test]
    fn test_division_by_zero_is_not_folded() {
        let f = function(
            vec![local("x")],
            vec![
                Cmd::Binop {
                    dst: 0,
                    op: IrBinop::IntDivInt,
                    lhs: Value::Integer(1),
                    rhs: Value::Integer(0),
                },
                Cmd::Return {
                    values: vec![Value::Local(0)],
                },
            ],
        );
        let folded = propagate_function(f.clone());
        assert_eq!(folded.body, f.body);
    }

    #[test]
    fn test_multiply_assigned_local_is_not_tracked() {
        let f = function(
            vec![local("x"), local("y")],
            vec![
                Cmd::Move {
                    dst: 0,
                    src: Value::Integer(1),
                },
                Cmd::Move {
                    dst: 0,
                    src: Value::Integer(2),
                },
                Cmd::Move {
                    dst: 1,
                    src: Value::Local(0),
                },
            ],
        );
        let folded = propagate_function(f.clone());
        assert_eq!(folded.body, f.body);
    }

    #[test]
    fn test_idempotent() {
        let f = function(
            vec![local("x"), local("y")],
            vec![
                Cmd::Move {
                    dst: 0,
                    src: Value::Integer(3),
                },
                Cmd::Binop {
                    dst: 1,
                    op: IrBinop::AddInt,
                    lhs: Value::Local(0),
                    rhs: Value::Local(0),
                },
                Cmd::Return {
                    values: vec![Value::Local(1)],
                },
            ],
        );
        let once = propagate_function(f);
        let twice = propagate_function(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_integer_arithmetic_wraps_like_the_runtime() {
        assert_eq!(
            fold_binop(
                IrBinop::AddInt,
                &Value::Integer(i64::MAX),
                &Value::Integer(1)
            ),
            Some(Value::Integer(i64::MIN))
        );
        assert_eq!(lua_imod(-5, 3), 1);
        assert_eq!(lua_imod(5, -3), -1);
        assert_eq!(lua_idiv(-7, 2), -4);
        assert_eq!(lua_shl(1, 70), 0);
        assert_eq!(lua_shr(-1, 1), i64::MAX);
    }
}
