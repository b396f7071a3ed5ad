//! Forward dataflow pass rejecting reads of never-written locals.
//!
//! The defined set flows forward through the structured command tree:
//! parameters start defined, an `if` joins its branches by intersection,
//! and a loop's exit set is the intersection over its `Break` points. A
//! branch that cannot fall through (it returned or broke) does not
//! constrain the join. Because the command tree has no goto, definitions
//! only accumulate along a path, so the first-iteration walk of a loop
//! body is already the fixed point.

use crate::ir::{Cmd, Function, Module};

use super::{Pass, PassError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uninitialized;

type Set = Vec<bool>;

impl Pass for Uninitialized {
    fn name(&self) -> &'static str {
        "uninitialized"
    }

    fn run(&self, module: Module) -> Result<Module, PassError> {
        check_function(&module.init)?;
        for function in &module.functions {
            check_function(function)?;
        }
        Ok(module)
    }
}

fn check_function(function: &Function) -> Result<(), PassError> {
    let mut defined = vec![false; function.locals.len()];
    for slot in defined.iter_mut().take(function.param_count) {
        *slot = true;
    }
    let mut breaks = vec![];
    analyze(&function.body, &mut defined, function, &mut breaks)?;
    Ok(())
}

fn intersect(a: &Set, b: &Set) -> Set {
    a.iter().zip(b).map(|(x, y)| *x && *y).collect()
}

/// Walk one command list. Returns whether control can reach its end.
fn analyze(
    cmds: &[Cmd],
    defined: &mut Set,
    function: &Function,
    breaks: &mut Vec<Vec<Set>>,
) -> Result<bool, PassError> {
    for cmd in cmds {
        let mut reads = vec![];
        Function::local_reads(cmd, &mut reads);
        for index in reads {
            if !defined[index] {
                let local = &function.locals[index];
                return Err(PassError {
                    kind: "uninitialized",
                    message: format!("variable '{}' may be used uninitialized", local.name),
                    loc: local.loc.clone(),
                });
            }
        }

        match cmd {
            Cmd::If {
                then_cmds,
                else_cmds,
                ..
            } => {
                let mut then_set = defined.clone();
                let mut else_set = defined.clone();
                let then_reaches = analyze(then_cmds, &mut then_set, function, breaks)?;
                let else_reaches = analyze(else_cmds, &mut else_set, function, breaks)?;
                match (then_reaches, else_reaches) {
                    (true, true) => *defined = intersect(&then_set, &else_set),
                    (true, false) => *defined = then_set,
                    (false, true) => *defined = else_set,
                    (false, false) => return Ok(false),
                }
            }
            Cmd::Loop { body } => {
                breaks.push(vec![]);
                let mut body_set = defined.clone();
                analyze(body, &mut body_set, function, breaks)?;
                let exits = breaks.pop().expect("loop frame was just pushed");
                let Some(first) = exits.first() else {
                    // no break: the loop never falls through
                    return Ok(false);
                };
                *defined = exits[1..]
                    .iter()
                    .fold(first.clone(), |acc, set| intersect(&acc, set));
            }
            Cmd::ForNumInt { var, body, .. } | Cmd::ForNumFloat { var, body, .. } => {
                // a numeric for body can run zero times; breaks inside it
                // exit past the loop, and every break state includes the
                // entry state, so the exit set is the entry set
                breaks.push(vec![]);
                let mut body_set = defined.clone();
                body_set[*var] = true;
                analyze(body, &mut body_set, function, breaks)?;
                breaks.pop();
            }
            Cmd::Break => {
                if let Some(frame) = breaks.last_mut() {
                    frame.push(defined.clone());
                }
                return Ok(false);
            }
            Cmd::Return { .. } => return Ok(false),
            _ => {}
        }

        if let Some(dst) = Function::local_write(cmd) {
            defined[dst] = true;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrBinop, Local, Value};
    use crate::lexer::Loc;
    use crate::typechecker::Type;

    fn function(locals: Vec<Local>, param_count: usize, body: Vec<Cmd>) -> Function {
        Function {
            name: "f".into(),
            loc: Loc::dummy(),
            typ: Type::Function {
                params: vec![],
                rets: vec![],
            },
            param_count,
            locals,
            body,
            exported: false,
        }
    }

    fn local(name: &str) -> Local {
        Local {
            name: name.into(),
            typ: Type::Integer,
            loc: Loc::dummy(),
        }
    }

    #[test]
    fn test_read_before_write_is_rejected() {
        let f = function(
            vec![local("x"), local("y")],
            0,
            vec![Cmd::Move {
                dst: 1,
                src: Value::Local(0),
            }],
        );
        let err = check_function(&f).unwrap_err();
        assert!(err.message.contains("'x' may be used uninitialized"));
    }

    #[test]
    fn test_params_start_defined() {
        let f = function(
            vec![local("p"), local("y")],
            1,
            vec![Cmd::Move {
                dst: 1,
                src: Value::Local(0),
            }],
        );
        assert!(check_function(&f).is_ok());
    }

    #[test]
    fn test_if_join_is_intersection() {
        // x is written in only one branch, then read
        let f = function(
            vec![local("c"), local("x"), local("y")],
            1,
            vec![
                Cmd::If {
                    cond: Value::Local(0),
                    then_cmds: vec![Cmd::Move {
                        dst: 1,
                        src: Value::Integer(1),
                    }],
                    else_cmds: vec![],
                },
                Cmd::Move {
                    dst: 2,
                    src: Value::Local(1),
                },
            ],
        );
        assert!(check_function(&f).is_err());
    }

    #[test]
    fn test_both_branches_define() {
        let f = function(
            vec![local("c"), local("x"), local("y")],
            1,
            vec![
                Cmd::If {
                    cond: Value::Local(0),
                    then_cmds: vec![Cmd::Move {
                        dst: 1,
                        src: Value::Integer(1),
                    }],
                    else_cmds: vec![Cmd::Move {
                        dst: 1,
                        src: Value::Integer(2),
                    }],
                },
                Cmd::Move {
                    dst: 2,
                    src: Value::Local(1),
                },
            ],
        );
        assert!(check_function(&f).is_ok());
    }

    #[test]
    fn test_loop_exit_set_comes_from_breaks() {
        // while true: x = 1; break; end; y = x  -- x defined at the break
        let f = function(
            vec![local("x"), local("y")],
            0,
            vec![
                Cmd::Loop {
                    body: vec![
                        Cmd::Move {
                            dst: 0,
                            src: Value::Integer(1),
                        },
                        Cmd::Break,
                    ],
                },
                Cmd::Move {
                    dst: 1,
                    src: Value::Local(0),
                },
            ],
        );
        assert!(check_function(&f).is_ok());
    }

    #[test]
    fn test_for_body_var_is_defined() {
        let f = function(
            vec![local("i"), local("acc")],
            0,
            vec![
                Cmd::Move {
                    dst: 1,
                    src: Value::Integer(0),
                },
                Cmd::ForNumInt {
                    var: 0,
                    start: Value::Integer(1),
                    limit: Value::Integer(10),
                    step: Value::Integer(1),
                    body: vec![Cmd::Binop {
                        dst: 1,
                        op: IrBinop::AddInt,
                        lhs: Value::Local(1),
                        rhs: Value::Local(0),
                    }],
                },
            ],
        );
        assert!(check_function(&f).is_ok());
    }
}
