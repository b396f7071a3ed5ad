//! AST-to-IR lowering.
//!
//! Compound expressions are flattened: every subexpression lands in a
//! fresh temporary and commands reference locals by index. Short-circuit
//! `and`/`or` become `If` commands writing a boolean temporary, numeric
//! `for` loops are specialized on the iteration variable's static type,
//! and checker-inserted promotions become `Convert` commands. Lambdas are
//! lifted into module-level functions; the checker has already rejected
//! any capture of enclosing locals.

use std::collections::HashMap;

use log::debug;

use crate::lexer::Loc;
use crate::parser::ast::{
    Binop, Block, Exp, InitEntry, ParamDecl, Stat, TopLevel, Unop, VarNode, Visibility,
};
use crate::typechecker::{CheckedModule, Type};

use super::{
    Cmd, Conversion, Export, ExportItem, Function, Global, IrBinop, IrUnop, Local, Module, Value,
};

pub fn lower(module_name: &str, checked: &CheckedModule) -> Module {
    let mut lowerer = Lowerer::new(checked);
    lowerer.lower_module(module_name)
}

struct FuncBuilder {
    locals: Vec<Local>,
    scopes: Vec<HashMap<String, usize>>,
    temp_count: usize,
}

impl FuncBuilder {
    fn new() -> Self {
        FuncBuilder {
            locals: vec![],
            scopes: vec![HashMap::new()],
            temp_count: 0,
        }
    }

    fn declare(&mut self, name: &str, typ: Type, loc: Loc) -> usize {
        let index = self.locals.len();
        self.locals.push(Local {
            name: name.to_string(),
            typ,
            loc,
        });
        self.scopes
            .last_mut()
            .expect("builder scope stack is never empty")
            .insert(name.to_string(), index);
        index
    }

    fn temp(&mut self, typ: Type, loc: Loc) -> usize {
        let index = self.locals.len();
        self.locals.push(Local {
            name: format!("$t{}", self.temp_count),
            typ,
            loc,
        });
        self.temp_count += 1;
        index
    }

    fn resolve(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }
}

struct Lowerer<'a> {
    checked: &'a CheckedModule,
    functions: Vec<Option<Function>>,
    func_indices: HashMap<String, usize>,
    globals: Vec<Global>,
    global_indices: HashMap<String, usize>,
}

impl<'a> Lowerer<'a> {
    fn new(checked: &'a CheckedModule) -> Self {
        Lowerer {
            checked,
            functions: vec![],
            func_indices: HashMap::new(),
            globals: vec![],
            global_indices: HashMap::new(),
        }
    }

    fn lower_module(&mut self, module_name: &str) -> Module {
        let checked = self.checked;

        // assign function and global slots up front so bodies can
        // forward-reference any toplevel
        for toplevel in &checked.program.toplevels {
            match toplevel {
                TopLevel::Func(func) => {
                    let index = self.functions.len();
                    self.functions.push(None);
                    self.func_indices.insert(func.name.clone(), index);
                }
                TopLevel::Var(var) => {
                    let index = self.globals.len();
                    self.globals.push(Global {
                        name: var.name.clone(),
                        typ: var.info.clone(),
                        loc: var.loc.clone(),
                        import: None,
                    });
                    self.global_indices.insert(var.name.clone(), index);
                }
                TopLevel::Import(import) => {
                    let index = self.globals.len();
                    self.globals.push(Global {
                        name: import.name.clone(),
                        typ: Type::Any,
                        loc: import.loc.clone(),
                        import: Some(import.module.clone()),
                    });
                    self.global_indices.insert(import.name.clone(), index);
                }
                _ => {}
            }
        }

        let mut init_builder = FuncBuilder::new();
        let mut init_cmds = vec![];

        for toplevel in &checked.program.toplevels {
            match toplevel {
                TopLevel::Func(func) => {
                    debug!("lowering function '{}'", func.name);
                    let index = self.func_indices[&func.name];
                    let lowered = self.lower_function(
                        &func.name,
                        func.loc.clone(),
                        func.info.clone(),
                        &func.params,
                        &func.body,
                        func.visibility == Visibility::Export,
                    );
                    self.functions[index] = Some(lowered);
                }
                TopLevel::Var(var) => {
                    let global = self.global_indices[&var.name];
                    let src = self.lower_exp(&mut init_builder, &var.value, &mut init_cmds);
                    init_cmds.push(Cmd::SetGlobal { global, src });
                }
                _ => {}
            }
        }

        let init = Function {
            name: "$init".to_string(),
            loc: Loc::dummy(),
            typ: Type::Function {
                params: vec![],
                rets: vec![],
            },
            param_count: 0,
            locals: init_builder.locals,
            body: init_cmds,
            exported: false,
        };

        let exports = checked
            .exports
            .iter()
            .map(|(name, _)| {
                let item = match self.func_indices.get(name) {
                    Some(&index) => ExportItem::Function(index),
                    None => ExportItem::Global(self.global_indices[name]),
                };
                Export {
                    name: name.clone(),
                    item,
                }
            })
            .collect();

        Module {
            name: module_name.to_string(),
            functions: self
                .functions
                .drain(..)
                .map(|f| f.expect("every toplevel function is lowered"))
                .collect(),
            globals: std::mem::take(&mut self.globals),
            init,
            exports,
        }
    }

    fn lower_function(
        &mut self,
        name: &str,
        loc: Loc,
        typ: Type,
        params: &[ParamDecl],
        body: &Block<Type>,
        exported: bool,
    ) -> Function {
        let Type::Function {
            params: param_types,
            rets,
        } = &typ
        else {
            unreachable!("function declarations carry function types")
        };

        let mut fb = FuncBuilder::new();
        for (param, param_type) in params.iter().zip(param_types) {
            fb.declare(&param.name, param_type.clone(), param.loc.clone());
        }

        let mut cmds = vec![];
        self.lower_block(&mut fb, body, &mut cmds);

        // functions with no return type fall off the end implicitly
        if rets.is_empty() && !matches!(cmds.last(), Some(Cmd::Return { .. })) {
            cmds.push(Cmd::Return { values: vec![] });
        }

        Function {
            name: name.to_string(),
            loc,
            typ: typ.clone(),
            param_count: params.len(),
            locals: fb.locals,
            body: cmds,
            exported,
        }
    }

    fn lower_block(&mut self, fb: &mut FuncBuilder, block: &Block<Type>, cmds: &mut Vec<Cmd>) {
        fb.push_scope();
        for stat in &block.stats {
            self.lower_stat(fb, stat, cmds);
        }
        fb.pop_scope();
    }

    fn lower_stat(&mut self, fb: &mut FuncBuilder, stat: &Stat<Type>, cmds: &mut Vec<Cmd>) {
        match stat {
            Stat::Block { body, .. } => self.lower_block(fb, body, cmds),
            Stat::Decl {
                loc,
                name,
                value,
                info,
                ..
            } => {
                let src = value
                    .as_ref()
                    .map(|value| self.lower_exp(fb, value, cmds));
                let dst = fb.declare(name, info.clone(), loc.clone());
                if let Some(src) = src {
                    cmds.push(Cmd::Move { dst, src });
                }
            }
            Stat::Assign { var, value, .. } => {
                let src = self.lower_exp(fb, value, cmds);
                self.lower_assignment(fb, var, src, cmds);
            }
            Stat::If {
                arms, else_block, ..
            } => self.lower_if(fb, arms, else_block.as_ref(), cmds),
            Stat::While { cond, body, .. } => {
                let mut loop_body = vec![];
                let cond_value = self.lower_exp(fb, cond, &mut loop_body);
                let mut then_cmds = vec![];
                self.lower_block(fb, body, &mut then_cmds);
                loop_body.push(Cmd::If {
                    cond: cond_value,
                    then_cmds,
                    else_cmds: vec![Cmd::Break],
                });
                cmds.push(Cmd::Loop { body: loop_body });
            }
            Stat::Repeat { body, cond, .. } => {
                // the until-condition sees the body's locals, so the body
                // block and the condition share one builder scope
                let mut loop_body = vec![];
                fb.push_scope();
                for stat in &body.stats {
                    self.lower_stat(fb, stat, &mut loop_body);
                }
                let cond_value = self.lower_exp(fb, cond, &mut loop_body);
                fb.pop_scope();
                loop_body.push(Cmd::If {
                    cond: cond_value,
                    then_cmds: vec![Cmd::Break],
                    else_cmds: vec![],
                });
                cmds.push(Cmd::Loop { body: loop_body });
            }
            Stat::For {
                loc,
                var,
                start,
                limit,
                step,
                body,
                info,
                ..
            } => {
                let start = self.lower_exp(fb, start, cmds);
                let limit = self.lower_exp(fb, limit, cmds);
                let step = match step {
                    Some(step) => self.lower_exp(fb, step, cmds),
                    None => match info {
                        Type::Float => Value::Float(1.0),
                        _ => Value::Integer(1),
                    },
                };

                fb.push_scope();
                let var_index = fb.declare(var, info.clone(), loc.clone());
                let mut body_cmds = vec![];
                for stat in &body.stats {
                    self.lower_stat(fb, stat, &mut body_cmds);
                }
                fb.pop_scope();

                let cmd = match info {
                    Type::Float => Cmd::ForNumFloat {
                        var: var_index,
                        start,
                        limit,
                        step,
                        body: body_cmds,
                    },
                    _ => Cmd::ForNumInt {
                        var: var_index,
                        start,
                        limit,
                        step,
                        body: body_cmds,
                    },
                };
                cmds.push(cmd);
            }
            Stat::Break { .. } => cmds.push(Cmd::Break),
            Stat::Return { values, .. } => {
                let values = values
                    .iter()
                    .map(|value| self.lower_exp(fb, value, cmds))
                    .collect();
                cmds.push(Cmd::Return { values });
            }
            Stat::Call { call, .. } => {
                self.lower_call(fb, call, cmds, false);
            }
        }
    }

    fn lower_if(
        &mut self,
        fb: &mut FuncBuilder,
        arms: &[(Exp<Type>, Block<Type>)],
        else_block: Option<&Block<Type>>,
        cmds: &mut Vec<Cmd>,
    ) {
        let Some(((cond, body), rest)) = arms.split_first() else {
            if let Some(body) = else_block {
                self.lower_block(fb, body, cmds);
            }
            return;
        };

        let cond_value = self.lower_exp(fb, cond, cmds);
        let mut then_cmds = vec![];
        self.lower_block(fb, body, &mut then_cmds);
        let mut else_cmds = vec![];
        self.lower_if(fb, rest, else_block, &mut else_cmds);
        cmds.push(Cmd::If {
            cond: cond_value,
            then_cmds,
            else_cmds,
        });
    }

    fn lower_assignment(
        &mut self,
        fb: &mut FuncBuilder,
        var: &VarNode<Type>,
        src: Value,
        cmds: &mut Vec<Cmd>,
    ) {
        match var {
            VarNode::Name { name, .. } => {
                if let Some(dst) = fb.resolve(name) {
                    cmds.push(Cmd::Move { dst, src });
                } else if let Some(&global) = self.global_indices.get(name) {
                    cmds.push(Cmd::SetGlobal { global, src });
                }
                // assignments to function names were rejected by the checker
            }
            VarNode::Bracket {
                loc,
                array,
                index,
                info,
            } => {
                let arr = self.lower_exp(fb, array, cmds);
                let idx = self.lower_exp(fb, index, cmds);
                cmds.push(Cmd::SetArr {
                    arr,
                    idx,
                    src,
                    elem: info.clone(),
                    line: loc.line,
                });
            }
            VarNode::Dot {
                loc, object, field, ..
            } => {
                let obj = self.lower_exp(fb, object, cmds);
                cmds.push(Cmd::SetField {
                    obj,
                    field: field.clone(),
                    src,
                    line: loc.line,
                });
            }
        }
    }

    fn lower_exp(&mut self, fb: &mut FuncBuilder, exp: &Exp<Type>, cmds: &mut Vec<Cmd>) -> Value {
        match exp {
            Exp::Nil { .. } => Value::Nil,
            Exp::Bool { value, .. } => Value::Bool(*value),
            Exp::Integer { value, .. } => Value::Integer(*value),
            Exp::Float { value, .. } => Value::Float(*value),
            Exp::Str { value, .. } => Value::String(value.clone()),
            Exp::Paren { exp, .. } => self.lower_exp(fb, exp, cmds),
            Exp::Var { var, .. } => self.lower_var_read(fb, var, cmds),
            Exp::ToFloat { loc, exp, .. } => {
                let src = self.lower_exp(fb, exp, cmds);
                let dst = fb.temp(Type::Float, loc.clone());
                cmds.push(Cmd::Convert {
                    dst,
                    conv: Conversion::IntToFloat,
                    src,
                    line: loc.line,
                });
                Value::Local(dst)
            }
            Exp::Cast { loc, exp, info, .. } => {
                let from = exp.info().clone();
                let src = self.lower_exp(fb, exp, cmds);
                let to = info.clone();
                let conv = match (&from, &to) {
                    (from, to) if from == to => return src,
                    (Type::Integer, Type::Float) => Conversion::IntToFloat,
                    (Type::Float, Type::Integer) => Conversion::FloatToInt,
                    (Type::Any, to) => Conversion::Unbox(to.clone()),
                    (from, Type::Any) => Conversion::Box(from.clone()),
                    // ill-typed casts were reported; keep the value moving
                    _ => return src,
                };
                let dst = fb.temp(to, loc.clone());
                cmds.push(Cmd::Convert {
                    dst,
                    conv,
                    src,
                    line: loc.line,
                });
                Value::Local(dst)
            }
            Exp::Unop { loc, op, exp, info } => {
                let operand_type = exp.info().clone();
                let src = self.lower_exp(fb, exp, cmds);
                let op = ir_unop(*op, &operand_type);
                let dst = fb.temp(info.clone(), loc.clone());
                cmds.push(Cmd::Unop { dst, op, src });
                Value::Local(dst)
            }
            Exp::Binop {
                loc,
                op,
                lhs,
                rhs,
                info,
            } => match op {
                Binop::And => self.lower_short_circuit(fb, lhs, rhs, true, loc, cmds),
                Binop::Or => self.lower_short_circuit(fb, lhs, rhs, false, loc, cmds),
                _ => {
                    let operand_type = lhs.info().clone();
                    let lhs = self.lower_exp(fb, lhs, cmds);
                    let rhs = self.lower_exp(fb, rhs, cmds);
                    let op = ir_binop(*op, &operand_type);
                    let dst = fb.temp(info.clone(), loc.clone());
                    cmds.push(Cmd::Binop { dst, op, lhs, rhs });
                    Value::Local(dst)
                }
            },
            Exp::Concat { loc, parts, .. } => {
                let srcs = parts
                    .iter()
                    .map(|part| self.lower_exp(fb, part, cmds))
                    .collect();
                let dst = fb.temp(Type::String, loc.clone());
                cmds.push(Cmd::Concat { dst, srcs });
                Value::Local(dst)
            }
            Exp::Initlist { loc, entries, info } => {
                self.lower_initlist(fb, loc, entries, info, cmds)
            }
            Exp::Lambda {
                loc,
                params,
                body,
                info,
                ..
            } => {
                let index = self.lift_lambda(loc, params, body, info);
                Value::Function(index)
            }
            Exp::CallFunc { .. } | Exp::CallMethod { .. } => self
                .lower_call(fb, exp, cmds, true)
                .expect("calls in expression position produce a value"),
        }
    }

    /// `and`/`or` lower into an `If` writing a fresh boolean local.
    fn lower_short_circuit(
        &mut self,
        fb: &mut FuncBuilder,
        lhs: &Exp<Type>,
        rhs: &Exp<Type>,
        is_and: bool,
        loc: &Loc,
        cmds: &mut Vec<Cmd>,
    ) -> Value {
        let dst = fb.temp(Type::Boolean, loc.clone());
        let lhs_value = self.lower_exp(fb, lhs, cmds);
        cmds.push(Cmd::Move {
            dst,
            src: lhs_value,
        });

        let mut rhs_cmds = vec![];
        let rhs_value = self.lower_exp(fb, rhs, &mut rhs_cmds);
        rhs_cmds.push(Cmd::Move {
            dst,
            src: rhs_value,
        });

        let (then_cmds, else_cmds) = if is_and {
            (rhs_cmds, vec![])
        } else {
            (vec![], rhs_cmds)
        };
        cmds.push(Cmd::If {
            cond: Value::Local(dst),
            then_cmds,
            else_cmds,
        });
        Value::Local(dst)
    }

    fn lower_var_read(
        &mut self,
        fb: &mut FuncBuilder,
        var: &VarNode<Type>,
        cmds: &mut Vec<Cmd>,
    ) -> Value {
        match var {
            VarNode::Name { loc, name, info } => {
                if let Some(index) = fb.resolve(name) {
                    return Value::Local(index);
                }
                if let Some(&index) = self.func_indices.get(name) {
                    return Value::Function(index);
                }
                if let Some(&global) = self.global_indices.get(name) {
                    let dst = fb.temp(info.clone(), loc.clone());
                    cmds.push(Cmd::GetGlobal { dst, global });
                    return Value::Local(dst);
                }
                // undeclared names were reported by the checker
                Value::Nil
            }
            VarNode::Bracket {
                loc,
                array,
                index,
                info,
            } => {
                let arr = self.lower_exp(fb, array, cmds);
                let idx = self.lower_exp(fb, index, cmds);
                let dst = fb.temp(info.clone(), loc.clone());
                cmds.push(Cmd::GetArr {
                    dst,
                    arr,
                    idx,
                    elem: info.clone(),
                    line: loc.line,
                });
                Value::Local(dst)
            }
            VarNode::Dot {
                loc,
                object,
                field,
                info,
            } => {
                let obj = self.lower_exp(fb, object, cmds);
                let dst = fb.temp(info.clone(), loc.clone());
                cmds.push(Cmd::GetField {
                    dst,
                    obj,
                    field: field.clone(),
                    typ: info.clone(),
                    line: loc.line,
                });
                Value::Local(dst)
            }
        }
    }

    fn lower_initlist(
        &mut self,
        fb: &mut FuncBuilder,
        loc: &Loc,
        entries: &[InitEntry<Type>],
        info: &Type,
        cmds: &mut Vec<Cmd>,
    ) -> Value {
        let named = entries.iter().any(|entry| entry.name.is_some());
        if named {
            let fields = entries
                .iter()
                .filter_map(|entry| {
                    let name = entry.name.clone()?;
                    Some((name, self.lower_exp(fb, &entry.value, cmds)))
                })
                .collect();
            let dst = fb.temp(info.clone(), loc.clone());
            cmds.push(Cmd::NewTable { dst, fields });
            Value::Local(dst)
        } else {
            let elems = entries
                .iter()
                .map(|entry| self.lower_exp(fb, &entry.value, cmds))
                .collect();
            let dst = fb.temp(info.clone(), loc.clone());
            cmds.push(Cmd::NewArray { dst, elems });
            Value::Local(dst)
        }
    }

    /// Lower a call. `want_value` distinguishes expression position from
    /// statement position, where the result is discarded.
    fn lower_call(
        &mut self,
        fb: &mut FuncBuilder,
        exp: &Exp<Type>,
        cmds: &mut Vec<Cmd>,
        want_value: bool,
    ) -> Option<Value> {
        match exp {
            Exp::CallFunc {
                loc,
                func,
                args,
                info,
            } => {
                // a direct name that is not shadowed by a local and names
                // a toplevel function takes the static call path
                let static_target = match func.as_ref() {
                    Exp::Var {
                        var: VarNode::Name { name, .. },
                        ..
                    } if fb.resolve(name).is_none() => self.func_indices.get(name).copied(),
                    _ => None,
                };

                // the callee is evaluated before its arguments
                let callee = match static_target {
                    Some(_) => None,
                    None => Some(self.lower_exp(fb, func, cmds)),
                };
                let args: Vec<Value> = args
                    .iter()
                    .map(|arg| self.lower_exp(fb, arg, cmds))
                    .collect();
                let dst = want_value.then(|| fb.temp(info.clone(), loc.clone()));

                match static_target {
                    Some(func) => cmds.push(Cmd::CallStatic {
                        dst,
                        func,
                        args,
                        line: loc.line,
                    }),
                    None => cmds.push(Cmd::CallDyn {
                        dst,
                        func: callee.expect("dynamic calls lower their callee"),
                        args,
                        line: loc.line,
                    }),
                }
                dst.map(Value::Local)
            }
            Exp::CallMethod {
                loc,
                receiver,
                method,
                args,
                info,
            } => {
                let obj = self.lower_exp(fb, receiver, cmds);
                let method_slot = fb.temp(Type::Any, loc.clone());
                cmds.push(Cmd::GetField {
                    dst: method_slot,
                    obj,
                    field: method.clone(),
                    typ: Type::Any,
                    line: loc.line,
                });
                let args: Vec<Value> = args
                    .iter()
                    .map(|arg| self.lower_exp(fb, arg, cmds))
                    .collect();
                let dst = want_value.then(|| fb.temp(info.clone(), loc.clone()));
                cmds.push(Cmd::CallDyn {
                    dst,
                    func: Value::Local(method_slot),
                    args,
                    line: loc.line,
                });
                dst.map(Value::Local)
            }
            other => {
                // statement position guarantees a call expression
                let value = self.lower_exp(fb, other, cmds);
                Some(value)
            }
        }
    }

    fn lift_lambda(
        &mut self,
        loc: &Loc,
        params: &[ParamDecl],
        body: &Block<Type>,
        info: &Type,
    ) -> usize {
        let index = self.functions.len();
        let name = format!("$lambda{index}");
        self.functions.push(None);
        let lowered =
            self.lower_function(&name, loc.clone(), info.clone(), params, body, false);
        self.functions[index] = Some(lowered);
        index
    }
}

fn ir_unop(op: Unop, operand: &Type) -> IrUnop {
    match op {
        Unop::Not => IrUnop::Not,
        Unop::BitNot => IrUnop::BitNot,
        Unop::Neg => match operand {
            Type::Float => IrUnop::NegFloat,
            _ => IrUnop::NegInt,
        },
        Unop::Len => match operand {
            Type::String => IrUnop::LenStr,
            _ => IrUnop::LenArr,
        },
    }
}

fn ir_binop(op: Binop, operand: &Type) -> IrBinop {
    let is_float = matches!(operand, Type::Float);
    match op {
        Binop::Add => {
            if is_float {
                IrBinop::AddFloat
            } else {
                IrBinop::AddInt
            }
        }
        Binop::Sub => {
            if is_float {
                IrBinop::SubFloat
            } else {
                IrBinop::SubInt
            }
        }
        Binop::Mul => {
            if is_float {
                IrBinop::MulFloat
            } else {
                IrBinop::MulInt
            }
        }
        Binop::Mod => {
            if is_float {
                IrBinop::ModFloat
            } else {
                IrBinop::ModInt
            }
        }
        Binop::Div => IrBinop::DivFloat,
        Binop::IntDiv => {
            if is_float {
                IrBinop::IntDivFloat
            } else {
                IrBinop::IntDivInt
            }
        }
        Binop::Pow => IrBinop::PowFloat,
        Binop::Eq => match operand {
            Type::Float => IrBinop::EqFloat,
            Type::Boolean => IrBinop::EqBool,
            Type::String => IrBinop::EqStr,
            Type::Integer => IrBinop::EqInt,
            _ => IrBinop::EqVal,
        },
        Binop::Ne => match operand {
            Type::Float => IrBinop::NeFloat,
            Type::Boolean => IrBinop::NeBool,
            Type::String => IrBinop::NeStr,
            Type::Integer => IrBinop::NeInt,
            _ => IrBinop::NeVal,
        },
        Binop::Lt => match operand {
            Type::Float => IrBinop::LtFloat,
            Type::String => IrBinop::LtStr,
            _ => IrBinop::LtInt,
        },
        Binop::Le => match operand {
            Type::Float => IrBinop::LeFloat,
            Type::String => IrBinop::LeStr,
            _ => IrBinop::LeInt,
        },
        Binop::Gt => match operand {
            Type::Float => IrBinop::GtFloat,
            Type::String => IrBinop::GtStr,
            _ => IrBinop::GtInt,
        },
        Binop::Ge => match operand {
            Type::Float => IrBinop::GeFloat,
            Type::String => IrBinop::GeStr,
            _ => IrBinop::GeInt,
        },
        Binop::BitAnd => IrBinop::BitAnd,
        Binop::BitOr => IrBinop::BitOr,
        Binop::BitXor => IrBinop::BitXor,
        Binop::ShiftL => IrBinop::ShiftL,
        Binop::ShiftR => IrBinop::ShiftR,
        Binop::And | Binop::Or => unreachable!("short-circuit operators lower to If"),
    }
}
