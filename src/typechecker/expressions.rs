//! Expression typing. Every function here consumes an `Exp<()>` and
//! produces an `Exp<Type>`; on error a diagnostic is recorded and the
//! expression recovers with `any` so checking can continue.

use crate::lexer::Loc;
use crate::parser::ast::{Binop, Exp, InitEntry, Unop, VarNode};

use super::error::TypeCheckErrorDetail;
use super::scope::{Declaration, ResolvedScope};
use super::types::Type;
use super::TypeChecker;

impl TypeChecker {
    pub(crate) fn check_exp(&mut self, exp: Exp<()>, expected: Option<&Type>) -> Exp<Type> {
        match exp {
            Exp::Nil { loc, .. } => Exp::Nil {
                loc,
                info: Type::Nil,
            },
            Exp::Bool { loc, value, .. } => Exp::Bool {
                loc,
                value,
                info: Type::Boolean,
            },
            Exp::Integer { loc, value, .. } => Exp::Integer {
                loc,
                value,
                info: Type::Integer,
            },
            Exp::Float { loc, value, .. } => Exp::Float {
                loc,
                value,
                info: Type::Float,
            },
            Exp::Str { loc, value, .. } => Exp::Str {
                loc,
                value,
                info: Type::String,
            },
            Exp::Paren { loc, exp, .. } => {
                let exp = self.check_exp(*exp, expected);
                let info = exp.info().clone();
                Exp::Paren {
                    loc,
                    exp: Box::new(exp),
                    info,
                }
            }
            Exp::Var { loc, var, .. } => {
                let (var, typ) = self.check_var(var, false);
                Exp::Var {
                    loc,
                    var,
                    info: typ,
                }
            }
            Exp::Cast {
                loc,
                exp,
                type_name,
                span,
                ..
            } => {
                let exp = self.check_exp(*exp, None);
                let from = exp.info().clone();
                let to = self.ctx.resolve(&type_name);
                let legal = from == to
                    || from == Type::Any
                    || to == Type::Any
                    || (from.is_numeric() && to.is_numeric());
                if !legal {
                    self.ctx.error(
                        TypeCheckErrorDetail::InvalidCast {
                            from,
                            to: to.clone(),
                        },
                        loc.clone(),
                    );
                }
                Exp::Cast {
                    loc,
                    exp: Box::new(exp),
                    type_name,
                    span,
                    info: to,
                }
            }
            Exp::ToFloat { .. } => unreachable!("promotions are inserted by the checker"),
            Exp::Unop { loc, op, exp, .. } => self.check_unop(loc, op, *exp),
            Exp::Binop {
                loc, op, lhs, rhs, ..
            } => self.check_binop(loc, op, *lhs, *rhs),
            Exp::Concat { loc, parts, .. } => self.check_concat(loc, parts),
            Exp::Initlist { loc, entries, .. } => self.check_initlist(loc, entries, expected),
            Exp::Lambda {
                loc,
                params,
                ret_annotation,
                ret_types,
                body,
                ..
            } => {
                let param_types: Vec<Type> = params
                    .iter()
                    .map(|p| match &p.type_name {
                        Some(type_name) => self.ctx.resolve(type_name),
                        None => Type::Any,
                    })
                    .collect();
                let rets: Vec<Type> =
                    ret_types.iter().map(|t| self.ctx.resolve(t)).collect();

                self.ctx.scope.push_function();
                for (param, typ) in params.iter().zip(&param_types) {
                    self.ctx.scope.declare(Declaration {
                        loc: param.loc.clone(),
                        name: param.name.clone(),
                        typ: typ.clone(),
                        mutable: true,
                    });
                }
                self.rets.push(rets.clone());
                let body = self.check_block(body);
                self.rets.pop();
                self.ctx.scope.pop_function();

                Exp::Lambda {
                    loc,
                    params,
                    ret_annotation,
                    ret_types,
                    body,
                    info: Type::Function {
                        params: param_types,
                        rets,
                    },
                }
            }
            Exp::CallFunc {
                loc, func, args, ..
            } => {
                let func = self.check_exp(*func, None);
                let (args, info) = match func.info().clone() {
                    Type::Function { params, rets } => {
                        if params.len() != args.len() {
                            self.ctx.error(
                                TypeCheckErrorDetail::WrongArity {
                                    expected: params.len(),
                                    found: args.len(),
                                },
                                loc.clone(),
                            );
                        }
                        let args = args
                            .into_iter()
                            .enumerate()
                            .map(|(index, arg)| {
                                let expected = params.get(index).cloned();
                                let arg = self.check_exp(arg, expected.as_ref());
                                match expected {
                                    Some(t) => {
                                        let loc = arg.loc().clone();
                                        self.coerce(arg, &t, loc)
                                    }
                                    None => arg,
                                }
                            })
                            .collect();
                        let info = rets.first().cloned().unwrap_or(Type::Nil);
                        (args, info)
                    }
                    Type::Any => {
                        // dynamic call through the host protocol
                        let args = args
                            .into_iter()
                            .map(|arg| self.check_exp(arg, None))
                            .collect();
                        (args, Type::Any)
                    }
                    found => {
                        self.ctx
                            .error(TypeCheckErrorDetail::NotCallable { found }, loc.clone());
                        let args = args
                            .into_iter()
                            .map(|arg| self.check_exp(arg, None))
                            .collect();
                        (args, Type::Any)
                    }
                };
                Exp::CallFunc {
                    loc,
                    func: Box::new(func),
                    args,
                    info,
                }
            }
            Exp::CallMethod {
                loc,
                receiver,
                method,
                args,
                ..
            } => {
                let receiver = self.check_exp(*receiver, None);
                let receiver_type = receiver.info().clone();

                let method_type = match &receiver_type {
                    Type::Any => Some(Type::Any),
                    other => {
                        let fields = self.ctx.fields_of(other).map(|f| f.to_vec());
                        match fields {
                            Some(fields) => {
                                match fields.iter().find(|(name, _)| name == &method) {
                                    Some((_, typ)) => Some(typ.clone()),
                                    None => {
                                        self.ctx.error(
                                            TypeCheckErrorDetail::NoSuchField {
                                                typ: receiver_type.clone(),
                                                field: method.clone(),
                                            },
                                            loc.clone(),
                                        );
                                        None
                                    }
                                }
                            }
                            None => {
                                self.ctx.error(
                                    TypeCheckErrorDetail::NotCallable {
                                        found: receiver_type.clone(),
                                    },
                                    loc.clone(),
                                );
                                None
                            }
                        }
                    }
                };

                let (args, info) = match method_type {
                    Some(Type::Function { params, rets }) => {
                        if params.len() != args.len() {
                            self.ctx.error(
                                TypeCheckErrorDetail::WrongArity {
                                    expected: params.len(),
                                    found: args.len(),
                                },
                                loc.clone(),
                            );
                        }
                        let args = args
                            .into_iter()
                            .enumerate()
                            .map(|(index, arg)| {
                                let expected = params.get(index).cloned();
                                let arg = self.check_exp(arg, expected.as_ref());
                                match expected {
                                    Some(t) => {
                                        let loc = arg.loc().clone();
                                        self.coerce(arg, &t, loc)
                                    }
                                    None => arg,
                                }
                            })
                            .collect();
                        (args, rets.first().cloned().unwrap_or(Type::Nil))
                    }
                    Some(Type::Any) => {
                        let args = args
                            .into_iter()
                            .map(|arg| self.check_exp(arg, None))
                            .collect();
                        (args, Type::Any)
                    }
                    Some(found) => {
                        self.ctx
                            .error(TypeCheckErrorDetail::NotCallable { found }, loc.clone());
                        let args = args
                            .into_iter()
                            .map(|arg| self.check_exp(arg, None))
                            .collect();
                        (args, Type::Any)
                    }
                    None => {
                        let args = args
                            .into_iter()
                            .map(|arg| self.check_exp(arg, None))
                            .collect();
                        (args, Type::Any)
                    }
                };

                Exp::CallMethod {
                    loc,
                    receiver: Box::new(receiver),
                    method,
                    args,
                    info,
                }
            }
        }
    }

    /// Resolve a variable reference. `for_write` additionally checks
    /// mutability of named bindings.
    pub(crate) fn check_var(
        &mut self,
        var: VarNode<()>,
        for_write: bool,
    ) -> (VarNode<Type>, Type) {
        match var {
            VarNode::Name { loc, name, .. } => {
                let typ = match self.ctx.scope.resolve(&name) {
                    Some((decl, scope)) => {
                        let typ = decl.typ.clone();
                        let mutable = decl.mutable;
                        if scope == ResolvedScope::Outer {
                            self.ctx.error(
                                TypeCheckErrorDetail::CapturedVariable {
                                    name: name.clone(),
                                },
                                loc.clone(),
                            );
                        }
                        if for_write && !mutable {
                            self.ctx.error(
                                TypeCheckErrorDetail::NotMutable { name: name.clone() },
                                loc.clone(),
                            );
                        }
                        typ
                    }
                    None => {
                        self.ctx.error(
                            TypeCheckErrorDetail::UndeclaredVariable { name: name.clone() },
                            loc.clone(),
                        );
                        Type::Any
                    }
                };
                (
                    VarNode::Name {
                        loc,
                        name,
                        info: typ.clone(),
                    },
                    typ,
                )
            }
            VarNode::Bracket {
                loc, array, index, ..
            } => {
                let array = self.check_exp(*array, None);
                let elem = match array.info() {
                    Type::Array(elem) => (**elem).clone(),
                    Type::Any => Type::Any,
                    found => {
                        self.ctx.error(
                            TypeCheckErrorDetail::NotIndexable {
                                found: found.clone(),
                            },
                            loc.clone(),
                        );
                        Type::Any
                    }
                };
                let index = self.check_exp(*index, Some(&Type::Integer));
                match index.info() {
                    Type::Integer | Type::Any => {}
                    found => {
                        self.ctx.error(
                            TypeCheckErrorDetail::IndexNotInteger {
                                found: found.clone(),
                            },
                            loc.clone(),
                        );
                    }
                }
                (
                    VarNode::Bracket {
                        loc,
                        array: Box::new(array),
                        index: Box::new(index),
                        info: elem.clone(),
                    },
                    elem,
                )
            }
            VarNode::Dot {
                loc, object, field, ..
            } => {
                let object = self.check_exp(*object, None);
                let object_type = object.info().clone();
                let typ = match &object_type {
                    Type::Any => Type::Any,
                    other => {
                        let fields = self.ctx.fields_of(other).map(|f| f.to_vec());
                        match fields {
                            Some(fields) => {
                                match fields.iter().find(|(name, _)| name == &field) {
                                    Some((_, typ)) => typ.clone(),
                                    None => {
                                        self.ctx.error(
                                            TypeCheckErrorDetail::NoSuchField {
                                                typ: object_type.clone(),
                                                field: field.clone(),
                                            },
                                            loc.clone(),
                                        );
                                        Type::Any
                                    }
                                }
                            }
                            None => {
                                self.ctx.error(
                                    TypeCheckErrorDetail::NotIndexable {
                                        found: object_type.clone(),
                                    },
                                    loc.clone(),
                                );
                                Type::Any
                            }
                        }
                    }
                };
                (
                    VarNode::Dot {
                        loc,
                        object: Box::new(object),
                        field,
                        info: typ.clone(),
                    },
                    typ,
                )
            }
        }
    }

    /// Insert the implicit integer-to-float promotion, accept boxing into
    /// `any`, or report a mismatch.
    pub(crate) fn coerce(&mut self, exp: Exp<Type>, expected: &Type, loc: Loc) -> Exp<Type> {
        let found = exp.info().clone();
        if &found == expected {
            return exp;
        }
        if found == Type::Integer && *expected == Type::Float {
            let loc = exp.loc().clone();
            return Exp::ToFloat {
                loc,
                exp: Box::new(exp),
                info: Type::Float,
            };
        }
        if *expected == Type::Any {
            // every value boxes into the dynamic type
            return exp;
        }
        self.ctx.error(
            TypeCheckErrorDetail::TypeMismatch {
                expected: expected.clone(),
                found,
            },
            loc,
        );
        exp
    }

    fn check_unop(&mut self, loc: Loc, op: Unop, exp: Exp<()>) -> Exp<Type> {
        let exp = self.check_exp(exp, None);
        let found = exp.info().clone();
        let info = match op {
            Unop::Not => {
                if found != Type::Boolean {
                    self.ctx.error(
                        TypeCheckErrorDetail::WrongUnopOperand { op, found },
                        loc.clone(),
                    );
                }
                Type::Boolean
            }
            Unop::Len => {
                if !matches!(found, Type::Array(_) | Type::String) {
                    self.ctx.error(
                        TypeCheckErrorDetail::WrongUnopOperand { op, found },
                        loc.clone(),
                    );
                }
                Type::Integer
            }
            Unop::Neg => match found {
                Type::Integer => Type::Integer,
                Type::Float => Type::Float,
                found => {
                    self.ctx.error(
                        TypeCheckErrorDetail::WrongUnopOperand { op, found },
                        loc.clone(),
                    );
                    Type::Any
                }
            },
            Unop::BitNot => {
                if found != Type::Integer {
                    self.ctx.error(
                        TypeCheckErrorDetail::WrongUnopOperand { op, found },
                        loc.clone(),
                    );
                }
                Type::Integer
            }
        };
        Exp::Unop {
            loc,
            op,
            exp: Box::new(exp),
            info,
        }
    }

    fn check_binop(&mut self, loc: Loc, op: Binop, lhs: Exp<()>, rhs: Exp<()>) -> Exp<Type> {
        let lhs = self.check_exp(lhs, None);
        let rhs = self.check_exp(rhs, None);

        match op {
            Binop::Add | Binop::Sub | Binop::Mul | Binop::Mod | Binop::IntDiv => {
                let (lhs, rhs, info) = self.arith_operands(op, &loc, lhs, rhs);
                self.binop(loc, op, lhs, rhs, info)
            }
            Binop::Div | Binop::Pow => {
                let lhs = self.require_numeric_as_float(op, &loc, lhs);
                let rhs = self.require_numeric_as_float(op, &loc, rhs);
                self.binop(loc, op, lhs, rhs, Type::Float)
            }
            Binop::Lt | Binop::Gt | Binop::Le | Binop::Ge => {
                let tl = lhs.info().clone();
                let tr = rhs.info().clone();
                if tl == Type::String && tr == Type::String {
                    self.binop(loc, op, lhs, rhs, Type::Boolean)
                } else {
                    let (lhs, rhs, _) = self.arith_operands(op, &loc, lhs, rhs);
                    self.binop(loc, op, lhs, rhs, Type::Boolean)
                }
            }
            Binop::Eq | Binop::Ne => {
                let tl = lhs.info().clone();
                let tr = rhs.info().clone();
                if tl == tr {
                    self.binop(loc, op, lhs, rhs, Type::Boolean)
                } else if tl.is_numeric() && tr.is_numeric() {
                    // cross-kind numeric equality compares by value
                    let (lhs, rhs, _) = self.arith_operands(op, &loc, lhs, rhs);
                    self.binop(loc, op, lhs, rhs, Type::Boolean)
                } else {
                    self.ctx.error(
                        TypeCheckErrorDetail::TypeMismatch {
                            expected: tl,
                            found: tr,
                        },
                        loc.clone(),
                    );
                    self.binop(loc, op, lhs, rhs, Type::Boolean)
                }
            }
            Binop::And | Binop::Or => {
                let lhs = {
                    let loc = lhs.loc().clone();
                    self.coerce(lhs, &Type::Boolean, loc)
                };
                let rhs = {
                    let loc = rhs.loc().clone();
                    self.coerce(rhs, &Type::Boolean, loc)
                };
                self.binop(loc, op, lhs, rhs, Type::Boolean)
            }
            Binop::BitAnd | Binop::BitOr | Binop::BitXor | Binop::ShiftL | Binop::ShiftR => {
                let lhs = self.require_integer(op, lhs);
                let rhs = self.require_integer(op, rhs);
                self.binop(loc, op, lhs, rhs, Type::Integer)
            }
        }
    }

    fn binop(
        &mut self,
        loc: Loc,
        op: Binop,
        lhs: Exp<Type>,
        rhs: Exp<Type>,
        info: Type,
    ) -> Exp<Type> {
        Exp::Binop {
            loc,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            info,
        }
    }

    /// Homogenize numeric operands: integer/integer stays integer,
    /// anything involving a float promotes the integer side.
    fn arith_operands(
        &mut self,
        op: Binop,
        loc: &Loc,
        lhs: Exp<Type>,
        rhs: Exp<Type>,
    ) -> (Exp<Type>, Exp<Type>, Type) {
        let tl = lhs.info().clone();
        let tr = rhs.info().clone();
        match (&tl, &tr) {
            (Type::Integer, Type::Integer) => (lhs, rhs, Type::Integer),
            (Type::Float, Type::Float) => (lhs, rhs, Type::Float),
            (Type::Integer, Type::Float) => {
                let lhs = self.promote(lhs);
                (lhs, rhs, Type::Float)
            }
            (Type::Float, Type::Integer) => {
                let rhs = self.promote(rhs);
                (lhs, rhs, Type::Float)
            }
            _ => {
                let found = if tl.is_numeric() { tr } else { tl };
                self.ctx.error(
                    TypeCheckErrorDetail::WrongBinopOperand { op, found },
                    loc.clone(),
                );
                (lhs, rhs, Type::Any)
            }
        }
    }

    fn promote(&mut self, exp: Exp<Type>) -> Exp<Type> {
        let loc = exp.loc().clone();
        Exp::ToFloat {
            loc,
            exp: Box::new(exp),
            info: Type::Float,
        }
    }

    fn require_numeric_as_float(&mut self, op: Binop, loc: &Loc, exp: Exp<Type>) -> Exp<Type> {
        match exp.info() {
            Type::Float => exp,
            Type::Integer => self.promote(exp),
            found => {
                let found = found.clone();
                self.ctx.error(
                    TypeCheckErrorDetail::WrongBinopOperand { op, found },
                    loc.clone(),
                );
                exp
            }
        }
    }

    fn require_integer(&mut self, op: Binop, exp: Exp<Type>) -> Exp<Type> {
        if *exp.info() != Type::Integer {
            let found = exp.info().clone();
            let loc = exp.loc().clone();
            self.ctx
                .error(TypeCheckErrorDetail::WrongBinopOperand { op, found }, loc);
        }
        exp
    }

    fn check_concat(&mut self, loc: Loc, parts: Vec<Exp<()>>) -> Exp<Type> {
        let parts: Vec<Exp<Type>> = parts
            .into_iter()
            .map(|part| {
                let part = self.check_exp(part, None);
                if !part.info().is_concatable() {
                    let found = part.info().clone();
                    let loc = part.loc().clone();
                    self.ctx.error(
                        TypeCheckErrorDetail::WrongBinopOperand {
                            op: Binop::Add,
                            found,
                        },
                        loc,
                    );
                }
                part
            })
            .collect();

        let parts = fold_literal_runs(parts);
        if parts.len() == 1 {
            if let Exp::Str { .. } = &parts[0] {
                return parts.into_iter().next().unwrap();
            }
        }
        Exp::Concat {
            loc,
            parts,
            info: Type::String,
        }
    }

    fn check_initlist(
        &mut self,
        loc: Loc,
        entries: Vec<InitEntry<()>>,
        expected: Option<&Type>,
    ) -> Exp<Type> {
        let expected = expected.cloned();
        match expected {
            Some(Type::Array(elem)) => {
                let entries = entries
                    .into_iter()
                    .map(|entry| {
                        if entry.name.is_some() {
                            self.ctx.error(
                                TypeCheckErrorDetail::InitlistNamedElement,
                                entry.loc.clone(),
                            );
                        }
                        let value = self.check_exp(entry.value, Some(&elem));
                        let value_loc = value.loc().clone();
                        let value = self.coerce(value, &elem, value_loc);
                        InitEntry {
                            loc: entry.loc,
                            name: entry.name,
                            value,
                        }
                    })
                    .collect();
                Exp::Initlist {
                    loc,
                    entries,
                    info: Type::Array(elem),
                }
            }
            Some(expected_type @ (Type::Table(_) | Type::Record(_))) => {
                let fields: Vec<(String, Type)> = self
                    .ctx
                    .fields_of(&expected_type)
                    .map(|f| f.to_vec())
                    .unwrap_or_default();

                let mut seen: Vec<String> = vec![];
                let entries: Vec<InitEntry<Type>> = entries
                    .into_iter()
                    .map(|entry| {
                        let Some(name) = entry.name.clone() else {
                            self.ctx.error(
                                TypeCheckErrorDetail::InitlistPositionalField,
                                entry.loc.clone(),
                            );
                            let value = self.check_exp(entry.value, None);
                            return InitEntry {
                                loc: entry.loc,
                                name: entry.name,
                                value,
                            };
                        };
                        let field_type =
                            fields.iter().find(|(n, _)| n == &name).map(|(_, t)| t.clone());
                        let value = match field_type {
                            Some(t) => {
                                let value = self.check_exp(entry.value, Some(&t));
                                let value_loc = value.loc().clone();
                                self.coerce(value, &t, value_loc)
                            }
                            None => {
                                self.ctx.error(
                                    TypeCheckErrorDetail::NoSuchField {
                                        typ: expected_type.clone(),
                                        field: name.clone(),
                                    },
                                    entry.loc.clone(),
                                );
                                self.check_exp(entry.value, None)
                            }
                        };
                        seen.push(name);
                        InitEntry {
                            loc: entry.loc,
                            name: entry.name,
                            value,
                        }
                    })
                    .collect();

                for (name, _) in &fields {
                    if !seen.iter().any(|s| s == name) {
                        self.ctx.error(
                            TypeCheckErrorDetail::MissingField {
                                typ: expected_type.clone(),
                                field: name.clone(),
                            },
                            loc.clone(),
                        );
                    }
                }

                Exp::Initlist {
                    loc,
                    entries,
                    info: expected_type,
                }
            }
            _ => {
                self.ctx
                    .error(TypeCheckErrorDetail::InitlistNeedsContext, loc.clone());
                let entries = entries
                    .into_iter()
                    .map(|entry| InitEntry {
                        loc: entry.loc.clone(),
                        name: entry.name.clone(),
                        value: self.check_exp(entry.value, None),
                    })
                    .collect();
                Exp::Initlist {
                    loc,
                    entries,
                    info: Type::Any,
                }
            }
        }
    }
}

/// Merge adjacent compile-time literals of a concatenation into single
/// string literals, matching the runtime's number-to-string conversion.
fn fold_literal_runs(parts: Vec<Exp<Type>>) -> Vec<Exp<Type>> {
    let mut out: Vec<Exp<Type>> = vec![];
    for part in parts {
        let literal = match &part {
            Exp::Str { value, .. } => Some(value.clone()),
            Exp::Integer { value, .. } => Some(value.to_string()),
            Exp::Float { value, .. } => Some(lua_float_repr(*value)),
            _ => None,
        };
        match literal {
            Some(text) => {
                if let Some(Exp::Str { value, .. }) = out.last_mut() {
                    value.push_str(&text);
                } else {
                    out.push(Exp::Str {
                        loc: part.loc().clone(),
                        value: text,
                        info: Type::String,
                    });
                }
            }
            None => out.push(part),
        }
    }
    out
}

/// Format a float the way Lua's `tostring` does (`"%.14g"`, with a
/// trailing `.0` added when the result would read as an integer).
pub(crate) fn lua_float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let mut s = format_g(x, 14);
    if !s.contains('.') && !s.contains('e') && !s.contains('n') && !s.contains('i') {
        s.push_str(".0");
    }
    s
}

fn format_g(x: f64, significant: i32) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let exp = x.abs().log10().floor() as i32;
    if exp < -4 || exp >= significant {
        // exponent form, mantissa trimmed of trailing zeros
        let mut mantissa = format!("{:.*e}", (significant - 1) as usize, x);
        if let Some(e_pos) = mantissa.find('e') {
            let exp_part: i32 = mantissa[e_pos + 1..].parse().unwrap_or(0);
            let mut digits = mantissa[..e_pos].to_string();
            if digits.contains('.') {
                while digits.ends_with('0') {
                    digits.pop();
                }
                if digits.ends_with('.') {
                    digits.pop();
                }
            }
            mantissa = format!(
                "{digits}e{}{:02}",
                if exp_part < 0 { "-" } else { "+" },
                exp_part.abs()
            );
        }
        mantissa
    } else {
        let precision = (significant - 1 - exp).max(0) as usize;
        let mut s = format!("{x:.precision$}");
        if s.contains('.') {
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lua_float_repr() {
        assert_eq!(lua_float_repr(1.0), "1.0");
        assert_eq!(lua_float_repr(2.5), "2.5");
        assert_eq!(lua_float_repr(0.1), "0.1");
        assert_eq!(lua_float_repr(-3.0), "-3.0");
        assert_eq!(lua_float_repr(1e100), "1e+100");
    }
}
