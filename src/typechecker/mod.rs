//! Name resolution and type checking.
//!
//! Checking runs in three passes over the toplevels: first the type
//! namespace is built (records registered, typealiases expanded with
//! cycle detection), then value signatures are collected so function
//! bodies can forward-reference each other, and finally every body is
//! checked left-to-right. The checker rewrites the tree from
//! `Program<()>` to `Program<Type>`, inserting explicit promotion nodes
//! where an integer meets a float, and accumulates diagnostics instead of
//! stopping at the first.

mod context;
mod error;
mod expressions;
mod scope;
mod types;

use std::collections::HashMap;

use log::debug;

use crate::parser::ast::{
    Block, FuncDecl, Program, Stat, TopLevel, TypeName, TypealiasDecl, VarDecl, Visibility,
};

pub use self::error::{CheckErrorKind, TypeCheckError, TypeCheckErrorDetail};
pub use self::scope::{Declaration, ResolvedScope, Scope};
pub use self::types::Type;

use self::context::Context;
use self::scope::Declaration as Decl;

/// A checked module: the decorated tree plus the tables later stages
/// need (record field lists and the export list in declaration order).
#[derive(Debug, Clone)]
pub struct CheckedModule {
    pub program: Program<Type>,
    pub records: HashMap<String, Vec<(String, Type)>>,
    pub exports: Vec<(String, Type)>,
}

pub struct TypeChecker {
    ctx: Context,
    /// Return types of the function currently being checked, innermost
    /// last (lambdas nest).
    rets: Vec<Vec<Type>>,
}

pub fn check(program: Program<()>) -> Result<CheckedModule, Vec<TypeCheckError>> {
    let mut checker = TypeChecker {
        ctx: Context::new(),
        rets: vec![],
    };

    checker.collect_types(&program);
    checker.collect_signatures(&program);
    let program = checker.check_program(program);

    let TypeChecker { mut ctx, .. } = checker;
    if ctx.errors.is_empty() {
        Ok(CheckedModule {
            program,
            records: std::mem::take(&mut ctx.records),
            exports: std::mem::take(&mut ctx.exports),
        })
    } else {
        ctx.errors.sort_by_key(|e| e.loc.pos);
        Err(ctx.errors)
    }
}

impl TypeChecker {
    /// Pass 1: build the type namespace. Records are registered first so
    /// aliases can reference them; aliases may reference each other in
    /// any order, and cycles are reported rather than looped over.
    fn collect_types(&mut self, program: &Program<()>) {
        for toplevel in &program.toplevels {
            if let TopLevel::Record(record) = toplevel {
                if !self
                    .ctx
                    .declare_type(&record.name, Type::Record(record.name.clone()))
                {
                    self.ctx.error(
                        TypeCheckErrorDetail::DuplicateDeclaration {
                            name: record.name.clone(),
                        },
                        record.loc.clone(),
                    );
                }
            }
        }

        let mut aliases: HashMap<String, &TypealiasDecl> = HashMap::new();
        for toplevel in &program.toplevels {
            if let TopLevel::Typealias(alias) = toplevel {
                if self.ctx.lookup_type(&alias.name).is_some()
                    || aliases.contains_key(&alias.name)
                {
                    self.ctx.error(
                        TypeCheckErrorDetail::DuplicateDeclaration {
                            name: alias.name.clone(),
                        },
                        alias.loc.clone(),
                    );
                    continue;
                }
                aliases.insert(alias.name.clone(), alias);
            }
        }

        let names: Vec<String> = program
            .toplevels
            .iter()
            .filter_map(|t| match t {
                TopLevel::Typealias(a) => Some(a.name.clone()),
                _ => None,
            })
            .collect();
        for name in names {
            if self.ctx.lookup_type(&name).is_none() {
                let mut visiting = vec![];
                self.expand_alias(&name, &aliases, &mut visiting);
            }
        }

        // record field types can mention records and aliases freely
        for toplevel in &program.toplevels {
            if let TopLevel::Record(record) = toplevel {
                let fields = record
                    .fields
                    .iter()
                    .map(|(name, tn)| (name.clone(), self.ctx.resolve(tn)))
                    .collect();
                self.ctx.records.insert(record.name.clone(), fields);
            }
        }
    }

    fn expand_alias(
        &mut self,
        name: &str,
        aliases: &HashMap<String, &TypealiasDecl>,
        visiting: &mut Vec<String>,
    ) -> Type {
        let Some(alias) = aliases.get(name) else {
            // caller checked membership; duplicates were dropped above
            return Type::Any;
        };
        visiting.push(name.to_string());
        let typ = self.expand_alias_target(&alias.type_name, aliases, visiting);
        visiting.pop();
        self.ctx.declare_type(name, typ.clone());
        typ
    }

    fn expand_alias_target(
        &mut self,
        target: &TypeName,
        aliases: &HashMap<String, &TypealiasDecl>,
        visiting: &mut Vec<String>,
    ) -> Type {
        match target {
            TypeName::Name(loc, name) => {
                if let Some(typ) = self.ctx.lookup_type(name) {
                    return typ.clone();
                }
                if visiting.iter().any(|n| n == name) {
                    self.ctx.error(
                        TypeCheckErrorDetail::CircularTypealias { name: name.clone() },
                        loc.clone(),
                    );
                    return Type::Any;
                }
                if aliases.contains_key(name) {
                    return self.expand_alias(name, aliases, visiting);
                }
                self.ctx.error(
                    TypeCheckErrorDetail::UndeclaredType { name: name.clone() },
                    loc.clone(),
                );
                Type::Any
            }
            TypeName::Array(_, elem) => {
                Type::Array(Box::new(self.expand_alias_target(elem, aliases, visiting)))
            }
            TypeName::Table(_, fields) => Type::Table(
                fields
                    .iter()
                    .map(|(n, t)| (n.clone(), self.expand_alias_target(t, aliases, visiting)))
                    .collect(),
            ),
            TypeName::Function(_, params, rets) => Type::Function {
                params: params
                    .iter()
                    .map(|t| self.expand_alias_target(t, aliases, visiting))
                    .collect(),
                rets: rets
                    .iter()
                    .map(|t| self.expand_alias_target(t, aliases, visiting))
                    .collect(),
            },
            simple => {
                // primitive type names resolve without touching the alias map
                self.ctx.resolve(simple)
            }
        }
    }

    /// Pass 2: declare toplevel functions, imports and annotated module
    /// variables so bodies can forward-reference them.
    fn collect_signatures(&mut self, program: &Program<()>) {
        for toplevel in &program.toplevels {
            match toplevel {
                TopLevel::Func(func) => {
                    let typ = self.function_type(func);
                    self.declare_module_name(&func.name, typ, false, func.loc.clone());
                }
                TopLevel::Import(import) => {
                    self.declare_module_name(
                        &import.name,
                        Type::Any,
                        false,
                        import.loc.clone(),
                    );
                }
                TopLevel::Var(var) => {
                    if let Some(type_name) = &var.type_name {
                        let typ = self.ctx.resolve(type_name);
                        self.declare_module_name(&var.name, typ, true, var.loc.clone());
                    }
                }
                _ => {}
            }
        }
    }

    fn function_type(&mut self, func: &FuncDecl<()>) -> Type {
        let params = func
            .params
            .iter()
            .map(|p| match &p.type_name {
                Some(type_name) => self.ctx.resolve(type_name),
                None => Type::Any,
            })
            .collect();
        let rets = func
            .ret_types
            .iter()
            .map(|t| self.ctx.resolve(t))
            .collect();
        Type::Function { params, rets }
    }

    fn declare_module_name(
        &mut self,
        name: &str,
        typ: Type,
        mutable: bool,
        loc: crate::lexer::Loc,
    ) {
        let previous = self.ctx.scope.declare(Decl {
            loc: loc.clone(),
            name: name.to_string(),
            typ,
            mutable,
        });
        if previous.is_some() {
            self.ctx.error(
                TypeCheckErrorDetail::DuplicateDeclaration {
                    name: name.to_string(),
                },
                loc,
            );
        }
    }

    /// Pass 3: check every toplevel in source order.
    fn check_program(&mut self, program: Program<()>) -> Program<Type> {
        let toplevels = program
            .toplevels
            .into_iter()
            .map(|toplevel| self.check_toplevel(toplevel))
            .collect();
        Program { toplevels }
    }

    fn check_toplevel(&mut self, toplevel: TopLevel<()>) -> TopLevel<Type> {
        match toplevel {
            TopLevel::Func(func) => TopLevel::Func(self.check_func(func)),
            TopLevel::Var(var) => TopLevel::Var(self.check_toplevel_var(var)),
            TopLevel::Typealias(alias) => TopLevel::Typealias(alias),
            TopLevel::Record(record) => TopLevel::Record(record),
            TopLevel::Import(import) => TopLevel::Import(import),
            TopLevel::ModuleReturn { loc, value } => TopLevel::ModuleReturn {
                loc,
                value: self.check_module_return(value),
            },
        }
    }

    /// A module-level `return` names already-declared bindings; its table
    /// constructor is checked without a surrounding context type.
    fn check_module_return(
        &mut self,
        value: crate::parser::ast::Exp<()>,
    ) -> crate::parser::ast::Exp<Type> {
        use crate::parser::ast::{Exp, InitEntry};
        match value {
            Exp::Initlist { loc, entries, .. } => {
                let entries = entries
                    .into_iter()
                    .map(|entry| InitEntry {
                        loc: entry.loc,
                        name: entry.name,
                        value: self.check_exp(entry.value, None),
                    })
                    .collect();
                Exp::Initlist {
                    loc,
                    entries,
                    info: Type::Any,
                }
            }
            other => self.check_exp(other, None),
        }
    }

    fn check_func(&mut self, func: FuncDecl<()>) -> FuncDecl<Type> {
        debug!("checking function '{}'", func.name);
        let typ = self.function_type(&func);
        let Type::Function { params, rets } = typ.clone() else {
            unreachable!()
        };

        self.ctx.scope.push_function();
        for (param, param_type) in func.params.iter().zip(&params) {
            let previous = self.ctx.scope.declare(Decl {
                loc: param.loc.clone(),
                name: param.name.clone(),
                typ: param_type.clone(),
                mutable: true,
            });
            if previous.is_some() {
                self.ctx.error(
                    TypeCheckErrorDetail::DuplicateDeclaration {
                        name: param.name.clone(),
                    },
                    param.loc.clone(),
                );
            }
        }

        self.rets.push(rets);
        let body = self.check_block_stats(func.body);
        self.rets.pop();
        self.ctx.scope.pop_function();

        if func.visibility == Visibility::Export {
            self.ctx.exports.push((func.name.clone(), typ.clone()));
        }

        FuncDecl {
            loc: func.loc,
            name: func.name,
            visibility: func.visibility,
            export_kw: func.export_kw,
            params: func.params,
            ret_annotation: func.ret_annotation,
            ret_types: func.ret_types,
            body,
            end_loc: func.end_loc,
            info: typ,
        }
    }

    fn check_toplevel_var(&mut self, var: VarDecl<()>) -> VarDecl<Type> {
        let annotated = var.type_name.as_ref().map(|tn| self.ctx.resolve(tn));
        let value = self.check_exp(var.value, annotated.as_ref());
        let (value, typ) = match annotated {
            Some(typ) => (self.coerce(value, &typ, var.loc.clone()), typ),
            None => {
                let typ = value.info().clone();
                self.declare_module_name(&var.name, typ.clone(), true, var.loc.clone());
                (value, typ)
            }
        };

        if var.visibility == Visibility::Export {
            self.ctx.exports.push((var.name.clone(), typ.clone()));
        }

        VarDecl {
            loc: var.loc,
            name: var.name,
            visibility: var.visibility,
            export_kw: var.export_kw,
            annotation: var.annotation,
            type_name: var.type_name,
            value,
            info: typ,
        }
    }

    /// Check a block in a fresh scope frame.
    pub(crate) fn check_block(&mut self, block: Block<()>) -> Block<Type> {
        self.ctx.scope.push_block();
        let block = self.check_block_stats(block);
        self.ctx.scope.pop_block();
        block
    }

    /// Check a block's statements in the current scope frame. Used
    /// directly where the enclosing construct owns the frame (function
    /// bodies, `repeat` bodies whose condition sees body locals).
    fn check_block_stats(&mut self, block: Block<()>) -> Block<Type> {
        let stats = block
            .stats
            .into_iter()
            .map(|stat| self.check_stat(stat))
            .collect();
        Block {
            loc: block.loc,
            stats,
        }
    }

    fn check_stat(&mut self, stat: Stat<()>) -> Stat<Type> {
        match stat {
            Stat::Block { loc, body } => Stat::Block {
                loc,
                body: self.check_block(body),
            },
            Stat::Decl {
                loc,
                name,
                annotation,
                type_name,
                value,
                ..
            } => {
                let annotated = type_name.as_ref().map(|tn| self.ctx.resolve(tn));
                let value = value.map(|v| self.check_exp(v, annotated.as_ref()));

                let (value, typ) = match (annotated, value) {
                    (Some(typ), Some(value)) => {
                        (Some(self.coerce(value, &typ, loc.clone())), typ)
                    }
                    (Some(typ), None) => (None, typ),
                    (None, Some(value)) => {
                        let typ = value.info().clone();
                        (Some(value), typ)
                    }
                    (None, None) => {
                        self.ctx.error(
                            TypeCheckErrorDetail::DeclNeedsTypeOrValue {
                                name: name.clone(),
                            },
                            loc.clone(),
                        );
                        (None, Type::Any)
                    }
                };

                // locals may shadow earlier declarations in enclosing
                // frames but not collide within their own
                let previous = self.ctx.scope.declare(Decl {
                    loc: loc.clone(),
                    name: name.clone(),
                    typ: typ.clone(),
                    mutable: true,
                });
                if previous.is_some() {
                    self.ctx.error(
                        TypeCheckErrorDetail::DuplicateDeclaration { name: name.clone() },
                        loc.clone(),
                    );
                }

                Stat::Decl {
                    loc,
                    name,
                    annotation,
                    type_name,
                    value,
                    info: typ,
                }
            }
            Stat::Assign { loc, var, value } => {
                let (var, var_type) = self.check_var(var, true);
                let value = self.check_exp(value, Some(&var_type));
                let value = self.coerce(value, &var_type, loc.clone());
                Stat::Assign { loc, var, value }
            }
            Stat::If {
                loc,
                arms,
                else_block,
            } => {
                let arms = arms
                    .into_iter()
                    .map(|(cond, body)| {
                        let cond = self.check_condition(cond);
                        (cond, self.check_block(body))
                    })
                    .collect();
                let else_block = else_block.map(|b| self.check_block(b));
                Stat::If {
                    loc,
                    arms,
                    else_block,
                }
            }
            Stat::While { loc, cond, body } => {
                let cond = self.check_condition(cond);
                let body = self.check_block(body);
                Stat::While { loc, cond, body }
            }
            Stat::Repeat { loc, body, cond } => {
                // the until-condition sees the body's locals
                self.ctx.scope.push_block();
                let body = self.check_block_stats(body);
                let cond = self.check_condition(cond);
                self.ctx.scope.pop_block();
                Stat::Repeat { loc, body, cond }
            }
            Stat::For {
                loc,
                var,
                annotation,
                type_name,
                start,
                limit,
                step,
                body,
                ..
            } => {
                let annotated = type_name.as_ref().map(|tn| self.ctx.resolve(tn));
                let start = self.check_exp(start, annotated.as_ref());
                let var_type = annotated.unwrap_or_else(|| start.info().clone());
                if !var_type.is_numeric() {
                    self.ctx.error(
                        TypeCheckErrorDetail::TypeMismatch {
                            expected: Type::Integer,
                            found: var_type.clone(),
                        },
                        loc.clone(),
                    );
                }
                let start = self.coerce(start, &var_type, loc.clone());
                let limit = self.check_exp(limit, Some(&var_type));
                let limit = self.coerce(limit, &var_type, loc.clone());
                let step = step.map(|s| {
                    let s = self.check_exp(s, Some(&var_type));
                    self.coerce(s, &var_type, loc.clone())
                });

                self.ctx.scope.push_block();
                self.ctx.scope.declare(Decl {
                    loc: loc.clone(),
                    name: var.clone(),
                    typ: var_type.clone(),
                    mutable: true,
                });
                let body = self.check_block_stats(body);
                self.ctx.scope.pop_block();

                Stat::For {
                    loc,
                    var,
                    annotation,
                    type_name,
                    start,
                    limit,
                    step,
                    body,
                    info: var_type,
                }
            }
            Stat::Break { loc } => Stat::Break { loc },
            Stat::Return { loc, values } => {
                let expected = self.rets.last().cloned().unwrap_or_default();
                if expected.is_empty() && !values.is_empty() {
                    self.ctx.error(
                        TypeCheckErrorDetail::ReturnValueInVoidFunction,
                        loc.clone(),
                    );
                } else if expected.len() != values.len() {
                    self.ctx.error(
                        TypeCheckErrorDetail::ReturnArity {
                            expected: expected.len(),
                            found: values.len(),
                        },
                        loc.clone(),
                    );
                }
                let values = values
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| {
                        let expected = expected.get(index).cloned();
                        let value = self.check_exp(value, expected.as_ref());
                        match expected {
                            Some(t) => self.coerce(value, &t, loc.clone()),
                            None => value,
                        }
                    })
                    .collect();
                Stat::Return { loc, values }
            }
            Stat::Call { loc, call } => {
                let call = self.check_exp(call, None);
                Stat::Call { loc, call }
            }
        }
    }

    fn check_condition(
        &mut self,
        cond: crate::parser::ast::Exp<()>,
    ) -> crate::parser::ast::Exp<Type> {
        let loc = cond.loc().clone();
        let cond = self.check_exp(cond, Some(&Type::Boolean));
        self.coerce(cond, &Type::Boolean, loc)
    }
}
