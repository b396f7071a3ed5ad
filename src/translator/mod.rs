//! The Lua back end: strip Pallene's type syntax from the original byte
//! buffer without moving a single remaining byte.
//!
//! Every byte of a stripped span maps to itself if it is `\n`, `\r` or
//! `\t` and to a space otherwise, so line geometry and column positions
//! survive exactly. Comment bytes inside a stripped span are kept as
//! they are; only the surrounding type syntax is whited out. The
//! `export` keyword rewrites in place to `local ` (same six bytes), and
//! a module that exported anything gets the export table appended after
//! the transformed body. Translation is a fixed point on its own output:
//! the emitted source has no annotations left to strip and already ends
//! in a module return.

use crate::parser::ast::{
    Block, ByteSpan, Exp, FuncDecl, InitEntry, ParamDecl, Program, Stat, TopLevel, VarNode,
    Visibility,
};

/// Translate a checked program back to plain Lua source. `source` must be
/// the exact byte buffer the program was parsed from; `comments` are the
/// comment spans the lexer collected from it.
pub fn translate<T>(source: &str, program: &Program<T>, comments: &[(usize, usize)]) -> String {
    let mut spans = Collector::default();
    spans.program(program);

    let mut out = source.as_bytes().to_vec();

    for span in &spans.strip {
        for index in span.start..span.end.min(out.len()) {
            if in_comment(comments, index) {
                continue;
            }
            match out[index] {
                b'\n' | b'\r' | b'\t' => {}
                _ => out[index] = b' ',
            }
        }
    }

    for &pos in &spans.exports_kw {
        out[pos..pos + 6].copy_from_slice(b"local ");
    }

    let exports = export_names(program);
    if !exports.is_empty() && !has_module_return(program) {
        if !out.ends_with(b"\n") {
            out.push(b'\n');
        }
        out.extend_from_slice(b"return {\n");
        for name in exports {
            out.extend_from_slice(format!("    {name} = {name},\n").as_bytes());
        }
        out.extend_from_slice(b"}\n");
    }

    // the input was valid UTF-8 and whiteout only writes ASCII
    String::from_utf8(out).expect("translation preserves UTF-8")
}

fn in_comment(comments: &[(usize, usize)], index: usize) -> bool {
    comments
        .iter()
        .any(|&(start, end)| index >= start && index < end)
}

fn export_names<T>(program: &Program<T>) -> Vec<&str> {
    let mut names = vec![];
    for toplevel in &program.toplevels {
        match toplevel {
            TopLevel::Func(func) if func.visibility == Visibility::Export => {
                names.push(func.name.as_str());
            }
            TopLevel::Var(var) if var.visibility == Visibility::Export => {
                names.push(var.name.as_str());
            }
            _ => {}
        }
    }
    names
}

fn has_module_return<T>(program: &Program<T>) -> bool {
    program
        .toplevels
        .iter()
        .any(|t| matches!(t, TopLevel::ModuleReturn { .. }))
}

/// Gathers the byte spans to white out and the `export` keyword offsets.
#[derive(Default)]
struct Collector {
    strip: Vec<ByteSpan>,
    exports_kw: Vec<usize>,
}

impl Collector {
    fn program<T>(&mut self, program: &Program<T>) {
        for toplevel in &program.toplevels {
            match toplevel {
                TopLevel::Func(func) => self.func(func),
                TopLevel::Var(var) => {
                    if let Some(pos) = var.export_kw {
                        self.exports_kw.push(pos);
                    }
                    if let Some(span) = var.annotation {
                        self.strip.push(span);
                    }
                    self.exp(&var.value);
                }
                TopLevel::Typealias(alias) => self.strip.push(alias.span),
                TopLevel::Record(record) => self.strip.push(record.span),
                TopLevel::Import(_) => {}
                TopLevel::ModuleReturn { value, .. } => self.exp(value),
            }
        }
    }

    fn func<T>(&mut self, func: &FuncDecl<T>) {
        if let Some(pos) = func.export_kw {
            self.exports_kw.push(pos);
        }
        self.params(&func.params);
        if let Some(span) = func.ret_annotation {
            self.strip.push(span);
        }
        self.block(&func.body);
    }

    fn params(&mut self, params: &[ParamDecl]) {
        for param in params {
            if let Some(span) = param.annotation {
                self.strip.push(span);
            }
        }
    }

    fn block<T>(&mut self, block: &Block<T>) {
        for stat in &block.stats {
            self.stat(stat);
        }
    }

    fn stat<T>(&mut self, stat: &Stat<T>) {
        match stat {
            Stat::Block { body, .. } => self.block(body),
            Stat::Assign { var, value, .. } => {
                self.var(var);
                self.exp(value);
            }
            Stat::Decl {
                annotation, value, ..
            } => {
                if let Some(span) = annotation {
                    self.strip.push(*span);
                }
                if let Some(value) = value {
                    self.exp(value);
                }
            }
            Stat::If {
                arms, else_block, ..
            } => {
                for (cond, body) in arms {
                    self.exp(cond);
                    self.block(body);
                }
                if let Some(body) = else_block {
                    self.block(body);
                }
            }
            Stat::While { cond, body, .. } => {
                self.exp(cond);
                self.block(body);
            }
            Stat::Repeat { body, cond, .. } => {
                self.block(body);
                self.exp(cond);
            }
            Stat::For {
                annotation,
                start,
                limit,
                step,
                body,
                ..
            } => {
                if let Some(span) = annotation {
                    self.strip.push(*span);
                }
                self.exp(start);
                self.exp(limit);
                if let Some(step) = step {
                    self.exp(step);
                }
                self.block(body);
            }
            Stat::Break { .. } => {}
            Stat::Return { values, .. } => {
                for value in values {
                    self.exp(value);
                }
            }
            Stat::Call { call, .. } => self.exp(call),
        }
    }

    fn exp<T>(&mut self, exp: &Exp<T>) {
        match exp {
            Exp::Nil { .. }
            | Exp::Bool { .. }
            | Exp::Integer { .. }
            | Exp::Float { .. }
            | Exp::Str { .. } => {}
            Exp::Lambda {
                params,
                ret_annotation,
                body,
                ..
            } => {
                self.params(params);
                if let Some(span) = ret_annotation {
                    self.strip.push(*span);
                }
                self.block(body);
            }
            Exp::Initlist { entries, .. } => {
                for InitEntry { value, .. } in entries {
                    self.exp(value);
                }
            }
            Exp::Cast { exp, span, .. } => {
                self.strip.push(*span);
                self.exp(exp);
            }
            Exp::ToFloat { exp, .. } => self.exp(exp),
            Exp::Unop { exp, .. } => self.exp(exp),
            Exp::Binop { lhs, rhs, .. } => {
                self.exp(lhs);
                self.exp(rhs);
            }
            Exp::Concat { parts, .. } => {
                for part in parts {
                    self.exp(part);
                }
            }
            Exp::CallFunc { func, args, .. } => {
                self.exp(func);
                for arg in args {
                    self.exp(arg);
                }
            }
            Exp::CallMethod { receiver, args, .. } => {
                self.exp(receiver);
                for arg in args {
                    self.exp(arg);
                }
            }
            Exp::Var { var, .. } => self.var(var),
            Exp::Paren { exp, .. } => self.exp(exp),
        }
    }

    fn var<T>(&mut self, var: &VarNode<T>) {
        match var {
            VarNode::Name { .. } => {}
            VarNode::Bracket { array, index, .. } => {
                self.exp(array);
                self.exp(index);
            }
            VarNode::Dot { object, .. } => self.exp(object),
        }
    }
}
