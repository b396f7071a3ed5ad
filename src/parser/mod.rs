//! Recursive-descent parser for Pallene.
//!
//! The grammar commits after each leading keyword; every commit point is a
//! [`SyntaxLabel`] paired with a static message, so a missing terminal
//! reports what was expected and where instead of a bare parse failure.
//! The parser is a context object owning the token cursor and the file
//! name; callers may run any number of parsers concurrently.

pub mod ast;
mod expressions;
mod labels;
mod state;
mod statements;

pub use labels::SyntaxLabel;

use std::{error::Error, fmt::Display};

use crate::lexer::{LexError, Lexer, Loc, Token, TokenKind};

use self::ast::{Block, Exp, Program, Stat, TopLevel, VarNode};
use self::state::ParseState;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParseError {
    pub label: SyntaxLabel,
    pub loc: Loc,
    pub message: String,
}

impl ParseError {
    fn expected(label: SyntaxLabel, found: &Token) -> Self {
        ParseError {
            label,
            loc: found.loc.clone(),
            message: format!("{} (found {})", label.message(), found.kind.describe()),
        }
    }

    fn at(label: SyntaxLabel, loc: Loc) -> Self {
        ParseError {
            label,
            loc,
            message: label.message().to_string(),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            label: SyntaxLabel::MalformedToken,
            loc: err.loc,
            message: err.message,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: syntax: {}", self.loc, self.message)
    }
}

impl Error for ParseError {}

pub type PResult<T> = Result<T, ParseError>;

/// Parse result: the AST plus the comment byte spans the translator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProgram {
    pub program: Program<()>,
    pub comments: Vec<(usize, usize)>,
}

/// Parser context: owns the token cursor for one compilation unit. The
/// file name rides on every token's location, so there is no shared
/// file-name state anywhere.
pub struct Parser {
    state: ParseState,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            state: ParseState::new(tokens),
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        self.state.peek()
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.state.peek().kind
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &TokenKind {
        &self.state.peek_at(offset).kind
    }

    pub(crate) fn next(&mut self) -> Token {
        self.state.next()
    }

    pub(crate) fn prev_end(&self) -> usize {
        self.state.prev_end()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.next())
        } else {
            None
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, label: SyntaxLabel) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.next())
        } else {
            Err(ParseError::expected(label, self.peek()))
        }
    }

    pub(crate) fn expect_name(&mut self, label: SyntaxLabel) -> PResult<(String, Loc)> {
        match self.peek_kind() {
            TokenKind::Name(_) => {
                let token = self.next();
                let TokenKind::Name(name) = token.kind else {
                    unreachable!()
                };
                Ok((name, token.loc))
            }
            _ => Err(ParseError::expected(label, self.peek())),
        }
    }
}

/// Parse a whole compilation unit. On success the returned AST's nodes
/// carry locations into `source`; on failure all collected syntax errors
/// are returned in source order.
pub fn parse(file_name: &str, source: &str) -> Result<ParsedProgram, Vec<ParseError>> {
    let output = Lexer::new(file_name, source)
        .lex()
        .map_err(|e| vec![ParseError::from(e)])?;

    let mut parser = Parser::new(output.tokens);
    let program = parser.parse_program().map_err(|e| vec![e])?;

    let errors = structural_checks(&program);
    if errors.is_empty() {
        Ok(ParsedProgram {
            program,
            comments: output.comments,
        })
    } else {
        Err(errors)
    }
}

/// Post-parse structural constraints: `break` must sit lexically inside a
/// `while`, `repeat` or `for` body. Lambda bodies open a fresh context.
fn structural_checks(program: &Program<()>) -> Vec<ParseError> {
    let mut errors = vec![];
    for toplevel in &program.toplevels {
        match toplevel {
            TopLevel::Func(func) => check_block(&func.body, false, &mut errors),
            TopLevel::Var(var) => check_exp(&var.value, &mut errors),
            TopLevel::ModuleReturn { value, .. } => check_exp(value, &mut errors),
            _ => {}
        }
    }
    errors.sort_by_key(|e| e.loc.pos);
    errors
}

fn check_block(block: &Block<()>, in_loop: bool, errors: &mut Vec<ParseError>) {
    for stat in &block.stats {
        check_stat(stat, in_loop, errors);
    }
}

fn check_stat(stat: &Stat<()>, in_loop: bool, errors: &mut Vec<ParseError>) {
    match stat {
        Stat::Break { loc } => {
            if !in_loop {
                errors.push(ParseError::at(SyntaxLabel::BreakOutsideLoop, loc.clone()));
            }
        }
        Stat::Block { body, .. } => check_block(body, in_loop, errors),
        Stat::If {
            arms, else_block, ..
        } => {
            for (cond, body) in arms {
                check_exp(cond, errors);
                check_block(body, in_loop, errors);
            }
            if let Some(body) = else_block {
                check_block(body, in_loop, errors);
            }
        }
        Stat::While { cond, body, .. } => {
            check_exp(cond, errors);
            check_block(body, true, errors);
        }
        Stat::Repeat { body, cond, .. } => {
            check_block(body, true, errors);
            check_exp(cond, errors);
        }
        Stat::For {
            start,
            limit,
            step,
            body,
            ..
        } => {
            check_exp(start, errors);
            check_exp(limit, errors);
            if let Some(step) = step {
                check_exp(step, errors);
            }
            check_block(body, true, errors);
        }
        Stat::Assign { var, value, .. } => {
            check_var(var, errors);
            check_exp(value, errors);
        }
        Stat::Decl { value, .. } => {
            if let Some(value) = value {
                check_exp(value, errors);
            }
        }
        Stat::Return { values, .. } => {
            for value in values {
                check_exp(value, errors);
            }
        }
        Stat::Call { call, .. } => check_exp(call, errors),
    }
}

fn check_exp(exp: &Exp<()>, errors: &mut Vec<ParseError>) {
    match exp {
        Exp::Lambda { body, .. } => check_block(body, false, errors),
        Exp::Initlist { entries, .. } => {
            for entry in entries {
                check_exp(&entry.value, errors);
            }
        }
        Exp::Cast { exp, .. }
        | Exp::ToFloat { exp, .. }
        | Exp::Unop { exp, .. }
        | Exp::Paren { exp, .. } => check_exp(exp, errors),
        Exp::Binop { lhs, rhs, .. } => {
            check_exp(lhs, errors);
            check_exp(rhs, errors);
        }
        Exp::Concat { parts, .. } => {
            for part in parts {
                check_exp(part, errors);
            }
        }
        Exp::CallFunc { func, args, .. } => {
            check_exp(func, errors);
            for arg in args {
                check_exp(arg, errors);
            }
        }
        Exp::CallMethod { receiver, args, .. } => {
            check_exp(receiver, errors);
            for arg in args {
                check_exp(arg, errors);
            }
        }
        Exp::Var { var, .. } => check_var(var, errors),
        Exp::Nil { .. }
        | Exp::Bool { .. }
        | Exp::Integer { .. }
        | Exp::Float { .. }
        | Exp::Str { .. } => {}
    }
}

fn check_var(var: &VarNode<()>, errors: &mut Vec<ParseError>) {
    match var {
        VarNode::Name { .. } => {}
        VarNode::Bracket { array, index, .. } => {
            check_exp(array, errors);
            check_exp(index, errors);
        }
        VarNode::Dot { object, .. } => check_exp(object, errors),
    }
}
