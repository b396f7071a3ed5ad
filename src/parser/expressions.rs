//! Expression parsing: precedence climbing over the operator table, with
//! `..` runs flattened into a single node and `as` casts bound tightest.

use crate::lexer::TokenKind;

use super::ast::{Binop, ByteSpan, Exp, InitEntry, Unop, VarNode};
use super::labels::SyntaxLabel;
use super::{PResult, ParseError, Parser};

// Binding powers, lowest to highest. `..` and `^` are right-associative
// (left power above right power); everything else is left-associative.
const CONCAT_L: u8 = 16;
const CONCAT_R: u8 = 15;
const UNARY_BP: u8 = 21;

fn binop_binding(kind: &TokenKind) -> Option<(Binop, u8, u8)> {
    let entry = match kind {
        TokenKind::Or => (Binop::Or, 1, 2),
        TokenKind::And => (Binop::And, 3, 4),
        TokenKind::EqEq => (Binop::Eq, 5, 6),
        TokenKind::NotEq => (Binop::Ne, 5, 6),
        TokenKind::Less => (Binop::Lt, 5, 6),
        TokenKind::Greater => (Binop::Gt, 5, 6),
        TokenKind::LessEq => (Binop::Le, 5, 6),
        TokenKind::GreaterEq => (Binop::Ge, 5, 6),
        TokenKind::Pipe => (Binop::BitOr, 7, 8),
        TokenKind::Tilde => (Binop::BitXor, 9, 10),
        TokenKind::Ampersand => (Binop::BitAnd, 11, 12),
        TokenKind::ShiftLeft => (Binop::ShiftL, 13, 14),
        TokenKind::ShiftRight => (Binop::ShiftR, 13, 14),
        TokenKind::Plus => (Binop::Add, 17, 18),
        TokenKind::Minus => (Binop::Sub, 17, 18),
        TokenKind::Star => (Binop::Mul, 19, 20),
        TokenKind::Slash => (Binop::Div, 19, 20),
        TokenKind::DoubleSlash => (Binop::IntDiv, 19, 20),
        TokenKind::Percent => (Binop::Mod, 19, 20),
        TokenKind::Caret => (Binop::Pow, 24, 23),
        _ => return None,
    };
    Some(entry)
}

impl Parser {
    pub(crate) fn parse_exp(&mut self) -> PResult<Exp<()>> {
        self.parse_exp_bp(0)
    }

    fn parse_exp_bp(&mut self, min_bp: u8) -> PResult<Exp<()>> {
        let mut lhs = match self.peek_kind() {
            TokenKind::Not | TokenKind::Hash | TokenKind::Minus | TokenKind::Tilde => {
                let token = self.next();
                let op = match token.kind {
                    TokenKind::Not => Unop::Not,
                    TokenKind::Hash => Unop::Len,
                    TokenKind::Minus => Unop::Neg,
                    TokenKind::Tilde => Unop::BitNot,
                    _ => unreachable!(),
                };
                let exp = self.parse_exp_bp(UNARY_BP)?;
                Exp::Unop {
                    loc: token.loc,
                    op,
                    exp: Box::new(exp),
                    info: (),
                }
            }
            _ => self.parse_suffixed_exp()?,
        };

        loop {
            match self.peek_kind() {
                // casts bind tighter than every operator
                TokenKind::As => {
                    let as_token = self.next();
                    let type_name = self.parse_type(SyntaxLabel::TypeCast)?;
                    let span = ByteSpan::new(as_token.loc.pos, self.prev_end());
                    let loc = lhs.loc().clone();
                    lhs = Exp::Cast {
                        loc,
                        exp: Box::new(lhs),
                        type_name,
                        span,
                        info: (),
                    };
                }
                TokenKind::DotDot => {
                    if CONCAT_L < min_bp {
                        break;
                    }
                    self.next();
                    let rhs = self.parse_exp_bp(CONCAT_R)?;
                    let loc = lhs.loc().clone();
                    let mut parts = vec![lhs];
                    match rhs {
                        Exp::Concat { parts: rest, .. } => parts.extend(rest),
                        other => parts.push(other),
                    }
                    lhs = Exp::Concat {
                        loc,
                        parts,
                        info: (),
                    };
                }
                kind => {
                    let Some((op, left_bp, right_bp)) = binop_binding(kind) else {
                        break;
                    };
                    if left_bp < min_bp {
                        break;
                    }
                    let token = self.next();
                    let rhs = self.parse_exp_bp(right_bp)?;
                    lhs = Exp::Binop {
                        loc: token.loc,
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                        info: (),
                    };
                }
            }
        }

        Ok(lhs)
    }

    /// A primary expression followed by any chain of `.name`, `[exp]`,
    /// `(args)` and `:name(args)` suffixes.
    pub(crate) fn parse_suffixed_exp(&mut self) -> PResult<Exp<()>> {
        let mut exp = self.parse_primary_exp()?;

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.next();
                    let (field, field_loc) = self.expect_name(SyntaxLabel::NameDot)?;
                    let loc = exp.loc().clone();
                    exp = Exp::Var {
                        loc: loc.clone(),
                        var: VarNode::Dot {
                            loc: field_loc,
                            object: Box::new(exp),
                            field,
                            info: (),
                        },
                        info: (),
                    };
                }
                TokenKind::LBracket => {
                    let bracket = self.next();
                    let index = self.parse_exp()?;
                    self.expect(&TokenKind::RBracket, SyntaxLabel::RBracketIndex)?;
                    let loc = exp.loc().clone();
                    exp = Exp::Var {
                        loc,
                        var: VarNode::Bracket {
                            loc: bracket.loc,
                            array: Box::new(exp),
                            index: Box::new(index),
                            info: (),
                        },
                        info: (),
                    };
                }
                TokenKind::LParen => {
                    let args = self.parse_call_args()?;
                    let loc = exp.loc().clone();
                    exp = Exp::CallFunc {
                        loc,
                        func: Box::new(exp),
                        args,
                        info: (),
                    };
                }
                TokenKind::Colon => {
                    self.next();
                    let (method, _) = self.expect_name(SyntaxLabel::NameMethod)?;
                    if !self.check(&TokenKind::LParen) {
                        return Err(ParseError::expected(SyntaxLabel::LParenCall, self.peek()));
                    }
                    let args = self.parse_call_args()?;
                    let loc = exp.loc().clone();
                    exp = Exp::CallMethod {
                        loc,
                        receiver: Box::new(exp),
                        method,
                        args,
                        info: (),
                    };
                }
                _ => break,
            }
        }

        Ok(exp)
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Exp<()>>> {
        self.next(); // consumes the '(' checked by the caller
        let mut args = vec![];
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_exp()?);
                if self.eat(&TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, SyntaxLabel::RParenCall)?;
        Ok(args)
    }

    fn parse_primary_exp(&mut self) -> PResult<Exp<()>> {
        match self.peek_kind().clone() {
            TokenKind::Nil => {
                let token = self.next();
                Ok(Exp::Nil {
                    loc: token.loc,
                    info: (),
                })
            }
            TokenKind::True | TokenKind::False => {
                let token = self.next();
                Ok(Exp::Bool {
                    value: matches!(token.kind, TokenKind::True),
                    loc: token.loc,
                    info: (),
                })
            }
            TokenKind::Integer(value) => {
                let token = self.next();
                Ok(Exp::Integer {
                    loc: token.loc,
                    value,
                    info: (),
                })
            }
            TokenKind::Float(value) => {
                let token = self.next();
                Ok(Exp::Float {
                    loc: token.loc,
                    value,
                    info: (),
                })
            }
            TokenKind::Str(value) => {
                let token = self.next();
                Ok(Exp::Str {
                    loc: token.loc,
                    value,
                    info: (),
                })
            }
            TokenKind::Function => self.parse_lambda(),
            TokenKind::LBrace => self.parse_initlist(),
            TokenKind::LParen => {
                let token = self.next();
                let exp = self.parse_exp()?;
                self.expect(&TokenKind::RParen, SyntaxLabel::RParenExpr)?;
                Ok(Exp::Paren {
                    loc: token.loc,
                    exp: Box::new(exp),
                    info: (),
                })
            }
            TokenKind::Name(name) => {
                let token = self.next();
                Ok(Exp::Var {
                    loc: token.loc.clone(),
                    var: VarNode::Name {
                        loc: token.loc,
                        name,
                        info: (),
                    },
                    info: (),
                })
            }
            _ => Err(ParseError::expected(SyntaxLabel::ExpExpr, self.peek())),
        }
    }

    fn parse_lambda(&mut self) -> PResult<Exp<()>> {
        let function = self.next();
        self.expect(&TokenKind::LParen, SyntaxLabel::LParenParams)?;
        let params = self.parse_params()?;
        let (ret_annotation, ret_types) = self.parse_ret_annotation()?;
        let body = self.parse_block()?;
        self.expect(&TokenKind::End, SyntaxLabel::EndFunc)?;
        Ok(Exp::Lambda {
            loc: function.loc,
            params,
            ret_annotation,
            ret_types,
            body,
            info: (),
        })
    }

    fn parse_initlist(&mut self) -> PResult<Exp<()>> {
        let brace = self.next();
        let mut entries = vec![];

        while !self.check(&TokenKind::RBrace) {
            let entry_loc = self.peek().loc.clone();
            let named = matches!(self.peek_kind(), TokenKind::Name(_))
                && matches!(self.peek_at(1), TokenKind::Assign);
            let entry = if named {
                let (name, _) = self.expect_name(SyntaxLabel::ExpExpr)?;
                self.expect(&TokenKind::Assign, SyntaxLabel::AssignInitField)?;
                let value = self.parse_exp()?;
                InitEntry {
                    loc: entry_loc,
                    name: Some(name),
                    value,
                }
            } else {
                InitEntry {
                    loc: entry_loc,
                    name: None,
                    value: self.parse_exp()?,
                }
            };
            entries.push(entry);

            if self.eat(&TokenKind::Comma).is_none()
                && self.eat(&TokenKind::Semicolon).is_none()
            {
                break;
            }
        }

        self.expect(&TokenKind::RBrace, SyntaxLabel::RBraceInitlist)?;
        Ok(Exp::Initlist {
            loc: brace.loc,
            entries,
            info: (),
        })
    }
}
