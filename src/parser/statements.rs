//! Statement, toplevel and type-expression parsing. Annotation byte spans
//! are captured here for the Lua translator: each one runs from the colon
//! (or keyword) through the last token of the type.

use crate::lexer::TokenKind;

use super::ast::{
    Block, ByteSpan, Exp, FuncDecl, ImportDecl, ParamDecl, Program, RecordDecl, Stat, TopLevel,
    TypeName, TypealiasDecl, VarDecl, Visibility,
};
use super::labels::SyntaxLabel;
use super::{PResult, ParseError, Parser};

impl Parser {
    pub(crate) fn parse_program(&mut self) -> PResult<Program<()>> {
        let mut toplevels = vec![];
        while !self.at_eof() {
            toplevels.push(self.parse_toplevel()?);
        }
        Ok(Program { toplevels })
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn parse_toplevel(&mut self) -> PResult<TopLevel<()>> {
        match self.peek_kind() {
            TokenKind::Function => self.parse_func(Visibility::Export, None),
            TokenKind::Local => {
                let local = self.next();
                if self.check(&TokenKind::Function) {
                    self.parse_func(Visibility::Local, None)
                } else {
                    self.parse_toplevel_var(local.loc, Visibility::Local, None)
                }
            }
            TokenKind::Export => {
                let export = self.next();
                let kw_pos = Some(export.loc.pos);
                if self.check(&TokenKind::Function) {
                    self.parse_func(Visibility::Export, kw_pos)
                } else {
                    self.parse_toplevel_var(export.loc, Visibility::Export, kw_pos)
                }
            }
            TokenKind::Typealias => self.parse_typealias(),
            TokenKind::Record => self.parse_record(),
            TokenKind::Return => {
                let ret = self.next();
                let value = if self.at_eof() || self.check(&TokenKind::Semicolon) {
                    Exp::Nil {
                        loc: ret.loc.clone(),
                        info: (),
                    }
                } else {
                    self.parse_exp()?
                };
                self.eat(&TokenKind::Semicolon);
                Ok(TopLevel::ModuleReturn {
                    loc: ret.loc,
                    value,
                })
            }
            _ => Err(ParseError::expected(
                SyntaxLabel::ExpectedToplevel,
                self.peek(),
            )),
        }
    }

    fn parse_func(
        &mut self,
        visibility: Visibility,
        export_kw: Option<usize>,
    ) -> PResult<TopLevel<()>> {
        let function = self.next();
        let (name, _) = self.expect_name(SyntaxLabel::NameFunc)?;
        self.expect(&TokenKind::LParen, SyntaxLabel::LParenParams)?;
        let params = self.parse_params()?;
        let (ret_annotation, ret_types) = self.parse_ret_annotation()?;
        let body = self.parse_block()?;
        let end = self.expect(&TokenKind::End, SyntaxLabel::EndFunc)?;

        Ok(TopLevel::Func(FuncDecl {
            loc: function.loc,
            name,
            visibility,
            export_kw,
            params,
            ret_annotation,
            ret_types,
            body,
            end_loc: end.loc,
            info: (),
        }))
    }

    /// Parameter list after the opening paren, consuming the closing paren.
    pub(crate) fn parse_params(&mut self) -> PResult<Vec<ParamDecl>> {
        let mut params = vec![];
        if !self.check(&TokenKind::RParen) {
            loop {
                let (name, loc) = self.expect_name(SyntaxLabel::RParenParams)?;
                let (annotation, type_name) = self.parse_opt_annotation()?;
                params.push(ParamDecl {
                    loc,
                    name,
                    type_name,
                    annotation,
                });
                if self.eat(&TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, SyntaxLabel::RParenParams)?;
        Ok(params)
    }

    /// Optional `: rettype` after the parameter list. A parenthesized
    /// tuple declares multiple return types; the parens belong to the
    /// stripped annotation span.
    pub(crate) fn parse_ret_annotation(
        &mut self,
    ) -> PResult<(Option<ByteSpan>, Vec<TypeName>)> {
        let Some(colon) = self.eat(&TokenKind::Colon) else {
            return Ok((None, vec![]));
        };

        let mut ret_types = vec![];
        if self.eat(&TokenKind::LParen).is_some() {
            if !self.check(&TokenKind::RParen) {
                loop {
                    ret_types.push(self.parse_type(SyntaxLabel::TypeExp)?);
                    if self.eat(&TokenKind::Comma).is_none() {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RParen, SyntaxLabel::RParenRetTypes)?;
        } else {
            ret_types.push(self.parse_type(SyntaxLabel::TypeExp)?);
        }

        let span = ByteSpan::new(colon.loc.pos, self.prev_end());
        Ok((Some(span), ret_types))
    }

    fn parse_toplevel_var(
        &mut self,
        kw_loc: crate::lexer::Loc,
        visibility: Visibility,
        export_kw: Option<usize>,
    ) -> PResult<TopLevel<()>> {
        let (name, name_loc) = self.expect_name(SyntaxLabel::NameDecl)?;
        let (annotation, type_name) = self.parse_opt_annotation()?;
        self.expect(&TokenKind::Assign, SyntaxLabel::AssignToplevelVar)?;

        if annotation.is_none() && self.check(&TokenKind::Import) {
            self.next();
            self.expect(&TokenKind::LParen, SyntaxLabel::LParenImport)?;
            let module = match self.peek_kind() {
                TokenKind::Str(_) => {
                    let token = self.next();
                    let TokenKind::Str(module) = token.kind else {
                        unreachable!()
                    };
                    module
                }
                _ => {
                    return Err(ParseError::expected(
                        SyntaxLabel::StringImport,
                        self.peek(),
                    ));
                }
            };
            self.expect(&TokenKind::RParen, SyntaxLabel::RParenImport)?;
            return Ok(TopLevel::Import(ImportDecl {
                loc: name_loc,
                name,
                module,
            }));
        }

        let value = self.parse_exp()?;
        let _ = name_loc;
        Ok(TopLevel::Var(VarDecl {
            loc: kw_loc,
            name,
            visibility,
            export_kw,
            annotation,
            type_name,
            value,
            info: (),
        }))
    }

    fn parse_typealias(&mut self) -> PResult<TopLevel<()>> {
        let keyword = self.next();
        let (name, _) = self.expect_name(SyntaxLabel::NameTypealias)?;
        self.expect(&TokenKind::Assign, SyntaxLabel::AssignTypealias)?;
        let type_name = self.parse_type(SyntaxLabel::TypeExp)?;
        let span = ByteSpan::new(keyword.loc.pos, self.prev_end());
        Ok(TopLevel::Typealias(TypealiasDecl {
            loc: keyword.loc,
            name,
            type_name,
            span,
        }))
    }

    fn parse_record(&mut self) -> PResult<TopLevel<()>> {
        let keyword = self.next();
        let (name, _) = self.expect_name(SyntaxLabel::NameRecord)?;

        let mut fields = vec![];
        while !self.check(&TokenKind::End) {
            let (field, _) = self.expect_name(SyntaxLabel::EndRecord)?;
            self.expect(&TokenKind::Colon, SyntaxLabel::ColonRecordField)?;
            let type_name = self.parse_type(SyntaxLabel::TypeExp)?;
            fields.push((field, type_name));
            // separators are optional, as in Lua table constructors
            while self.eat(&TokenKind::Comma).is_some()
                || self.eat(&TokenKind::Semicolon).is_some()
            {}
        }
        self.expect(&TokenKind::End, SyntaxLabel::EndRecord)?;
        let span = ByteSpan::new(keyword.loc.pos, self.prev_end());

        Ok(TopLevel::Record(RecordDecl {
            loc: keyword.loc,
            name,
            fields,
            span,
        }))
    }

    /// Optional `: type`, returning the annotation span for the translator.
    fn parse_opt_annotation(&mut self) -> PResult<(Option<ByteSpan>, Option<TypeName>)> {
        let Some(colon) = self.eat(&TokenKind::Colon) else {
            return Ok((None, None));
        };
        let type_name = self.parse_type(SyntaxLabel::TypeExp)?;
        let span = ByteSpan::new(colon.loc.pos, self.prev_end());
        Ok((Some(span), Some(type_name)))
    }

    pub(crate) fn parse_type(&mut self, label: SyntaxLabel) -> PResult<TypeName> {
        match self.peek_kind().clone() {
            TokenKind::Nil => {
                let token = self.next();
                Ok(TypeName::Nil(token.loc))
            }
            TokenKind::Name(name) => {
                let token = self.next();
                Ok(match name.as_str() {
                    "boolean" => TypeName::Boolean(token.loc),
                    "integer" => TypeName::Integer(token.loc),
                    "float" => TypeName::Float(token.loc),
                    "string" => TypeName::String(token.loc),
                    "any" => TypeName::Any(token.loc),
                    _ => TypeName::Name(token.loc, name),
                })
            }
            TokenKind::LBrace => {
                let brace = self.next();
                let is_table = matches!(self.peek_kind(), TokenKind::Name(_))
                    && matches!(self.peek_at(1), TokenKind::Colon);
                if is_table {
                    let mut fields = vec![];
                    loop {
                        let (field, _) = self.expect_name(SyntaxLabel::RBraceType)?;
                        self.expect(&TokenKind::Colon, SyntaxLabel::ColonTableType)?;
                        fields.push((field, self.parse_type(SyntaxLabel::TypeExp)?));
                        if self.eat(&TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RBrace, SyntaxLabel::RBraceType)?;
                    Ok(TypeName::Table(brace.loc, fields))
                } else {
                    let elem = self.parse_type(SyntaxLabel::TypeExp)?;
                    self.expect(&TokenKind::RBrace, SyntaxLabel::RBraceType)?;
                    Ok(TypeName::Array(brace.loc, Box::new(elem)))
                }
            }
            TokenKind::LParen => {
                let paren = self.next();
                let mut params = vec![];
                if !self.check(&TokenKind::RParen) {
                    loop {
                        params.push(self.parse_type(SyntaxLabel::TypeExp)?);
                        if self.eat(&TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                self.expect(&TokenKind::RParen, SyntaxLabel::RParenFuncType)?;
                self.expect(&TokenKind::Arrow, SyntaxLabel::ArrowFuncType)?;

                let mut rets = vec![];
                if self.eat(&TokenKind::LParen).is_some() {
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            rets.push(self.parse_type(SyntaxLabel::TypeExp)?);
                            if self.eat(&TokenKind::Comma).is_none() {
                                break;
                            }
                        }
                    }
                    self.expect(&TokenKind::RParen, SyntaxLabel::RParenRetTypes)?;
                } else {
                    rets.push(self.parse_type(SyntaxLabel::TypeExp)?);
                }
                Ok(TypeName::Function(paren.loc, params, rets))
            }
            _ => Err(ParseError::expected(label, self.peek())),
        }
    }

    pub(crate) fn parse_block(&mut self) -> PResult<Block<()>> {
        let loc = self.peek().loc.clone();
        let mut stats = vec![];

        loop {
            match self.peek_kind() {
                TokenKind::End
                | TokenKind::Else
                | TokenKind::Elseif
                | TokenKind::Until
                | TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.next();
                }
                TokenKind::Return => {
                    let ret = self.next();
                    let mut values = vec![];
                    if !self.block_ends() && !self.check(&TokenKind::Semicolon) {
                        loop {
                            values.push(self.parse_exp()?);
                            if self.eat(&TokenKind::Comma).is_none() {
                                break;
                            }
                        }
                    }
                    self.eat(&TokenKind::Semicolon);
                    stats.push(Stat::Return {
                        loc: ret.loc,
                        values,
                    });
                    // return closes the block; the enclosing construct's
                    // terminator check reports anything that follows
                    break;
                }
                _ => stats.push(self.parse_statement()?),
            }
        }

        Ok(Block { loc, stats })
    }

    fn block_ends(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::End
                | TokenKind::Else
                | TokenKind::Elseif
                | TokenKind::Until
                | TokenKind::Eof
        )
    }

    fn parse_statement(&mut self) -> PResult<Stat<()>> {
        match self.peek_kind() {
            TokenKind::Do => {
                let token = self.next();
                let body = self.parse_block()?;
                self.expect(&TokenKind::End, SyntaxLabel::EndDo)?;
                Ok(Stat::Block {
                    loc: token.loc,
                    body,
                })
            }
            TokenKind::Local => {
                let token = self.next();
                let (name, _) = self.expect_name(SyntaxLabel::NameDecl)?;
                let (annotation, type_name) = self.parse_opt_annotation()?;
                let value = match self.eat(&TokenKind::Assign) {
                    Some(_) => Some(self.parse_exp()?),
                    None => None,
                };
                Ok(Stat::Decl {
                    loc: token.loc,
                    name,
                    annotation,
                    type_name,
                    value,
                    info: (),
                })
            }
            TokenKind::If => {
                let token = self.next();
                let mut arms = vec![];
                let cond = self.parse_exp()?;
                self.expect(&TokenKind::Then, SyntaxLabel::ThenIf)?;
                arms.push((cond, self.parse_block()?));

                let mut else_block = None;
                loop {
                    if self.eat(&TokenKind::Elseif).is_some() {
                        let cond = self.parse_exp()?;
                        self.expect(&TokenKind::Then, SyntaxLabel::ThenIf)?;
                        arms.push((cond, self.parse_block()?));
                    } else if self.eat(&TokenKind::Else).is_some() {
                        else_block = Some(self.parse_block()?);
                        break;
                    } else {
                        break;
                    }
                }
                self.expect(&TokenKind::End, SyntaxLabel::EndIf)?;
                Ok(Stat::If {
                    loc: token.loc,
                    arms,
                    else_block,
                })
            }
            TokenKind::While => {
                let token = self.next();
                let cond = self.parse_exp()?;
                self.expect(&TokenKind::Do, SyntaxLabel::DoWhile)?;
                let body = self.parse_block()?;
                self.expect(&TokenKind::End, SyntaxLabel::EndWhile)?;
                Ok(Stat::While {
                    loc: token.loc,
                    cond,
                    body,
                })
            }
            TokenKind::Repeat => {
                let token = self.next();
                let body = self.parse_block()?;
                self.expect(&TokenKind::Until, SyntaxLabel::UntilRepeat)?;
                let cond = self.parse_exp()?;
                Ok(Stat::Repeat {
                    loc: token.loc,
                    body,
                    cond,
                })
            }
            TokenKind::For => {
                let token = self.next();
                let (var, _) = self.expect_name(SyntaxLabel::NameFor)?;
                let (annotation, type_name) = self.parse_opt_annotation()?;
                self.expect(&TokenKind::Assign, SyntaxLabel::AssignFor)?;
                let start = self.parse_exp()?;
                self.expect(&TokenKind::Comma, SyntaxLabel::CommaFor)?;
                let limit = self.parse_exp()?;
                let step = match self.eat(&TokenKind::Comma) {
                    Some(_) => Some(self.parse_exp()?),
                    None => None,
                };
                self.expect(&TokenKind::Do, SyntaxLabel::DoFor)?;
                let body = self.parse_block()?;
                self.expect(&TokenKind::End, SyntaxLabel::EndFor)?;
                Ok(Stat::For {
                    loc: token.loc,
                    var,
                    annotation,
                    type_name,
                    start,
                    limit,
                    step,
                    body,
                    info: (),
                })
            }
            TokenKind::Break => {
                let token = self.next();
                Ok(Stat::Break { loc: token.loc })
            }
            _ => {
                // assignment or call statement
                let exp = self.parse_suffixed_exp()?;
                if self.eat(&TokenKind::Assign).is_some() {
                    let value = self.parse_exp()?;
                    match exp {
                        Exp::Var { loc, var, .. } => Ok(Stat::Assign { loc, var, value }),
                        other => Err(ParseError::at(
                            SyntaxLabel::AssignNotToVar,
                            other.loc().clone(),
                        )),
                    }
                } else {
                    match exp {
                        call @ (Exp::CallFunc { .. } | Exp::CallMethod { .. }) => {
                            Ok(Stat::Call {
                                loc: call.loc().clone(),
                                call,
                            })
                        }
                        other => Err(ParseError::at(
                            SyntaxLabel::CallStat,
                            other.loc().clone(),
                        )),
                    }
                }
            }
        }
    }
}
