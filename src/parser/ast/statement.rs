use crate::lexer::Loc;

use super::{ByteSpan, Exp, TypeName, VarNode};

/// Whether a top-level binding is visible to importers of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Visibility {
    Local,
    Export,
}

/// A function or lambda parameter. The annotation span covers the colon
/// through the end of the type; a parameter without an annotation (as in
/// plain Lua input) has type `any`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParamDecl {
    pub loc: Loc,
    pub name: String,
    pub type_name: Option<TypeName>,
    pub annotation: Option<ByteSpan>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block<T> {
    pub loc: Loc,
    pub stats: Vec<Stat<T>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Stat<T> {
    /// `do ... end`
    Block { loc: Loc, body: Block<T> },
    Assign {
        loc: Loc,
        var: VarNode<T>,
        value: Exp<T>,
    },
    /// `local name [: t] [= e]`
    Decl {
        loc: Loc,
        name: String,
        annotation: Option<ByteSpan>,
        type_name: Option<TypeName>,
        value: Option<Exp<T>>,
        info: T,
    },
    If {
        loc: Loc,
        arms: Vec<(Exp<T>, Block<T>)>,
        else_block: Option<Block<T>>,
    },
    While {
        loc: Loc,
        cond: Exp<T>,
        body: Block<T>,
    },
    Repeat {
        loc: Loc,
        body: Block<T>,
        cond: Exp<T>,
    },
    /// Numeric `for`; the iteration variable's static type picks the
    /// integer or float loop command during lowering.
    For {
        loc: Loc,
        var: String,
        annotation: Option<ByteSpan>,
        type_name: Option<TypeName>,
        start: Exp<T>,
        limit: Exp<T>,
        step: Option<Exp<T>>,
        body: Block<T>,
        info: T,
    },
    Break { loc: Loc },
    Return { loc: Loc, values: Vec<Exp<T>> },
    /// A call expression in statement position.
    Call { loc: Loc, call: Exp<T> },
}

impl<T> Stat<T> {
    pub fn loc(&self) -> &Loc {
        match self {
            Stat::Block { loc, .. }
            | Stat::Assign { loc, .. }
            | Stat::Decl { loc, .. }
            | Stat::If { loc, .. }
            | Stat::While { loc, .. }
            | Stat::Repeat { loc, .. }
            | Stat::For { loc, .. }
            | Stat::Break { loc }
            | Stat::Return { loc, .. }
            | Stat::Call { loc, .. } => loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FuncDecl<T> {
    pub loc: Loc,
    pub name: String,
    pub visibility: Visibility,
    /// Byte offset of the `export` keyword, when spelled out.
    pub export_kw: Option<usize>,
    pub params: Vec<ParamDecl>,
    /// Span of `: rettype` (parens of a tuple return included).
    pub ret_annotation: Option<ByteSpan>,
    pub ret_types: Vec<TypeName>,
    pub body: Block<T>,
    /// Location of the closing `end`.
    pub end_loc: Loc,
    pub info: T,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VarDecl<T> {
    pub loc: Loc,
    pub name: String,
    pub visibility: Visibility,
    pub export_kw: Option<usize>,
    pub annotation: Option<ByteSpan>,
    pub type_name: Option<TypeName>,
    pub value: Exp<T>,
    pub info: T,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypealiasDecl {
    pub loc: Loc,
    pub name: String,
    pub type_name: TypeName,
    /// Whole declaration, `typealias` keyword through the type expression.
    pub span: ByteSpan,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecordDecl {
    pub loc: Loc,
    pub name: String,
    pub fields: Vec<(String, TypeName)>,
    /// Whole declaration, `record` keyword through the closing `end`.
    pub span: ByteSpan,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImportDecl {
    pub loc: Loc,
    pub name: String,
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TopLevel<T> {
    Func(FuncDecl<T>),
    Var(VarDecl<T>),
    Typealias(TypealiasDecl),
    Record(RecordDecl),
    Import(ImportDecl),
    /// A final `return <exp>` at module level. Plain Lua modules (and
    /// the translator's own output) end in one; a module that already
    /// returns its table gets no synthesized export table.
    ModuleReturn { loc: Loc, value: Exp<T> },
}

impl<T> TopLevel<T> {
    pub fn loc(&self) -> &Loc {
        match self {
            TopLevel::Func(f) => &f.loc,
            TopLevel::Var(v) => &v.loc,
            TopLevel::Typealias(t) => &t.loc,
            TopLevel::Record(r) => &r.loc,
            TopLevel::Import(i) => &i.loc,
            TopLevel::ModuleReturn { loc, .. } => loc,
        }
    }
}
