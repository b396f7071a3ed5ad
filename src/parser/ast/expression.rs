use crate::lexer::Loc;

use super::{Block, ByteSpan, ParamDecl, TypeName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Unop {
    Not,
    Len,
    Neg,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Binop {
    Add,
    Sub,
    Mul,
    Mod,
    Div,
    IntDiv,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    ShiftL,
    ShiftR,
}

impl Binop {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Binop::Eq | Binop::Ne | Binop::Lt | Binop::Gt | Binop::Le | Binop::Ge
        )
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            Binop::BitAnd | Binop::BitOr | Binop::BitXor | Binop::ShiftL | Binop::ShiftR
        )
    }

    pub fn spelling(&self) -> &'static str {
        match self {
            Binop::Add => "+",
            Binop::Sub => "-",
            Binop::Mul => "*",
            Binop::Mod => "%",
            Binop::Div => "/",
            Binop::IntDiv => "//",
            Binop::Pow => "^",
            Binop::Eq => "==",
            Binop::Ne => "~=",
            Binop::Lt => "<",
            Binop::Gt => ">",
            Binop::Le => "<=",
            Binop::Ge => ">=",
            Binop::And => "and",
            Binop::Or => "or",
            Binop::BitAnd => "&",
            Binop::BitOr => "|",
            Binop::BitXor => "~",
            Binop::ShiftL => "<<",
            Binop::ShiftR => ">>",
        }
    }
}

impl Unop {
    pub fn spelling(&self) -> &'static str {
        match self {
            Unop::Not => "not",
            Unop::Len => "#",
            Unop::Neg => "-",
            Unop::BitNot => "~",
        }
    }
}

/// One entry of an initializer list: positional (`e`) or named (`name = e`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InitEntry<T> {
    pub loc: Loc,
    pub name: Option<String>,
    pub value: Exp<T>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Exp<T> {
    Nil {
        loc: Loc,
        info: T,
    },
    Bool {
        loc: Loc,
        value: bool,
        info: T,
    },
    Integer {
        loc: Loc,
        value: i64,
        info: T,
    },
    Float {
        loc: Loc,
        value: f64,
        info: T,
    },
    Str {
        loc: Loc,
        value: String,
        info: T,
    },
    Lambda {
        loc: Loc,
        params: Vec<ParamDecl>,
        ret_annotation: Option<ByteSpan>,
        ret_types: Vec<TypeName>,
        body: Block<T>,
        info: T,
    },
    Initlist {
        loc: Loc,
        entries: Vec<InitEntry<T>>,
        info: T,
    },
    /// Explicit `e as t` cast; `span` covers the `as` keyword through the
    /// end of the type so the translator can white it out.
    Cast {
        loc: Loc,
        exp: Box<Exp<T>>,
        type_name: TypeName,
        span: ByteSpan,
        info: T,
    },
    /// Integer-to-float promotion inserted by the checker. Has no surface
    /// syntax, hence no byte span.
    ToFloat {
        loc: Loc,
        exp: Box<Exp<T>>,
        info: T,
    },
    Unop {
        loc: Loc,
        op: Unop,
        exp: Box<Exp<T>>,
        info: T,
    },
    Binop {
        loc: Loc,
        op: Binop,
        lhs: Box<Exp<T>>,
        rhs: Box<Exp<T>>,
        info: T,
    },
    /// `a .. b .. c` with the operand run flattened into one node.
    Concat {
        loc: Loc,
        parts: Vec<Exp<T>>,
        info: T,
    },
    CallFunc {
        loc: Loc,
        func: Box<Exp<T>>,
        args: Vec<Exp<T>>,
        info: T,
    },
    CallMethod {
        loc: Loc,
        receiver: Box<Exp<T>>,
        method: String,
        args: Vec<Exp<T>>,
        info: T,
    },
    Var {
        loc: Loc,
        var: VarNode<T>,
        info: T,
    },
    Paren {
        loc: Loc,
        exp: Box<Exp<T>>,
        info: T,
    },
}

impl<T> Exp<T> {
    pub fn loc(&self) -> &Loc {
        match self {
            Exp::Nil { loc, .. }
            | Exp::Bool { loc, .. }
            | Exp::Integer { loc, .. }
            | Exp::Float { loc, .. }
            | Exp::Str { loc, .. }
            | Exp::Lambda { loc, .. }
            | Exp::Initlist { loc, .. }
            | Exp::Cast { loc, .. }
            | Exp::ToFloat { loc, .. }
            | Exp::Unop { loc, .. }
            | Exp::Binop { loc, .. }
            | Exp::Concat { loc, .. }
            | Exp::CallFunc { loc, .. }
            | Exp::CallMethod { loc, .. }
            | Exp::Var { loc, .. }
            | Exp::Paren { loc, .. } => loc,
        }
    }

    pub fn info(&self) -> &T {
        match self {
            Exp::Nil { info, .. }
            | Exp::Bool { info, .. }
            | Exp::Integer { info, .. }
            | Exp::Float { info, .. }
            | Exp::Str { info, .. }
            | Exp::Lambda { info, .. }
            | Exp::Initlist { info, .. }
            | Exp::Cast { info, .. }
            | Exp::ToFloat { info, .. }
            | Exp::Unop { info, .. }
            | Exp::Binop { info, .. }
            | Exp::Concat { info, .. }
            | Exp::CallFunc { info, .. }
            | Exp::CallMethod { info, .. }
            | Exp::Var { info, .. }
            | Exp::Paren { info, .. } => info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum VarNode<T> {
    Name {
        loc: Loc,
        name: String,
        info: T,
    },
    Bracket {
        loc: Loc,
        array: Box<Exp<T>>,
        index: Box<Exp<T>>,
        info: T,
    },
    Dot {
        loc: Loc,
        object: Box<Exp<T>>,
        field: String,
        info: T,
    },
}

impl<T> VarNode<T> {
    pub fn loc(&self) -> &Loc {
        match self {
            VarNode::Name { loc, .. }
            | VarNode::Bracket { loc, .. }
            | VarNode::Dot { loc, .. } => loc,
        }
    }

    pub fn info(&self) -> &T {
        match self {
            VarNode::Name { info, .. }
            | VarNode::Bracket { info, .. }
            | VarNode::Dot { info, .. } => info,
        }
    }
}
