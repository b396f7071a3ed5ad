use std::{error::Error, fmt::Display};

use crate::lexer::Loc;
use crate::parser::ast::{Binop, Unop};

use super::types::Type;

/// Whether a checker diagnostic is a typing error or a naming error.
/// Drives the `<kind>` field of rendered diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckErrorKind {
    Type,
    Name,
}

impl Display for CheckErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckErrorKind::Type => write!(f, "type"),
            CheckErrorKind::Name => write!(f, "name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeCheckErrorDetail {
    UndeclaredType { name: String },
    UndeclaredVariable { name: String },
    DuplicateDeclaration { name: String },
    CircularTypealias { name: String },
    TypeMismatch { expected: Type, found: Type },
    WrongArity { expected: usize, found: usize },
    NotCallable { found: Type },
    NotIndexable { found: Type },
    IndexNotInteger { found: Type },
    NoSuchField { typ: Type, field: String },
    MissingField { typ: Type, field: String },
    InvalidCast { from: Type, to: Type },
    WrongUnopOperand { op: Unop, found: Type },
    WrongBinopOperand { op: Binop, found: Type },
    ReturnValueInVoidFunction,
    ReturnArity { expected: usize, found: usize },
    InitlistNeedsContext,
    InitlistPositionalField,
    InitlistNamedElement,
    NotMutable { name: String },
    CapturedVariable { name: String },
    DeclNeedsTypeOrValue { name: String },
}

impl Display for TypeCheckErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TypeCheckErrorDetail::*;
        match self {
            UndeclaredType { name } => write!(f, "type '{name}' is not declared"),
            UndeclaredVariable { name } => write!(f, "variable '{name}' is not declared"),
            DuplicateDeclaration { name } => {
                write!(f, "duplicate declaration of '{name}'")
            }
            CircularTypealias { name } => write!(f, "circular typealias '{name}'"),
            TypeMismatch { expected, found } => {
                write!(f, "expected {expected} but found {found}")
            }
            WrongArity { expected, found } => write!(
                f,
                "function expects {expected} argument(s) but received {found}"
            ),
            NotCallable { found } => write!(f, "expected a function but found {found}"),
            NotIndexable { found } => write!(f, "expected an array but found {found}"),
            IndexNotInteger { found } => {
                write!(f, "array index must be an integer, found {found}")
            }
            NoSuchField { typ, field } => {
                write!(f, "type {typ} has no field '{field}'")
            }
            MissingField { typ, field } => {
                write!(f, "initializer for {typ} is missing field '{field}'")
            }
            InvalidCast { from, to } => write!(f, "cannot cast from {from} to {to}"),
            WrongUnopOperand { op, found } => write!(
                f,
                "operator '{}' cannot be applied to {found}",
                op.spelling()
            ),
            WrongBinopOperand { op, found } => write!(
                f,
                "operator '{}' cannot be applied to {found}",
                op.spelling()
            ),
            ReturnValueInVoidFunction => {
                write!(f, "return statement with a value in a function with no return type")
            }
            ReturnArity { expected, found } => write!(
                f,
                "return statement returns {found} value(s) but the function declares {expected}"
            ),
            InitlistNeedsContext => {
                write!(f, "initializer list needs a type annotation context")
            }
            InitlistPositionalField => {
                write!(f, "table initializer entries must be named")
            }
            InitlistNamedElement => {
                write!(f, "array initializer entries cannot be named")
            }
            NotMutable { name } => write!(f, "'{name}' is not assignable"),
            CapturedVariable { name } => write!(
                f,
                "cannot capture local variable '{name}' in a nested function"
            ),
            DeclNeedsTypeOrValue { name } => write!(
                f,
                "declaration of '{name}' needs a type annotation or an initial value"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeCheckError {
    pub detail: TypeCheckErrorDetail,
    pub loc: Loc,
}

impl TypeCheckError {
    pub fn new(detail: TypeCheckErrorDetail, loc: Loc) -> Self {
        TypeCheckError { detail, loc }
    }

    pub fn kind(&self) -> CheckErrorKind {
        use TypeCheckErrorDetail::*;
        match self.detail {
            UndeclaredType { .. }
            | UndeclaredVariable { .. }
            | DuplicateDeclaration { .. } => CheckErrorKind::Name,
            _ => CheckErrorKind::Type,
        }
    }
}

impl Display for TypeCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.loc, self.kind(), self.detail)
    }
}

impl Error for TypeCheckError {}
