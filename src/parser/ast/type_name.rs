use std::fmt::Display;

use crate::lexer::Loc;

/// A type expression as written in the source, before resolution against
/// the module's type namespace.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TypeName {
    Nil(Loc),
    Boolean(Loc),
    Integer(Loc),
    Float(Loc),
    String(Loc),
    Any(Loc),
    /// A user-declared name: record, typealias, or undeclared (an error).
    Name(Loc, String),
    /// `{ t }`
    Array(Loc, Box<TypeName>),
    /// `{ name: t, ... }`, field order preserved
    Table(Loc, Vec<(String, TypeName)>),
    /// `(t1, t2) -> t`; the return side may itself be a parenthesized tuple
    Function(Loc, Vec<TypeName>, Vec<TypeName>),
}

impl TypeName {
    pub fn loc(&self) -> &Loc {
        match self {
            TypeName::Nil(loc)
            | TypeName::Boolean(loc)
            | TypeName::Integer(loc)
            | TypeName::Float(loc)
            | TypeName::String(loc)
            | TypeName::Any(loc)
            | TypeName::Name(loc, _)
            | TypeName::Array(loc, _)
            | TypeName::Table(loc, _)
            | TypeName::Function(loc, _, _) => loc,
        }
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Nil(_) => write!(f, "nil"),
            TypeName::Boolean(_) => write!(f, "boolean"),
            TypeName::Integer(_) => write!(f, "integer"),
            TypeName::Float(_) => write!(f, "float"),
            TypeName::String(_) => write!(f, "string"),
            TypeName::Any(_) => write!(f, "any"),
            TypeName::Name(_, name) => write!(f, "{name}"),
            TypeName::Array(_, elem) => write!(f, "{{ {elem} }}"),
            TypeName::Table(_, fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, t)| format!("{name}: {t}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{ {fields} }}")
            }
            TypeName::Function(_, params, rets) => {
                let params = params
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let rets = rets
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({params}) -> ({rets})")
            }
        }
    }
}
