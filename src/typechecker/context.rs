use std::collections::HashMap;

use crate::lexer::Loc;
use crate::parser::ast::TypeName;

use super::error::{TypeCheckError, TypeCheckErrorDetail};
use super::scope::Scope;
use super::types::Type;

/// Mutable checker state: the scope stack, the type namespace, the record
/// field tables, the export list and the accumulated diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub scope: Scope,
    /// Fully expanded type namespace: record names and typealias targets.
    types: HashMap<String, Type>,
    /// Field lists of the records declared in this module.
    pub records: HashMap<String, Vec<(String, Type)>>,
    /// Exported toplevel names, in declaration order.
    pub exports: Vec<(String, Type)>,
    pub errors: Vec<TypeCheckError>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            scope: Scope::new(),
            ..Default::default()
        }
    }

    pub fn error(&mut self, detail: TypeCheckErrorDetail, loc: Loc) {
        self.errors.push(TypeCheckError::new(detail, loc));
    }

    pub fn declare_type(&mut self, name: &str, typ: Type) -> bool {
        if self.types.contains_key(name) {
            return false;
        }
        self.types.insert(name.to_string(), typ);
        true
    }

    pub fn lookup_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    /// Field list of a record or table type, if it has one.
    pub fn fields_of<'a>(&'a self, typ: &'a Type) -> Option<&'a [(String, Type)]> {
        match typ {
            Type::Table(fields) => Some(fields),
            Type::Record(name) => self.records.get(name).map(|f| f.as_slice()),
            _ => None,
        }
    }

    /// Resolve a surface type expression against the (already expanded)
    /// type namespace. Undeclared names report an error and resolve to
    /// `any` so checking can continue.
    pub fn resolve(&mut self, type_name: &TypeName) -> Type {
        match type_name {
            TypeName::Nil(_) => Type::Nil,
            TypeName::Boolean(_) => Type::Boolean,
            TypeName::Integer(_) => Type::Integer,
            TypeName::Float(_) => Type::Float,
            TypeName::String(_) => Type::String,
            TypeName::Any(_) => Type::Any,
            TypeName::Name(loc, name) => match self.types.get(name) {
                Some(typ) => typ.clone(),
                None => {
                    self.error(
                        TypeCheckErrorDetail::UndeclaredType { name: name.clone() },
                        loc.clone(),
                    );
                    Type::Any
                }
            },
            TypeName::Array(_, elem) => Type::Array(Box::new(self.resolve(elem))),
            TypeName::Table(_, fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, t)| (name.clone(), self.resolve(t)))
                    .collect();
                Type::Table(fields)
            }
            TypeName::Function(_, params, rets) => {
                let params = params.iter().map(|t| self.resolve(t)).collect();
                let rets = rets.iter().map(|t| self.resolve(t)).collect();
                Type::Function { params, rets }
            }
        }
    }
}
