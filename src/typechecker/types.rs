use std::fmt::Display;

/// Semantic type used by the checker, the IR and the code generator.
/// Equality is structural except for `Record`, which is nominal: two
/// records are the same type only if they are the same declaration.
/// Typealiases never appear here; the resolution pass expands them away.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Type {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    /// The dynamic type: a boxed Lua value of unknown shape.
    Any,
    Array(Box<Type>),
    /// Field order is the declaration order.
    Table(Vec<(String, Type)>),
    Function {
        params: Vec<Type>,
        rets: Vec<Type>,
    },
    /// Nominal reference to a record declared in this module; the field
    /// list lives in the checker context.
    Record(String),
}

impl Type {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Float)
    }

    /// Types whose values can appear as `..` operands.
    pub fn is_concatable(&self) -> bool {
        matches!(self, Type::String | Type::Integer | Type::Float)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Nil => write!(f, "nil"),
            Type::Boolean => write!(f, "boolean"),
            Type::Integer => write!(f, "integer"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Any => write!(f, "any"),
            Type::Array(elem) => write!(f, "{{ {elem} }}"),
            Type::Table(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, t)| format!("{name}: {t}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{ {fields} }}")
            }
            Type::Function { params, rets } => {
                let params = params
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                match rets.len() {
                    0 => write!(f, "({params}) -> ()"),
                    1 => write!(f, "({params}) -> {}", rets[0]),
                    _ => {
                        let rets = rets
                            .iter()
                            .map(|t| t.to_string())
                            .collect::<Vec<_>>()
                            .join(", ");
                        write!(f, "({params}) -> ({rets})")
                    }
                }
            }
            Type::Record(name) => write!(f, "{name}"),
        }
    }
}
