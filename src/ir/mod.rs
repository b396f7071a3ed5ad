//! The flat intermediate representation.
//!
//! Each checked function becomes a [`Function`]: a table of
//! integer-indexed locals (parameters first) and a tree of structured
//! commands. There is no SSA and no goto; control flow is expressed with
//! `If`, `Loop`, the two numeric `ForNum` variants, `Break` and
//! `Return`, which is exactly the shape the analysis passes traverse.
//! Checked array and field accesses are distinct commands carrying the
//! source line so the code generator can emit precise runtime
//! diagnostics.

mod lower;

pub use lower::lower;

use crate::lexer::Loc;
use crate::typechecker::Type;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
    pub globals: Vec<Global>,
    /// Synthesized function initializing the non-import globals; the
    /// host entry point runs it once at load time.
    pub init: Function,
    pub exports: Vec<Export>,
}

/// A module-level variable. Imports are globals bound by the host's
/// `require` at load time instead of by the init commands.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Global {
    pub name: String,
    pub typ: Type,
    pub loc: Loc,
    pub import: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Export {
    pub name: String,
    pub item: ExportItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExportItem {
    Function(usize),
    Global(usize),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Function {
    pub name: String,
    pub loc: Loc,
    pub typ: Type,
    pub param_count: usize,
    pub locals: Vec<Local>,
    pub body: Vec<Cmd>,
    pub exported: bool,
}

/// A numbered local slot. Temporaries get synthesized `$t<n>` names;
/// declared locals keep their surface name for diagnostics.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Local {
    pub name: String,
    pub typ: Type,
    pub loc: Loc,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Local(usize),
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Reference to a toplevel function (direct-call target, or boxed
    /// when used as a first-class value).
    Function(usize),
}

impl Value {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Value::Nil | Value::Bool(_) | Value::Integer(_) | Value::Float(_) | Value::String(_)
        )
    }
}

/// Value-representation changes. The integer/float conversions come from
/// checker-inserted promotions and `as` casts; boxing and unboxing move
/// values across the `any` boundary.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Conversion {
    IntToFloat,
    FloatToInt,
    Box(Type),
    Unbox(Type),
}

/// Arithmetic, comparison and bitwise operators that survive into the
/// IR. `and`/`or` never appear here; lowering turns them into `If`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum IrBinop {
    AddInt,
    AddFloat,
    SubInt,
    SubFloat,
    MulInt,
    MulFloat,
    ModInt,
    ModFloat,
    DivFloat,
    IntDivInt,
    IntDivFloat,
    PowFloat,
    EqInt,
    EqFloat,
    EqBool,
    EqStr,
    NeInt,
    NeFloat,
    NeBool,
    NeStr,
    LtInt,
    LtFloat,
    LtStr,
    LeInt,
    LeFloat,
    LeStr,
    GtInt,
    GtFloat,
    GtStr,
    GeInt,
    GeFloat,
    GeStr,
    /// Generic (boxed) equality for values whose type has no primitive
    /// comparison, e.g. two values of the same record type.
    EqVal,
    NeVal,
    BitAnd,
    BitOr,
    BitXor,
    ShiftL,
    ShiftR,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum IrUnop {
    NegInt,
    NegFloat,
    BitNot,
    Not,
    LenArr,
    LenStr,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Cmd {
    Move {
        dst: usize,
        src: Value,
    },
    Unop {
        dst: usize,
        op: IrUnop,
        src: Value,
    },
    Binop {
        dst: usize,
        op: IrBinop,
        lhs: Value,
        rhs: Value,
    },
    Concat {
        dst: usize,
        srcs: Vec<Value>,
    },
    /// Value-representation change. The line feeds the runtime tag
    /// check an unboxing conversion emits.
    Convert {
        dst: usize,
        conv: Conversion,
        src: Value,
        line: u32,
    },
    NewArray {
        dst: usize,
        elems: Vec<Value>,
    },
    NewTable {
        dst: usize,
        fields: Vec<(String, Value)>,
    },
    /// Checked array load: bounds check plus element tag check.
    GetArr {
        dst: usize,
        arr: Value,
        idx: Value,
        elem: Type,
        line: u32,
    },
    SetArr {
        arr: Value,
        idx: Value,
        src: Value,
        elem: Type,
        line: u32,
    },
    GetField {
        dst: usize,
        obj: Value,
        field: String,
        typ: Type,
        line: u32,
    },
    SetField {
        obj: Value,
        field: String,
        src: Value,
        line: u32,
    },
    GetGlobal {
        dst: usize,
        global: usize,
    },
    SetGlobal {
        global: usize,
        src: Value,
    },
    /// Direct call to a toplevel function of this module.
    CallStatic {
        dst: Option<usize>,
        func: usize,
        args: Vec<Value>,
        line: u32,
    },
    /// Call through the host protocol: the callee is a boxed value.
    CallDyn {
        dst: Option<usize>,
        func: Value,
        args: Vec<Value>,
        line: u32,
    },
    If {
        cond: Value,
        then_cmds: Vec<Cmd>,
        else_cmds: Vec<Cmd>,
    },
    Loop {
        body: Vec<Cmd>,
    },
    /// Integer numeric for: stops without wrapping at the i64 boundary.
    ForNumInt {
        var: usize,
        start: Value,
        limit: Value,
        step: Value,
        body: Vec<Cmd>,
    },
    /// Float numeric for: termination follows the sign of the step.
    ForNumFloat {
        var: usize,
        start: Value,
        limit: Value,
        step: Value,
        body: Vec<Cmd>,
    },
    Break,
    Return {
        values: Vec<Value>,
    },
}

impl Function {
    /// All locals read by a command, for the dataflow passes.
    pub fn local_reads(cmd: &Cmd, out: &mut Vec<usize>) {
        fn value(v: &Value, out: &mut Vec<usize>) {
            if let Value::Local(index) = v {
                out.push(*index);
            }
        }
        match cmd {
            Cmd::Move { src, .. } => value(src, out),
            Cmd::Unop { src, .. } => value(src, out),
            Cmd::Binop { lhs, rhs, .. } => {
                value(lhs, out);
                value(rhs, out);
            }
            Cmd::Concat { srcs, .. } => srcs.iter().for_each(|v| value(v, out)),
            Cmd::Convert { src, .. } => value(src, out),
            Cmd::NewArray { elems, .. } => elems.iter().for_each(|v| value(v, out)),
            Cmd::NewTable { fields, .. } => {
                fields.iter().for_each(|(_, v)| value(v, out))
            }
            Cmd::GetArr { arr, idx, .. } => {
                value(arr, out);
                value(idx, out);
            }
            Cmd::SetArr { arr, idx, src, .. } => {
                value(arr, out);
                value(idx, out);
                value(src, out);
            }
            Cmd::GetField { obj, .. } => value(obj, out),
            Cmd::SetField { obj, src, .. } => {
                value(obj, out);
                value(src, out);
            }
            Cmd::GetGlobal { .. } => {}
            Cmd::SetGlobal { src, .. } => value(src, out),
            Cmd::CallStatic { args, .. } => args.iter().for_each(|v| value(v, out)),
            Cmd::CallDyn { func, args, .. } => {
                value(func, out);
                args.iter().for_each(|v| value(v, out));
            }
            Cmd::If { cond, .. } => value(cond, out),
            Cmd::Loop { .. } => {}
            Cmd::ForNumInt {
                start, limit, step, ..
            }
            | Cmd::ForNumFloat {
                start, limit, step, ..
            } => {
                value(start, out);
                value(limit, out);
                value(step, out);
            }
            Cmd::Break => {}
            Cmd::Return { values } => values.iter().for_each(|v| value(v, out)),
        }
    }

    /// The local a command defines, if any. Nested bodies of structured
    /// commands are not inspected here.
    pub fn local_write(cmd: &Cmd) -> Option<usize> {
        match cmd {
            Cmd::Move { dst, .. }
            | Cmd::Unop { dst, .. }
            | Cmd::Binop { dst, .. }
            | Cmd::Concat { dst, .. }
            | Cmd::Convert { dst, .. }
            | Cmd::NewArray { dst, .. }
            | Cmd::NewTable { dst, .. }
            | Cmd::GetArr { dst, .. }
            | Cmd::GetField { dst, .. }
            | Cmd::GetGlobal { dst, .. } => Some(*dst),
            Cmd::CallStatic { dst, .. } | Cmd::CallDyn { dst, .. } => *dst,
            Cmd::ForNumInt { var, .. } | Cmd::ForNumFloat { var, .. } => Some(*var),
            _ => None,
        }
    }
}
