/// Labeled commit points of the grammar. Each label names the place where
/// the parser has committed to a production and pairs it with the static
/// message reported when the expected terminal is missing. The catalog is
/// the single source of syntax-error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SyntaxLabel {
    ExpectedToplevel,
    NameFunc,
    LParenParams,
    RParenParams,
    EndFunc,
    NameDecl,
    AssignToplevelVar,
    NameRecord,
    EndRecord,
    ColonRecordField,
    NameTypealias,
    AssignTypealias,
    TypeExp,
    RBraceType,
    ColonTableType,
    ArrowFuncType,
    RParenFuncType,
    RParenRetTypes,
    ThenIf,
    EndIf,
    DoWhile,
    EndWhile,
    UntilRepeat,
    NameFor,
    AssignFor,
    CommaFor,
    DoFor,
    EndFor,
    EndDo,
    ExpExpr,
    RParenExpr,
    RBracketIndex,
    RBraceInitlist,
    AssignInitField,
    LParenCall,
    RParenCall,
    NameMethod,
    NameDot,
    TypeCast,
    CallStat,
    AssignNotToVar,
    BreakOutsideLoop,
    LParenImport,
    StringImport,
    RParenImport,
    MalformedToken,
}

impl SyntaxLabel {
    pub fn message(&self) -> &'static str {
        use SyntaxLabel::*;
        match self {
            ExpectedToplevel => {
                "Expected a toplevel element (function, variable, typealias, record, or import)"
            }
            NameFunc => "Expected a name after 'function'",
            LParenParams => "Expected '(' to start the parameter list",
            RParenParams => "Expected ')' to close the parameter list",
            EndFunc => "Expected 'end' to close the function body.",
            NameDecl => "Expected a name after 'local'",
            AssignToplevelVar => "Expected '=' in the module variable declaration",
            NameRecord => "Expected a name after 'record'",
            EndRecord => "Expected 'end' to close the record declaration",
            ColonRecordField => "Expected ':' after the record field name",
            NameTypealias => "Expected a name after 'typealias'",
            AssignTypealias => "Expected '=' after the typealias name",
            TypeExp => "Expected a type",
            RBraceType => "Expected '}' to close the type",
            ColonTableType => "Expected ':' after the field name in the table type",
            ArrowFuncType => "Expected '->' in the function type",
            RParenFuncType => "Expected ')' in the function type",
            RParenRetTypes => "Expected ')' to close the return types",
            ThenIf => "Expected 'then' after the condition",
            EndIf => "Expected 'end' to close the 'if' statement",
            DoWhile => "Expected 'do' after the 'while' condition",
            EndWhile => "Expected 'end' to close the 'while' loop",
            UntilRepeat => "Expected 'until' to close the 'repeat' loop",
            NameFor => "Expected a variable name after 'for'",
            AssignFor => "Expected '=' after the 'for' variable",
            CommaFor => "Expected ',' between the 'for' bounds",
            DoFor => "Expected 'do' after the 'for' bounds",
            EndFor => "Expected 'end' to close the 'for' loop",
            EndDo => "Expected 'end' to close the 'do' block",
            ExpExpr => "Expected an expression",
            RParenExpr => "Expected ')' to close the parenthesized expression",
            RBracketIndex => "Expected ']' to close the index expression",
            RBraceInitlist => "Expected '}' to close the initializer list",
            AssignInitField => "Expected '=' after the field name in the initializer",
            LParenCall => "Expected '(' to start the argument list",
            RParenCall => "Expected ')' to close the argument list",
            NameMethod => "Expected a method name after ':'",
            NameDot => "Expected a field name after '.'",
            TypeCast => "Expected a type after 'as'",
            CallStat => "Only function calls can be used as statements",
            AssignNotToVar => "left side of assignment is not a variable",
            BreakOutsideLoop => "break statement outside loop",
            LParenImport => "Expected '(' after 'import'",
            StringImport => "Expected a module name string in 'import'",
            RParenImport => "Expected ')' to close the 'import'",
            MalformedToken => "Malformed token",
        }
    }
}
