#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum GuardError {
    #[error("invalid guard expression: {0}")]
    Syntax(String),

    #[error("undefined name `{0}` in guard expression")]
    UndefinedName(String),

    #[error("type mismatch: comparison operand `{0:?}` did not evaluate to a number")]
    TypeMismatch(crate::guard::ast::Expr),
}
