#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum NetError {
    #[error("context `{0}` has no declared place")]
    UnknownContext(String),

    #[error("missing guard for transition `{0}`")]
    MissingGuard(String),

    #[error(transparent)]
    Guard(#[from] crate::guard::GuardError),
}
