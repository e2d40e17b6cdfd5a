use crate::config::ConfigError;
use crate::fmu::FmuError;
use crate::guard::GuardError;
use crate::net::NetError;

/// Which quantified invariant (`spec.md` §3) was found violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// Exactly one mode-place should hold a token.
    I1,
    /// `tokens(C) + tokens(C_ModeSwitch) = 1`.
    I2,
    /// At most one place in an exclusion group holds a token.
    I3,
    /// `tokens(dep) > 0 ⇒ tokens(req) > 0`.
    I4,
    /// Log time is non-decreasing.
    I5,
}

impl std::fmt::Display for Invariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Invariant::I1 => "I1 (single active mode)",
            Invariant::I2 => "I2 (pair conservation)",
            Invariant::I3 => "I3 (exclusion)",
            Invariant::I4 => "I4 (requirement)",
            Invariant::I5 => "I5 (monotonic time)",
        };
        f.write_str(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Fmu(#[from] FmuError),

    #[error("invariant {0} violated")]
    InvariantViolation(Invariant),

    #[error("simulation made no progress for {0} consecutive iteration(s)")]
    StuckSimulation(u32),
}
