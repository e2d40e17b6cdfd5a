//! `modalsim`: a variable-structure co-simulation orchestrator coupling a
//! Context Petri Net to FMI 2.0/3.0 co-simulation FMUs.
//!
//! See [`guard`] for the boolean guard-expression interpreter, [`net`] for
//! the Context Petri Net, [`fmu`] for the FMU adapter contract, [`engine`]
//! for the simulation loop, and [`config`] for the declarative
//! configuration document these are all built from.

pub mod config;
pub mod engine;
pub mod fmu;
pub mod guard;
pub mod net;

pub use config::{Config, ConfigError};
pub use engine::{Engine, EngineError, Invariant};

/// Aggregates every sub-error `modalsim` can surface, with the exit code
/// mapping of `spec.md` §6.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Net(#[from] net::NetError),

    #[error(transparent)]
    Guard(#[from] guard::GuardError),

    #[error(transparent)]
    Fmu(#[from] fmu::FmuError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl Error {
    /// The exit code an embedding CLI should use (`spec.md` §6).
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            Error::Fmu(_) => 3,
            Error::Net(_) => 2,
            Error::Guard(_) => 2,
            Error::Engine(EngineError::Fmu(_)) => 3,
            Error::Engine(EngineError::InvariantViolation(_)) => 4,
            Error::Engine(EngineError::StuckSimulation(_)) => 5,
            Error::Engine(EngineError::Config(_) | EngineError::Net(_) | EngineError::Guard(_)) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_spec() {
        assert_eq!(Error::Engine(EngineError::InvariantViolation(Invariant::I1)).exit_code(), 4);
        assert_eq!(Error::Engine(EngineError::StuckSimulation(1)).exit_code(), 5);
    }
}
