//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(unsafe_code)]

use modalsim::engine::FmuOpener;
use modalsim::{Config, Engine};

pub mod options;

/// CLI-level error, carrying `modalsim::Error`'s exit code through to
/// `main` (`spec.md` §6).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Modalsim(#[from] modalsim::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Modalsim(err) => err.exit_code(),
            Error::Io(_) => 2,
        }
    }
}

/// Run the configuration document at `config_path` to completion, returning
/// the engine so the caller can pull its log out.
pub fn run(config_path: &std::path::Path) -> Result<Engine, Error> {
    let config = Config::from_path(config_path).map_err(modalsim::Error::from)?;

    let opener: FmuOpener = Box::new(|path, instance_name| {
        let (variables, slave) = modalsim::fmu::DynamicSlave::open(path, instance_name)?;
        Ok((variables, Box::new(slave) as Box<dyn modalsim::fmu::CoSimulationBinding>))
    });

    let mut engine = Engine::new(&config, opener).map_err(modalsim::Error::from)?;
    engine.run().map_err(modalsim::Error::from)?;
    Ok(engine)
}
