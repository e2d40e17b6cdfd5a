use std::path::PathBuf;

/// Run a configuration document to completion (`spec.md` §6's external
/// interface: a configuration document in, a CSV log out).
#[derive(Debug, clap::Parser)]
#[command(name = "modalsim", version, about)]
pub struct ModalsimOptions {
    /// Path to the simulation configuration document (JSON).
    #[arg(short = 'c', long)]
    pub config: PathBuf,

    /// CSV log output file. Default is to write to standard output.
    #[arg(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}
