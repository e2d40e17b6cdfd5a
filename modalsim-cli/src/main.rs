use clap::Parser;

fn main() {
    let options = modalsim_cli::options::ModalsimOptions::parse();

    let level_spec = options.verbose.log_level_filter().to_string().to_lowercase();
    let _logger = flexi_logger::Logger::try_with_env_or_str(&level_spec)
        .and_then(|logger| logger.start())
        .expect("failed to initialize logging");

    match modalsim_cli::run(&options.config) {
        Ok(engine) => {
            log::info!("simulation finished at t = {:.3}", engine.time());
            let result = match options.output_file {
                Some(path) => std::fs::File::create(path).and_then(|f| engine.logger().write_csv(f)),
                None => engine.logger().write_csv(std::io::stdout().lock()),
            };
            if let Err(err) = result {
                eprintln!("error writing log: {err}");
                std::process::exit(2);
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}
