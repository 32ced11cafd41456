use crate::config::Config;
use crate::error::GameError;
use env_logger::{Builder, Env, Target};
use std::fs::File;

/// The terminal is in raw mode on the alternate screen while a scene runs,
/// so records go to `config.log_file` instead of stderr.
pub fn init(config: &Config) -> Result<(), GameError>
{
    let file = File::create(&config.log_file).map_err(|source| GameError::LogFile {
        path: config.log_file.clone(),
        source,
    })?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(|_| GameError::LoggerInstalled)?;

    log::info!("logging to {}", config.log_file.display());
    Ok(())
}
