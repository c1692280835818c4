/// Log sink setup.
///
/// The terminal is in raw mode on the alternate screen while the game runs,
/// so records go to a file instead of stderr. `RUST_LOG` overrides the
/// configured level.

use std::fs::File;

use crate::config::LogConfig;

/// Install the global logger. Logging is best-effort: a file that can't be
/// created leaves the game running without logs.
pub fn init(cfg: &LogConfig) {
    let Some(path) = &cfg.file else { return };

    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", path.display());
            return;
        }
    };

    let result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cfg.level.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .format_timestamp_millis()
    .try_init();

    if let Err(e) = result {
        eprintln!("Warning: logger already initialized: {e}");
    }
}
