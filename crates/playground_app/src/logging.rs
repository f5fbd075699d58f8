use std::str::FromStr;

use log::LevelFilter;

use crate::error::InitError;

/// Targets that log every resource and pass at `info`.
const NOISY_TARGETS: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Installs the global logger: `[LEVEL target] message` lines on stderr.
pub fn init(level: LevelFilter) -> Result<(), InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
        })
        .level(level);
    for target in NOISY_TARGETS {
        dispatch = dispatch.level_for(target, capped(level));
    }
    dispatch.chain(std::io::stderr()).apply()?;
    Ok(())
}

pub fn parse_level(name: &str) -> Result<LevelFilter, InitError> {
    LevelFilter::from_str(name).map_err(|_| InitError::LogLevel(name.to_string()))
}

fn capped(level: LevelFilter) -> LevelFilter {
    level.min(LevelFilter::Warn)
}
