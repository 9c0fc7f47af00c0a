// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Logging setup for the `smrt` CLI binary. Library code never calls this;
//! it only ever calls `log::{trace,debug,info,warn,error}` and lets the
//! binary decide how (or whether) to display them.

use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Configure `fern` as the global logger. `verbosity` follows the usual `-v`
/// repeat-flag convention: 0 = info, 1 = debug, 2+ = trace.
pub fn init_logging(verbosity: u8) -> Result<(), fern::InitError> {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                colors.color(record.level()),
                message
            ))
        })
        .level(level)
        .level_for("smrt", level)
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}
