pub mod formats;

use flexi_logger::Logger;

use crate::Error;

/// Start logging to stderr; stdout carries command output only.
///
/// `RUST_LOG` overrides the default level.
pub fn init(verbose: bool) -> Result<(), Error> {
    let (spec, format): (&str, flexi_logger::FormatFunction) = if verbose {
        ("info", formats::detailed_format)
    } else {
        ("warn", formats::cli_format)
    };

    Logger::try_with_env_or_str(spec)?
        .format(format)
        .log_to_stderr()
        .start()?;

    Ok(())
}
