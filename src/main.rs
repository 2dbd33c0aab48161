//! Binary entrypoint that launches the SiteGen builder server.

use std::process::ExitCode;

use sitegen::start_sitegen;

/// Start the builder server with configuration from the environment.
fn main() -> ExitCode {
    start_sitegen::run()
}
