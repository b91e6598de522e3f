pub mod casing;
pub mod cli;
pub mod codegen;
pub mod coerce;
pub mod error;
pub mod model;
pub mod parse;
pub mod request;
pub mod source;
pub mod trace;

/// Tool version stamped into every generated file header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> std::process::ExitCode {
    trace::init_tracing();
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
