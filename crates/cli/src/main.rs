use std::process::ExitCode;

fn main() -> ExitCode {
    ventura_cli::run()
}
