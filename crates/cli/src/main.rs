use std::process::ExitCode;

fn main() -> ExitCode {
    siteboss_cli::run()
}
