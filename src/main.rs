use std::process::ExitCode;

fn main() -> ExitCode {
    pypeline::cli::run()
}
