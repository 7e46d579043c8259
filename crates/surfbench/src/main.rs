mod cli;
mod run;

use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match cli::parse() {
        Ok(cli) => cli,
        Err(early) => {
            early.report();
            return ExitCode::from(early.code);
        }
    };
    run::initialise_tracing();

    match run::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = run::exit_code(&err);
            tracing::error!(code, "benchmark failed");
            eprintln!("{err:#}");
            ExitCode::from(code)
        }
    }
}
