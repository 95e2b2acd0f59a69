use std::process::ExitCode;

fn main() -> ExitCode {
    match seu_curves::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error [{}]: {err}", err.stage());
            if let Some(hint) = err.remediation() {
                eprintln!("  -> {hint}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
