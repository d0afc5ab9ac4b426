use std::process::ExitCode;

fn main() -> ExitCode {
    match muon_lifetime::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(kind = ?err.kind(), "{}", err.message());
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
