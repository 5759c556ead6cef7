mod app;

use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(wiring) = app::build_app() else {
        return ExitCode::FAILURE;
    };
    app::run(wiring)
}
