use std::process::ExitCode;

use editor::{run_app, AppError};
use tracing::{error, info};

use super::bootstrap::AppWiring;

/// Exit code 1 means the window never opened; 2 means the loop died mid-session.
pub(crate) fn run(app: AppWiring) -> ExitCode {
    let export_path = app.config.export_path.clone();
    match run_app(app.config) {
        Ok(()) => {
            info!(export_path = %export_path.display(), "editor_closed");
            ExitCode::SUCCESS
        }
        Err(
            err @ (AppError::CreateEventLoop(_)
            | AppError::CreateWindow(_)
            | AppError::CreateRenderer(_)),
        ) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(error = %err, "event_loop_failed");
            ExitCode::from(2)
        }
    }
}
