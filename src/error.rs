use std::process::ExitCode;

/// Errors that cause rolecall to exit with a specific code.
#[derive(Debug, thiserror::Error)]
pub enum ExitError {
    #[error("config error: {0}")]
    Config(String),

    #[error("bot token not set: export {env} or add it to .env")]
    MissingToken { env: String },

    #[error("telegram transport failed: {0}")]
    Transport(String),

    #[error("{count} problem(s) found")]
    DoctorFailed { count: usize },
}

impl ExitError {
    pub const fn code(&self) -> u8 {
        match self {
            ExitError::Config(_) => 2,
            ExitError::MissingToken { .. } => 3,
            ExitError::Transport(_) => 4,
            ExitError::DoctorFailed { .. } => 6,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
