use sudo::RunningAs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrivilegeError {
    #[error("Creating accounts requires root privileges (run with sudo or use --dry-run)")]
    NeedRoot,
    #[error("Failed to escalate privileges: {0}")]
    Escalation(String),
}

/// Make sure the process can write the account database.
///
/// With `escalate` the process restarts itself through sudo, keeping the
/// variables that control debugging output.
pub fn ensure_root(escalate: bool) -> Result<(), PrivilegeError> {
    match sudo::check() {
        RunningAs::Root | RunningAs::Suid => Ok(()),
        RunningAs::User if escalate => {
            sudo::with_env(&["RUST_BACKTRACE", "NO_COLOR"])
                .map(|_| ())
                .map_err(|e| PrivilegeError::Escalation(e.to_string()))
        }
        RunningAs::User => Err(PrivilegeError::NeedRoot),
    }
}

pub fn is_root() -> bool {
    !matches!(sudo::check(), RunningAs::User)
}
