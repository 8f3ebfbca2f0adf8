use thiserror::Error;

/// Failures that stop a provisioning run.
///
/// Every variant is fatal to the whole batch. The only non-fatal condition,
/// an account that already exists, is an outcome and not an error.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Invalid username '{0}': only letters and digits are allowed, starting with a letter")]
    InvalidUsername(String),

    #[error("Invalid group list '{0}': group names may only contain letters, digits and '_'")]
    InvalidGroupList(String),

    #[error("Unknown group '{0}': not present in the system group database")]
    UnknownGroup(String),

    #[error("Directory service unavailable: {message}")]
    DirectoryUnavailable {
        message: String,
        /// Raw output of the directory query, kept for diagnostics
        response: String,
    },

    #[error("User '{0}' not found in the directory (missing gecos or uidNumber)")]
    UserNotFound(String),

    #[error("Failed to create account '{username}': {message}")]
    ProvisionFailed { username: String, message: String },
}

impl ProvisionError {
    /// Process exit status reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::InvalidUsername(_) => 2,
            ProvisionError::InvalidGroupList(_) => 3,
            ProvisionError::UnknownGroup(_) => 4,
            ProvisionError::DirectoryUnavailable { .. } => 5,
            ProvisionError::UserNotFound(_) => 6,
            ProvisionError::ProvisionFailed { .. } => 7,
        }
    }

    /// Stable event code used in the transcript.
    pub fn code(&self) -> &'static str {
        match self {
            ProvisionError::InvalidUsername(_) => "provision.invalid_username",
            ProvisionError::InvalidGroupList(_) => "provision.invalid_group_list",
            ProvisionError::UnknownGroup(_) => "provision.unknown_group",
            ProvisionError::DirectoryUnavailable { .. } => "provision.directory_unavailable",
            ProvisionError::UserNotFound(_) => "provision.user_not_found",
            ProvisionError::ProvisionFailed { .. } => "provision.create_failed",
        }
    }

    /// Extra diagnostic text shown below the error message, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            ProvisionError::DirectoryUnavailable { response, .. } if !response.trim().is_empty() => {
                Some(response.as_str())
            }
            _ => None,
        }
    }

    pub(crate) fn directory(message: impl Into<String>, response: impl Into<String>) -> Self {
        ProvisionError::DirectoryUnavailable {
            message: message.into(),
            response: response.into(),
        }
    }

    pub(crate) fn create_failed(username: &str, message: impl Into<String>) -> Self {
        ProvisionError::ProvisionFailed {
            username: username.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let errors = [
            ProvisionError::InvalidUsername("a;b".into()),
            ProvisionError::InvalidGroupList("x!".into()),
            ProvisionError::UnknownGroup("nope".into()),
            ProvisionError::directory("bind failed", ""),
            ProvisionError::UserNotFound("carol".into()),
            ProvisionError::create_failed("dave", "exit 9"),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn diagnostics_only_for_directory_failures_with_output() {
        let err = ProvisionError::directory("exit code 49", "ldap_bind: Invalid credentials (49)");
        assert_eq!(err.diagnostics(), Some("ldap_bind: Invalid credentials (49)"));
        assert!(ProvisionError::directory("x", "  \n").diagnostics().is_none());
        assert!(ProvisionError::UserNotFound("carol".into()).diagnostics().is_none());
    }
}
