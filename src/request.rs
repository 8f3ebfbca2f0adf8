//! Input line parsing and syntax validation.
//!
//! Usernames and group names end up as arguments of a privileged `useradd`
//! call, so anything outside the allowed character sets is rejected here,
//! before the values reach any other component.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ProvisionError;

/// Longest login name `useradd` accepts.
pub const MAX_USERNAME_LEN: usize = 32;

/// One validated line of the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRequest {
    pub username: String,
    pub supplementary_groups: Vec<String>,
}

fn username_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("username pattern compiles"))
}

fn group_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("group pattern compiles"))
}

/// Whether `name` is acceptable as a group name after case folding.
///
/// A leading digit is refused: `getent` and `useradd -G` treat an all-digit
/// token as a GID rather than a name.
pub fn is_valid_group_name(name: &str) -> bool {
    group_pattern().is_match(&name.to_lowercase())
}

/// True for lines that carry no entry: blank lines and `#` comments.
pub fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parse one input line of the form `username` or `username : group1 group2`.
///
/// The username loses all whitespace and is folded to lower case; groups are
/// folded to lower case and split on whitespace. Duplicate groups are kept
/// once in first-seen order.
pub fn parse_line(line: &str) -> Result<UserRequest, ProvisionError> {
    let (user_field, groups_field) = match line.split_once(':') {
        Some((user, groups)) => (user, groups),
        None => (line, ""),
    };

    let username = normalize_username(user_field)?;
    let supplementary_groups = normalize_groups(groups_field)?;

    Ok(UserRequest {
        username,
        supplementary_groups,
    })
}

fn normalize_username(field: &str) -> Result<String, ProvisionError> {
    let stripped: String = field.chars().filter(|c| !c.is_whitespace()).collect();

    if stripped.is_empty()
        || stripped.len() > MAX_USERNAME_LEN
        || !username_pattern().is_match(&stripped)
    {
        return Err(ProvisionError::InvalidUsername(field.trim().to_string()));
    }

    Ok(stripped.to_lowercase())
}

fn normalize_groups(field: &str) -> Result<Vec<String>, ProvisionError> {
    let lowered = field.to_lowercase();
    let mut groups: Vec<String> = Vec::new();

    for group in lowered.split_whitespace() {
        if !group_pattern().is_match(group) {
            return Err(ProvisionError::InvalidGroupList(field.trim().to_string()));
        }
        if !groups.iter().any(|existing| existing == group) {
            groups.push(group.to_string());
        }
    }

    Ok(groups)
}
