//! Directory service lookups.

pub mod ldapsearch;
pub mod ldif;

pub use ldapsearch::LdapSearch;

use crate::error::ProvisionError;

/// Attributes of one directory entry needed to create an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    pub username: String,
    pub display_name: String,
    pub uid: u32,
}

/// Resolves a validated username to its directory record.
///
/// Exactly one query per call; implementations never retry.
pub trait DirectoryLookup {
    fn lookup(&self, username: &str) -> Result<DirectoryRecord, ProvisionError>;
}

impl<T: DirectoryLookup + ?Sized> DirectoryLookup for &T {
    fn lookup(&self, username: &str) -> Result<DirectoryRecord, ProvisionError> {
        (**self).lookup(username)
    }
}

/// Build a record from the first entry of a search result.
///
/// A missing entry, a missing attribute or a non-numeric `uidNumber` all
/// mean the user cannot be resolved.
pub fn record_from_entries(
    username: &str,
    entries: &[ldif::LdifEntry],
) -> Result<DirectoryRecord, ProvisionError> {
    let not_found = || ProvisionError::UserNotFound(username.to_string());

    let entry = entries.first().ok_or_else(not_found)?;
    let display_name = entry.first("gecos").ok_or_else(not_found)?;
    let uid = entry
        .first("uidNumber")
        .and_then(|value| value.trim().parse::<u32>().ok())
        .ok_or_else(not_found)?;

    Ok(DirectoryRecord {
        username: username.to_string(),
        display_name: display_name.trim().to_string(),
        uid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_record_from_complete_entry() {
        let entries = ldif::parse("dn: uid=alice,dc=x\ngecos: Alice A.\nuidNumber: 5001\n");
        let record = record_from_entries("alice", &entries).unwrap();
        assert_eq!(
            record,
            DirectoryRecord {
                username: "alice".into(),
                display_name: "Alice A.".into(),
                uid: 5001,
            }
        );
    }

    #[test]
    fn no_entry_is_user_not_found() {
        assert!(matches!(
            record_from_entries("carol", &[]),
            Err(ProvisionError::UserNotFound(name)) if name == "carol"
        ));
    }

    #[test]
    fn missing_gecos_is_user_not_found() {
        let entries = ldif::parse("dn: uid=carol,dc=x\nuidNumber: 5003\n");
        assert!(matches!(
            record_from_entries("carol", &entries),
            Err(ProvisionError::UserNotFound(_))
        ));
    }

    #[test]
    fn non_numeric_uid_is_user_not_found() {
        let entries = ldif::parse("dn: uid=carol,dc=x\ngecos: Carol\nuidNumber: abc\n");
        assert!(matches!(
            record_from_entries("carol", &entries),
            Err(ProvisionError::UserNotFound(_))
        ));
    }
}
