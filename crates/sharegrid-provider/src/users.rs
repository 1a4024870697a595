//! Provider user accounts.
//!
//! Users are loaded from a plain text file with one account per line:
//! `username password_hash home_dir`. Password hashes are bcrypt.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use sharegrid_common::SharegridError;

/// A provider user with a bcrypt password hash and a home directory of
/// shared files.
#[derive(Clone, Debug)]
pub struct User {
    pub name: String,
    pub password_hash: String,
    pub home_dir: PathBuf,
}

impl User {
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// Load user accounts from `path`, skipping blank lines and `#` comments.
///
/// Duplicate usernames are skipped with a warning, first entry wins.
pub fn load_users(path: &Path) -> Result<HashMap<String, User>, SharegridError> {
    let content = fs::read_to_string(path)?;
    let mut users = HashMap::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(SharegridError::IllegalArgument(format!(
                "malformed user entry at {}:{}",
                path.display(),
                line_no + 1
            )));
        }

        let user = User {
            name: fields[0].to_string(),
            password_hash: fields[1].to_string(),
            home_dir: PathBuf::from(fields[2]),
        };

        if users.contains_key(&user.name) {
            warn!(username = %user.name, "Skipping duplicate username");
            continue;
        }
        users.insert(user.name.clone(), user);
    }

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn hash(password: &str) -> String {
        bcrypt::hash(password, 4).unwrap()
    }

    #[test]
    fn test_load_users() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# accounts").unwrap();
        writeln!(file, "alice {} /data/alice", hash("wonder")).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "bob {} /data/bob", hash("builder")).unwrap();

        let users = load_users(file.path()).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users["alice"].home_dir, PathBuf::from("/data/alice"));
        assert!(users["alice"].verify_password("wonder"));
        assert!(!users["alice"].verify_password("builder"));
    }

    #[test]
    fn test_duplicate_username_first_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alice {} /data/alice", hash("first")).unwrap();
        writeln!(file, "alice {} /data/other", hash("second")).unwrap();

        let users = load_users(file.path()).unwrap();
        assert_eq!(users.len(), 1);
        assert!(users["alice"].verify_password("first"));
    }

    #[test]
    fn test_malformed_entry_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alice only-two-fields").unwrap();

        assert!(load_users(file.path()).is_err());
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        let user = User {
            name: "alice".to_string(),
            password_hash: "not-a-bcrypt-hash".to_string(),
            home_dir: PathBuf::from("/data/alice"),
        };
        assert!(!user.verify_password("anything"));
    }
}
