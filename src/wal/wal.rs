use crate::models::user::User;
use anyhow::{anyhow, bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const NONE_MARKER: &str = "-";

/// WAL operation types
#[derive(Debug, Clone, PartialEq)]
pub enum WalOperation {
    /// Full upsert of a user record, last one for a username wins on replay
    SaveUser {
        username: String,
        name: String,
        password_hash: String,
        token: Option<String>,
        token_expired_at: Option<i64>,
    },
}

impl From<&User> for WalOperation {
    fn from(user: &User) -> Self {
        WalOperation::SaveUser {
            username: user.username.clone(),
            name: user.name.clone(),
            password_hash: user.password_hash.clone(),
            token: user.token.clone(),
            token_expired_at: user.token_expired_at,
        }
    }
}

impl WalOperation {
    pub fn into_user(self) -> User {
        match self {
            WalOperation::SaveUser {
                username,
                name,
                password_hash,
                token,
                token_expired_at,
            } => {
                let mut user = User::new(username, name, password_hash);
                // A half-written session is dropped rather than restored
                if let (Some(token), Some(expired_at)) = (token, token_expired_at) {
                    user.open_session(token, expired_at);
                }
                user
            }
        }
    }

    // Free-text fields are hex encoded so a '|' in a name cannot break the line
    fn to_line(&self) -> String {
        match self {
            WalOperation::SaveUser {
                username,
                name,
                password_hash,
                token,
                token_expired_at,
            } => {
                let token = token
                    .as_ref()
                    .map(hex::encode)
                    .unwrap_or_else(|| NONE_MARKER.to_string());
                let expired_at = token_expired_at
                    .map(|ts| ts.to_string())
                    .unwrap_or_else(|| NONE_MARKER.to_string());
                format!(
                    "SAVE_USER|{}|{}|{}|{}|{}",
                    hex::encode(username),
                    hex::encode(name),
                    hex::encode(password_hash),
                    token,
                    expired_at
                )
            }
        }
    }

    fn from_line(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split('|').collect();

        match parts.first() {
            Some(&"SAVE_USER") => {
                if parts.len() != 6 {
                    bail!("Invalid SAVE_USER format");
                }
                let username = decode_text(parts[1]).context("Invalid username hex")?;
                if username.is_empty() {
                    bail!("username must not be empty");
                }
                let name = decode_text(parts[2]).context("Invalid name hex")?;
                let password_hash = decode_text(parts[3]).context("Invalid password hash hex")?;
                let token = match parts[4] {
                    NONE_MARKER => None,
                    raw => Some(decode_text(raw).context("Invalid token hex")?),
                };
                let token_expired_at = match parts[5] {
                    NONE_MARKER => None,
                    raw => Some(raw.parse::<i64>().context("Invalid token expiry")?),
                };

                Ok(WalOperation::SaveUser {
                    username,
                    name,
                    password_hash,
                    token,
                    token_expired_at,
                })
            }
            _ => bail!("Unknown operation type"),
        }
    }
}

fn decode_text(raw: &str) -> Result<String> {
    let bytes = hex::decode(raw)?;
    String::from_utf8(bytes).context("Field is not valid UTF-8")
}

pub struct Wal {
    file: Arc<Mutex<File>>,
    path: PathBuf,
}

impl Wal {
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open WAL file")?;

        Ok(Wal {
            file: Arc::new(Mutex::new(file)),
            path,
        })
    }

    pub fn log_operation(&self, op: &WalOperation) -> Result<()> {
        let line = op.to_line();
        let mut file = self.file.lock().map_err(|_| anyhow!("WAL lock poisoned"))?;
        writeln!(file, "{}", line).context("Failed to write to WAL")?;
        file.flush().context("Failed to flush WAL")?;
        Ok(())
    }

    pub fn replay(&self) -> Result<Vec<WalOperation>> {
        let file = File::open(&self.path).context("Failed to open WAL for replay")?;
        let reader = BufReader::new(file);
        let mut operations = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from WAL")?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match WalOperation::from_line(line) {
                Ok(op) => operations.push(op),
                Err(e) => {
                    tracing::warn!(
                        line_num = line_num + 1,
                        error = %e,
                        "Failed to parse WAL line, skipping"
                    );
                }
            }
        }

        Ok(operations)
    }

    /// Replace the log with a snapshot, one operation per live record.
    pub fn compact(&self, snapshot: &[WalOperation]) -> Result<()> {
        let mut file = self.file.lock().map_err(|_| anyhow!("WAL lock poisoned"))?;
        file.set_len(0).context("Failed to truncate WAL")?;
        for op in snapshot {
            writeln!(file, "{}", op.to_line()).context("Failed to write WAL snapshot")?;
        }
        file.flush().context("Failed to flush WAL after compaction")?;
        file.sync_all().context("Failed to sync WAL after compaction")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn save_op(username: &str, name: &str, token: Option<&str>, expired_at: Option<i64>) -> WalOperation {
        WalOperation::SaveUser {
            username: username.to_string(),
            name: name.to_string(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            token: token.map(str::to_string),
            token_expired_at: expired_at,
        }
    }

    #[test]
    fn test_line_format() {
        let op = save_op("test", "Te|st", None, None);
        let line = op.to_line();

        assert!(line.starts_with(&format!("SAVE_USER|{}|{}|", hex::encode("test"), hex::encode("Te|st"))));
        assert!(line.ends_with("|-|-"));
        assert_eq!(line.matches('|').count(), 5);
        assert_eq!(WalOperation::from_line(&line).unwrap(), op);
    }

    #[test]
    fn test_wal_log_and_replay() {
        let temp_dir = TempDir::new().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let wal = Wal::new(wal_path).unwrap();

        wal.log_operation(&save_op("test", "Test", None, None)).unwrap();
        wal.log_operation(&save_op("test", "Test", Some("tok"), Some(1_700_000_000_000)))
            .unwrap();

        let operations = wal.replay().unwrap();
        assert_eq!(operations.len(), 2);

        let user = operations[1].clone().into_user();
        assert_eq!(user.username, "test");
        assert_eq!(user.token.as_deref(), Some("tok"));
        assert_eq!(user.token_expired_at, Some(1_700_000_000_000));
    }

    #[test]
    fn test_half_session_is_not_restored() {
        let user = save_op("test", "Test", Some("tok"), None).into_user();
        assert!(user.token.is_none());
        assert!(user.token_expired_at.is_none());
    }

    #[test]
    fn test_wal_compact() {
        let temp_dir = TempDir::new().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let wal = Wal::new(wal_path).unwrap();

        for name in ["A", "B", "C"] {
            wal.log_operation(&save_op("test", name, None, None)).unwrap();
        }
        assert_eq!(wal.replay().unwrap().len(), 3);

        wal.compact(&[save_op("test", "C", None, None)]).unwrap();

        let operations = wal.replay().unwrap();
        assert_eq!(operations, vec![save_op("test", "C", None, None)]);

        // Appends keep working after compaction
        wal.log_operation(&save_op("other", "O", None, None)).unwrap();
        assert_eq!(wal.replay().unwrap().len(), 2);
    }

    #[test]
    fn test_wal_invalid_lines() {
        let temp_dir = TempDir::new().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let valid = save_op("test", "Test", None, None).to_line();
        fs::write(
            &wal_path,
            format!("INVALID_OP|data\nSAVE_USER|zz|00|00|-|-\n{}\n", valid),
        )
        .unwrap();

        let wal = Wal::new(wal_path).unwrap();
        let operations = wal.replay().unwrap();

        // Should skip invalid lines and parse the valid one
        assert_eq!(operations.len(), 1);
    }
}
