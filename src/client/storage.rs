use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::ClientError;

/// The well-known key the session token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Durable client-side key/value storage.
pub trait TokenStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&mut self, key: &str) -> Result<(), ClientError>;
}

/// Storage that lives as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenStorage {
    values: HashMap<String, String>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Storage backed by one file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    dir: PathBuf,
}

impl FileTokenStorage {
    /// Uses `dir` for storage, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> Result<PathBuf, ClientError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ClientError::Validation(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(key))
    }
}

impl TokenStorage for FileTokenStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        std::fs::write(self.path(key)?, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        match std::fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
