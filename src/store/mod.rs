//! Per-session cache of assistant, thread, last response and last attached file.
//!
//! Everything lives in flat files:
//!
//! - `<home>/.gpt/assistant_id`
//! - `<tmp>/<session>_thread_id`
//! - `<tmp>/<session>_last`
//! - `<tmp>/<session>_last_file`

mod storage;

#[cfg(test)]
pub use self::storage::MemoryStorage;
pub use self::storage::{FsStorage, Storage};

use anyhow::{anyhow, Result};
use std::{fmt, path::PathBuf, sync::Arc};

const ASSISTANT_DIR_NAME: &str = ".gpt";
const ASSISTANT_FILE_NAME: &str = "assistant_id";
const THREAD_SUFFIX: &str = "_thread_id";
const LAST_RESPONSE_SUFFIX: &str = "_last";
const LAST_FILE_SUFFIX: &str = "_last_file";
const TEMP_DIR: &str = "/tmp";

/// Identifies the shell context whose thread and responses are cached.
///
/// The default is the parent process id, which stays stable for the lifetime of the
/// calling shell. Parent ids can be reused or shared across containers, so callers
/// that need a stronger guarantee should pass their own key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: &str) -> Result<Self> {
        let key = key.trim();
        if key.is_empty() || key.contains(['/', '\\']) {
            return Err(anyhow!("Invalid session key '{key}'"));
        }
        Ok(Self(key.to_string()))
    }

    pub fn from_parent_process() -> Self {
        Self(std::os::unix::process::parent_id().to_string())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    key: SessionKey,
    home_dir: PathBuf,
    temp_dir: PathBuf,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>, key: SessionKey, home_dir: PathBuf) -> Self {
        Self {
            storage,
            key,
            home_dir,
            temp_dir: PathBuf::from(TEMP_DIR),
        }
    }

    pub fn open(key: SessionKey) -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Not found home dir"))?;
        Ok(Self::new(Arc::new(FsStorage), key, home_dir))
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn assistant_path(&self) -> PathBuf {
        self.home_dir
            .join(ASSISTANT_DIR_NAME)
            .join(ASSISTANT_FILE_NAME)
    }

    pub fn thread_path(&self) -> PathBuf {
        self.session_path(THREAD_SUFFIX)
    }

    pub fn last_response_path(&self) -> PathBuf {
        self.session_path(LAST_RESPONSE_SUFFIX)
    }

    pub fn last_file_path(&self) -> PathBuf {
        self.session_path(LAST_FILE_SUFFIX)
    }

    pub fn assistant_id(&self) -> Result<Option<String>> {
        self.storage.read(&self.assistant_path())
    }

    pub fn save_assistant_id(&self, id: &str) -> Result<()> {
        self.storage.write(&self.assistant_path(), id)
    }

    pub fn thread_id(&self) -> Result<Option<String>> {
        self.storage.read(&self.thread_path())
    }

    pub fn save_thread_id(&self, id: &str) -> Result<()> {
        self.storage.write(&self.thread_path(), id)
    }

    pub fn last_response(&self) -> Result<Option<String>> {
        self.storage.read(&self.last_response_path())
    }

    pub fn save_last_response(&self, text: &str) -> Result<()> {
        self.storage.write(&self.last_response_path(), text)
    }

    pub fn last_file(&self) -> Result<Option<String>> {
        self.storage.read(&self.last_file_path())
    }

    pub fn save_last_file(&self, id: &str) -> Result<()> {
        self.storage.write(&self.last_file_path(), id)
    }

    fn session_path(&self, suffix: &str) -> PathBuf {
        self.temp_dir.join(format!("{}{suffix}", self.key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn memory_store(key: &str) -> SessionStore {
        SessionStore::new(
            Arc::new(MemoryStorage::new()),
            SessionKey::new(key).unwrap(),
            PathBuf::from("/home/alice"),
        )
    }

    #[test]
    fn test_paths() {
        let store = memory_store("4242");
        assert_eq!(
            store.assistant_path(),
            PathBuf::from("/home/alice/.gpt/assistant_id")
        );
        assert_eq!(store.thread_path(), PathBuf::from("/tmp/4242_thread_id"));
        assert_eq!(store.last_response_path(), PathBuf::from("/tmp/4242_last"));
        assert_eq!(store.last_file_path(), PathBuf::from("/tmp/4242_last_file"));
    }

    #[test]
    fn test_session_key() {
        assert_eq!(SessionKey::new(" work ").unwrap().to_string(), "work");
        assert!(SessionKey::new("").is_err());
        assert!(SessionKey::new("../etc").is_err());
        let key = SessionKey::from_parent_process();
        assert_eq!(key, SessionKey::from_parent_process());
        assert!(key.to_string().parse::<u32>().is_ok());
    }

    #[test]
    fn test_sessions_share_assistant_only() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let home = PathBuf::from("/home/alice");
        let a = SessionStore::new(storage.clone(), SessionKey::new("1").unwrap(), home.clone());
        let b = SessionStore::new(storage, SessionKey::new("2").unwrap(), home);

        a.save_assistant_id("asst_1").unwrap();
        a.save_thread_id("thread_1").unwrap();
        a.save_last_response("hello").unwrap();

        assert_eq!(b.assistant_id().unwrap(), Some("asst_1".to_string()));
        assert_eq!(b.thread_id().unwrap(), None);
        assert_eq!(b.last_response().unwrap(), None);
        assert_eq!(a.last_response().unwrap(), Some("hello".to_string()));
    }
}
