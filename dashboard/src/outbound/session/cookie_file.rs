//! Session store persisted as a small JSON cookie jar.
//!
//! The jar lives in a capability-scoped directory. Every write goes to a
//! hidden temporary file that is then renamed over the jar, so concurrent
//! readers see either the old or the new session and never a torn file.
//! Entries that no longer parse read as absent, matching request cookies.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionToken, TOKEN_COOKIE, USER_COOKIE, UserProfile};

/// Default jar file name inside the session directory.
pub const DEFAULT_COOKIE_FILE: &str = "session-cookies.json";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieJar {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

/// File-backed session store for long-lived client processes.
#[derive(Debug)]
pub struct CookieFileSessionStore {
    dir: Dir,
    file_name: String,
    guard: Mutex<()>,
}

impl CookieFileSessionStore {
    /// Open `directory` and use `file_name` as the jar.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be opened or `file_name` is
    /// not a single path component.
    pub fn open(directory: &Utf8Path, file_name: &str) -> io::Result<Self> {
        let mut components = Utf8Path::new(file_name).components();
        let (Some(Utf8Component::Normal(name)), None) = (components.next(), components.next())
        else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cookie jar name must be a file name, got {file_name:?}"),
            ));
        };
        let dir = Dir::open_ambient_dir(directory, ambient_authority())?;
        Ok(Self {
            dir,
            file_name: name.to_owned(),
            guard: Mutex::new(()),
        })
    }

    /// Path of the jar relative to the opened directory.
    pub fn file_name(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.file_name.as_str())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, SessionStoreError> {
        self.guard
            .lock()
            .map_err(|_| SessionStoreError::write("cookie jar lock poisoned"))
    }

    fn load(&self) -> Result<CookieJar, SessionStoreError> {
        match self.dir.read_to_string(&self.file_name) {
            Ok(text) if text.trim().is_empty() => Ok(CookieJar::default()),
            Ok(text) => serde_json::from_str(&text).map_err(|err| {
                SessionStoreError::read(format!("{}: {err}", self.file_name))
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(CookieJar::default()),
            Err(err) => Err(SessionStoreError::read(format!(
                "{}: {err}",
                self.file_name
            ))),
        }
    }

    fn save(&self, jar: &CookieJar) -> Result<(), SessionStoreError> {
        let contents = serde_json::to_string_pretty(jar)
            .map_err(|err| SessionStoreError::write(err.to_string()))?;
        write_atomic(&self.dir, &self.file_name, &contents)
            .map_err(|err| SessionStoreError::write(format!("{}: {err}", self.file_name)))
    }

    fn update(&self, apply: impl FnOnce(&mut CookieJar)) -> Result<(), SessionStoreError> {
        let _guard = self.lock()?;
        let mut jar = self.load()?;
        apply(&mut jar);
        self.save(&jar)
    }
}

#[async_trait]
impl SessionStore for CookieFileSessionStore {
    async fn token(&self) -> Result<Option<SessionToken>, SessionStoreError> {
        let jar = self.load()?;
        Ok(jar.token.and_then(|raw| match SessionToken::new(raw) {
            Ok(token) => Some(token),
            Err(err) => {
                debug!(
                    file = %self.file_name,
                    entry = TOKEN_COOKIE,
                    error = %err,
                    "ignoring unusable jar entry"
                );
                None
            }
        }))
    }

    async fn set_token(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        let raw = token.as_str().to_owned();
        self.update(|jar| jar.token = Some(raw))
    }

    async fn user(&self) -> Result<Option<UserProfile>, SessionStoreError> {
        let jar = self.load()?;
        Ok(jar.user.and_then(|raw| match UserProfile::from_cookie_value(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                debug!(
                    file = %self.file_name,
                    entry = USER_COOKIE,
                    error = %err,
                    "ignoring unusable jar entry"
                );
                None
            }
        }))
    }

    async fn set_user(&self, user: &UserProfile) -> Result<(), SessionStoreError> {
        let raw = user.to_cookie_value();
        self.update(|jar| jar.user = Some(raw))
    }

    async fn clear_session(&self) -> Result<(), SessionStoreError> {
        let _guard = self.lock()?;
        match self.dir.remove_file(&self.file_name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionStoreError::write(format!(
                "{}: {err}",
                self.file_name
            ))),
        }
    }
}

fn write_atomic(dir: &Dir, file_name: &str, contents: &str) -> io::Result<()> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{file_name}.tmp.{}.{suffix}.{counter}",
        std::process::id()
    );

    if let Err(err) = write_temp_file(dir, &tmp_name, contents) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    if let Err(err) = dir.rename(&tmp_name, dir, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    if dir.open(".").and_then(|parent| parent.sync_all()).is_err() {
        debug!(file = file_name, "cookie jar directory sync skipped");
    }
    Ok(())
}

fn write_temp_file(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn store_in(temp: &tempfile::TempDir) -> CookieFileSessionStore {
        let path = Utf8Path::from_path(temp.path()).expect("utf-8 temp path");
        CookieFileSessionStore::open(path, DEFAULT_COOKIE_FILE).expect("open jar")
    }

    #[tokio::test]
    async fn missing_jar_reads_as_empty_session() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = store_in(&temp);
        assert_eq!(store.token().await.expect("read"), None);
        assert_eq!(store.user().await.expect("read"), None);
    }

    #[tokio::test]
    async fn persists_token_and_user_across_instances() {
        let temp = tempfile::tempdir().expect("temp dir");
        let token = SessionToken::new("h.p.s").expect("token");
        let profile = UserProfile::from_json(&json!({ "email": "ops@example.com", "role": "admin" }))
            .expect("profile");
        {
            let store = store_in(&temp);
            store.set_token(&token).await.expect("write token");
            store.set_user(&profile).await.expect("write user");
        }

        let reopened = store_in(&temp);
        assert_eq!(reopened.token().await.expect("read"), Some(token));
        assert_eq!(reopened.user().await.expect("read"), Some(profile));
    }

    #[tokio::test]
    async fn clear_removes_jar_and_leaves_no_temp_files() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = store_in(&temp);
        store
            .set_token(&SessionToken::new("t").expect("token"))
            .await
            .expect("write");
        store.clear_session().await.expect("clear");
        store.clear_session().await.expect("clearing twice is fine");

        assert_eq!(store.token().await.expect("read"), None);
        let dir = Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("open");
        assert_eq!(dir.entries().expect("list").count(), 0);
    }

    #[tokio::test]
    async fn corrupt_jar_is_a_read_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("open");
        dir.write(DEFAULT_COOKIE_FILE, "{not json").expect("seed");
        let err = store_in(&temp).token().await.expect_err("must fail");
        assert!(matches!(err, SessionStoreError::Read { .. }));
    }

    #[rstest]
    #[case::empty_token(r#"{"token":""}"#)]
    #[case::blank_token(r#"{"token":"   "}"#)]
    #[case::garbled_user(r#"{"user":"not a profile"}"#)]
    #[tokio::test]
    async fn unusable_entries_read_as_absent(#[case] jar: &str) {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("open");
        dir.write(DEFAULT_COOKIE_FILE, jar).expect("seed");
        let store = store_in(&temp);
        assert_eq!(store.token().await.expect("read"), None);
        assert_eq!(store.user().await.expect("read"), None);
    }

    #[test]
    fn rejects_nested_jar_name() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8Path::from_path(temp.path()).expect("utf-8 temp path");
        let err = CookieFileSessionStore::open(path, "nested/jar.json").expect_err("must fail");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
