//! JSON-file storage backend.
//!
//! State lives in memory behind one `tokio` mutex and is mirrored into three
//! pretty-printed documents under the data directory:
//!
//! - `users.json`: username → `{hashed_password, friend_group}`
//! - `locations.json`: username → `{friend_group, location}`
//! - `rects.json`: the rectangle array in stored order
//!
//! Every mutation rewrites its document atomically while the lock is held,
//! so the first-login bind is a compare-and-set within this process. Two
//! processes sharing a directory get no such guarantee.

mod atomic_io;

use std::collections::BTreeMap;
use std::io;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tracing::{debug, info};

use crate::domain::ports::{
    BindOutcome, CredentialRepository, CredentialRepositoryError, GeofenceRepository,
    GeofenceRepositoryError, LocationRepository, LocationRepositoryError, Storage,
    StorageInitError,
};
use crate::domain::{
    CredentialRecord, FriendGroup, LocationFix, MemberLocation, Rect, StoredPassword, Username,
};

const USERS_FILE: &str = "users.json";
const LOCATIONS_FILE: &str = "locations.json";
const RECTS_FILE: &str = "rects.json";

/// Failures reading or writing the backing documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileStoreError {
    /// The data directory could not be created or opened.
    #[error("cannot open data directory {path}: {message}")]
    Directory { path: String, message: String },
    /// A document could not be read.
    #[error("cannot read {file}: {message}")]
    Read { file: String, message: String },
    /// A document was not valid JSON of the expected shape.
    #[error("malformed {file}: {message}")]
    Parse { file: String, message: String },
    /// A document could not be written.
    #[error("cannot write {file}: {message}")]
    Write { file: String, message: String },
}

impl FileStoreError {
    fn write(file: &str, err: impl ToString) -> Self {
        Self::Write {
            file: file.to_owned(),
            message: err.to_string(),
        }
    }
}

impl From<FileStoreError> for StorageInitError {
    fn from(err: FileStoreError) -> Self {
        Self::io(err.to_string())
    }
}

impl From<FileStoreError> for CredentialRepositoryError {
    fn from(err: FileStoreError) -> Self {
        Self::query(err.to_string())
    }
}

impl From<FileStoreError> for LocationRepositoryError {
    fn from(err: FileStoreError) -> Self {
        Self::query(err.to_string())
    }
}

impl From<FileStoreError> for GeofenceRepositoryError {
    fn from(err: FileStoreError) -> Self {
        Self::query(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLocation {
    friend_group: FriendGroup,
    location: LocationFix,
}

struct Documents {
    dir: Dir,
    users: BTreeMap<Username, CredentialRecord>,
    locations: BTreeMap<Username, StoredLocation>,
    rects: Vec<Rect>,
}

impl Documents {
    fn load(root: &Utf8Path) -> Result<Self, FileStoreError> {
        let directory_error = |err: io::Error| FileStoreError::Directory {
            path: root.to_string(),
            message: err.to_string(),
        };
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(directory_error)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(directory_error)?;

        let users = read_document(&dir, USERS_FILE)?;
        let locations = read_document(&dir, LOCATIONS_FILE)?;
        let rects = read_document(&dir, RECTS_FILE)?;
        Ok(Self {
            dir,
            users,
            locations,
            rects,
        })
    }
}

fn read_document<T>(dir: &Dir, file: &str) -> Result<T, FileStoreError>
where
    T: DeserializeOwned + Default,
{
    let raw = match dir.read_to_string(file) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(err) => {
            return Err(FileStoreError::Read {
                file: file.to_owned(),
                message: err.to_string(),
            });
        }
    };
    serde_json::from_str(&raw).map_err(|err| FileStoreError::Parse {
        file: file.to_owned(),
        message: err.to_string(),
    })
}

fn write_document<T: Serialize>(dir: &Dir, file: &str, value: &T) -> Result<(), FileStoreError> {
    let mut raw =
        serde_json::to_string_pretty(value).map_err(|err| FileStoreError::write(file, err))?;
    raw.push('\n');
    atomic_io::write_atomic(dir, file, &raw)
}

/// Storage backend persisting to JSON documents in a local directory.
pub struct JsonFileStorage {
    root: Utf8PathBuf,
    state: OnceCell<Mutex<Documents>>,
}

impl JsonFileStorage {
    /// Backend rooted at `root`. Nothing is touched until first use.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: OnceCell::new(),
        }
    }

    /// Directory holding the documents.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Lock the cache, loading it from disk on first access.
    async fn documents(&self) -> Result<MutexGuard<'_, Documents>, FileStoreError> {
        let state = self
            .state
            .get_or_try_init(|| async {
                let loaded = Documents::load(&self.root)?;
                debug!(
                    root = %self.root,
                    users = loaded.users.len(),
                    locations = loaded.locations.len(),
                    rects = loaded.rects.len(),
                    "loaded file store"
                );
                Ok::<_, FileStoreError>(Mutex::new(loaded))
            })
            .await?;
        Ok(state.lock().await)
    }
}

impl Documents {
    /// Apply `change` to a copy of the users map, persist, then commit.
    fn update_users<R>(
        &mut self,
        change: impl FnOnce(&mut BTreeMap<Username, CredentialRecord>) -> R,
    ) -> Result<R, FileStoreError> {
        let mut users = self.users.clone();
        let outcome = change(&mut users);
        write_document(&self.dir, USERS_FILE, &users)?;
        self.users = users;
        Ok(outcome)
    }
}

#[async_trait]
impl CredentialRepository for JsonFileStorage {
    async fn get_user_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<CredentialRecord>, CredentialRepositoryError> {
        let docs = self.documents().await?;
        Ok(docs.users.get(username).cloned())
    }

    async fn set_user_credentials(
        &self,
        username: &Username,
        digest: &str,
    ) -> Result<BindOutcome, CredentialRepositoryError> {
        let mut docs = self.documents().await?;
        let still_unset = docs
            .users
            .get(username)
            .is_some_and(|record| record.hashed_password.is_unset());
        if !still_unset {
            return Ok(BindOutcome::AlreadyBound);
        }
        docs.update_users(|users| {
            if let Some(record) = users.get_mut(username) {
                record.hashed_password = StoredPassword::from_stored(digest);
            }
        })?;
        Ok(BindOutcome::Bound)
    }

    async fn create_user(
        &self,
        username: &Username,
        friend_group: &FriendGroup,
    ) -> Result<(), CredentialRepositoryError> {
        let mut docs = self.documents().await?;
        if docs.users.contains_key(username) {
            return Err(CredentialRepositoryError::already_exists(username.as_str()));
        }
        docs.update_users(|users| {
            users.insert(
                username.clone(),
                CredentialRecord::provisioned(friend_group.clone()),
            );
        })?;
        info!(username = %username, friend_group = %friend_group, "user created");
        Ok(())
    }

    async fn reset_password(&self, username: &Username) -> Result<(), CredentialRepositoryError> {
        let mut docs = self.documents().await?;
        if !docs.users.contains_key(username) {
            return Err(CredentialRepositoryError::not_found(username.as_str()));
        }
        docs.update_users(|users| {
            if let Some(record) = users.get_mut(username) {
                record.hashed_password = StoredPassword::Unset;
            }
        })?;
        info!(username = %username, "password reset");
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for JsonFileStorage {
    async fn save_user_location(
        &self,
        username: &Username,
        friend_group: &FriendGroup,
        location: &LocationFix,
    ) -> Result<(), LocationRepositoryError> {
        let mut docs = self.documents().await?;
        let mut locations = docs.locations.clone();
        locations.insert(
            username.clone(),
            StoredLocation {
                friend_group: friend_group.clone(),
                location: location.clone(),
            },
        );
        write_document(&docs.dir, LOCATIONS_FILE, &locations)?;
        docs.locations = locations;
        Ok(())
    }

    async fn get_user_locations_in_group(
        &self,
        friend_group: &FriendGroup,
    ) -> Result<Vec<MemberLocation>, LocationRepositoryError> {
        let docs = self.documents().await?;
        Ok(docs
            .locations
            .iter()
            // Membership is read from users.json, not the group saved with the fix.
            .filter(|(username, _)| {
                docs.users
                    .get(*username)
                    .is_some_and(|record| record.friend_group == *friend_group)
            })
            .map(|(username, stored)| MemberLocation {
                username: username.clone(),
                location: stored.location.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl GeofenceRepository for JsonFileStorage {
    async fn save_rects(&self, rects: &[Rect]) -> Result<(), GeofenceRepositoryError> {
        let mut docs = self.documents().await?;
        write_document(&docs.dir, RECTS_FILE, &rects)?;
        docs.rects = rects.to_vec();
        Ok(())
    }

    async fn get_rects(&self) -> Result<Vec<Rect>, GeofenceRepositoryError> {
        let docs = self.documents().await?;
        Ok(docs.rects.clone())
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn initialize(&self) -> Result<(), StorageInitError> {
        drop(self.documents().await?);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
