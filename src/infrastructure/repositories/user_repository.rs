use crate::domain::library::{is_valid_username, PodcastStatus, Transition, User};
use crate::error::{AppError, AppResult};
use crate::infrastructure::scheduler::{JobOutcome, JobStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One JSON document per user under `dir`.
///
/// Every read-modify-write runs under a per-user async lock and replaces the
/// file atomically, so concurrent job completions for the same user never
/// lose each other's updates.
pub struct UserRepository {
    dir: PathBuf,
    locks: parking_lot::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Create an empty record
    pub async fn create(&self, username: &str) -> AppResult<User> {
        let path = self.path_for(username)?;
        let _guard = self.lock_user(username).await;

        if tokio::fs::try_exists(&path).await? {
            return Err(AppError::Conflict(format!("user {} exists", username)));
        }

        let user = User::new(username);
        self.write(&path, &user).await?;
        tracing::info!(username = %username, "User created");
        Ok(user)
    }

    /// Find user by name
    pub async fn find(&self, username: &str) -> AppResult<Option<User>> {
        let path = self.path_for(username)?;
        let _guard = self.lock_user(username).await;
        self.read(&path).await
    }

    /// Apply `change` to the stored record and persist it. `None` when the
    /// user does not exist.
    pub async fn update<T, F>(&self, username: &str, change: F) -> AppResult<Option<T>>
    where
        F: FnOnce(&mut User) -> T + Send,
        T: Send,
    {
        let path = self.path_for(username)?;
        let _guard = self.lock_user(username).await;

        let Some(mut user) = self.read(&path).await? else {
            return Ok(None);
        };
        let result = change(&mut user);
        self.write(&path, &user).await?;
        Ok(Some(result))
    }

    fn path_for(&self, username: &str) -> AppResult<PathBuf> {
        if !is_valid_username(username) {
            return Err(AppError::BadRequest(format!(
                "invalid username: {}",
                username
            )));
        }
        Ok(self.dir.join(format!("{}.json", username)))
    }

    async fn lock_user(&self, username: &str) -> UserLock<'_> {
        let lock = self
            .locks
            .lock()
            .entry(username.to_string())
            .or_default()
            .clone();
        UserLock {
            locks: &self.locks,
            username: username.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    async fn read(&self, path: &Path) -> AppResult<Option<User>> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| AppError::Internal(format!("corrupt user record {}: {}", path.display(), e)))
    }

    async fn write(&self, path: &Path, user: &User) -> AppResult<()> {
        let body = serde_json::to_vec_pretty(user)
            .map_err(|e| AppError::Internal(format!("failed to encode user record: {}", e)))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, body).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Held for one read-modify-write. The map entry is dropped with the last
/// holder or waiter.
struct UserLock<'a> {
    locks: &'a parking_lot::Mutex<HashMap<String, Arc<Mutex<()>>>>,
    username: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLock<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        drop(self.guard.take());
        if locks
            .get(&self.username)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.username);
        }
    }
}

#[async_trait]
impl JobStore for UserRepository {
    async fn complete_job(
        &self,
        owner: &str,
        job_id: &str,
        outcome: JobOutcome,
    ) -> anyhow::Result<()> {
        let (status, error) = match outcome {
            JobOutcome::Ready { .. } => (PodcastStatus::Ready, None),
            JobOutcome::Failed { error } => (PodcastStatus::Failed, Some(error)),
        };

        let transition = self
            .update(owner, |user| user.finish_podcast(job_id, status, error))
            .await?;

        match transition {
            Some(Transition::Applied) => Ok(()),
            Some(Transition::AlreadyFinal(existing)) => {
                tracing::warn!(owner, job_id, status = %existing, "Job already finished");
                Ok(())
            }
            Some(Transition::Missing) => anyhow::bail!("podcast {} no longer exists", job_id),
            None => anyhow::bail!("user {} no longer exists", owner),
        }
    }
}
