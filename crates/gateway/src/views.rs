//! In-memory view sessions
//!
//! Each session owns one [`CatalogView`]. Sessions idle longer than the
//! configured TTL are swept whenever the registry is touched. A session
//! whose lock is held is in use and is never swept.

use aixiv_catalog::view::{self, CatalogView, ViewSnapshot};
use aixiv_common::config::CatalogConfig;
use aixiv_common::errors::{AppError, Result};
use aixiv_common::{metrics, SubmissionSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

pub struct ViewSession {
    pub view: CatalogView,
    last_active: Instant,
}

impl ViewSession {
    fn new(view: CatalogView) -> Self {
        Self {
            view,
            last_active: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

pub type SharedSession = Arc<Mutex<ViewSession>>;

pub struct ViewRegistry {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    ttl: Duration,
    max_views: usize,
}

impl ViewRegistry {
    pub fn new(ttl: Duration, max_views: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_views,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(Duration::from_secs(config.view_ttl_secs), config.max_views)
    }

    /// Register a new session
    pub async fn create(&self, view: CatalogView) -> Result<(Uuid, SharedSession)> {
        let mut sessions = self.sessions.write().await;
        self.sweep(&mut sessions);

        if sessions.len() >= self.max_views {
            return Err(AppError::TooManyViews {
                limit: self.max_views,
            });
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(ViewSession::new(view)));
        sessions.insert(id, session.clone());
        metrics::record_open_views(sessions.len());

        tracing::info!(view_id = %id, open = sessions.len(), "View session created");
        Ok((id, session))
    }

    /// Look up a live session and mark it active
    pub async fn get(&self, id: Uuid) -> Result<SharedSession> {
        let session = {
            let mut sessions = self.sessions.write().await;
            self.sweep(&mut sessions);
            sessions.get(&id).cloned()
        };

        let session = session.ok_or_else(|| AppError::ViewNotFound { id: id.to_string() })?;
        session.lock().await.touch();
        Ok(session)
    }

    /// Drop a session, cancelling its fetch in flight
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let removed = {
            let mut sessions = self.sessions.write().await;
            let removed = sessions.remove(&id);
            metrics::record_open_views(sessions.len());
            removed
        };

        let session = removed.ok_or_else(|| AppError::ViewNotFound { id: id.to_string() })?;
        session.lock().await.view.abort();

        tracing::info!(view_id = %id, "View session removed");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, SharedSession>) {
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, session| match session.try_lock() {
            Ok(s) => s.last_active.elapsed() < ttl,
            Err(_) => true,
        });

        let swept = before - sessions.len();
        if swept > 0 {
            tracing::debug!(swept, open = sessions.len(), "Expired view sessions swept");
            metrics::record_open_views(sessions.len());
        }
    }
}

/// Run one fetch for `session` and return the resulting snapshot.
///
/// The session lock is released while the fetch is in flight, so a newer
/// request on the same view can supersede it.
pub async fn refresh(session: &SharedSession, source: &dyn SubmissionSource) -> ViewSnapshot {
    let ticket = {
        let mut s = session.lock().await;
        s.touch();
        s.view.begin_fetch()
    };

    let result = view::fetch(&ticket, source).await;

    let mut s = session.lock().await;
    s.view.complete(ticket, result);
    s.touch();
    s.view.snapshot()
}
