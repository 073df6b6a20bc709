use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::quiz::session::QuizSession;

/// In-memory registry of open quiz sessions. Sessions idle for longer than
/// the TTL are closed and dropped by the sweeper.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<QuizSession>>>,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub async fn insert(&self, session: Arc<QuizSession>) {
        self.sessions.write().await.insert(session.id(), session);
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<QuizSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Removes and closes the session.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.close().await;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Closes every session idle for longer than the TTL. Returns how many were evicted.
    pub async fn evict_idle(&self) -> usize {
        let expired: Vec<Arc<QuizSession>> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .values()
                .filter(|s| s.idle_for() > self.idle_ttl)
                .map(|s| s.id())
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            session.close().await;
        }
        expired.len()
    }

    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = self.evict_idle().await;
                if evicted > 0 {
                    info!(evicted, "evicted idle quiz sessions");
                }
            }
        })
    }
}
