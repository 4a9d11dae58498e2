//! Live deployments: concurrent map access via DashMap, one async lock per record.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use deployiq_core::models::DeploymentAttempt;

/// A live attempt and the checkout its fixes run in.
#[derive(Debug, Clone)]
pub struct TrackedDeployment {
    pub attempt: DeploymentAttempt,
    pub working_dir: PathBuf,
}

pub type DeploymentHandle = Arc<Mutex<TrackedDeployment>>;

/// The map shards its own locking; callers hold a record's mutex for the
/// whole of one mutation, so two reports for the same id never interleave.
#[derive(Default)]
pub struct ActiveDeployments {
    entries: DashMap<String, DeploymentHandle>,
}

impl ActiveDeployments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deployment. Returns false if the id is already live.
    pub fn insert(&self, tracked: TrackedDeployment) -> bool {
        let id = tracked.attempt.deployment_id.clone();
        match self.entries.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(tracked)));
                true
            }
        }
    }

    /// Clone the handle out so no map guard is held across an await.
    pub fn handle(&self, deployment_id: &str) -> Option<DeploymentHandle> {
        self.entries.get(deployment_id).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, deployment_id: &str) -> bool {
        self.entries.contains_key(deployment_id)
    }

    pub fn remove(&self, deployment_id: &str) -> Option<DeploymentHandle> {
        self.entries.remove(deployment_id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every handle, sorted by id.
    pub fn handles(&self) -> Vec<(String, DeploymentHandle)> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(id: &str) -> TrackedDeployment {
        TrackedDeployment {
            attempt: DeploymentAttempt::new(id, "production"),
            working_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn insert_refuses_duplicate_ids() {
        let active = ActiveDeployments::new();
        assert!(active.insert(tracked("a")));
        assert!(!active.insert(tracked("a")));
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn handles_share_one_record() {
        let active = ActiveDeployments::new();
        active.insert(tracked("a"));
        let first = active.handle("a").unwrap();
        first.lock().await.attempt.environment = "staging".into();
        let second = active.handle("a").unwrap();
        assert_eq!(second.lock().await.attempt.environment, "staging");

        assert!(active.remove("a").is_some());
        assert!(active.handle("a").is_none());
        assert!(active.is_empty());
    }
}
