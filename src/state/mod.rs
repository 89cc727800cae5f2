pub mod pending;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock, watch};

use crate::{
    config::AppConfig,
    dao::hunt_store::HuntStore,
    error::ServiceError,
    progress::{ProgressController, redemption::RedemptionCodeGenerator},
};

pub use self::pending::{PendingUnlock, PendingUnlocks};

pub type SharedState = Arc<AppState>;

/// Central application state storing the storage handle and per-player runtime data.
pub struct AppState {
    hunt_store: RwLock<Option<Arc<dyn HuntStore>>>,
    degraded: watch::Sender<bool>,
    pending_unlocks: PendingUnlocks,
    question_writes: Mutex<()>,
    controller: ProgressController,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let controller =
            ProgressController::new(RedemptionCodeGenerator::new(config.redemption_prefix()));
        Arc::new(Self {
            hunt_store: RwLock::new(None),
            degraded: degraded_tx,
            pending_unlocks: PendingUnlocks::default(),
            question_writes: Mutex::new(()),
            controller,
            config,
        })
    }

    /// Obtain a handle to the current hunt store, if one is installed.
    pub async fn hunt_store(&self) -> Option<Arc<dyn HuntStore>> {
        let guard = self.hunt_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store, or [`ServiceError::Degraded`] when storage is down.
    pub async fn require_hunt_store(&self) -> Result<Arc<dyn HuntStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.hunt_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new hunt store implementation and leave degraded mode.
    pub async fn install_hunt_store(&self, store: Arc<dyn HuntStore>) {
        {
            let mut guard = self.hunt_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Answers accepted but still waiting for their unlock code.
    pub fn pending_unlocks(&self) -> &PendingUnlocks {
        &self.pending_unlocks
    }

    /// Held by admin writes between the order-uniqueness check and the save.
    pub async fn lock_question_writes(&self) -> MutexGuard<'_, ()> {
        self.question_writes.lock().await
    }

    /// Progress decision engine.
    pub fn controller(&self) -> &ProgressController {
        &self.controller
    }

    /// Runtime configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::hunt_store::memory::MemoryHuntStore;

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_hunt_store().await,
            Err(ServiceError::Degraded)
        ));

        let mut watcher = state.degraded_watcher();
        state
            .install_hunt_store(Arc::new(MemoryHuntStore::new()))
            .await;
        assert!(!state.is_degraded());
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());
        assert!(state.require_hunt_store().await.is_ok());
    }

    #[tokio::test]
    async fn degraded_flag_gates_an_installed_store() {
        let state = AppState::new(AppConfig::default());
        state
            .install_hunt_store(Arc::new(MemoryHuntStore::new()))
            .await;

        state.update_degraded(true);
        assert!(matches!(
            state.require_hunt_store().await,
            Err(ServiceError::Degraded)
        ));
    }
}
