use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use tracing::{debug, warn};

use crate::models::auth::{AuthChangeEvent, AuthSession, AuthUser};
use crate::storage::SessionStorage;
use crate::utils::time::unix_now;

/// Callback invoked on every auth state change
pub type AuthCallback = Box<dyn Fn(AuthChangeEvent, Option<&AuthSession>) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(AuthChangeEvent, Option<&AuthSession>) + Send + Sync>;

#[derive(Default)]
struct ObserverList {
    next_id: u64,
    callbacks: Vec<(u64, SharedCallback)>,
}

/// Current session of one auth client plus the observers watching it.
///
/// The session is mirrored into [`SessionStorage`] under a fixed key so that a
/// fresh holder over the same storage picks it up again. Expired or
/// unreadable records are purged instead of trusted.
pub struct SessionHolder {
    storage: Arc<dyn SessionStorage>,
    key: String,
    state: RwLock<Option<AuthSession>>,
    observers: Arc<Mutex<ObserverList>>,
}

impl SessionHolder {
    /// Create a holder and restore any persisted session under `key`
    pub fn new(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        let holder = Self {
            storage,
            key: key.into(),
            state: RwLock::new(None),
            observers: Arc::new(Mutex::new(ObserverList::default())),
        };
        let restored = holder.load_persisted();
        *holder.state.write().unwrap_or_else(PoisonError::into_inner) = restored;
        holder
    }

    fn load_persisted(&self) -> Option<AuthSession> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read persisted session '{}': {}", self.key, e);
                return None;
            }
        };

        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) if !session.is_expired_at(unix_now()) => {
                debug!("Restored session for {}", session.user.email);
                Some(session)
            }
            Ok(_) => {
                debug!("Persisted session '{}' has expired, purging", self.key);
                self.purge();
                None
            }
            Err(e) => {
                warn!("Discarding unreadable session '{}': {}", self.key, e);
                self.purge();
                None
            }
        }
    }

    fn persist(&self, session: &AuthSession) {
        let result = serde_json::to_string(session)
            .map_err(crate::storage::StorageError::from)
            .and_then(|raw| self.storage.set_item(&self.key, &raw));
        if let Err(e) = result {
            warn!("Failed to persist session '{}': {}", self.key, e);
        }
    }

    fn purge(&self) {
        if let Err(e) = self.storage.remove_item(&self.key) {
            warn!("Failed to remove persisted session '{}': {}", self.key, e);
        }
    }

    /// The current session if it has not expired.
    ///
    /// An expired session is cleared and observers see `SIGNED_OUT`.
    pub fn current(&self) -> Option<AuthSession> {
        let now = unix_now();
        let expired = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            match state.as_ref().map(|session| session.is_expired_at(now)) {
                Some(false) => return state.clone(),
                Some(true) => state.take().is_some(),
                None => false,
            }
        };

        if expired {
            debug!("Session '{}' expired", self.key);
            self.purge();
            self.notify(AuthChangeEvent::SignedOut, None);
        }
        None
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.current().map(|session| session.user)
    }

    pub fn access_token(&self) -> Option<String> {
        self.current().map(|session| session.access_token)
    }

    /// Replace the session, persist it and notify `SIGNED_IN`
    pub fn set_session(&self, session: AuthSession) {
        self.persist(&session);
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        self.notify(AuthChangeEvent::SignedIn, Some(&session));
    }

    /// Drop the session, purge the record and notify `SIGNED_OUT`
    pub fn clear(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.purge();
        self.notify(AuthChangeEvent::SignedOut, None);
    }

    /// Register `callback` and invoke it once with the current state
    pub fn subscribe(&self, callback: AuthCallback) -> Subscription {
        // Read first so an expiry detected here is not also broadcast to the newcomer
        let current = self.current();
        let callback: SharedCallback = Arc::from(callback);
        let id = {
            let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
            observers.next_id += 1;
            let id = observers.next_id;
            observers.callbacks.push((id, Arc::clone(&callback)));
            id
        };

        match current.as_ref() {
            Some(session) => callback(AuthChangeEvent::SignedIn, Some(session)),
            None => callback(AuthChangeEvent::SignedOut, None),
        }

        Subscription {
            id,
            observers: Arc::downgrade(&self.observers),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .len()
    }

    fn notify(&self, event: AuthChangeEvent, session: Option<&AuthSession>) {
        let callbacks: Vec<SharedCallback> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        debug!("Auth state {} -> {} observer(s)", event, callbacks.len());
        for callback in callbacks {
            callback(event, session);
        }
    }
}

impl std::fmt::Debug for SessionHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHolder")
            .field("key", &self.key)
            .field("storage", &self.storage.storage_type())
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Handle returned by `on_auth_state_change`; dropping it detaches the callback
#[must_use = "dropping the subscription detaches the callback"]
pub struct Subscription {
    id: u64,
    observers: Weak<Mutex<ObserverList>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Detach the callback; calling it twice is harmless
    pub fn unsubscribe(&self) {
        if let Some(observers) = self.observers.upgrade() {
            let mut observers = observers.lock().unwrap_or_else(PoisonError::into_inner);
            observers.callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
