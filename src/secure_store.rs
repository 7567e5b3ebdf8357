// Secure credential store collaborator. Platform implementations wrap an
// encrypted keystore; the core never inspects the encryption scheme, it only
// persists and retrieves the token and a minimal profile.

use parking_lot::Mutex;

use crate::models::StoredUser;

pub trait SecureStore: Send + Sync + 'static {
    fn save_token(&self, token: &str);
    fn get_token(&self) -> Option<String>;
    fn clear_token(&self);

    fn save_user(&self, user: &StoredUser);
    fn get_user(&self) -> Option<StoredUser>;
    fn clear_user(&self);
}

// Plain in-memory store. Useful for tests and for embedders that have no
// platform keystore; offers no at-rest protection.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Slots>,
}

#[derive(Default)]
struct Slots {
    token: Option<String>,
    user: Option<StoredUser>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecureStore for MemoryStore {
    fn save_token(&self, token: &str) {
        self.inner.lock().token = Some(token.to_string());
    }

    fn get_token(&self) -> Option<String> {
        self.inner.lock().token.clone()
    }

    fn clear_token(&self) {
        self.inner.lock().token = None;
    }

    fn save_user(&self, user: &StoredUser) {
        self.inner.lock().user = Some(user.clone());
    }

    fn get_user(&self) -> Option<StoredUser> {
        self.inner.lock().user.clone()
    }

    fn clear_user(&self) {
        self.inner.lock().user = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_token_and_user() {
        let store = MemoryStore::new();
        assert!(store.get_token().is_none());

        store.save_token("tok-1");
        store.save_user(&StoredUser {
            id: "u1".to_string(),
            first_name: Some("Rosa".to_string()),
            last_name: None,
            phone_number: None,
        });

        assert_eq!(store.get_token().as_deref(), Some("tok-1"));
        assert_eq!(store.get_user().map(|u| u.id), Some("u1".to_string()));

        store.clear_token();
        store.clear_user();
        assert!(store.get_token().is_none());
        assert!(store.get_user().is_none());
    }
}
