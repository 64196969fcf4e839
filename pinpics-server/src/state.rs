use std::sync::Arc;

use crate::db::Database;
use crate::session::SessionManager;
use crate::storage::ObjectStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_manager: SessionManager,
    pub store: Arc<dyn ObjectStore>,
    pub bcrypt_cost: u32,
    /// Mark session cookies `Secure`
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(db: Database, store: Arc<dyn ObjectStore>, bcrypt_cost: u32, secure_cookies: bool) -> Self {
        let session_manager = SessionManager::new(db.clone());
        Self {
            db,
            session_manager,
            store,
            bcrypt_cost,
            secure_cookies,
        }
    }

    /// Get authenticated user ID from session token
    pub fn get_authenticated_user_id_from_token(&self, token: &str) -> Option<i64> {
        self.session_manager.validate_session(token).ok()
    }
}
