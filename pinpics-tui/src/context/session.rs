use pinpics_types::User;

/// Who is logged in, shared read-only with every view
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub user: Option<User>,
    /// Set while a login is waiting on the server
    pub user_loading: bool,
}

impl Session {
    pub fn set_user(&mut self, user: User) {
        log::info!("Session user set to {} (id {})", user.name, user.id);
        self.user = Some(user);
        self.user_loading = false;
    }

    pub fn clear(&mut self) {
        self.user = None;
        self.user_loading = false;
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn can_delete_posts(&self) -> bool {
        self.user.as_ref().is_some_and(User::can_delete_posts)
    }
}
