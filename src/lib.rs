//! Gym Admin Dashboard Client Library
//!
//! A Rust client for the gym admin dashboard backend, providing staff
//! authentication, durable session restore, the session guard for
//! protected views, and member roster operations with statistics.

pub mod config;
pub mod error;

pub use gymdash_rust_auth as auth;
pub use gymdash_rust_members as members;

use reqwest::Client;

use crate::auth::{AuthClient, LoginResponse, ProfileStorage, SessionGuard, SessionStore, StoredProfile};
use crate::config::ClientOptions;
use crate::error::Error;
use crate::members::{MemberDirectory, MembersClient};

/// The main entry point for the gym dashboard client
pub struct GymDash {
    /// The base URL for the record service
    pub url: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Process-wide session store
    pub session: SessionStore,
    /// Auth client for login and token validation
    pub auth: AuthClient,
    /// Durable profile storage
    pub storage: ProfileStorage,
    /// Client options
    pub options: ClientOptions,
}

impl GymDash {
    /// Create a new client with default options
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the record service
    ///
    /// # Example
    ///
    /// ```
    /// use gymdash_rust::GymDash;
    ///
    /// let gymdash = GymDash::new("http://localhost:1337");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self::new_with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use gymdash_rust::{config::ClientOptions, GymDash};
    ///
    /// let options = ClientOptions::default().with_persist_session(false);
    /// let gymdash = GymDash::new_with_options("http://localhost:1337", options);
    /// ```
    pub fn new_with_options(base_url: &str, options: ClientOptions) -> Self {
        let http_client = match options.request_timeout {
            Some(timeout) => Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            None => Client::new(),
        };

        let session = SessionStore::new();
        let auth = AuthClient::new(base_url, http_client.clone());
        let storage = ProfileStorage::new(&options.storage_dir);

        Self {
            url: base_url.to_string(),
            http_client,
            session,
            auth,
            storage,
            options,
        }
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// Get a reference to the process-wide session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Create a members client bound to the session store
    pub fn members(&self) -> MembersClient {
        MembersClient::new(&self.url, self.http_client.clone(), self.session.clone())
    }

    /// Create a directory controller for the member-management view
    pub fn directory(&self) -> MemberDirectory {
        MemberDirectory::new(self.members())
    }

    /// Create a session guard for protected views
    ///
    /// Each protected view gets its own guard; they all share the same
    /// session store and storage, so one successful verification is
    /// visible to every other guard.
    pub fn guard(&self) -> SessionGuard<AuthClient> {
        SessionGuard::new(
            self.session.clone(),
            self.storage.clone(),
            self.auth.clone(),
        )
    }

    /// Sign in and populate the session store and durable storage
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, Error> {
        let response = self.auth.login(email, password).await?;

        self.session.set_profile(
            &response.details.name,
            &response.details.email,
            &response.details.profile_pic,
            &response.user_id,
            &response.role,
        );
        self.session.set_token(&response.token);
        self.session.set_authenticated(true);

        if self.options.persist_session {
            let profile = StoredProfile {
                name: response.details.name.clone(),
                email: response.details.email.clone(),
                token: response.token.clone(),
                user_id: response.user_id.clone(),
            };
            if !self.storage.save(&profile) {
                log::warn!("signed in but profile was not persisted; session will not survive a restart");
            }
        }

        Ok(response)
    }

    /// Sign out, clearing the session store and durable storage
    pub fn sign_out(&self) -> bool {
        auth::sign_out(&self.session, &self.storage)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::GymDash;
}
