use std::sync::Arc;

use auth::{Credentials, ResetFlow, ResetNotifier, TokenIssuer};
use config::Config;
use store::{CredentialStore, TodoStore};

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod store;
pub mod utils;

pub use router::create_router;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: Credentials,
    pub tokens: TokenIssuer,
    pub resets: ResetFlow,
    pub todos: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new<S>(
        config: Config,
        store: Arc<S>,
        notifier: Arc<dyn ResetNotifier>,
    ) -> Result<Self, bcrypt::BcryptError>
    where
        S: CredentialStore + TodoStore + 'static,
    {
        let credentials = Credentials::new(store.clone(), config.bcrypt_cost)?;
        let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_expiration());
        let resets = ResetFlow::new(
            store.clone(),
            credentials.clone(),
            notifier,
            config.reset_token_expiration(),
            config.reset_link_base.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            credentials,
            tokens,
            resets,
            todos: store,
        })
    }
}
