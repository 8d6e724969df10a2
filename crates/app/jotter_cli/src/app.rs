//! Per-invocation wiring: storage, session, API client and manager.

use std::sync::Arc;

use jotter_api_client::{ApiClient, ClientConfig};
use jotter_core::models::session::Session;
use jotter_core::notify::NotificationDispatcher;
use jotter_core::session::guard::{Access, GuardDecision, Route, RouteGuard};
use jotter_core::session::manager::SessionManager;
use jotter_core::session::storage::FileStore;
use jotter_core::session::store::SessionStore;
use log::debug;

use crate::cli::Cli;
use crate::{Error, Result};

pub struct App {
    pub store: Arc<SessionStore>,
    pub client: ApiClient,
    pub manager: Arc<SessionManager>,
}

impl App {
    pub fn open(args: &Cli) -> Result<Self> {
        let storage = match &args.data_dir {
            Some(dir) => FileStore::in_dir(dir),
            None => FileStore::default_location(),
        };
        debug!("session file: {}", storage.path().display());

        let store = Arc::new(SessionStore::open(
            Arc::new(storage),
            NotificationDispatcher::new(),
        ));

        let mut config = ClientConfig::from_env();
        if let Some(url) = &args.api_url {
            config.base_url = url.clone();
        }
        let client = ApiClient::new(&config, Arc::clone(&store))?;
        let manager = Arc::new(SessionManager::new(
            Arc::clone(&store),
            Arc::new(client.clone()),
        ));

        Ok(Self {
            store,
            client,
            manager,
        })
    }

    /// Resolve a restored session, then apply the route guard.
    pub async fn require(&self, access: Access) -> Result<Session> {
        if self.store.snapshot().is_loading() {
            self.manager.validate().await;
        }

        let session = self.store.snapshot();
        match RouteGuard::decide(&session, access) {
            GuardDecision::Render => Ok(session),
            GuardDecision::Redirect(Route::Login) | GuardDecision::Loading => Err(Error::custom(
                "Not signed in. Run `jotter login` first.",
            )),
            GuardDecision::Redirect(route) => Err(Error::custom(format!(
                "This command needs the ADMIN role (current home is {route}). Try `jotter switch-role ADMIN`."
            ))),
        }
    }
}
