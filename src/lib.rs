pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod models;
pub mod resources;
pub mod services;
pub mod session;
pub mod view;

use std::sync::Arc;

pub use api::{ApiClient, HttpResourceClient, Transport};
pub use config::Config;
pub use controller::{FormController, ListController, ListState, LoadOutcome, Reconcile};
pub use error::{ClientError, ClientResult};
pub use services::{AdminService, AuthService, PayrollService};
pub use session::{FileSessionStore, MemorySessionStore, Route, SessionContext, SessionStore};

/// Everything a screen or command needs, wired once at startup.
pub struct AppContext {
    pub config: Config,
    pub api: ApiClient,
    pub session: SessionContext,
    pub auth: AuthService,
    pub admin: AdminService,
}

impl AppContext {
    /// Real HTTP transport and the file-backed session from `config`.
    pub fn from_config(config: Config) -> ClientResult<Self> {
        let api = ApiClient::http(&config)?;
        let session = SessionContext::new(Arc::new(FileSessionStore::new(&config.session_file)))?;
        Ok(Self::with_parts(config, api, session))
    }

    pub fn with_parts(config: Config, api: ApiClient, session: SessionContext) -> Self {
        Self {
            auth: AuthService::new(api.clone(), session.clone()),
            admin: AdminService::new(api.clone()),
            config,
            api,
            session,
        }
    }

    /// List controller for `resource`, honouring `?page=&limit=` from `location` when given.
    pub fn list<R: resources::Resource>(
        &self,
        resource: R,
        location: Option<&str>,
    ) -> ListController<R> {
        match location {
            Some(location) => {
                ListController::from_location(resource, self.api.clone(), &self.config, location)
            }
            None => ListController::new(resource, self.api.clone(), &self.config),
        }
    }

    pub fn payroll(&self, resource: resources::SalarySlipResource) -> PayrollService {
        PayrollService::new(self.api.clone(), resource)
    }
}
