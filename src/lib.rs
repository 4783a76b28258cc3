pub mod api;
pub mod backend;
pub mod config;
pub mod domain;

use crate::api::auth::CredentialVerifier;
use crate::backend::ClusterBackend;
use std::sync::Arc;

pub struct AppState {
    pub backend: Arc<dyn ClusterBackend>,
    pub credentials: Arc<dyn CredentialVerifier>,
}
