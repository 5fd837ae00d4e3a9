//! Shared handler state.

use std::sync::Arc;

use peruser_perms::Gate;
use peruser_store::RecordStore;

use crate::config::ServiceDescriptor;

/// Everything a request needs, passed explicitly into route registration.
///
/// Cloned per request; all fields are shared handles. The store is the only
/// state shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub gate: Gate,
    pub service: Option<Arc<ServiceDescriptor>>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, gate: Gate) -> Self {
        Self {
            store,
            gate,
            service: None,
        }
    }

    pub fn with_service(mut self, service: ServiceDescriptor) -> Self {
        self.service = Some(Arc::new(service));
        self
    }
}
