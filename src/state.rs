use std::sync::Arc;

use crate::service::PersonService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PersonService>,
}

impl AppState {
    pub fn new(service: Arc<PersonService>) -> Self {
        Self { service }
    }
}
