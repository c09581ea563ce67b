use core_agent::AgentService;
use core_store::StoreService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn AgentService>,
    pub store: Arc<StoreService>,
}
