pub mod error;
pub mod prompt;
pub mod service;
pub mod sql;

pub use error::{AgentError, AgentResult};
pub use service::{AgentService, AskOutcome, CoreAgentService};
