pub mod error;
pub mod provider;
pub mod providers;

pub use error::{ProviderError, ProviderResult};
pub use provider::{CompletionProvider, ProviderKind};
pub use providers::ProviderRegistry;
