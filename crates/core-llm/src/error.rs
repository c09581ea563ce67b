use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProviderError {
    #[snafu(display("Provider {provider} unavailable: {message}"))]
    Unavailable { provider: String, message: String },

    #[snafu(display("Provider {provider} rejected the request credentials"))]
    Auth { provider: String },

    #[snafu(display("Provider {provider} rate limit exceeded"))]
    RateLimited { provider: String },

    #[snafu(display("Provider {provider} request failed with status {status}: {message}"))]
    RequestFailed {
        provider: String,
        status: u16,
        message: String,
    },

    #[snafu(display("Provider {provider} returned an unexpected response: {message}"))]
    MalformedResponse { provider: String, message: String },

    #[snafu(display("Provider {provider} is not configured: missing API key"))]
    MissingCredentials { provider: String },

    #[snafu(display("Cannot build HTTP client: {source}"))]
    HttpClient { source: reqwest::Error },
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
