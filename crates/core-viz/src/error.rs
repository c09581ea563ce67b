use snafu::prelude::*;

/// Rendering errors are logged and swallowed by the caller; they never fail
/// a request.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VizError {
    #[snafu(display("Chart rendering failed: {message}"))]
    Render { message: String },
}
