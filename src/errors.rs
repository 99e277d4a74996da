//! Error Types
//!
//! The main error type [`SumiError`] covers the failure modes of the material
//! core. Note that "not ready" (a blocking texture still loading, a program
//! still compiling) is deliberately *not* an error: callers observe it through
//! [`Resolution::NotReady`](crate::pipeline::flags::Resolution) or an
//! `Ok(false)` readiness poll and simply retry next frame.

use thiserror::Error;

/// The main error type for the Sumi material core.
#[derive(Error, Debug)]
pub enum SumiError {
    /// Shader template rendering failed (missing template, syntax error).
    #[error("Shader template error: {0}")]
    ShaderTemplate(String),

    /// Program compilation failed and the fallback ladder is exhausted.
    ///
    /// `attempted` lists the canonical flag string of every variant that was
    /// tried, in order, so the diagnostic identifies exactly which feature
    /// combinations the backend rejected.
    #[error("Shader compilation failed after exhausting fallbacks; attempted variants: {attempted:?}")]
    ShaderCompileExhausted {
        /// Canonical flag strings, first attempt first.
        attempted: Vec<String>,
    },

    /// JSON (de)serialization error for the parameter store.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, SumiError>`.
pub type Result<T> = std::result::Result<T, SumiError>;
