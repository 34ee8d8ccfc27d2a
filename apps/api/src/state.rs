use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds no generator: each outline request builds its own from `config`,
/// so provider and template edits on disk apply to the next request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pooled HTTP client handed to every text-generation client.
    pub http: reqwest::Client,
}
