use crate::config::Config;
use crate::tailoring::TailorService;

/// Shared application state injected into route handlers via Axum extractors.
/// The tailor service carries the model client; both are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub tailor: TailorService,
    pub config: Config,
}
