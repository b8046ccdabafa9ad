use crate::auth::TokenMaker;
use crate::store::Store;

/// Shared gateway state, built once at startup and injected into every
/// handler. There are no process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tokens: TokenMaker,
}

impl AppState {
    pub fn new(store: Store, tokens: TokenMaker) -> Self {
        Self { store, tokens }
    }
}
