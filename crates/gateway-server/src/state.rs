//! Shared handler state

use gateway_auth::TokenService;
use gateway_core::AuthorizationEngine;
use std::sync::Arc;

/// State cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    engine: AuthorizationEngine,
    tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(engine: AuthorizationEngine, tokens: TokenService) -> Self {
        Self {
            engine,
            tokens: Arc::new(tokens),
        }
    }

    pub fn engine(&self) -> &AuthorizationEngine {
        &self.engine
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}
