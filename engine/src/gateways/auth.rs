use super::AuthGateway;
use crate::error::EngineError;
use shared::models::UserId;
use std::collections::HashMap;

/// Bearer tokens fixed at startup from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenAuth {
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        StaticTokenAuth { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[tonic::async_trait]
impl AuthGateway for StaticTokenAuth {
    async fn authenticate(&self, token: &str) -> Result<UserId, EngineError> {
        if token.is_empty() {
            return Err(EngineError::Unauthenticated("missing bearer token".to_string()));
        }
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| EngineError::Unauthenticated("unknown bearer token".to_string()))
    }
}
