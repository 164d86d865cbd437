#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use vertex_gateway::auth::TokenProvider;
use vertex_gateway::errors::GatewayError;

/// Hands out a fixed token and counts how often it was asked.
pub struct CountingTokenProvider {
    token: String,
    calls: Arc<AtomicUsize>,
}

impl CountingTokenProvider {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for CountingTokenProvider {
    async fn get_token(&self) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.token.clone())
    }
}

pub struct FailingTokenProvider;

#[async_trait]
impl TokenProvider for FailingTokenProvider {
    async fn get_token(&self) -> Result<String, GatewayError> {
        Err(GatewayError::AuthError(
            "could not refresh credentials".to_string(),
        ))
    }
}
