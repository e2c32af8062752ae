use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{FlowError, Result};

/// Key/value store shared by the tasks of one pipeline run
#[derive(Clone, Debug, Default)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, key: impl Into<String>, value: impl serde::Serialize) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| FlowError::ContextError(format!("cannot store '{}': {}", key, e)))?;
        self.data.insert(key, value);
        Ok(())
    }

    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Like [`Context::get`], but a missing or mistyped value is an error.
    pub async fn require<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.get(key)
            .await
            .ok_or_else(|| FlowError::ContextError(format!("'{}' not found in context", key)))
    }
}
