use axum::extract::FromRef;
use helm_domain::config::ApiConfig;
use helm_settings::ConfigStore;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub store: ConfigStore,
}

/// Shared request state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn new(config: ApiConfig, store: ConfigStore) -> Self {
        Self { inner: Arc::new(ApiStateInner { config, store }) }
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for ConfigStore {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.store.clone()
    }
}
