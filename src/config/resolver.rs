//! Context-aware configuration resolution.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::context::ContextId;

use super::profile::{ConfigError, FingerprintConfig};

/// Maps execution contexts to their effective configuration.
///
/// One fallback configuration covers every context without an
/// override. All access goes through a single lock and hands out owned
/// copies, so readers never observe a partially applied update and
/// updates are atomic per call.
#[derive(Debug)]
pub struct ConfigResolver {
    inner: Mutex<ResolverState>,
}

#[derive(Debug)]
struct ResolverState {
    fallback: FingerprintConfig,
    overrides: HashMap<ContextId, FingerprintConfig>,
}

impl ConfigResolver {
    /// Creates a resolver with the built-in default as its fallback.
    pub fn new() -> Self {
        Self::with_fallback(FingerprintConfig::default())
    }

    /// Creates a resolver with an explicit fallback configuration.
    ///
    /// The fallback is stored as given even if invalid; invalid values
    /// are only rejected at the update operations.
    pub fn with_fallback(fallback: FingerprintConfig) -> Self {
        Self {
            inner: Mutex::new(ResolverState {
                fallback,
                overrides: HashMap::new(),
            }),
        }
    }

    /// Returns the effective configuration for a context.
    ///
    /// Contexts without an override resolve to the fallback. The copy
    /// is detached: mutating it does not affect the resolver.
    pub fn resolve(&self, ctx: ContextId) -> FingerprintConfig {
        let state = self.inner.lock();
        state
            .overrides
            .get(&ctx)
            .unwrap_or(&state.fallback)
            .clone()
    }

    /// Returns the fallback configuration.
    pub fn default_config(&self) -> FingerprintConfig {
        self.inner.lock().fallback.clone()
    }

    /// Installs a per-context override after validating it.
    ///
    /// On failure nothing is stored and the first violation is
    /// returned; the full list is logged.
    pub fn set_for_context(
        &self,
        ctx: ContextId,
        config: FingerprintConfig,
    ) -> Result<(), ConfigError> {
        Self::check(&config)?;
        debug!(context = %ctx, profile = %config.profile_name, "context configuration updated");
        self.inner.lock().overrides.insert(ctx, config);
        Ok(())
    }

    /// Replaces the fallback configuration after validating it.
    pub fn set_default(&self, config: FingerprintConfig) -> Result<(), ConfigError> {
        Self::check(&config)?;
        debug!(profile = %config.profile_name, "fallback configuration updated");
        self.inner.lock().fallback = config;
        Ok(())
    }

    /// Drops a per-context override; the context reverts to the
    /// fallback. Removing an unknown context is a no-op.
    pub fn remove_for_context(&self, ctx: ContextId) {
        if self.inner.lock().overrides.remove(&ctx).is_some() {
            debug!(context = %ctx, "context configuration removed");
        }
    }

    /// Number of contexts with an override installed.
    pub fn override_count(&self) -> usize {
        self.inner.lock().overrides.len()
    }

    fn check(config: &FingerprintConfig) -> Result<(), ConfigError> {
        let errors = config.validation_errors();
        if let Some(first) = errors.first() {
            warn!(
                profile = %config.profile_name,
                violations = errors.len(),
                error = %first,
                "rejected invalid configuration"
            );
            for error in &errors {
                debug!(%error, "configuration violation");
            }
            return Err(first.clone());
        }
        Ok(())
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}
