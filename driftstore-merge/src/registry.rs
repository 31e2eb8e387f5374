//! Process-wide registry of named merge strategies.
//!
//! Attribute definitions that arrive by name (configuration, wire schemas)
//! resolve their strategy here. The built-ins are pre-registered; custom
//! strategies register once at startup, before any schema resolution.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use crate::error::{MergeError, MergeResult};
use crate::strategies::{LatestAttribute, LatestObject, Max, MergeStrategy};

static STRATEGIES: LazyLock<RwLock<HashMap<String, Arc<dyn MergeStrategy>>>> =
    LazyLock::new(|| {
        let mut map: HashMap<String, Arc<dyn MergeStrategy>> = HashMap::new();
        for strategy in [
            Arc::new(LatestObject) as Arc<dyn MergeStrategy>,
            Arc::new(LatestAttribute),
            Arc::new(Max),
        ] {
            map.insert(strategy.name().to_string(), strategy);
        }
        RwLock::new(map)
    });

/// Registers a custom strategy under its [`MergeStrategy::name`].
///
/// Re-registering a name replaces the previous entry; call this only during
/// the startup configuration phase.
pub fn register_strategy(strategy: Arc<dyn MergeStrategy>) {
    let mut map = STRATEGIES
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    map.insert(strategy.name().to_string(), strategy);
}

/// Resolves a strategy by name.
///
/// Fails with [`MergeError::InvalidStrategyType`] for unknown names.
pub fn strategy_named(name: &str) -> MergeResult<Arc<dyn MergeStrategy>> {
    let map = STRATEGIES
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    map.get(name)
        .cloned()
        .ok_or_else(|| MergeError::InvalidStrategyType(name.to_string()))
}
