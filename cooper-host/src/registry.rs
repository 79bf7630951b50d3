//! Named class registry for a host object model.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use cooper_core::{ClassDef, ClassNode, Composer, CooperConfig, Kwargs, Object};
use parking_lot::RwLock;

use crate::error::HostError;
use crate::mro::C3Linearizer;

/// Composes classes with C3 ordering and keeps them by name.
pub struct Host {
    composer: Composer<C3Linearizer>,
    classes: RwLock<BTreeMap<String, Arc<ClassNode>>>,
}

impl Host {
    pub fn new() -> Self {
        Self::with_config(CooperConfig::default())
    }

    pub fn with_config(config: CooperConfig) -> Self {
        Self {
            composer: Composer::with_config(C3Linearizer, config),
            classes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a host from a TOML settings file.
    pub fn from_config_file(path: &Path) -> Result<Self, HostError> {
        let config = CooperConfig::from_file(path).map_err(|report| HostError::Settings {
            message: report.to_string(),
        })?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &CooperConfig {
        self.composer.config()
    }

    /// Compose a cooperative class and register it under its name.
    pub fn define(&self, def: ClassDef) -> Result<Arc<ClassNode>, HostError> {
        self.ensure_free(def.name())?;
        let class = self.composer.compose(def)?;
        self.register(class)
    }

    /// Register a class that takes no part in cooperation.
    pub fn define_plain(&self, def: ClassDef) -> Result<Arc<ClassNode>, HostError> {
        self.ensure_free(def.name())?;
        let class = self.composer.define_plain(def)?;
        self.register(class)
    }

    pub fn class(&self, name: &str) -> Option<Arc<ClassNode>> {
        self.classes.read().get(name).cloned()
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<ClassNode>, HostError> {
        self.class(name).ok_or_else(|| HostError::UnknownClass {
            name: name.to_string(),
        })
    }

    /// Instantiate a registered class by name.
    pub fn instantiate(&self, name: &str, kwargs: Kwargs) -> Result<Object, HostError> {
        let class = self.lookup(name)?;
        Ok(class.instantiate(kwargs)?)
    }

    /// Registered class names in sorted order.
    pub fn classes(&self) -> Vec<String> {
        self.classes.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_free(&self, name: &str) -> Result<(), HostError> {
        if self.classes.read().contains_key(name) {
            return Err(HostError::DuplicateClass {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn register(&self, class: Arc<ClassNode>) -> Result<Arc<ClassNode>, HostError> {
        let mut classes = self.classes.write();
        if classes.contains_key(class.name()) {
            return Err(HostError::DuplicateClass {
                name: class.name().to_string(),
            });
        }
        tracing::debug!(class = class.name(), "registered class");
        classes.insert(class.name().to_string(), Arc::clone(&class));
        Ok(class)
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}
