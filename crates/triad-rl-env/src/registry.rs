//! Environment registry for creating environments by name

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use triad_rl_core::{Environment, EnvironmentConfig, RLError, Result};

use crate::classic::{CartPoleConfig, CartPoleEnv};

/// Boxed environment constructor
pub type EnvConstructor =
    Arc<dyn Fn(EnvironmentConfig) -> Result<Box<dyn Environment>> + Send + Sync>;

lazy_static::lazy_static! {
    static ref REGISTRY: Mutex<EnvRegistry> = Mutex::new(EnvRegistry::with_defaults());
}

/// Named environment constructors
pub struct EnvRegistry {
    /// Registered environments
    envs: HashMap<String, EnvConstructor>,
}

impl EnvRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            envs: HashMap::new(),
        }
    }

    /// Registry with the built-in classic control environments
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("CartPole-v0", |config| {
            Ok(Box::new(CartPoleEnv::new(config)) as Box<dyn Environment>)
        });
        registry.register("CartPole-v1", |config| {
            let physics = CartPoleConfig {
                max_steps: 500,
                ..CartPoleConfig::default()
            };
            Ok(Box::new(CartPoleEnv::with_physics(config, physics)) as Box<dyn Environment>)
        });
        registry
    }

    /// Register an environment
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(EnvironmentConfig) -> Result<Box<dyn Environment>> + Send + Sync + 'static,
    {
        self.envs.insert(name.into(), Arc::new(constructor));
    }

    /// Look up the constructor for `name`
    pub fn constructor(&self, name: &str) -> Result<EnvConstructor> {
        self.envs
            .get(name)
            .cloned()
            .ok_or_else(|| RLError::Environment(format!("Unknown environment: {name}")))
    }

    /// List registered environments
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.envs.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for EnvRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn global() -> Result<std::sync::MutexGuard<'static, EnvRegistry>> {
    REGISTRY
        .lock()
        .map_err(|_| RLError::Environment("environment registry poisoned".into()))
}

/// Register an environment globally
pub fn register_env<F>(name: impl Into<String>, constructor: F) -> Result<()>
where
    F: Fn(EnvironmentConfig) -> Result<Box<dyn Environment>> + Send + Sync + 'static,
{
    global()?.register(name, constructor);
    Ok(())
}

/// Constructor registered under `name`, usable without holding the registry lock
pub fn env_constructor(name: &str) -> Result<EnvConstructor> {
    global()?.constructor(name)
}

/// List all registered environments
pub fn list_envs() -> Result<Vec<String>> {
    Ok(global()?.list())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_constructor() {
        let make = env_constructor("CartPole-v0").unwrap();
        let mut env = make(EnvironmentConfig::seeded(0)).unwrap();
        assert_eq!(env.observation_dim(), 4);
        assert_eq!(env.action_count(), 2);
        assert_eq!(env.reset().await.unwrap().len(), 4);
    }

    #[test]
    fn test_unknown_environment() {
        let err = env_constructor("Pendulum-v1").err().unwrap();
        assert!(matches!(err, RLError::Environment(_)));
    }

    #[test]
    fn test_register_custom() {
        register_env("CartPole-short", |config| {
            let physics = CartPoleConfig {
                max_steps: 10,
                ..CartPoleConfig::default()
            };
            Ok(Box::new(CartPoleEnv::with_physics(config, physics)) as Box<dyn Environment>)
        })
        .unwrap();
        assert!(list_envs().unwrap().contains(&"CartPole-short".to_string()));
        assert!(env_constructor("CartPole-short").is_ok());
    }
}
