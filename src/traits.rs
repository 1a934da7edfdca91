//! Shared trait abstractions

use crate::Result;

/// Components that carry a replaceable configuration
pub trait Configurable {
    type Config: Clone;

    fn config(&self) -> &Self::Config;

    /// Replaces the configuration; implementations validate first
    fn set_config(&mut self, config: Self::Config) -> Result<()>;

    fn validate_config(config: &Self::Config) -> Result<()> {
        let _ = config;
        Ok(())
    }

    /// Applies a partial change on a copy, validates it, then sets it
    fn update_config<F>(&mut self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Self::Config),
    {
        let mut config = self.config().clone();
        updater(&mut config);
        Self::validate_config(&config)?;
        self.set_config(config)
    }
}
