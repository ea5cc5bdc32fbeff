use sk_config::SkillsmithConfig;
use sk_core::RegistryEntry;
use sk_health::HealthChecker;
use sk_registry::{RegistryError, RegistryUpdater};

/// Everything a command handler needs, built once per invocation.
pub struct AppContext {
    pub config: SkillsmithConfig,
    pub updater: RegistryUpdater,
}

impl AppContext {
    #[must_use]
    pub fn init(config: SkillsmithConfig) -> Self {
        let updater =
            RegistryUpdater::from_config(&config.registry, &config.runtime.script_extension);
        Self { config, updater }
    }

    #[must_use]
    pub fn checker(&self) -> HealthChecker {
        HealthChecker::new(self.config.registry.root.clone(), self.config.runtime.clone())
    }

    /// Registry snapshot for read-only consumers. A registry that was never
    /// written is empty; a corrupt one is still an error.
    pub fn snapshot(&self) -> Result<Vec<RegistryEntry>, RegistryError> {
        match self.updater.entries() {
            Err(RegistryError::Missing(path)) => {
                tracing::warn!(path = %path.display(), "no registry document; treating as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }
}
