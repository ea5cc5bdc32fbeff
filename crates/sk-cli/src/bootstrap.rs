use std::path::Path;

use anyhow::Context;
use sk_config::SkillsmithConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then layered configuration, then apply `--registry`.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<SkillsmithConfig> {
    load_dotenv(flags.registry.as_deref())?;

    let mut config = SkillsmithConfig::load().context("failed to load skillsmith configuration")?;
    if let Some(root) = &flags.registry {
        config.registry = config.registry.with_root(root);
    }
    tracing::debug!(
        registry = %config.registry.index_path().display(),
        runtime = %config.runtime.program,
        "configuration loaded"
    );
    Ok(config)
}

/// A `.env` beside an explicit registry root wins over one in the working directory.
fn load_dotenv(registry: Option<&Path>) -> anyhow::Result<()> {
    let candidates = registry
        .map(|root| root.join(".env"))
        .into_iter()
        .chain(std::env::current_dir().ok().map(|cwd| cwd.join(".env")));

    for env_path in candidates {
        if env_path.is_file() {
            dotenvy::from_path(&env_path)
                .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
            return Ok(());
        }
    }
    Ok(())
}
