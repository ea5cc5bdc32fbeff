use sk_strategy::StrategyEngine;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StrategyArgs;
use crate::commands::shared::requirements;
use crate::context::AppContext;
use crate::output::output;

/// Handle `skl strategy`. Always succeeds once a decision is made.
pub fn handle(args: &StrategyArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let requirements = requirements::from_args(&args.requirements)?;
    let entries = ctx.snapshot()?;
    let engine = StrategyEngine::with_config(ctx.config.matching.clone(), ctx.checker());

    let decision = engine.decide(args.skill.trim(), &requirements, &entries);
    output(&decision, flags.format)
}
