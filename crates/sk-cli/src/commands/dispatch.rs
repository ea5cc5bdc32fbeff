use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(command: &Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Health(args) => commands::health::handle(args, ctx, flags),
        Commands::Index { action } => commands::index::handle(action, ctx, flags),
        Commands::Match(args) => commands::match_cmd::handle(args, ctx, flags),
        Commands::Strategy(args) => commands::strategy::handle(args, ctx, flags),
        Commands::Verify(args) => commands::verify::handle(args, ctx, flags),
        Commands::Schema(args) => commands::schema::handle(args, flags),
    }
}
