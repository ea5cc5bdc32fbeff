use anyhow::bail;
use sk_verify::{ServerType, VerificationHarness, VerificationInput};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::VerifyArgs;
use crate::commands::shared::parse::{inline_or_file, parse_enum};
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `skl verify`. Never touches the registry.
pub fn handle(args: &VerifyArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let server_type = parse_enum::<ServerType>(&args.server_type, "server type")?;
    let shell_output = inline_or_file(
        args.bash_output.as_deref(),
        args.bash_output_file.as_deref(),
        "shell output",
    )?;
    let execution_output = inline_or_file(
        args.execution_output.as_deref(),
        args.execution_output_file.as_deref(),
        "execution output",
    )?;

    let harness = VerificationHarness::new(&ctx.config.verify, ctx.config.runtime.clone())?;
    let spinner = args
        .skill_path
        .as_ref()
        .map(|path| Progress::spinner(&format!("running {}", path.display())));

    let report = harness.verify(&VerificationInput {
        shell_output: &shell_output,
        execution_output: &execution_output,
        server_type,
        script_path: args.skill_path.as_deref(),
    });
    if let Some(spinner) = spinner {
        spinner.finish_clear();
    }

    output(&report, flags.format)?;
    if !report.all_passed {
        bail!("verification failed: {}", report.failed().join(", "));
    }
    Ok(())
}
