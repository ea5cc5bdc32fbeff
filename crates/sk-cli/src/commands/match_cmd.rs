use std::fmt::Write as _;

use anyhow::bail;
use serde::Serialize;
use serde_json::{Value, json};
use sk_core::MatchResult;
use sk_match::SemanticMatcher;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::MatchArgs;
use crate::commands::shared::requirements;
use crate::context::AppContext;
use crate::output::{Report, output};

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub matched: bool,
    pub min_score: u32,
    pub best: Option<MatchResult>,
    /// Every pre-filtered candidate, when requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<MatchResult>,
}

impl Report for MatchResponse {
    fn text(&self) -> String {
        let mut out = match &self.best {
            Some(best) => {
                let mut out = format!(
                    "Best match: {} (score {})\n  script: {}\n",
                    best.entry.name, best.score, best.entry.script_path
                );
                for reason in &best.matched_reasons {
                    let _ = writeln!(out, "    - {reason}");
                }
                out
            }
            None => format!("No skill scored at least {}\n", self.min_score),
        };
        if !self.candidates.is_empty() {
            out.push_str("Candidates:\n");
            for candidate in &self.candidates {
                let _ = writeln!(out, "  {:>3}  {}", candidate.score, candidate.entry.name);
            }
        }
        out.trim_end().to_string()
    }

    fn table_value(&self) -> anyhow::Result<Value> {
        let rows = if self.candidates.is_empty() {
            self.best.iter().collect::<Vec<_>>()
        } else {
            self.candidates.iter().collect()
        };
        Ok(Value::Array(
            rows.into_iter()
                .map(|result| {
                    json!({
                        "skill": result.entry.name,
                        "score": result.score,
                        "reasons": result.matched_reasons,
                    })
                })
                .collect(),
        ))
    }
}

/// Handle `skl match`.
pub fn handle(args: &MatchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let requirements = requirements::from_args(&args.requirements)?;
    let entries = ctx.snapshot()?;
    let matcher = SemanticMatcher::new(ctx.config.matching.clone());

    let best = matcher.find_matching_skill(&entries, &requirements);
    let candidates = if args.all {
        matcher.rank(&entries, &requirements)
    } else {
        Vec::new()
    };
    let response = MatchResponse {
        matched: best.is_some(),
        min_score: matcher.config().min_score,
        best,
        candidates,
    };

    output(&response, flags.format)?;
    if !response.matched {
        bail!(
            "no {} skill for '{}' scored at least {}",
            requirements.data_type,
            requirements.topic,
            response.min_score
        );
    }
    Ok(())
}
