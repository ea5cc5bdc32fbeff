//! Ordered decision list: the first matching rule wins.
//!
//! | # | Condition                                   | Strategy |
//! |---|---------------------------------------------|----------|
//! | 1 | exact name, healthy                         | REUSE    |
//! | 2 | exact name, degraded                        | ADAPT    |
//! | 3 | exact name, broken                          | CREATE   |
//! | 4 | semantic match >= threshold and healthy     | ADAPT    |
//! | 5 | otherwise                                   | CREATE   |

use sk_config::MatchingConfig;
use sk_core::{
    HealthReport, HealthStatus, MatchResult, RegistryEntry, Requirements, Strategy,
    StrategyDecision,
};
use sk_health::HealthProbe;
use sk_match::SemanticMatcher;
use tracing::info;

use crate::reference::{Reference, select_reference};

pub struct StrategyEngine<P> {
    matcher: SemanticMatcher,
    probe: P,
}

impl<P: HealthProbe> StrategyEngine<P> {
    #[must_use]
    pub const fn new(matcher: SemanticMatcher, probe: P) -> Self {
        Self { matcher, probe }
    }

    #[must_use]
    pub fn with_config(config: MatchingConfig, probe: P) -> Self {
        Self::new(SemanticMatcher::new(config), probe)
    }

    /// Decide how to satisfy a request for `skill` against a registry snapshot.
    ///
    /// Health is computed on the spot for the exact-name entry and for a
    /// semantic candidate; stored health is not trusted.
    #[must_use]
    pub fn decide(
        &self,
        skill: &str,
        requirements: &Requirements,
        entries: &[RegistryEntry],
    ) -> StrategyDecision {
        let decision = match entries.iter().find(|entry| entry.name == skill) {
            Some(entry) => self.decide_exact(entry, requirements, entries),
            None => self.decide_without_exact(skill, requirements, entries),
        };
        info!(
            skill = %skill,
            strategy = %decision.strategy,
            reference = decision.reference_entry.as_deref(),
            "strategy decided"
        );
        decision
    }

    fn decide_exact(
        &self,
        entry: &RegistryEntry,
        requirements: &Requirements,
        entries: &[RegistryEntry],
    ) -> StrategyDecision {
        let report = self.probe.probe(entry);
        match report.status {
            HealthStatus::Healthy => reuse(entry, &report),
            HealthStatus::Degraded => adapt_in_place(entry, report),
            HealthStatus::Broken => {
                let reference = self.reference(requirements, entries, Some(&entry.name));
                recreate_broken(entry, &report, reference)
            }
        }
    }

    fn decide_without_exact(
        &self,
        skill: &str,
        requirements: &Requirements,
        entries: &[RegistryEntry],
    ) -> StrategyDecision {
        let threshold = self.matcher.config().adapt_threshold;
        if let Some(candidate) = self
            .matcher
            .find_matching_skill(entries, requirements)
            .filter(|candidate| candidate.score >= threshold)
        {
            let report = self.probe.probe(&candidate.entry);
            if report.status == HealthStatus::Healthy {
                return fork(skill, requirements, &candidate);
            }
        }

        let reference = self.reference(requirements, entries, None);
        create(skill, requirements, reference)
    }

    fn reference(
        &self,
        requirements: &Requirements,
        entries: &[RegistryEntry],
        exclude: Option<&str>,
    ) -> Option<Reference> {
        let profile = self
            .matcher
            .config()
            .profile(requirements.data_type.as_str());
        let sources = self.matcher.requested_sources(requirements);
        select_reference(&profile, &sources, entries, exclude)
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

fn reuse(entry: &RegistryEntry, report: &HealthReport) -> StrategyDecision {
    StrategyDecision {
        strategy: Strategy::Reuse,
        target_entry: Some(entry.name.clone()),
        reference_entry: None,
        reason: format!("'{}' exists and is healthy", entry.name),
        action_plan: vec![format!(
            "Invoke the existing script unmodified: {}",
            entry.script_path
        )],
        health_status: Some(report.status),
        match_score: None,
    }
}

fn adapt_in_place(entry: &RegistryEntry, report: HealthReport) -> StrategyDecision {
    let mut action_plan = report.recommendations;
    action_plan.push("Re-verify after fixes".to_string());
    action_plan.push("Refresh registry health".to_string());

    let reason = if report.issues.is_empty() {
        format!("'{}' exists but is degraded", entry.name)
    } else {
        format!(
            "'{}' exists but is degraded: {}",
            entry.name,
            report.issues.join("; ")
        )
    };

    StrategyDecision {
        strategy: Strategy::Adapt,
        target_entry: Some(entry.name.clone()),
        reference_entry: None,
        reason,
        action_plan,
        health_status: Some(report.status),
        match_score: None,
    }
}

fn recreate_broken(
    entry: &RegistryEntry,
    report: &HealthReport,
    reference: Option<Reference>,
) -> StrategyDecision {
    let mut action_plan = vec![format!(
        "Remove broken files: {}, {}",
        entry.script_path, entry.doc_path
    )];
    action_plan.extend(generation_steps(reference.as_ref()));

    StrategyDecision {
        strategy: Strategy::Create,
        target_entry: Some(entry.name.clone()),
        reference_entry: reference.as_ref().map(|reference| reference.name.clone()),
        reason: format!(
            "'{}' is broken and cannot be trusted{}",
            entry.name,
            reference_suffix(reference.as_ref())
        ),
        action_plan,
        health_status: Some(report.status),
        match_score: None,
    }
}

fn fork(skill: &str, requirements: &Requirements, candidate: &MatchResult) -> StrategyDecision {
    StrategyDecision {
        strategy: Strategy::Adapt,
        target_entry: None,
        reference_entry: Some(candidate.entry.name.clone()),
        reason: format!(
            "'{}' is a healthy match (score {}): {}",
            candidate.entry.name,
            candidate.score,
            candidate.matched_reasons.join(", ")
        ),
        action_plan: vec![
            format!("Fork {} as {skill}", candidate.entry.script_path),
            format!(
                "Retarget parameters for topic '{}' ({})",
                requirements.topic, requirements.data_type
            ),
            "Re-verify the forked script".to_string(),
            format!("Register {skill} as a new entry"),
        ],
        health_status: Some(HealthStatus::Healthy),
        match_score: Some(candidate.score),
    }
}

fn create(
    skill: &str,
    requirements: &Requirements,
    reference: Option<Reference>,
) -> StrategyDecision {
    StrategyDecision {
        strategy: Strategy::Create,
        target_entry: None,
        reference_entry: reference.as_ref().map(|reference| reference.name.clone()),
        reason: format!(
            "no reusable entry for '{skill}' ({} / {}){}",
            requirements.data_type,
            requirements.topic,
            reference_suffix(reference.as_ref())
        ),
        action_plan: generation_steps(reference.as_ref()),
        health_status: None,
        match_score: None,
    }
}

fn generation_steps(reference: Option<&Reference>) -> Vec<String> {
    let first = reference.map_or_else(
        || "Generate a new script from scratch".to_string(),
        |reference| format!("Generate a new script using {} as a template", reference.name),
    );
    vec![
        first,
        "Execute and verify the new script".to_string(),
        "Register the new entry".to_string(),
    ]
}

fn reference_suffix(reference: Option<&Reference>) -> String {
    reference.map_or_else(String::new, |reference| {
        format!("; reference {} ({})", reference.name, reference.source)
    })
}
