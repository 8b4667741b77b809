use crate::catalog::rules::{DerivedGoalRule, GoalDefinition, Rules};
use crate::catalog::Catalog;
use crate::config::Settings;
use crate::domain::marker::MarkerDefinition;
use crate::domain::supplement::SupplementRecord;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

pub const MARKERS_FILE: &str = "markers.json";
pub const SUPPLEMENTS_FILE: &str = "supplements.json";
pub const GOALS_FILE: &str = "goals.json";
pub const RULES_FILE: &str = "rules.json";

const EMBEDDED_MARKERS: &str = include_str!("../../data/markers.json");
const EMBEDDED_SUPPLEMENTS: &str = include_str!("../../data/supplements.json");
const EMBEDDED_GOALS: &str = include_str!("../../data/goals.json");
const EMBEDDED_RULES: &str = include_str!("../../data/rules.json");

#[derive(Debug, Deserialize)]
struct MarkersFile {
    markers: Vec<MarkerDefinition>,
}

#[derive(Debug, Deserialize)]
struct SupplementsFile {
    supplements: Vec<SupplementRecord>,
}

#[derive(Debug, Deserialize)]
struct GoalsFile {
    goals: Vec<GoalDefinition>,
    #[serde(default)]
    derived_goals: Vec<DerivedGoalRule>,
}

impl Catalog {
    pub fn embedded() -> anyhow::Result<Self> {
        Self::from_json(
            EMBEDDED_MARKERS,
            EMBEDDED_SUPPLEMENTS,
            EMBEDDED_GOALS,
            EMBEDDED_RULES,
        )
        .context("embedded catalog is invalid")
    }

    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let read = |file: &str| {
            let path = dir.join(file);
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read catalog file {}", path.display()))
        };
        Self::from_json(
            &read(MARKERS_FILE)?,
            &read(SUPPLEMENTS_FILE)?,
            &read(GOALS_FILE)?,
            &read(RULES_FILE)?,
        )
        .with_context(|| format!("catalog in {} is invalid", dir.display()))
    }

    pub fn from_json(markers: &str, supplements: &str, goals: &str, rules: &str) -> anyhow::Result<Self> {
        let markers: MarkersFile =
            serde_json::from_str(markers).with_context(|| format!("failed to parse {MARKERS_FILE}"))?;
        let supplements: SupplementsFile = serde_json::from_str(supplements)
            .with_context(|| format!("failed to parse {SUPPLEMENTS_FILE}"))?;
        let goals: GoalsFile =
            serde_json::from_str(goals).with_context(|| format!("failed to parse {GOALS_FILE}"))?;
        let rules: Rules =
            serde_json::from_str(rules).with_context(|| format!("failed to parse {RULES_FILE}"))?;

        Ok(Self::new(
            markers.markers,
            supplements.supplements,
            goals.goals,
            goals.derived_goals,
            rules,
        ))
    }

    pub fn load(settings: &Settings) -> anyhow::Result<Self> {
        let catalog = match &settings.catalog_dir {
            Some(dir) => Self::from_dir(dir)?,
            None => Self::embedded()?,
        };

        let issues = catalog.validate();
        for issue in &issues {
            tracing::warn!(%issue, "catalog integrity issue");
        }
        tracing::info!(
            source = settings
                .catalog_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "embedded".to_string()),
            markers = catalog.markers().len(),
            supplements = catalog.supplements().len(),
            issues = issues.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}
