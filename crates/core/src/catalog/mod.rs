pub mod load;
pub mod rules;
pub mod validate;

use crate::domain::marker::{MarkerDefinition, MarkerId};
use crate::domain::request::{DietaryRestriction, HealthGoal};
use crate::domain::supplement::{SupplementKind, SupplementRecord};
use crate::error::PipelineError;
use rules::{DerivedGoalRule, GoalDefinition, Rules, SubstitutionRule};
use std::collections::HashMap;

pub use validate::CatalogIssue;

#[derive(Debug, Clone)]
pub struct Catalog {
    markers: Vec<MarkerDefinition>,
    supplements: Vec<SupplementRecord>,
    goals: Vec<GoalDefinition>,
    derived_goals: Vec<DerivedGoalRule>,
    rules: Rules,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(
        markers: Vec<MarkerDefinition>,
        supplements: Vec<SupplementRecord>,
        goals: Vec<GoalDefinition>,
        derived_goals: Vec<DerivedGoalRule>,
        rules: Rules,
    ) -> Self {
        let mut by_name = HashMap::with_capacity(supplements.len());
        for (i, s) in supplements.iter().enumerate() {
            // First definition wins; duplicates are reported by `validate`.
            by_name.entry(s.name.clone()).or_insert(i);
        }
        Self {
            markers,
            supplements,
            goals,
            derived_goals,
            rules,
            by_name,
        }
    }

    pub fn markers(&self) -> &[MarkerDefinition] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MarkerDefinition> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn supplements(&self) -> &[SupplementRecord] {
        &self.supplements
    }

    pub fn supplement(&self, name: &str) -> Option<&SupplementRecord> {
        self.by_name.get(name).map(|&i| &self.supplements[i])
    }

    pub fn require_supplement(
        &self,
        name: &str,
        context: &str,
    ) -> Result<&SupplementRecord, PipelineError> {
        self.supplement(name)
            .ok_or_else(|| PipelineError::UnknownSupplementReference {
                name: name.to_string(),
                context: context.to_string(),
            })
    }

    pub fn supplement_by_kind(&self, kind: SupplementKind) -> Option<&SupplementRecord> {
        self.supplements.iter().find(|s| s.kind == kind)
    }

    pub fn goals(&self) -> &[GoalDefinition] {
        &self.goals
    }

    pub fn goal(&self, id: HealthGoal) -> Option<&GoalDefinition> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn derived_goals(&self) -> &[DerivedGoalRule] {
        &self.derived_goals
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn substitution_for(
        &self,
        name: &str,
        restrictions: &[DietaryRestriction],
    ) -> Option<&SubstitutionRule> {
        self.rules
            .substitutions
            .iter()
            .find(|s| s.restricted == name && restrictions.contains(&s.restriction))
    }

    pub fn is_vegan_exclusive(&self, name: &str) -> bool {
        self.rules.vegan_exclusive.iter().any(|n| n == name)
    }

    pub fn is_women_only(&self, name: &str) -> bool {
        self.rules.women_only.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_resolves_core_lookups() {
        let catalog = Catalog::embedded().unwrap();
        assert!(catalog.supplement("Creatina Monohidrato").is_some());
        assert_eq!(
            catalog.supplement_by_kind(SupplementKind::VeganBcaa).map(|s| s.name.as_str()),
            Some("BCAA Veganos")
        );
        assert!(catalog.marker(MarkerId::VitaminD).is_some());
        assert!(catalog.goal(HealthGoal::GananciaMuscular).is_some());
        assert!(catalog.is_women_only("Cohosh Negro"));
        assert!(catalog.is_vegan_exclusive("Omega-3 de Algas"));
    }

    #[test]
    fn substitution_respects_table_order_and_restrictions() {
        let catalog = Catalog::embedded().unwrap();
        let rule = catalog
            .substitution_for("Proteína de Suero (Whey)", &[DietaryRestriction::LactoseFree])
            .unwrap();
        assert_eq!(rule.replacement, "Proteína de Guisante");
        assert!(catalog
            .substitution_for("Proteína de Suero (Whey)", &[DietaryRestriction::GlutenFree])
            .is_none());
    }

    #[test]
    fn require_supplement_reports_unknown_names() {
        let catalog = Catalog::embedded().unwrap();
        let err = catalog.require_supplement("Unicornio", "test").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownSupplementReference { .. }));
    }
}
