use crate::catalog::Catalog;
use crate::domain::marker::{MarkerDefinition, MarkerId, MarkerRange, RangeSelector};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogIssue {
    MissingMarker { marker: MarkerId },
    EmptyTable { marker: MarkerId, table: String },
    InvertedRange { marker: MarkerId, table: String, min: f64, max: f64 },
    RangeGap { marker: MarkerId, table: String, from: f64, to: f64 },
    RangeOverlap { marker: MarkerId, table: String, at: f64 },
    DomainNotCovered { marker: MarkerId, table: String, covered_min: f64, covered_max: f64 },
    DuplicateSupplement { name: String },
    UnknownSupplementReference { name: String, context: String },
    UnknownMedicationCategory { category: String },
    UnorderedHomaIrBands,
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::MissingMarker { marker } => write!(f, "marker {marker} has no definition"),
            CatalogIssue::EmptyTable { marker, table } => {
                write!(f, "marker {marker} table {table} is empty")
            }
            CatalogIssue::InvertedRange { marker, table, min, max } => {
                write!(f, "marker {marker} table {table} has range [{min}, {max}) with min >= max")
            }
            CatalogIssue::RangeGap { marker, table, from, to } => {
                write!(f, "marker {marker} table {table} leaves [{from}, {to}) uncovered")
            }
            CatalogIssue::RangeOverlap { marker, table, at } => {
                write!(f, "marker {marker} table {table} overlaps at {at}")
            }
            CatalogIssue::DomainNotCovered {
                marker,
                table,
                covered_min,
                covered_max,
            } => write!(
                f,
                "marker {marker} table {table} covers [{covered_min}, {covered_max}) instead of its domain"
            ),
            CatalogIssue::DuplicateSupplement { name } => write!(f, "supplement {name} is defined twice"),
            CatalogIssue::UnknownSupplementReference { name, context } => {
                write!(f, "{context} references unknown supplement {name}")
            }
            CatalogIssue::UnknownMedicationCategory { category } => {
                write!(f, "interaction references unknown medication category {category}")
            }
            CatalogIssue::UnorderedHomaIrBands => {
                write!(f, "HOMA-IR bands must ascend and end with an unbounded band")
            }
        }
    }
}

impl Catalog {
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        for id in MarkerId::ALL {
            match self.marker(id) {
                Some(def) => validate_marker(def, &mut issues),
                None => issues.push(CatalogIssue::MissingMarker { marker: id }),
            }
        }

        let mut seen = HashSet::new();
        for s in self.supplements() {
            if !seen.insert(s.name.as_str()) {
                issues.push(CatalogIssue::DuplicateSupplement { name: s.name.clone() });
            }
        }

        self.validate_references(&mut issues);
        self.validate_homa_ir_bands(&mut issues);
        issues
    }

    fn validate_references(&self, issues: &mut Vec<CatalogIssue>) {
        let mut check = |name: &str, context: String| {
            if self.supplement(name).is_none() {
                issues.push(CatalogIssue::UnknownSupplementReference {
                    name: name.to_string(),
                    context,
                });
            }
        };

        for def in self.markers() {
            for (selector, table) in def.tables() {
                for range in table {
                    for name in &range.supplement_recommendations {
                        check(name, format!("marker {} ({selector}) range {}", def.id, range.status));
                    }
                }
            }
        }
        for goal in self.goals() {
            for name in &goal.supplements {
                check(name, format!("goal {}", goal.id.as_str()));
            }
        }

        let rules = self.rules();
        for s in &rules.substitutions {
            check(&s.restricted, "substitution".to_string());
            check(&s.replacement, "substitution".to_string());
        }
        for name in &rules.vegan_exclusive {
            check(name, "vegan-exclusive list".to_string());
        }
        for name in &rules.women_only {
            check(name, "women-only list".to_string());
        }
        for w in &rules.age_warnings {
            check(&w.supplement, "age warning".to_string());
        }
        for i in &rules.interactions {
            check(&i.supplement, format!("interaction {}", i.category));
        }
        for t in &rules.synergy_templates {
            for name in &t.supplements {
                check(name, format!("synergy template {}", t.name));
            }
        }
        for name in &rules.wellness_fallback {
            check(name, "wellness fallback".to_string());
        }

        for i in &rules.interactions {
            if !rules.medication_categories.iter().any(|c| c.id == i.category) {
                issues.push(CatalogIssue::UnknownMedicationCategory {
                    category: i.category.clone(),
                });
            }
        }
    }

    fn validate_homa_ir_bands(&self, issues: &mut Vec<CatalogIssue>) {
        let bands = &self.rules().homa_ir_bands;
        let Some((last, bounded)) = bands.split_last() else {
            issues.push(CatalogIssue::UnorderedHomaIrBands);
            return;
        };
        let ascending = bounded
            .iter()
            .map(|b| b.below)
            .collect::<Option<Vec<f64>>>()
            .is_some_and(|v| v.windows(2).all(|w| w[0] < w[1]));
        if !ascending || last.below.is_some() {
            issues.push(CatalogIssue::UnorderedHomaIrBands);
        }
    }
}

fn validate_marker(def: &MarkerDefinition, issues: &mut Vec<CatalogIssue>) {
    for (selector, table) in def.tables() {
        validate_table(def, selector, table, issues);
    }
}

fn validate_table(
    def: &MarkerDefinition,
    selector: RangeSelector,
    table: &[MarkerRange],
    issues: &mut Vec<CatalogIssue>,
) {
    let marker = def.id;
    let label = selector.to_string();
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        issues.push(CatalogIssue::EmptyTable { marker, table: label });
        return;
    };

    for r in table {
        if r.min >= r.max {
            issues.push(CatalogIssue::InvertedRange {
                marker,
                table: label.clone(),
                min: r.min,
                max: r.max,
            });
        }
    }

    for pair in table.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.min > a.max {
            issues.push(CatalogIssue::RangeGap {
                marker,
                table: label.clone(),
                from: a.max,
                to: b.min,
            });
        } else if b.min < a.max {
            issues.push(CatalogIssue::RangeOverlap {
                marker,
                table: label.clone(),
                at: b.min,
            });
        }
    }

    if first.min != def.domain.min || last.max != def.domain.max {
        issues.push(CatalogIssue::DomainNotCovered {
            marker,
            table: label,
            covered_min: first.min,
            covered_max: last.max,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classifier::classify;
    use crate::domain::marker::MarkerModifiers;
    use crate::catalog::rules::Rules;
    use crate::domain::request::{Gender, TimeOfDay};
    use crate::domain::supplement::SupplementRecord;

    fn rebuilt(
        catalog: &Catalog,
        edit: impl FnOnce(&mut Vec<MarkerDefinition>, &mut Vec<SupplementRecord>, &mut Rules),
    ) -> Catalog {
        let mut markers = catalog.markers().to_vec();
        let mut supplements = catalog.supplements().to_vec();
        let mut rules = catalog.rules().clone();
        edit(&mut markers, &mut supplements, &mut rules);
        Catalog::new(
            markers,
            supplements,
            catalog.goals().to_vec(),
            catalog.derived_goals().to_vec(),
            rules,
        )
    }

    #[test]
    fn embedded_catalog_has_no_issues() {
        let catalog = Catalog::embedded().unwrap();
        let issues = catalog.validate();
        assert!(issues.is_empty(), "unexpected catalog issues: {issues:#?}");
    }

    #[test]
    fn every_sampled_value_in_every_domain_classifies() {
        let catalog = Catalog::embedded().unwrap();
        let modifier_sets = [
            MarkerModifiers::default(),
            MarkerModifiers { time_of_day: Some(TimeOfDay::Morning), gender: None },
            MarkerModifiers { time_of_day: Some(TimeOfDay::Evening), gender: None },
            MarkerModifiers { time_of_day: None, gender: Some(Gender::Male) },
            MarkerModifiers { time_of_day: None, gender: Some(Gender::Female) },
        ];

        for def in catalog.markers() {
            let span = def.domain.max - def.domain.min;
            for step in 0..1000 {
                let value = def.domain.min + span * (step as f64) / 1000.0;
                for modifiers in &modifier_sets {
                    let table = def.ranges_for(modifiers);
                    let hits = table.iter().filter(|r| r.contains(value)).count();
                    assert_eq!(hits, 1, "{} value {value} matched {hits} ranges", def.id);
                    assert!(classify(&catalog, def.id, value, modifiers).is_ok());
                }
            }
        }
    }

    #[test]
    fn detects_gaps_overlaps_and_domain_mismatch() {
        let catalog = Catalog::embedded().unwrap();
        let mut def = catalog.marker(MarkerId::Magnesium).unwrap().clone();
        def.ranges[1].min += 0.1;
        def.ranges[2].min -= 0.05;
        def.ranges.last_mut().unwrap().max -= 1.0;

        let mut issues = Vec::new();
        validate_marker(&def, &mut issues);
        assert!(issues.iter().any(|i| matches!(i, CatalogIssue::RangeGap { .. })));
        assert!(issues.iter().any(|i| matches!(i, CatalogIssue::RangeOverlap { .. })));
        assert!(issues.iter().any(|i| matches!(i, CatalogIssue::DomainNotCovered { .. })));
    }

    #[test]
    fn inverted_range_is_reported() {
        let catalog = Catalog::embedded().unwrap();
        let mut def = catalog.marker(MarkerId::Magnesium).unwrap().clone();
        def.ranges[0].max = def.ranges[0].min - 1.0;

        let mut issues = Vec::new();
        validate_marker(&def, &mut issues);
        assert!(issues
            .iter()
            .any(|i| matches!(i, CatalogIssue::InvertedRange { marker: MarkerId::Magnesium, .. })));
    }

    #[test]
    fn renamed_substitution_target_is_an_unknown_reference() {
        let catalog = Catalog::embedded().unwrap();
        let broken = rebuilt(&catalog, |_, _, rules| {
            rules.substitutions[0].replacement = "Proteína Inexistente".to_string();
        });
        assert_eq!(
            broken.validate(),
            vec![CatalogIssue::UnknownSupplementReference {
                name: "Proteína Inexistente".to_string(),
                context: "substitution".to_string(),
            }]
        );
    }

    #[test]
    fn range_recommending_a_missing_record_is_reported() {
        let catalog = Catalog::embedded().unwrap();
        let broken = rebuilt(&catalog, |markers, _, _| {
            let def = markers.iter_mut().find(|m| m.id == MarkerId::VitaminD).unwrap();
            def.ranges[0].supplement_recommendations.push("Fantasma".to_string());
        });
        let issues = broken.validate();
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0],
            CatalogIssue::UnknownSupplementReference { name, context }
                if name == "Fantasma" && context.starts_with("marker vitamin-d")
        ));
    }

    #[test]
    fn duplicated_record_is_reported_once() {
        let catalog = Catalog::embedded().unwrap();
        let broken = rebuilt(&catalog, |_, supplements, _| {
            let copy = supplements[0].clone();
            supplements.push(copy);
        });
        assert_eq!(
            broken.validate(),
            vec![CatalogIssue::DuplicateSupplement {
                name: catalog.supplements()[0].name.clone(),
            }]
        );
    }

    #[test]
    fn interaction_with_unknown_category_is_reported() {
        let catalog = Catalog::embedded().unwrap();
        let broken = rebuilt(&catalog, |_, _, rules| {
            rules.interactions[0].category = "antipaludicos".to_string();
        });
        assert_eq!(
            broken.validate(),
            vec![CatalogIssue::UnknownMedicationCategory {
                category: "antipaludicos".to_string(),
            }]
        );
    }

    #[test]
    fn descending_homa_ir_bands_are_reported() {
        let catalog = Catalog::embedded().unwrap();
        let broken = rebuilt(&catalog, |_, _, rules| rules.homa_ir_bands.reverse());
        assert_eq!(broken.validate(), vec![CatalogIssue::UnorderedHomaIrBands]);

        let empty = rebuilt(&catalog, |_, _, rules| rules.homa_ir_bands.clear());
        assert_eq!(empty.validate(), vec![CatalogIssue::UnorderedHomaIrBands]);
    }

    #[test]
    fn empty_variant_table_is_reported() {
        let catalog = Catalog::embedded().unwrap();
        let broken = rebuilt(&catalog, |markers, _, _| {
            let def = markers.iter_mut().find(|m| m.id == MarkerId::Cortisol).unwrap();
            def.variants[0].ranges.clear();
        });
        let issues = broken.validate();
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0],
            CatalogIssue::EmptyTable { marker: MarkerId::Cortisol, table } if table != "default"
        ));
    }
}
