use crate::catalog::Catalog;
use crate::domain::recommendation::{Candidate, CandidateSource, Diagnostic, Provenance};
use crate::domain::request::{is_plant_based_diet, DietaryRestriction};
use crate::domain::supplement::SupplementRecord;
use crate::pipeline::{MAX_RECOMMENDATIONS, MIN_RECOMMENDATIONS};
use std::cmp::Reverse;

#[derive(Debug, Clone)]
pub struct ResolvedSupplement<'c> {
    pub record: &'c SupplementRecord,
    pub source: CandidateSource,
    pub dosage: Option<String>,
    pub substituted_from: Option<String>,
}

impl ResolvedSupplement<'_> {
    pub fn provenance(&self) -> Provenance {
        self.source.provenance()
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }
}

/// Substitution runs before dedup so whey and a curated pea protein collapse into one entry.
pub fn resolve<'c>(
    catalog: &'c Catalog,
    candidates: &[Candidate],
    restrictions: &[DietaryRestriction],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ResolvedSupplement<'c>> {
    let mut admitted: Vec<_> = candidates
        .iter()
        .filter_map(|c| admit(catalog, c, restrictions, diagnostics))
        .collect();
    // Stable: collection order is kept within each provenance.
    admitted.sort_by_key(|r| Reverse(r.provenance()));

    let mut resolved = dedup(admitted);
    resolved.truncate(MAX_RECOMMENDATIONS);

    if resolved.len() < MIN_RECOMMENDATIONS {
        tracing::info!(found = resolved.len(), "too few candidates; adding wellness fallback");
        let fallback = wellness_fallback(catalog, restrictions, diagnostics);
        resolved = dedup(resolved.into_iter().chain(fallback));
        resolved.truncate(MAX_RECOMMENDATIONS);
    }

    resolved
}

pub fn wellness_fallback<'c>(
    catalog: &'c Catalog,
    restrictions: &[DietaryRestriction],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ResolvedSupplement<'c>> {
    catalog
        .rules()
        .wellness_fallback
        .iter()
        .map(|name| Candidate::fallback(name.as_str()))
        .filter_map(|c| admit(catalog, &c, restrictions, diagnostics))
        .collect()
}

fn admit<'c>(
    catalog: &'c Catalog,
    candidate: &Candidate,
    restrictions: &[DietaryRestriction],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ResolvedSupplement<'c>> {
    let (name, substituted_from) = match catalog.substitution_for(&candidate.supplement_name, restrictions) {
        Some(rule) => {
            tracing::debug!(
                from = %candidate.supplement_name,
                to = %rule.replacement,
                restriction = rule.restriction.as_str(),
                "substituted"
            );
            (rule.replacement.as_str(), Some(candidate.supplement_name.clone()))
        }
        None => (candidate.supplement_name.as_str(), None),
    };

    if catalog.is_vegan_exclusive(name) && !is_plant_based_diet(restrictions) {
        tracing::debug!(supplement = name, "dropping vegan-exclusive item for non plant-based diet");
        return None;
    }

    match catalog.require_supplement(name, &candidate.source.to_string()) {
        Ok(record) => Some(ResolvedSupplement {
            record,
            source: candidate.source,
            dosage: candidate.dosage.clone(),
            substituted_from,
        }),
        Err(err) => {
            tracing::warn!(error = %err, "skipping candidate");
            diagnostics.push(Diagnostic::UnknownSupplementReference {
                name: name.to_string(),
                context: candidate.source.to_string(),
            });
            None
        }
    }
}

/// Keeps the first occurrence of each name, except that an entry carrying a dosage replaces
/// an earlier one without, in place.
fn dedup<'c>(items: impl IntoIterator<Item = ResolvedSupplement<'c>>) -> Vec<ResolvedSupplement<'c>> {
    let mut out: Vec<ResolvedSupplement<'c>> = Vec::new();
    for item in items {
        match out.iter_mut().find(|kept| kept.name() == item.name()) {
            Some(kept) => {
                if kept.dosage.is_none() && item.dosage.is_some() {
                    *kept = item;
                }
            }
            None => out.push(item),
        }
    }
    out
}
