use crate::catalog::rules::SynergyTemplate;
use crate::catalog::Catalog;
use crate::domain::recommendation::{Combination, Recommendation};
use crate::domain::request::{DietaryRestriction, HealthGoal};
use crate::pipeline::instructions;
use crate::pipeline::pricing::{price_items, PricingStrategy, DISCOUNT_PERCENT};
use crate::pipeline::schedule::Schedule;

pub const FALLBACK_PACK_NAME: &str = "Complete Wellness Pack";
const FALLBACK_PACK_DESCRIPTION: &str =
    "Selección equilibrada de tus suplementos recomendados para el bienestar diario.";
const FALLBACK_PACK_SIZE: usize = 6;
const MIN_TEMPLATE_MATCHES: usize = 2;

pub fn bundle(
    catalog: &Catalog,
    recommendations: &[Recommendation],
    goals: &[HealthGoal],
    restrictions: &[DietaryRestriction],
    schedule: &Schedule<'_>,
    pricing: &mut dyn PricingStrategy,
) -> Vec<Combination> {
    let mut combinations = Vec::new();

    for &goal in goals {
        for template in catalog.rules().synergy_templates.iter().filter(|t| t.goal == goal) {
            let matched = match_template(catalog, template, recommendations);
            if matched.len() < MIN_TEMPLATE_MATCHES {
                tracing::debug!(template = %template.name, matched = matched.len(), "template not applicable");
                continue;
            }
            combinations.push(build(
                catalog,
                Pack {
                    name: &template.name,
                    description: &template.description,
                    synergy_notes: &template.synergy_notes,
                },
                &matched,
                restrictions,
                schedule,
                pricing,
            ));
        }
    }

    if combinations.is_empty() && !recommendations.is_empty() {
        let items: Vec<&Recommendation> = recommendations.iter().take(FALLBACK_PACK_SIZE).collect();
        combinations.push(build(
            catalog,
            Pack {
                name: FALLBACK_PACK_NAME,
                description: FALLBACK_PACK_DESCRIPTION,
                synergy_notes: &[],
            },
            &items,
            restrictions,
            schedule,
            pricing,
        ));
    }

    combinations
}

/// Template entries match by name, or by family so that a pea protein fills a whey slot.
fn match_template<'r>(
    catalog: &Catalog,
    template: &SynergyTemplate,
    recommendations: &'r [Recommendation],
) -> Vec<&'r Recommendation> {
    let mut matched: Vec<&Recommendation> = Vec::new();
    for name in &template.supplements {
        let family = catalog.supplement(name).and_then(|r| r.kind.family());
        let hit = recommendations
            .iter()
            .find(|r| r.name == *name || (family.is_some() && r.kind.family() == family));
        if let Some(r) = hit {
            if !matched.iter().any(|m| m.name == r.name) {
                matched.push(r);
            }
        }
    }
    matched
}

struct Pack<'a> {
    name: &'a str,
    description: &'a str,
    synergy_notes: &'a [String],
}

fn build(
    catalog: &Catalog,
    pack: Pack<'_>,
    items: &[&Recommendation],
    restrictions: &[DietaryRestriction],
    schedule: &Schedule<'_>,
    pricing: &mut dyn PricingStrategy,
) -> Combination {
    let mut description = pack.description.to_string();
    if !restrictions.is_empty() {
        let list: Vec<&str> = restrictions.iter().map(|r| r.as_str()).collect();
        description.push_str(&format!(" Adaptado a tus restricciones: {}.", list.join(", ")));
    }

    let (original_price, price) = price_items(pricing, items.iter().copied());
    tracing::debug!(combination = pack.name, items = items.len(), original_price, price, "combination priced");

    Combination {
        name: pack.name.to_string(),
        description,
        recommendations: items.iter().map(|&r| r.clone()).collect(),
        original_price,
        discount_percent: DISCOUNT_PERCENT,
        price,
        synergy_notes: pack.synergy_notes.to_vec(),
        instructions_text: instructions::render(catalog.rules(), schedule, items),
    }
}
