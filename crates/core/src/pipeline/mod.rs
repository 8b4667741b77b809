pub mod bundle;
pub mod classifier;
pub mod collector;
pub mod homa;
pub mod instructions;
pub mod pricing;
pub mod resolve;
pub mod safety;
pub mod schedule;

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::domain::recommendation::RecommendationOutput;
use crate::domain::request::UserRequest;
use crate::error::PipelineError;
use pricing::PricingStrategy;

pub const MAX_RECOMMENDATIONS: usize = 8;
pub const MIN_RECOMMENDATIONS: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GapPolicy {
    #[default]
    Strict,
    Degrade,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub gap_policy: GapPolicy,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            gap_policy: settings.gap_policy(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'c> {
    catalog: &'c Catalog,
    options: PipelineOptions,
}

impl<'c> Pipeline<'c> {
    pub fn new(catalog: &'c Catalog, options: PipelineOptions) -> Self {
        Self { catalog, options }
    }

    pub fn run(
        &self,
        request: &UserRequest,
        pricing: &mut dyn PricingStrategy,
    ) -> Result<RecommendationOutput, PipelineError> {
        let span = tracing::info_span!(
            "pipeline",
            goals = request.health_goals.len(),
            markers = request.blood_test_results.len()
        );
        let _enter = span.enter();

        let mut diagnostics = Vec::new();
        let collected = collector::collect(self.catalog, request, self.options.gap_policy, &mut diagnostics)?;
        let homa_ir = homa::assess(&self.catalog.rules().homa_ir_bands, &request.blood_test_results);

        let resolved = resolve::resolve(
            self.catalog,
            &collected.candidates,
            &request.dietary_restrictions,
            &mut diagnostics,
        );
        let recommendations = safety::filter(self.catalog, resolved, request, &collected.goals, &mut diagnostics);

        let schedule = schedule::schedule(&recommendations);
        let combinations = bundle::bundle(
            self.catalog,
            &recommendations,
            &collected.goals,
            &request.dietary_restrictions,
            &schedule,
            pricing,
        );
        let schedule = schedule.names();

        tracing::info!(
            recommendations = recommendations.len(),
            combinations = combinations.len(),
            diagnostics = diagnostics.len(),
            "pipeline finished"
        );

        Ok(RecommendationOutput {
            recommendations,
            combinations,
            schedule,
            marker_assessments: collected.assessments,
            homa_ir,
            diagnostics,
        })
    }
}
