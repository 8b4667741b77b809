use crate::config::Settings;
use crate::domain::recommendation::Recommendation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DISCOUNT_PERCENT: u8 = 15;

const PLACEHOLDER_BASE: f64 = 500.0;
const PLACEHOLDER_SPREAD: u32 = 1000;

pub trait PricingStrategy {
    fn item_price(&mut self, item: &Recommendation) -> f64;
}

// No product price list yet.
#[derive(Debug, Clone)]
pub struct PlaceholderPricing {
    rng: StdRng,
}

impl PlaceholderPricing {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        settings.pricing_seed.map_or_else(Self::new, Self::seeded)
    }
}

impl Default for PlaceholderPricing {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingStrategy for PlaceholderPricing {
    fn item_price(&mut self, _item: &Recommendation) -> f64 {
        PLACEHOLDER_BASE + f64::from(self.rng.random_range(0..=PLACEHOLDER_SPREAD))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FlatPricing {
    pub per_item: f64,
}

impl PricingStrategy for FlatPricing {
    fn item_price(&mut self, _item: &Recommendation) -> f64 {
        self.per_item
    }
}

pub fn price_items<'a>(
    pricing: &mut dyn PricingStrategy,
    items: impl IntoIterator<Item = &'a Recommendation>,
) -> (f64, f64) {
    let original: f64 = items.into_iter().map(|i| pricing.item_price(i)).sum();
    let discounted = original * (100.0 - f64::from(DISCOUNT_PERCENT)) / 100.0;
    (round_cents(original), round_cents(discounted))
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
