pub mod catalog;
pub mod domain;
pub mod error;
pub mod pipeline;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub catalog_dir: Option<PathBuf>,
        pub catalog_strict: bool,
        pub pricing_seed: Option<u64>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let catalog_strict = match std::env::var("CATALOG_STRICT").ok() {
                Some(s) => parse_bool(&s).with_context(|| format!("CATALOG_STRICT is not a bool: {s}"))?,
                // Dev and test builds fail on catalog gaps; release builds degrade.
                None => cfg!(debug_assertions),
            };

            let pricing_seed = match std::env::var("PRICING_SEED").ok() {
                Some(s) => Some(
                    s.trim()
                        .parse::<u64>()
                        .with_context(|| format!("PRICING_SEED is not a u64: {s}"))?,
                ),
                None => None,
            };

            Ok(Self {
                catalog_dir: std::env::var("CATALOG_DIR")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from),
                catalog_strict,
                pricing_seed,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn gap_policy(&self) -> crate::pipeline::GapPolicy {
            if self.catalog_strict {
                crate::pipeline::GapPolicy::Strict
            } else {
                crate::pipeline::GapPolicy::Degrade
            }
        }
    }

    fn parse_bool(s: &str) -> Option<bool> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parses_common_bool_spellings() {
            assert_eq!(parse_bool(" TRUE "), Some(true));
            assert_eq!(parse_bool("0"), Some(false));
            assert_eq!(parse_bool("maybe"), None);
        }
    }
}
