pub mod contract;
pub mod marker;
pub mod recommendation;
pub mod request;
pub mod supplement;

pub fn parse_id<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase())).ok()
}
