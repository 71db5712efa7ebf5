//! Structural validation of generation-endpoint responses.
//!
//! The provider wraps the generation record in a `data` object. Every field is
//! checked for presence and type before the record is trusted; unknown fields
//! are ignored. Nothing is coerced: a string where a number belongs rejects
//! the whole body.

use super::error::PricingError;
use super::types::{CostResult, TokenUsage};
use serde::{Deserialize, Deserializer};

/// `GET /generation` response envelope
#[derive(Deserialize)]
struct GenerationResponse {
    data: GenerationData,
}

#[derive(Deserialize)]
struct GenerationData {
    id: String,
    model: String,
    total_cost: f64,
    #[serde(default, deserialize_with = "token_count")]
    native_tokens_prompt: u64,
    #[serde(default, deserialize_with = "token_count")]
    native_tokens_completion: u64,
    #[serde(default, deserialize_with = "token_count")]
    native_tokens_reasoning: u64,
    #[serde(default, deserialize_with = "token_count")]
    native_tokens_cached: u64,
    /// Must be present, may be null
    #[serde(deserialize_with = "nullable_number")]
    cache_discount: Option<f64>,
    latency: f64,
    created_at: String,
}

fn nullable_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)
}

/// Whole, non-negative token count. `100.0` is accepted, `1.5` is not.
fn token_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(count) = number.as_u64() {
        return Ok(count);
    }
    match number.as_f64() {
        Some(value) if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 => {
            Ok(value as u64)
        }
        _ => Err(serde::de::Error::custom(format!(
            "token count must be a non-negative whole number, got {}",
            number
        ))),
    }
}

impl From<GenerationData> for CostResult {
    fn from(data: GenerationData) -> Self {
        Self {
            generation_id: data.id,
            model: data.model,
            total_cost: data.total_cost,
            tokens: TokenUsage {
                prompt: data.native_tokens_prompt,
                completion: data.native_tokens_completion,
                cached: data.native_tokens_cached,
                reasoning: data.native_tokens_reasoning,
            },
            cache_discount: data.cache_discount,
            latency: data.latency,
            created_at: data.created_at,
        }
    }
}

/// Parse and validate a generation response body.
pub fn parse_generation(body: &str) -> Result<CostResult, PricingError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| PricingError::InvalidSchema(e.to_string()))?;

    // serde accepts sequences for structs; the provider contract is objects only
    if !value.get("data").is_some_and(serde_json::Value::is_object) {
        return Err(PricingError::InvalidSchema(
            "expected an object with a `data` object".to_string(),
        ));
    }

    let response = GenerationResponse::deserialize(value)
        .map_err(|e| PricingError::InvalidSchema(e.to_string()))?;
    Ok(response.data.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_body() -> serde_json::Value {
        json!({
            "data": {
                "id": "gen_123",
                "model": "anthropic/claude-3-haiku",
                "total_cost": 0.00025,
                "native_tokens_prompt": 100,
                "native_tokens_completion": 50,
                "native_tokens_reasoning": 0,
                "native_tokens_cached": 25,
                "cache_discount": 0.5,
                "latency": 1234,
                "created_at": "2024-01-01T00:00:00Z"
            }
        })
    }

    fn parse(value: serde_json::Value) -> Result<CostResult, PricingError> {
        parse_generation(&value.to_string())
    }

    // ========================================================================
    // Accepted shapes
    // ========================================================================

    #[test]
    fn test_accepts_all_fields() {
        let cost = parse(full_body()).unwrap();
        assert_eq!(cost.generation_id, "gen_123");
        assert_eq!(cost.model, "anthropic/claude-3-haiku");
        assert_eq!(cost.total_cost, 0.00025);
        assert_eq!(cost.tokens.prompt, 100);
        assert_eq!(cost.tokens.completion, 50);
        assert_eq!(cost.tokens.cached, 25);
        assert_eq!(cost.tokens.reasoning, 0);
        assert_eq!(cost.cache_discount, Some(0.5));
        assert_eq!(cost.latency, 1234.0);
        assert_eq!(cost.created_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_accepts_null_cache_discount() {
        let mut body = full_body();
        body["data"]["cache_discount"] = serde_json::Value::Null;
        let cost = parse(body).unwrap();
        assert_eq!(cost.cache_discount, None);
    }

    #[test]
    fn test_missing_token_fields_default_to_zero() {
        let body = json!({
            "data": {
                "id": "gen_123",
                "model": "anthropic/claude-3-haiku",
                "total_cost": 0.00025,
                "cache_discount": null,
                "latency": 1234,
                "created_at": "2024-01-01T00:00:00Z"
            }
        });
        let cost = parse(body).unwrap();
        assert_eq!(cost.tokens, TokenUsage::default());
    }

    #[test]
    fn test_ignores_unknown_fields() {
        let mut body = full_body();
        body["data"]["provider_name"] = json!("Anthropic");
        body["data"]["streamed"] = json!(true);
        assert!(parse(body).is_ok());
    }

    // ========================================================================
    // Rejected shapes
    // ========================================================================

    #[test]
    fn test_rejects_missing_data_wrapper() {
        let body = json!({
            "id": "gen_123",
            "model": "anthropic/claude-3-haiku",
            "total_cost": 0.00025
        });
        assert!(matches!(parse(body), Err(PricingError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_missing_id() {
        let mut body = full_body();
        body["data"].as_object_mut().unwrap().remove("id");
        assert!(matches!(parse(body), Err(PricingError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_missing_total_cost() {
        let mut body = full_body();
        body["data"].as_object_mut().unwrap().remove("total_cost");
        assert!(matches!(parse(body), Err(PricingError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_string_total_cost() {
        let mut body = full_body();
        body["data"]["total_cost"] = json!("0.00025");
        assert!(matches!(parse(body), Err(PricingError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_missing_cache_discount() {
        let mut body = full_body();
        body["data"].as_object_mut().unwrap().remove("cache_discount");
        assert!(matches!(parse(body), Err(PricingError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_null_token_field() {
        let mut body = full_body();
        body["data"]["native_tokens_prompt"] = serde_json::Value::Null;
        assert!(matches!(parse(body), Err(PricingError::InvalidSchema(_))));
    }

    #[test]
    fn test_accepts_integral_float_token_counts() {
        let mut body = full_body();
        body["data"]["native_tokens_prompt"] = json!(100.0);
        body["data"]["native_tokens_cached"] = json!(0.0);

        let cost = parse(body).unwrap();
        assert_eq!(cost.tokens.prompt, 100);
        assert_eq!(cost.tokens.cached, 0);
    }

    #[test]
    fn test_rejects_fractional_negative_or_string_token_counts() {
        for bad in [json!(1.5), json!(-1), json!(-2.0), json!("100")] {
            let mut body = full_body();
            body["data"]["native_tokens_completion"] = bad.clone();
            assert!(
                matches!(parse(body), Err(PricingError::InvalidSchema(_))),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_rejects_numeric_model() {
        let mut body = full_body();
        body["data"]["model"] = json!(42);
        assert!(matches!(parse(body), Err(PricingError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_null_body() {
        assert!(matches!(
            parse_generation("null"),
            Err(PricingError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_rejects_empty_object() {
        assert!(matches!(
            parse_generation("{}"),
            Err(PricingError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(matches!(
            parse_generation("<html>Bad Gateway</html>"),
            Err(PricingError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_rejects_positional_data() {
        let body = json!({
            "data": [
                "gen_123",
                "anthropic/claude-3-haiku",
                0.00025,
                100,
                50,
                0,
                25,
                null,
                1234,
                "2024-01-01T00:00:00Z"
            ]
        });
        assert!(matches!(parse(body), Err(PricingError::InvalidSchema(_))));
    }

    #[test]
    fn test_rejects_array_body() {
        assert!(matches!(
            parse_generation("[]"),
            Err(PricingError::InvalidSchema(_))
        ));
    }
}
