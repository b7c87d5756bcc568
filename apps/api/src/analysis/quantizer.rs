//! Score quantization turns one self-reported value into an integer in [0, 100].
//!
//! Numbers are rescaled locally and never reach the model: values in [0, 4] are read
//! as a 4-point GPA, values in (4, 100] are taken as-is, anything else is clamped.
//! Free text is classified by the model against the five-tier rubric; if that call
//! fails the dimension gets the neutral default instead of failing the request.

use serde::Deserialize;
use tracing::warn;

use super::models::{clamp_score, deserialize_score, QuantizedScore, ScoreSource};
use super::prompts::{quantize_system, quantize_user, QUANTIZE_TEMPERATURE};
use crate::llm_client::LlmClient;

/// Score given to a textual value when the model could not classify it.
pub const NEUTRAL_DEFAULT_SCORE: u8 = 50;

const GPA_SCALE_MAX: f64 = 4.0;

#[derive(Debug, Deserialize)]
struct QuantizeReply {
    #[serde(deserialize_with = "deserialize_score")]
    score: u8,
}

/// Deterministic path. `None` means the value is not a finite number.
pub fn quantize_numeric(raw_value: &str) -> Option<u8> {
    let value: f64 = raw_value.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    if (0.0..=GPA_SCALE_MAX).contains(&value) {
        return Some(clamp_score(value / GPA_SCALE_MAX * 100.0));
    }
    Some(clamp_score(value))
}

/// Quantizes `raw_value` for the dimension called `dimension_name`. Never fails.
pub async fn quantize(llm: &LlmClient, raw_value: &str, dimension_name: &str) -> QuantizedScore {
    let raw_value = raw_value.trim();
    if raw_value.is_empty() {
        return QuantizedScore {
            score: 0,
            source: ScoreSource::Blank,
        };
    }

    if let Some(score) = quantize_numeric(raw_value) {
        return QuantizedScore {
            score,
            source: ScoreSource::Numeric,
        };
    }

    match llm
        .invoke_json::<QuantizeReply>(
            &quantize_system(),
            &quantize_user(dimension_name, raw_value),
            QUANTIZE_TEMPERATURE,
        )
        .await
    {
        Ok(reply) => QuantizedScore {
            score: reply.score,
            source: ScoreSource::Model,
        },
        Err(e) => {
            warn!("Quantization of '{dimension_name}' degraded to {NEUTRAL_DEFAULT_SCORE}: {e}");
            QuantizedScore {
                score: NEUTRAL_DEFAULT_SCORE,
                source: ScoreSource::Default,
            }
        }
    }
}
