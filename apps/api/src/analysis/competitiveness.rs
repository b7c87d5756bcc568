//! Competitiveness flow: six self-reported dimensions are quantized concurrently,
//! then summarized in one Markdown narrative.

use futures::future::join_all;
use tracing::{info, warn};

use super::fallback;
use super::models::{
    clamp_score, CompetitivenessAnalysis, CompetitivenessRequest, Dimension, DimensionScore,
    QuantizedScore, ScoreSource,
};
use super::prompts::{narrative_system, narrative_user, NARRATIVE_TEMPERATURE};
use super::quantizer::quantize;
use crate::llm_client::LlmClient;

async fn score_dimension(llm: &LlmClient, dimension: Dimension, raw_value: &str) -> DimensionScore {
    let QuantizedScore { score, source } = quantize(llm, raw_value, dimension.label()).await;
    DimensionScore {
        dimension,
        label: dimension.label().to_string(),
        raw_value: raw_value.to_string(),
        score,
        source,
    }
}

/// Rounded mean of the dimension scores; 0 for an empty slice.
pub fn overall_score(scores: &[DimensionScore]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let total: u32 = scores.iter().map(|s| u32::from(s.score)).sum();
    clamp_score(f64::from(total) / scores.len() as f64)
}

/// Runs the competitiveness flow. Never fails: every dimension gets a score and
/// the narrative falls back to a template built from those scores.
pub async fn analyze_competitiveness(
    llm: &LlmClient,
    request: &CompetitivenessRequest,
) -> CompetitivenessAnalysis {
    let quantized_scores: Vec<DimensionScore> = join_all(
        Dimension::ALL
            .iter()
            .map(|dimension| score_dimension(llm, *dimension, request.value(*dimension))),
    )
    .await;

    let overall = overall_score(&quantized_scores);
    let defaulted = quantized_scores
        .iter()
        .filter(|s| s.source == ScoreSource::Default)
        .count();
    info!("Quantized {} dimensions (overall={overall}, defaulted={defaulted})", quantized_scores.len());

    let (analysis_report, narrative_fell_back) = match llm
        .invoke_markdown(
            &narrative_system(),
            &narrative_user(&quantized_scores, overall),
            NARRATIVE_TEMPERATURE,
        )
        .await
    {
        Ok(report) => (report, false),
        Err(e) => {
            warn!("Competitiveness narrative degraded to template: {e}");
            (fallback::competitiveness_narrative(&quantized_scores, overall), true)
        }
    };

    CompetitivenessAnalysis {
        quantized_scores,
        overall_score: overall,
        analysis_report,
        fallback: narrative_fell_back || defaulted > 0,
    }
}

/// Single-value quantization. `dimension` is a dimension key ("gpa") or any
/// free-form dimension name, which is passed to the model as-is.
pub async fn quantize_one(llm: &LlmClient, dimension: &str, raw_value: &str) -> QuantizedScore {
    let name = Dimension::ALL
        .iter()
        .find(|d| d.key() == dimension.trim())
        .map(|d| d.label())
        .unwrap_or(dimension);
    quantize(llm, raw_value, name).await
}
