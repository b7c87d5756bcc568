//! Axum route handlers for the analysis API.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::analysis::career::{
    analyze_experiment, generate_career_plan, generate_questions, CareerQuestionSet,
};
use crate::analysis::competitiveness::{analyze_competitiveness, quantize_one};
use crate::analysis::models::{
    CompetitivenessAnalysis, CompetitivenessRequest, ResumeAnalysis, ScoreSource,
};
use crate::analysis::resume::{analyze_resume, generate_markdown};
use crate::analysis::roadmap::{plan_roadmap, RoadmapPlan, RoadmapRequest};
use crate::errors::AppError;
use crate::extraction::RawInput;
use crate::models::user::CurrentUser;
use crate::state::AppState;

const DEFAULT_GENERATE_TEMPERATURE: f32 = 0.7;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Successful response wrapper. The payload's fields, `fallback` included,
/// are flattened next to the envelope fields.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(payload: T) -> Json<Self> {
        Json(Envelope {
            success: true,
            request_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            payload,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub content: String,
    pub fallback: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuantizeRequest {
    pub dimension: String,
    #[serde(deserialize_with = "crate::analysis::models::string_or_number")]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct QuantizeResponse {
    pub dimension: String,
    pub raw_value: String,
    pub score: u8,
    pub source: ScoreSource,
    pub fallback: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart
// ────────────────────────────────────────────────────────────────────────────

/// Reads the resume from a multipart body: a `file` part (its filename declares
/// the format) or a `text` part. The first of the two wins.
async fn read_resume_upload(mut multipart: Multipart) -> Result<RawInput, AppError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Validation("file part has no filename".to_string()))?;
                let bytes = field.bytes().await?;
                info!("Received upload '{filename}' ({} bytes)", bytes.len());
                return Ok(RawInput::file(filename, bytes));
            }
            Some("text") => return Ok(RawInput::Text(field.text().await?)),
            _ => continue,
        }
    }
    Err(AppError::Validation(
        "expected a 'file' or 'text' part".to_string(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CareerQuestionsRequest {
    pub career: String,
}

#[derive(Debug, Deserialize)]
pub struct ExperimentRequest {
    /// Question id to chosen option.
    pub answers: serde_json::Map<String, Value>,
    #[serde(default)]
    pub career: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CareerPlanRequest {
    pub personality_json: serde_json::Map<String, Value>,
    pub experiment_markdown: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Markdown report from a flow without a fallback.
#[derive(Debug, Serialize)]
pub struct MarkdownResponse {
    pub markdown: String,
    pub fallback: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/analyze
///
/// Multipart upload of a PDF, DOCX or plain-text resume. Returns the diagnosis and
/// the rewritten resume; upstream failures come back as canned content.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Envelope<ResumeAnalysis>>, AppError> {
    let input = read_resume_upload(multipart?).await?;
    info!("Resume analysis requested by {}", user.label());

    let analysis = analyze_resume(&state.llm, input).await?;
    Ok(Envelope::new(analysis))
}

/// POST /api/v1/resume/analyze-text
pub async fn handle_analyze_resume_text(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<AnalyzeTextRequest>, JsonRejection>,
) -> Result<Json<Envelope<ResumeAnalysis>>, AppError> {
    let Json(request) = payload?;
    info!("Resume text analysis requested by {}", user.label());

    let analysis = analyze_resume(&state.llm, RawInput::Text(request.content)).await?;
    Ok(Envelope::new(analysis))
}

/// POST /api/v1/resume/generate
///
/// Free-form Markdown generation. Has no fallback: upstream failures are a 502.
pub async fn handle_generate(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Envelope<GenerateResponse>>, AppError> {
    let Json(request) = payload?;
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    let temperature = request.temperature.unwrap_or(DEFAULT_GENERATE_TEMPERATURE);
    if !(0.0..=2.0).contains(&temperature) {
        return Err(AppError::Validation(
            "temperature must be between 0 and 2".to_string(),
        ));
    }
    info!("Resume generation requested by {}", user.label());

    let content = generate_markdown(&state.llm, &request.prompt, temperature).await?;
    Ok(Envelope::new(GenerateResponse {
        content,
        fallback: false,
    }))
}

/// POST /api/v1/competitiveness/analyze
pub async fn handle_analyze_competitiveness(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CompetitivenessRequest>, JsonRejection>,
) -> Result<Json<Envelope<CompetitivenessAnalysis>>, AppError> {
    let Json(request) = payload?;
    info!("Competitiveness analysis requested by {}", user.label());

    let analysis = analyze_competitiveness(&state.llm, &request).await;
    Ok(Envelope::new(analysis))
}

/// POST /api/v1/competitiveness/quantize
pub async fn handle_quantize(
    State(state): State<AppState>,
    payload: Result<Json<QuantizeRequest>, JsonRejection>,
) -> Result<Json<Envelope<QuantizeResponse>>, AppError> {
    let Json(request) = payload?;
    if request.dimension.trim().is_empty() {
        return Err(AppError::Validation("dimension cannot be empty".to_string()));
    }

    let quantized = quantize_one(&state.llm, &request.dimension, &request.value).await;
    Ok(Envelope::new(QuantizeResponse {
        dimension: request.dimension,
        raw_value: request.value,
        score: quantized.score,
        source: quantized.source,
        fallback: quantized.source == ScoreSource::Default,
    }))
}

/// POST /api/v1/roadmap
pub async fn handle_roadmap(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<RoadmapRequest>, JsonRejection>,
) -> Result<Json<Envelope<RoadmapPlan>>, AppError> {
    let Json(request) = payload?;
    if request.current_grade.trim().is_empty() || request.target_role.trim().is_empty() {
        return Err(AppError::Validation(
            "current_grade and target_role are required".to_string(),
        ));
    }
    info!(
        "Roadmap requested by {} ({} → {})",
        user.label(),
        request.current_grade,
        request.target_role
    );

    let plan = plan_roadmap(&state.llm, &request).await;
    Ok(Envelope::new(plan))
}

/// POST /api/v1/career/questions
///
/// Matching quiz for a target career. Has no fallback: upstream failures are a 502.
pub async fn handle_career_questions(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CareerQuestionsRequest>, JsonRejection>,
) -> Result<Json<Envelope<CareerQuestionSet>>, AppError> {
    let Json(request) = payload?;
    let career = request.career.trim();
    if career.is_empty() {
        return Err(AppError::Validation("career cannot be empty".to_string()));
    }
    info!("Career questions for {career} requested by {}", user.label());

    let questions = generate_questions(&state.llm, career).await?;
    Ok(Envelope::new(questions))
}

/// POST /api/v1/career/experiment
pub async fn handle_analyze_experiment(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<ExperimentRequest>, JsonRejection>,
) -> Result<Json<Envelope<MarkdownResponse>>, AppError> {
    let Json(request) = payload?;
    if request.answers.is_empty() {
        return Err(AppError::Validation("answers cannot be empty".to_string()));
    }
    info!(
        "Experiment analysis requested by {} ({} answers)",
        user.label(),
        request.answers.len()
    );

    let answers = Value::Object(request.answers);
    let markdown = analyze_experiment(&state.llm, &answers, request.career.as_deref()).await?;
    Ok(Envelope::new(MarkdownResponse {
        markdown,
        fallback: false,
    }))
}

/// POST /api/v1/career/plan
pub async fn handle_career_plan(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CareerPlanRequest>, JsonRejection>,
) -> Result<Json<Envelope<MarkdownResponse>>, AppError> {
    let Json(request) = payload?;
    if request.experiment_markdown.trim().is_empty() {
        return Err(AppError::Validation(
            "experiment_markdown cannot be empty".to_string(),
        ));
    }
    info!("Career plan requested by {}", user.label());

    let personality = Value::Object(request.personality_json);
    let markdown = generate_career_plan(
        &state.llm,
        &personality,
        &request.experiment_markdown,
        request.note.as_deref().unwrap_or_default(),
    )
    .await?;
    Ok(Envelope::new(MarkdownResponse {
        markdown,
        fallback: false,
    }))
}
