//! Career exploration: a generated matching quiz for a target career, a report on
//! the quiz answers, and a final plan combining a personality test with that report.
//!
//! None of these has canned content to fall back on; upstream errors propagate
//! and the handlers turn them into a 502.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::prompts::{
    career_plan_system, career_plan_user, experiment_system, experiment_user, questions_system,
    questions_user, CAREER_REPORT_TEMPERATURE, QUESTIONS_TEMPERATURE, UNSPECIFIED_CAREER,
};
use crate::llm_client::{LlmClient, LlmError};

/// Upper bound on the quiz length, whatever the model returns.
pub const MAX_QUESTIONS: usize = 15;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CareerQuestion {
    pub id: String,
    pub title: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CareerQuestionSet {
    pub career: String,
    pub questions: Vec<CareerQuestion>,
}

#[derive(Debug, Deserialize)]
struct QuestionsReply {
    #[serde(default)]
    career: Option<String>,
    #[serde(default)]
    questions: Vec<QuestionReply>,
}

#[derive(Debug, Deserialize)]
struct QuestionReply {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    options: Vec<String>,
}

/// Asks the model for the matching quiz of `career`.
///
/// An empty question list is a contract violation. Missing ids become `q1`, `q2`, ...
/// by position, and the list is cut to `MAX_QUESTIONS`.
pub async fn generate_questions(
    llm: &LlmClient,
    career: &str,
) -> Result<CareerQuestionSet, LlmError> {
    let reply: QuestionsReply = llm
        .invoke_json(&questions_system(), &questions_user(career), QUESTIONS_TEMPERATURE)
        .await?;

    if reply.questions.is_empty() {
        return Err(LlmError::Schema("question list is empty".to_string()));
    }

    let questions = reply
        .questions
        .into_iter()
        .take(MAX_QUESTIONS)
        .enumerate()
        .map(|(index, q)| CareerQuestion {
            id: q
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("q{}", index + 1)),
            title: q.title,
            options: q.options,
        })
        .collect();

    Ok(CareerQuestionSet {
        career: reply
            .career
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| career.to_string()),
        questions,
    })
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Markdown report on how the quiz answers match `career`. Without a career the
/// model is asked to infer the best-matching direction.
pub async fn analyze_experiment(
    llm: &LlmClient,
    answers: &Value,
    career: Option<&str>,
) -> Result<String, LlmError> {
    let career = career
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNSPECIFIED_CAREER);
    llm.invoke_markdown(
        &experiment_system(),
        &experiment_user(career, &pretty(answers)),
        CAREER_REPORT_TEMPERATURE,
    )
    .await
}

/// Final Markdown career plan from the personality test and the experiment report.
pub async fn generate_career_plan(
    llm: &LlmClient,
    personality: &Value,
    experiment_markdown: &str,
    note: &str,
) -> Result<String, LlmError> {
    llm.invoke_markdown(
        &career_plan_system(),
        &career_plan_user(&pretty(personality), experiment_markdown, note),
        CAREER_REPORT_TEMPERATURE,
    )
    .await
}
