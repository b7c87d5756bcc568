//! Resume flow: extraction, then a structured diagnosis, then a Markdown rewrite.
//!
//! The two upstream steps degrade independently. A failed diagnosis does not
//! stop the rewrite; the rewrite only loses the weakness hints it would have had.

use anyhow::anyhow;
use tracing::{info, warn};

use super::fallback;
use super::models::{DiagnosisReport, ResumeAnalysis};
use super::prompts::{
    diagnosis_system, diagnosis_user, optimize_system, optimize_user, DIAGNOSIS_TEMPERATURE,
    OPTIMIZE_TEMPERATURE,
};
use crate::errors::AppError;
use crate::extraction::{extract, ExtractedText, RawInput};
use crate::llm_client::{LlmClient, LlmError};

/// Runs extraction off the async runtime. Only input errors come back as errors.
pub async fn extract_input(input: RawInput) -> Result<ExtractedText, AppError> {
    let extracted = tokio::task::spawn_blocking(move || extract(&input))
        .await
        .map_err(|e| AppError::Internal(anyhow!("extraction task failed: {e}")))??;
    Ok(extracted)
}

/// Diagnosis step. The flag is set when the canned report replaced the model's.
async fn diagnose(llm: &LlmClient, resume: &ExtractedText) -> (DiagnosisReport, bool) {
    match llm
        .invoke_json::<DiagnosisReport>(
            &diagnosis_system(),
            &diagnosis_user(resume.as_str()),
            DIAGNOSIS_TEMPERATURE,
        )
        .await
    {
        Ok(report) => (report, false),
        Err(e) => {
            warn!("Resume diagnosis degraded to fallback: {e}");
            (fallback::diagnosis(), true)
        }
    }
}

async fn optimize(llm: &LlmClient, resume: &ExtractedText, weaknesses: &[String]) -> (String, bool) {
    match llm
        .invoke_markdown(
            &optimize_system(),
            &optimize_user(resume.as_str(), weaknesses),
            OPTIMIZE_TEMPERATURE,
        )
        .await
    {
        Ok(markdown) => (markdown, false),
        Err(e) => {
            warn!("Resume optimization degraded to fallback: {e}");
            (fallback::OPTIMIZED_RESUME.to_string(), true)
        }
    }
}

/// Full resume flow. Fails only when the input itself is unusable.
pub async fn analyze_resume(llm: &LlmClient, input: RawInput) -> Result<ResumeAnalysis, AppError> {
    let resume = extract_input(input).await?;
    info!("Extracted resume text: {} chars", resume.char_count());

    let (diagnosis_report, diagnosis_fell_back) = diagnose(llm, &resume).await;
    let hints: &[String] = if diagnosis_fell_back {
        &[]
    } else {
        &diagnosis_report.weaknesses
    };
    let (optimized_resume, optimize_fell_back) = optimize(llm, &resume, hints).await;

    Ok(ResumeAnalysis {
        diagnosis_report,
        optimized_resume,
        fallback: diagnosis_fell_back || optimize_fell_back,
    })
}

/// Free-form Markdown generation. No fallback exists, so upstream errors propagate.
pub async fn generate_markdown(
    llm: &LlmClient,
    prompt: &str,
    temperature: f32,
) -> Result<String, LlmError> {
    llm.invoke_markdown(&optimize_system(), prompt, temperature)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{client, ScriptedBackend};
    use crate::llm_client::OutputMode;

    const DIAGNOSIS_JSON: &str = r#"{
        "score": 78,
        "score_rationale": "技术栈扎实，但缺少量化",
        "summary": "整体不错",
        "highlights": ["FastAPI 项目完整"],
        "weaknesses": ["缺少量化指标"],
        "suggestions": [{"advice": "补充 QPS 数据", "evidence": "FastAPI, MySQL"}],
        "matched_jobs": ["后端开发工程师"]
    }"#;

    fn healthy_backend() -> std::sync::Arc<ScriptedBackend> {
        ScriptedBackend::new(|req| match req.mode {
            OutputMode::Json => Ok(DIAGNOSIS_JSON.to_string()),
            OutputMode::Markdown => Ok("# 优化版简历\n\n- 使用 FastAPI 构建服务".to_string()),
        })
    }

    #[tokio::test]
    async fn test_healthy_upstream_returns_model_results() {
        let backend = healthy_backend();
        let input = RawInput::file("resume.txt", "FastAPI, MySQL, led a team of 3".as_bytes().to_vec());
        let result = analyze_resume(&client(&backend), input).await.unwrap();

        assert!(!result.fallback);
        assert_eq!(result.diagnosis_report.score, 78);
        assert!(!result.diagnosis_report.summary.is_empty());
        assert!(result.optimized_resume.starts_with("# 优化版简历"));
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_rewrite_prompt_carries_diagnosed_weaknesses() {
        let backend = ScriptedBackend::new(|req| match req.mode {
            OutputMode::Json => Ok(DIAGNOSIS_JSON.to_string()),
            OutputMode::Markdown => {
                assert!(req.user.contains("缺少量化指标"));
                Ok("rewritten".to_string())
            }
        });
        let result = analyze_resume(&client(&backend), RawInput::Text("简历".to_string()))
            .await
            .unwrap();
        assert_eq!(result.optimized_resume, "rewritten");
    }

    #[tokio::test]
    async fn test_blank_text_fails_before_upstream() {
        let backend = healthy_backend();
        let err = analyze_resume(&client(&backend), RawInput::Text("   ".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyContent(_)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_upload_fails_before_upstream() {
        let backend = healthy_backend();
        let input = RawInput::file("avatar.png", vec![0x89, b'P', b'N', b'G']);
        let err = analyze_resume(&client(&backend), input).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_timeouts_degrade_both_steps() {
        let backend = ScriptedBackend::timing_out();
        let result = analyze_resume(&client(&backend), RawInput::Text("熟悉 Rust".to_string()))
            .await
            .unwrap();

        assert!(result.fallback);
        assert_eq!(result.diagnosis_report, fallback::diagnosis());
        assert_eq!(result.optimized_resume, fallback::OPTIMIZED_RESUME);
    }

    #[tokio::test]
    async fn test_steps_degrade_independently() {
        // Diagnosis answers with a non-object; the rewrite still succeeds.
        let backend = ScriptedBackend::new(|req| match req.mode {
            OutputMode::Json => Ok("[1, 2]".to_string()),
            OutputMode::Markdown => Ok("# 优化版".to_string()),
        });
        let result = analyze_resume(&client(&backend), RawInput::Text("简历".to_string()))
            .await
            .unwrap();

        assert!(result.fallback);
        assert_eq!(result.diagnosis_report, fallback::diagnosis());
        assert_eq!(result.optimized_resume, "# 优化版");
    }

    #[tokio::test]
    async fn test_generate_markdown_propagates_upstream_errors() {
        let backend = ScriptedBackend::timing_out();
        let result = generate_markdown(&client(&backend), "写一份简历", 0.7).await;
        assert!(matches!(result, Err(LlmError::Timeout)));
    }
}
