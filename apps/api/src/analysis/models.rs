use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Scores
// ────────────────────────────────────────────────────────────────────────────

/// Rounds half away from zero and clamps into [0, 100]. NaN maps to 0.
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Tier names of the five-band rubric.
pub fn tier_label(score: u8) -> &'static str {
    match score {
        0..=20 => "很差或没有",
        21..=40 => "有限",
        41..=60 => "中等",
        61..=80 => "良好",
        _ => "优秀",
    }
}

/// Reads a model-supplied score: a JSON number or a numeric string.
fn score_from_value(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_f64().map(clamp_score),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(clamp_score),
        _ => None,
    }
}

/// Strict score field: must be present and numeric.
pub fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    score_from_value(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("score is not a number: {value}")))
}

/// Lenient score field: `null` counts as absent and becomes 0.
fn deserialize_score_or_zero<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0),
        Some(value) => score_from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("score is not a number: {value}"))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume diagnosis
// ────────────────────────────────────────────────────────────────────────────

/// A concrete edit, tied to the resume text that motivated it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "SuggestionRepr")]
pub struct Suggestion {
    pub advice: String,
    pub evidence: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionRepr {
    Full {
        advice: String,
        #[serde(default)]
        evidence: String,
    },
    Bare(String),
}

impl From<SuggestionRepr> for Suggestion {
    fn from(repr: SuggestionRepr) -> Self {
        match repr {
            SuggestionRepr::Full { advice, evidence } => Suggestion { advice, evidence },
            SuggestionRepr::Bare(advice) => Suggestion {
                advice,
                evidence: String::new(),
            },
        }
    }
}

/// Per-aspect sub-score (structure, impact, tech depth, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreDetail {
    pub dimension: String,
    #[serde(deserialize_with = "deserialize_score_or_zero", default)]
    pub score: u8,
    #[serde(default)]
    pub comment: String,
}

/// The structured resume diagnosis. Deserializing into this type is the schema
/// check for the diagnosis call: `summary` is required, `score` defaults to 0,
/// lists default to empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisReport {
    #[serde(deserialize_with = "deserialize_score_or_zero", default)]
    pub score: u8,
    #[serde(default)]
    pub score_rationale: String,
    pub summary: String,
    #[serde(default)]
    pub score_details: Vec<ScoreDetail>,
    #[serde(default, alias = "pros", alias = "strengths")]
    pub highlights: Vec<String>,
    #[serde(default, alias = "cons")]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub matched_jobs: Vec<String>,
}

/// Output of the resume flow.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeAnalysis {
    pub diagnosis_report: DiagnosisReport,
    pub optimized_resume: String,
    /// True when either the diagnosis or the rewrite was replaced by canned content.
    pub fallback: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Competitiveness
// ────────────────────────────────────────────────────────────────────────────

/// The six self-reported competitiveness dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Gpa,
    ProjectExperience,
    Internship,
    Competition,
    EnglishAcademic,
    Leadership,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Gpa,
        Dimension::ProjectExperience,
        Dimension::Internship,
        Dimension::Competition,
        Dimension::EnglishAcademic,
        Dimension::Leadership,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Gpa => "gpa",
            Dimension::ProjectExperience => "project_experience",
            Dimension::Internship => "internship",
            Dimension::Competition => "competition",
            Dimension::EnglishAcademic => "english_academic",
            Dimension::Leadership => "leadership",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Gpa => "学业成绩（GPA）",
            Dimension::ProjectExperience => "项目经历",
            Dimension::Internship => "实习经历",
            Dimension::Competition => "竞赛获奖",
            Dimension::EnglishAcademic => "英语与学术能力",
            Dimension::Leadership => "领导力与社团",
        }
    }
}

/// Where a quantized score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Parsed locally from a number.
    Numeric,
    /// Classified by the model.
    Model,
    /// The model call failed; neutral default.
    Default,
    /// Nothing was reported.
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizedScore {
    pub score: u8,
    pub source: ScoreSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub label: String,
    pub raw_value: String,
    pub score: u8,
    pub source: ScoreSource,
}

/// Request body of the competitiveness flow. Fields accept strings or bare numbers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitivenessRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub gpa: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub project_experience: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub internship: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub competition: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub english_academic: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub leadership: String,
}

impl CompetitivenessRequest {
    pub fn value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Gpa => &self.gpa,
            Dimension::ProjectExperience => &self.project_experience,
            Dimension::Internship => &self.internship,
            Dimension::Competition => &self.competition,
            Dimension::EnglishAcademic => &self.english_academic,
            Dimension::Leadership => &self.leadership,
        }
    }
}

pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}

/// Output of the competitiveness flow.
#[derive(Debug, Clone, Serialize)]
pub struct CompetitivenessAnalysis {
    pub quantized_scores: Vec<DimensionScore>,
    pub overall_score: u8,
    /// Markdown narrative.
    pub analysis_report: String,
    /// True when the narrative was templated or any dimension fell back to the default.
    pub fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_score_rounds_half_away_from_zero() {
        assert_eq!(clamp_score(94.5), 95);
        assert_eq!(clamp_score(94.49), 94);
        assert_eq!(clamp_score(-3.0), 0);
        assert_eq!(clamp_score(250.0), 100);
        assert_eq!(clamp_score(f64::NAN), 0);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_label(20), "很差或没有");
        assert_eq!(tier_label(21), "有限");
        assert_eq!(tier_label(60), "中等");
        assert_eq!(tier_label(61), "良好");
        assert_eq!(tier_label(100), "优秀");
    }

    #[test]
    fn test_diagnosis_accepts_original_key_names() {
        let report: DiagnosisReport = serde_json::from_value(json!({
            "score": 78,
            "score_rationale": "基础扎实，但缺少量化数据",
            "summary": "结构清晰",
            "pros": ["技术栈全面"],
            "cons": ["缺少数字"],
            "suggestions": [
                {"advice": "使用 STAR 法则", "evidence": "负责后端开发"},
                "补充 GitHub 链接"
            ],
            "matched_jobs": ["后端开发工程师"]
        }))
        .unwrap();
        assert_eq!(report.score, 78);
        assert_eq!(report.highlights, vec!["技术栈全面"]);
        assert_eq!(report.weaknesses, vec!["缺少数字"]);
        assert_eq!(report.suggestions[1].advice, "补充 GitHub 链接");
        assert_eq!(report.suggestions[1].evidence, "");
    }

    #[test]
    fn test_diagnosis_missing_score_defaults_to_zero() {
        let report: DiagnosisReport =
            serde_json::from_value(json!({ "summary": "只有点评" })).unwrap();
        assert_eq!(report.score, 0);
        assert!(report.highlights.is_empty());

        let report: DiagnosisReport =
            serde_json::from_value(json!({ "score": null, "summary": "s" })).unwrap();
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_diagnosis_score_is_clamped_and_accepts_strings() {
        let report: DiagnosisReport =
            serde_json::from_value(json!({ "score": 130, "summary": "s" })).unwrap();
        assert_eq!(report.score, 100);
        let report: DiagnosisReport =
            serde_json::from_value(json!({ "score": "82.6", "summary": "s" })).unwrap();
        assert_eq!(report.score, 83);
    }

    #[test]
    fn test_diagnosis_without_summary_is_rejected() {
        let result: Result<DiagnosisReport, _> = serde_json::from_value(json!({ "score": 80 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_diagnosis_with_non_numeric_score_is_rejected() {
        let result: Result<DiagnosisReport, _> =
            serde_json::from_value(json!({ "score": "high", "summary": "s" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_competitiveness_request_accepts_numbers() {
        let request: CompetitivenessRequest = serde_json::from_value(json!({
            "gpa": 3.8,
            "internship": "字节跳动实习三个月",
            "leadership": null
        }))
        .unwrap();
        assert_eq!(request.value(Dimension::Gpa), "3.8");
        assert_eq!(request.value(Dimension::Internship), "字节跳动实习三个月");
        assert_eq!(request.value(Dimension::Leadership), "");
        assert_eq!(request.value(Dimension::Competition), "");
    }

    #[test]
    fn test_dimension_keys_match_serde_names() {
        for dimension in Dimension::ALL {
            let serialized = serde_json::to_value(dimension).unwrap();
            assert_eq!(serialized, json!(dimension.key()));
        }
    }
}
