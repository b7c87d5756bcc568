//! Degradation policy: canned results served when the upstream model is unavailable.
//!
//! Every function here returns the same shape as the real result it replaces, so
//! callers render both the same way; only the `fallback` flag tells them apart.
//! Nothing here retries.

use std::fmt::Write;

use super::models::{
    tier_label, DiagnosisReport, DimensionScore, ScoreDetail, ScoreSource, Suggestion,
};
use super::roadmap::RadarChart;

/// Fixed diagnosis returned when the diagnosis call fails.
pub fn diagnosis() -> DiagnosisReport {
    DiagnosisReport {
        score: 75,
        score_rationale: "AI 诊断服务暂时不可用，以下为通用评估，仅供参考。".to_string(),
        summary: "简历整体结构完整，但项目描述偏泛，缺乏量化成果与作品背书，建议按下方通用建议逐条自查。"
            .to_string(),
        score_details: vec![
            detail("结构与逻辑", 80, "段落层级清晰，建议用 STAR 强化每段结论。"),
            detail("量化影响力", 65, "更多是职责描述，建议补充指标、规模与结果。"),
            detail("技术深度", 75, "技术栈覆盖不错，建议突出 1-2 个核心亮点与难点。"),
            detail("岗位匹配度", 78, "可加入与目标岗位强相关的项目切面。"),
        ],
        highlights: vec![
            "教育背景与技术栈信息齐全".to_string(),
            "项目描述具备一定完整度".to_string(),
            "具备持续学习与迁移能力的迹象".to_string(),
        ],
        weaknesses: vec![
            "成果缺少可验证的量化指标（性能、效率、成本）".to_string(),
            "关键项目缺少“难点-方案-取舍-结果”的闭环".to_string(),
            "作品集、链接、奖项等背书信息不足".to_string(),
        ],
        suggestions: vec![
            Suggestion {
                advice: "用 STAR 法则重写每段项目经历，补充目标、规模、你的角色与量化结果".to_string(),
                evidence: "通用建议：多数简历以“负责××开发”描述职责而非成果".to_string(),
            },
            Suggestion {
                advice: "把“熟悉某技术”改为“用某技术完成了某模块，带来某指标提升”".to_string(),
                evidence: "通用建议：技能栏罗列关键词难以体现深度".to_string(),
            },
            Suggestion {
                advice: "补充 GitHub 或作品链接，README 写清架构、功能与性能数据".to_string(),
                evidence: "通用建议：缺少可验证的作品背书".to_string(),
            },
        ],
        matched_jobs: vec![
            "后端开发工程师".to_string(),
            "前端开发工程师".to_string(),
            "数据开发工程师".to_string(),
        ],
    }
}

fn detail(dimension: &str, score: u8, comment: &str) -> ScoreDetail {
    ScoreDetail {
        dimension: dimension.to_string(),
        score,
        comment: comment.to_string(),
    }
}

/// Fixed rewrite guide returned when the optimization call fails.
pub const OPTIMIZED_RESUME: &str = "\
# 简历优化指南（AI 服务暂时不可用）

> 暂时无法生成个性化的优化版简历，请先按以下模板自查，稍后可重新生成。

## 基本信息
姓名 ｜ 电话 ｜ 邮箱 ｜ GitHub / 作品链接

## 教育背景
学校 · 专业 · 学历 · 起止时间 ｜ GPA 与排名（如有优势） ｜ 核心课程

## 专业技能
- 按熟练度分组：精通 / 熟悉 / 了解
- 每项技能尽量对应一个项目中的实际用途

## 项目经历
**项目名称 ｜ 角色 ｜ 起止时间**
- 背景（S）：项目要解决什么问题，规模多大
- 任务（T）：你负责的部分
- 行动（A）：关键技术方案与取舍
- 结果（R）：可量化的成果，例如响应时间从【待补充】降到【待补充】

## 实习经历
**公司 ｜ 岗位 ｜ 起止时间**
- 同样按 STAR 法则描述，突出可验证的业务影响

## 荣誉奖项
- 奖项名称 · 级别 · 时间 · 你在团队中的角色";

/// Narrative built directly from the quantized scores when the narrative call fails.
pub fn competitiveness_narrative(scores: &[DimensionScore], overall_score: u8) -> String {
    let mut report = String::from("# 竞争力分析报告（简版）\n\n");
    report.push_str("> AI 分析服务暂时不可用，以下报告根据量化得分自动生成。\n\n");

    let _ = writeln!(
        report,
        "## 整体定位\n\n综合得分 **{overall_score}** 分，整体处于「{}」水平。\n",
        tier_label(overall_score)
    );

    report.push_str("## 各维度得分\n\n| 维度 | 得分 | 档位 |\n| --- | --- | --- |\n");
    for score in scores {
        let note = match score.source {
            ScoreSource::Default => "（未能评估，按中性分计）",
            ScoreSource::Blank => "（未填写）",
            ScoreSource::Numeric | ScoreSource::Model => "",
        };
        let _ = writeln!(
            report,
            "| {}{} | {} | {} |",
            score.label,
            note,
            score.score,
            tier_label(score.score)
        );
    }

    if let (Some(best), Some(worst)) = (
        scores.iter().max_by_key(|s| s.score),
        scores.iter().min_by_key(|s| s.score),
    ) {
        let _ = writeln!(
            report,
            "\n## 优势与短板\n\n- 最突出的优势：**{}**（{} 分）\n- 最需要补强：**{}**（{} 分）\n",
            best.label, best.score, worst.label, worst.score
        );
        let _ = writeln!(
            report,
            "## 提升建议\n\n1. 优先补强「{}」，为它制定一个可在一个学期内完成的具体目标。\n\
             2. 保持「{}」的优势，并整理成可在简历和面试中展示的证据。\n\
             3. 每完成一项新经历，及时用可量化的结果更新简历。\n",
            worst.label, best.label
        );
    }

    report.push_str("## 结论\n\n先补短板、再放大优势，是当前阶段性价比最高的策略。");
    report
}

/// Mentor comment templated from the radar when the roadmap comment call fails.
pub fn roadmap_comment(current_grade: &str, target_role: &str, radar: &RadarChart) -> String {
    match (radar.strongest(), radar.weakest()) {
        (Some((strong, _)), Some((weak, weak_value))) => format!(
            "同学你好！基于你的{current_grade}身份，你的「{strong}」基础尚可，\
             但在「{weak}」方面与{target_role}岗位要求存在 {}% 的差距。建议重点强化实战项目。",
            100u8.saturating_sub(weak_value)
        ),
        _ => format!(
            "同学你好！作为{current_grade}学生，建议围绕{target_role}岗位要求，\
             先夯实基础，再通过实战项目积累经验。"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::Dimension;

    fn score(dimension: Dimension, value: u8, source: ScoreSource) -> DimensionScore {
        DimensionScore {
            dimension,
            label: dimension.label().to_string(),
            raw_value: String::new(),
            score: value,
            source,
        }
    }

    #[test]
    fn test_fallback_diagnosis_is_fully_populated() {
        let report = diagnosis();
        assert!(report.score <= 100);
        assert!(!report.summary.is_empty());
        assert!(!report.score_details.is_empty());
        assert!(!report.highlights.is_empty());
        assert!(!report.weaknesses.is_empty());
        assert!(report
            .suggestions
            .iter()
            .all(|s| !s.advice.is_empty() && !s.evidence.is_empty()));
    }

    fn top_level_keys(value: &serde_json::Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_fallback_diagnosis_has_model_report_shape() {
        let from_model: DiagnosisReport =
            serde_json::from_value(serde_json::json!({ "summary": "s" })).unwrap();
        let canned = serde_json::to_value(diagnosis()).unwrap();
        let real = serde_json::to_value(from_model).unwrap();
        assert_eq!(top_level_keys(&canned), top_level_keys(&real));

        let suggestion = &canned["suggestions"][0];
        assert!(suggestion["advice"].is_string());
        assert!(suggestion["evidence"].is_string());
    }

    #[test]
    fn test_narrative_names_every_dimension_and_extremes() {
        let scores = vec![
            score(Dimension::Gpa, 95, ScoreSource::Numeric),
            score(Dimension::Internship, 50, ScoreSource::Default),
            score(Dimension::Leadership, 10, ScoreSource::Blank),
        ];
        let narrative = competitiveness_narrative(&scores, 52);
        assert!(narrative.contains("**52**"));
        for s in &scores {
            assert!(narrative.contains(&s.label));
        }
        assert!(narrative.contains("最突出的优势：**学业成绩（GPA）**（95 分）"));
        assert!(narrative.contains("最需要补强：**领导力与社团**（10 分）"));
        assert!(narrative.contains("未能评估"));
    }

    #[test]
    fn test_narrative_with_no_scores_still_renders() {
        let narrative = competitiveness_narrative(&[], 0);
        assert!(narrative.contains("## 结论"));
    }
}
