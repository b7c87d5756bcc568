// Prompt templates for the analysis flows.
// Json-mode prompts enumerate every key the corresponding Rust type expects.

use super::models::DimensionScore;
use crate::llm_client::prompts::{json_system, markdown_system, SCORE_RUBRIC};

pub const DIAGNOSIS_TEMPERATURE: f32 = 0.2;
pub const OPTIMIZE_TEMPERATURE: f32 = 0.6;
pub const QUANTIZE_TEMPERATURE: f32 = 0.1;
pub const NARRATIVE_TEMPERATURE: f32 = 0.7;
pub const ROADMAP_TEMPERATURE: f32 = 0.7;
pub const QUESTIONS_TEMPERATURE: f32 = 0.3;
pub const CAREER_REPORT_TEMPERATURE: f32 = 0.4;

const DIAGNOSIS_ROLE: &str = "\
你是一位严厉但专业的资深技术面试官。请阅读用户的简历，给出结构化诊断。\n\
【重要要求】\n\
1. 评分要有依据，必须在 \"score_rationale\" 中用一句话说明扣分点。\n\
2. 提建议时必须有凭有据，在 \"evidence\" 字段中引用简历原文，或指出缺少的具体板块。\n\
3. 不要编造简历中没有的经历。";

const DIAGNOSIS_SCHEMA: &str = r#"{
  "score": 0-100 的整数,
  "score_rationale": "一句话解释评分依据",
  "summary": "50 字以内的专业点评",
  "score_details": [
    {"dimension": "结构与逻辑", "score": 0-100 的整数, "comment": "简短点评"},
    {"dimension": "量化影响力", "score": 0-100 的整数, "comment": "简短点评"},
    {"dimension": "技术深度", "score": 0-100 的整数, "comment": "简短点评"},
    {"dimension": "岗位匹配度", "score": 0-100 的整数, "comment": "简短点评"}
  ],
  "highlights": ["亮点1", "亮点2", "亮点3"],
  "weaknesses": ["不足1", "不足2", "不足3"],
  "suggestions": [
    {"advice": "具体的修改建议", "evidence": "关联的简历原文或缺失说明"}
  ],
  "matched_jobs": ["岗位1", "岗位2", "岗位3"]
}"#;

const OPTIMIZE_ROLE: &str = "\
你是严谨的简历优化专家。请在不虚构经历的前提下重写用户的简历：\
使用 STAR 法则描述项目与实习，尽量补充可量化的结果（用【待补充】标注用户需要填写的数据），\
按 基本信息 / 教育背景 / 专业技能 / 项目经历 / 实习经历 / 荣誉奖项 组织章节。";

const QUANTIZE_ROLE: &str = "\
你是一位求职竞争力评估专家。用户会给出某个评估维度以及他对该维度的自述，\
请依据评分档位给出一个 0-100 的整数分数。";

const QUANTIZE_SCHEMA: &str = r#"{
  "score": 0-100 的整数,
  "reason": "一句话说明打分依据"
}"#;

const NARRATIVE_ROLE: &str = "\
你是严谨的职业规划顾问。下面是一位学生在六个竞争力维度上的量化得分（0-100）及其自述。\
请生成一份竞争力分析报告，要求：\n\
1. 包含整体竞争力定位；\n\
2. 分析最突出的优势和最明显的短板；\n\
3. 给出 3 条具体、可执行的提升建议；\n\
4. 最后用一句话给出核心结论；\n\
5. 全程使用 Markdown，分标题层级，语言简洁专业。";

const ROADMAP_ROLE: &str = "\
你是一位温和但直接的职业导师。根据学生的年级、目标岗位和当前能力雷达，\
写一段 150 字以内的导师寄语：指出相对优势、最大差距，以及这一阶段最该做的一件事。";

const QUESTIONS_ROLE: &str = "\
你是一名职业规划评估题目设计专家。请针对指定职业设计 15 道用于评估匹配度的单选题，每题 4 个选项。\
题目要尽量贴近真实工作场景，覆盖能力要求、工作方式偏好、压力与节奏、沟通协作等维度。";

const QUESTIONS_SCHEMA: &str = r#"{
  "career": "职业名称",
  "questions": [
    {"id": "q1", "title": "题目文本", "options": ["选项A", "选项B", "选项C", "选项D"]}
  ]
}"#;

const EXPERIMENT_ROLE: &str = "\
你是一位资深生涯规划师与组织心理学顾问。用户针对某一职业完成了 15 道匹配度选择题（每题 4 个选项）。\
请生成一份围绕“目标职业匹配度”的报告，包含：\n\
1. 职业画像与动机分析（3-6 条要点）；\n\
2. 与目标职业的整体匹配度评级（高度匹配 / 基本匹配 / 需谨慎）；\n\
3. 关键优势与潜在风险（各 3-5 条，结合作答给出证据）；\n\
4. 若坚持该职业的 4 周行动建议（按周分解）；\n\
5. 若不适合该职业，至少 3 个备选方向及理由。";

const CAREER_PLAN_ROLE: &str = "\
你是一位资深生涯规划师。请整合用户的性格测试结果（JSON）与虚拟实验倾向分析（Markdown），\
输出一份最终的生涯规划报告，包含：\n\
1. 个人画像（性格、动机、工作方式偏好）；\n\
2. 目标职业方向建议（3 个主方向与 3 个备选方向）；\n\
3. 方向匹配理由（引用性格测试与虚拟实验中的证据）；\n\
4. 能力差距清单（基础、项目、软技能、行业认知）；\n\
5. 12 周成长路线图（按周分解，每周 3-6 个任务）；\n\
6. 至少 3 个可落地的作品集项目及产出物；\n\
7. 简历与面试策略（关键词、故事线、STAR 讲法）。";

/// Used when the caller did not name a target career.
pub const UNSPECIFIED_CAREER: &str = "未指定（请根据作答推断最匹配的方向）";

pub fn diagnosis_system() -> String {
    json_system(DIAGNOSIS_ROLE, DIAGNOSIS_SCHEMA)
}

pub fn diagnosis_user(resume: &str) -> String {
    format!("这是我的简历内容：\n{resume}")
}

pub fn optimize_system() -> String {
    markdown_system(OPTIMIZE_ROLE)
}

/// The rewrite prompt. Weaknesses from a real diagnosis, when available, steer the rewrite.
pub fn optimize_user(resume: &str, weaknesses: &[String]) -> String {
    let mut prompt = format!("请优化下面这份简历：\n\n{resume}");
    if !weaknesses.is_empty() {
        prompt.push_str("\n\n诊断发现的主要不足（重写时重点修正）：\n");
        for weakness in weaknesses {
            prompt.push_str("- ");
            prompt.push_str(weakness);
            prompt.push('\n');
        }
    }
    prompt
}

pub fn quantize_system() -> String {
    json_system(&format!("{QUANTIZE_ROLE}\n\n{SCORE_RUBRIC}"), QUANTIZE_SCHEMA)
}

pub fn quantize_user(dimension_name: &str, raw_value: &str) -> String {
    format!("评估维度：{dimension_name}\n用户自述：{raw_value}")
}

pub fn narrative_system() -> String {
    markdown_system(&format!("{NARRATIVE_ROLE}\n\n{SCORE_RUBRIC}"))
}

/// One line per dimension with label, score and what the student wrote.
pub fn narrative_user(scores: &[DimensionScore], overall_score: u8) -> String {
    let mut prompt = format!("综合得分：{overall_score}\n\n各维度：\n");
    for score in scores {
        let raw = if score.raw_value.trim().is_empty() {
            "（未填写）"
        } else {
            score.raw_value.trim()
        };
        prompt.push_str(&format!("- {}：{} 分；自述：{}\n", score.label, score.score, raw));
    }
    prompt
}

pub fn roadmap_system() -> String {
    markdown_system(ROADMAP_ROLE)
}

pub fn questions_system() -> String {
    json_system(QUESTIONS_ROLE, QUESTIONS_SCHEMA)
}

pub fn questions_user(career: &str) -> String {
    format!(
        "目标职业名称：\n{career}\n\n\
         如果这是一个冷门或未见过的职业，请先用 1-2 句话假设它的核心工作内容，再据此设计题目。"
    )
}

pub fn experiment_system() -> String {
    markdown_system(EXPERIMENT_ROLE)
}

/// `answers_json` is the pretty-printed answer map (question id to chosen option).
pub fn experiment_user(career: &str, answers_json: &str) -> String {
    format!(
        "目标职业：{career}\n\n用户的作答（key 为题号，value 为选项文本）：\n{answers_json}\n\n\
         请围绕此目标职业生成匹配度分析报告。"
    )
}

pub fn career_plan_system() -> String {
    markdown_system(CAREER_PLAN_ROLE)
}

pub fn career_plan_user(personality_json: &str, experiment_markdown: &str, note: &str) -> String {
    format!(
        "【性格测试 JSON】\n{personality_json}\n\n\
         【虚拟实验 Markdown】\n{experiment_markdown}\n\n\
         【用户补充说明（可为空）】\n{note}\n\n\
         请输出最终的生涯规划报告。"
    )
}
