// Shared prompt fragments.
// Each flow that calls the model defines its own prompts alongside it; this file
// holds the pieces that more than one flow appends.

/// Appended to every Json-mode system prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "\
只返回一个合法的 JSON 对象，不要输出 JSON 以外的任何文字，\
不要使用 Markdown 代码块，不要解释或道歉。";

/// Appended to every Markdown-mode system prompt.
pub const MARKDOWN_ONLY_INSTRUCTION: &str = "\
直接输出 Markdown 正文，不要包含 ```markdown 标记，不要添加开场白或结束语。";

/// The five-tier rubric shared by quantization and the competitiveness narrative.
pub const SCORE_RUBRIC: &str = "\
评分档位（0-100 整数）：\n\
- 0-20：很差或没有\n\
- 21-40：有限\n\
- 41-60：中等\n\
- 61-80：良好\n\
- 81-100：优秀";

/// Builds a Json-mode system prompt from a role description and an output schema.
pub fn json_system(role: &str, schema: &str) -> String {
    format!("{role}\n\n返回格式（严格遵守以下 JSON 结构）：\n{schema}\n\n{JSON_ONLY_INSTRUCTION}")
}

/// Builds a Markdown-mode system prompt from a role description.
pub fn markdown_system(role: &str) -> String {
    format!("{role}\n\n{MARKDOWN_ONLY_INSTRUCTION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_system_embeds_schema_and_instruction() {
        let prompt = json_system("你是面试官。", "{\"score\": 0}");
        assert!(prompt.starts_with("你是面试官。"));
        assert!(prompt.contains("{\"score\": 0}"));
        assert!(prompt.ends_with(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_rubric_lists_five_tiers() {
        assert_eq!(SCORE_RUBRIC.matches("\n- ").count(), 5);
    }
}
