//! Career roadmap: a skills radar and a four-year timeline for a target role,
//! plus a short mentor comment from the model.
//!
//! The radar and timeline are computed locally and deterministically; only the
//! comment goes upstream, with a templated comment as its fallback.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::fallback;
use super::prompts::{roadmap_system, ROADMAP_TEMPERATURE};
use crate::llm_client::LlmClient;

const ALGORITHM_INDICATORS: [&str; 5] = ["数学基础", "Python/C++", "论文复现", "模型调优", "工程落地"];
const FRONTEND_INDICATORS: [&str; 5] = ["HTML/CSS", "JavaScript", "Vue/React", "工程化", "UI审美"];
const BACKEND_INDICATORS: [&str; 5] = ["编程语言", "数据库", "分布式", "中间件", "系统设计"];

/// Per-indicator adjustment around the grade baseline: fundamentals come first,
/// applied skills lag behind.
const INDICATOR_OFFSETS: [i16; 5] = [8, 4, 0, -5, -8];

const GRADES: [&str; 4] = ["大一", "大二", "大三", "大四"];

#[derive(Debug, Clone, Deserialize)]
pub struct RoadmapRequest {
    pub current_grade: String,
    pub target_role: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RadarIndicator {
    pub name: String,
    pub max: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RadarChart {
    pub indicators: Vec<RadarIndicator>,
    pub values: Vec<u8>,
}

impl RadarChart {
    pub fn strongest(&self) -> Option<(&str, u8)> {
        self.pairs().max_by_key(|(_, value)| *value)
    }

    pub fn weakest(&self) -> Option<(&str, u8)> {
        self.pairs().min_by_key(|(_, value)| *value)
    }

    fn pairs(&self) -> impl Iterator<Item = (&str, u8)> {
        self.indicators
            .iter()
            .zip(self.values.iter())
            .map(|(indicator, value)| (indicator.name.as_str(), *value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Done,
    Process,
    Wait,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoadmapStage {
    pub timestamp: String,
    pub title: String,
    pub content: String,
    pub resources: Vec<String>,
    pub status: StageStatus,
    pub color: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoadmapPlan {
    pub radar_chart: RadarChart,
    /// Markdown.
    pub ai_comment: String,
    pub roadmap: Vec<RoadmapStage>,
    pub fallback: bool,
}

/// Index into `GRADES` from the first two characters of the grade ("大三上" → 2).
/// Unknown grades are treated as freshman year.
fn grade_index(current_grade: &str) -> Option<usize> {
    let prefix: String = current_grade.trim().chars().take(2).collect();
    GRADES.iter().position(|g| *g == prefix)
}

/// Builds the "current ability" radar for the role family of `target_role`.
pub fn build_radar(current_grade: &str, target_role: &str) -> RadarChart {
    let (names, baselines) = if target_role.contains("算法") {
        (ALGORITHM_INDICATORS, [30, 50, 70, 85])
    } else if target_role.contains("前端") {
        (FRONTEND_INDICATORS, [35, 55, 75, 90])
    } else {
        (BACKEND_INDICATORS, [30, 50, 70, 85])
    };
    let base: i16 = grade_index(current_grade)
        .map(|i| baselines[i])
        .unwrap_or(40);

    RadarChart {
        indicators: names
            .iter()
            .map(|name| RadarIndicator {
                name: name.to_string(),
                max: 100,
            })
            .collect(),
        values: INDICATOR_OFFSETS
            .iter()
            .map(|offset| (base + offset).clamp(0, 100) as u8)
            .collect(),
    }
}

struct StageTemplate {
    time: &'static str,
    title: &'static str,
    content: &'static str,
    resources: &'static [&'static str],
}

const STAGES: [StageTemplate; 6] = [
    StageTemplate {
        time: "大一上",
        title: "通识与筑基",
        content: "高数/C++ 均分 85+，加入技术社团",
        resources: &["CS50 公开课", "C++ Primer"],
    },
    StageTemplate {
        time: "大一下",
        title: "编程入门",
        content: "完成简易管理系统，熟悉 Git/Linux",
        resources: &["Git 飞行手册", "鸟哥的 Linux 私房菜"],
    },
    StageTemplate {
        time: "大二全",
        title: "核心栈构建",
        content: "系统学习 {role} 核心框架，刷题 200+",
        resources: &["LeetCode", "官方文档"],
    },
    StageTemplate {
        time: "大三上",
        title: "项目实战",
        content: "参与高含金量开源项目或学科竞赛",
        resources: &["GitHub Trending", "Kaggle"],
    },
    StageTemplate {
        time: "大三下",
        title: "实习冲刺",
        content: "制作简历，模拟面试，投递暑期实习",
        resources: &["牛客网", "Boss 直聘"],
    },
    StageTemplate {
        time: "大四",
        title: "秋招定局",
        content: "查漏补缺，冲击 SP Offer",
        resources: &["Offershow"],
    },
];

/// Timeline with stages before the current grade done, the current one in process.
pub fn build_timeline(current_grade: &str, target_role: &str) -> Vec<RoadmapStage> {
    let current = grade_index(current_grade).unwrap_or(0);

    STAGES
        .iter()
        .map(|stage| {
            let stage_grade = grade_index(stage.time).unwrap_or(0);
            let (status, color, icon) = match stage_grade.cmp(&current) {
                std::cmp::Ordering::Less => (StageStatus::Done, "#67C23A", "CircleCheck"),
                std::cmp::Ordering::Equal => (StageStatus::Process, "#409EFF", "Loading"),
                std::cmp::Ordering::Greater => (StageStatus::Wait, "#909399", "CircleCheck"),
            };
            RoadmapStage {
                timestamp: stage.time.to_string(),
                title: stage.title.to_string(),
                content: stage.content.replace("{role}", target_role),
                resources: stage.resources.iter().map(|r| r.to_string()).collect(),
                status,
                color,
                icon,
            }
        })
        .collect()
}

fn comment_prompt(request: &RoadmapRequest, radar: &RadarChart) -> String {
    let mut prompt = format!(
        "年级：{}\n目标岗位：{}\n当前能力雷达（满分 100）：\n",
        request.current_grade, request.target_role
    );
    for (name, value) in radar.pairs() {
        prompt.push_str(&format!("- {name}：{value}\n"));
    }
    prompt
}

/// Runs the roadmap flow. Never fails; a failed comment call is templated.
pub async fn plan_roadmap(llm: &LlmClient, request: &RoadmapRequest) -> RoadmapPlan {
    let radar_chart = build_radar(&request.current_grade, &request.target_role);
    let roadmap = build_timeline(&request.current_grade, &request.target_role);

    let (ai_comment, fallback) = match llm
        .invoke_markdown(
            &roadmap_system(),
            &comment_prompt(request, &radar_chart),
            ROADMAP_TEMPERATURE,
        )
        .await
    {
        Ok(comment) => (comment, false),
        Err(e) => {
            warn!("Roadmap comment degraded to template: {e}");
            (
                fallback::roadmap_comment(&request.current_grade, &request.target_role, &radar_chart),
                true,
            )
        }
    };

    RoadmapPlan {
        radar_chart,
        ai_comment,
        roadmap,
        fallback,
    }
}
