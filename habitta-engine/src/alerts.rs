//! Maintenance alert scoring
//!
//! Derives ranked alerts from pending maintenance tasks. Each task gets
//! an urgency score (days until due), an impact score (category cost ×
//! priority), and a binary safety score (keyword match); the weighted
//! composite is scaled to 0-100. Tasks under the noise floor are
//! suppressed entirely rather than shown as low-value alerts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task categories with distinct repair-cost profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Hvac,
    Roofing,
    Electrical,
    Plumbing,
    Appliance,
    Exterior,
    General,
}

impl TaskCategory {
    /// Relative repair/replacement cost multiplier.
    pub fn cost_multiplier(&self) -> f64 {
        match self {
            TaskCategory::Hvac => 1.0,
            TaskCategory::Roofing => 1.0,
            TaskCategory::Electrical => 0.8,
            TaskCategory::Plumbing => 0.7,
            TaskCategory::Appliance => 0.5,
            TaskCategory::Exterior => 0.45,
            TaskCategory::General => 0.4,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hvac" => Some(TaskCategory::Hvac),
            "roofing" => Some(TaskCategory::Roofing),
            "electrical" => Some(TaskCategory::Electrical),
            "plumbing" => Some(TaskCategory::Plumbing),
            "appliance" => Some(TaskCategory::Appliance),
            "exterior" => Some(TaskCategory::Exterior),
            "general" => Some(TaskCategory::General),
            _ => None,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            TaskCategory::Hvac => "hvac",
            TaskCategory::Roofing => "roofing",
            TaskCategory::Electrical => "electrical",
            TaskCategory::Plumbing => "plumbing",
            TaskCategory::Appliance => "appliance",
            TaskCategory::Exterior => "exterior",
            TaskCategory::General => "general",
        }
    }
}

/// Task priority as set by the user or the task generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    pub fn multiplier(&self) -> f64 {
        match self {
            TaskPriority::High => 1.0,
            TaskPriority::Medium => 0.7,
            TaskPriority::Low => 0.4,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "high" => Some(TaskPriority::High),
            "medium" => Some(TaskPriority::Medium),
            "low" => Some(TaskPriority::Low),
            _ => None,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }
}

/// A pending maintenance task, as loaded from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceTask {
    pub id: Uuid,
    pub title: String,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

/// Scoring weights and the suppression floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub urgency_weight: f64,
    pub impact_weight: f64,
    pub safety_weight: f64,
    /// Alerts scoring below this are suppressed (noise floor)
    pub score_floor: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            urgency_weight: 0.45,
            impact_weight: 0.35,
            safety_weight: 0.20,
            score_floor: 20,
        }
    }
}

/// One surfaced alert, with its component scores for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub task_id: Uuid,
    pub title: String,
    pub score: u32,
    pub urgency: f64,
    pub impact: f64,
    pub safety: f64,
}

/// Safety-relevant keywords; any match makes the safety signal 1.0.
const SAFETY_KEYWORDS: &[&str] = &[
    "gas", "leak", "carbon monoxide", "smoke", "fire", "electrical", "mold", "sewage",
];

/// Generate ranked alerts from pending tasks.
///
/// Returns alerts sorted descending by composite score, with everything
/// under `config.score_floor` suppressed.
pub fn generate_alerts_from_tasks(
    tasks: &[MaintenanceTask],
    config: &AlertConfig,
    today: NaiveDate,
) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = tasks
        .iter()
        .map(|task| score_task(task, config, today))
        .filter(|alert| alert.score >= config.score_floor)
        .collect();

    alerts.sort_by(|a, b| b.score.cmp(&a.score));
    alerts
}

fn score_task(task: &MaintenanceTask, config: &AlertConfig, today: NaiveDate) -> Alert {
    let urgency = urgency_score(task.due_date, today);
    let impact = impact_score(task);
    let safety = safety_score(&task.title);

    let composite = config.urgency_weight * urgency
        + config.impact_weight * impact
        + config.safety_weight * safety;
    let score = ((composite * 100.0).round() as u32).min(100);

    Alert {
        task_id: task.id,
        title: task.title.clone(),
        score,
        urgency,
        impact,
        safety,
    }
}

/// Stepped urgency from days until due: overdue 1.0, within a week 0.8,
/// within a month 0.6, then linear decay to zero at 90 days. No due
/// date scores zero urgency.
fn urgency_score(due_date: Option<NaiveDate>, today: NaiveDate) -> f64 {
    let due = match due_date {
        Some(date) => date,
        None => return 0.0,
    };

    let days_until = (due - today).num_days();
    if days_until < 0 {
        1.0
    } else if days_until <= 7 {
        0.8
    } else if days_until <= 30 {
        0.6
    } else if days_until <= 90 {
        0.6 * (90 - days_until) as f64 / 60.0
    } else {
        0.0
    }
}

fn impact_score(task: &MaintenanceTask) -> f64 {
    (task.category.cost_multiplier() * task.priority.multiplier()).clamp(0.0, 1.0)
}

fn safety_score(title: &str) -> f64 {
    let lowered = title.to_lowercase();
    if SAFETY_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        1.0
    } else {
        0.0
    }
}
