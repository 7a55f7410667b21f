use std::fmt;

/// Shared four-step scale used by both severity and priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Low,
    Medium,
    High,
    Critical,
}

impl Level {
    /// Case-insensitive parse. Unknown or absent values fall into `Medium`.
    pub fn parse_or_medium(value: Option<&str>) -> Level {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("critical") => Level::Critical,
            Some("high") => Level::High,
            Some("low") => Level::Low,
            _ => Level::Medium,
        }
    }

    pub fn severity_label(self) -> &'static str {
        match self {
            Level::Critical => "🔥 critical",
            Level::High => "🚨 high severity",
            Level::Medium => "⚠️ medium severity",
            Level::Low => "📝 low severity",
        }
    }

    pub fn priority_label(self) -> &'static str {
        match self {
            Level::Critical => "🎯 urgent",
            Level::High => "📈 high priority",
            Level::Medium => "📊 medium priority",
            Level::Low => "📉 low priority",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::Medium => write!(f, "medium"),
            Level::High => write!(f, "high"),
            Level::Critical => write!(f, "critical"),
        }
    }
}

/// A label the bootstrap step makes sure exists in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelSpec {
    pub name: &'static str,
    /// Hex color without the leading `#`
    pub color: &'static str,
    pub description: &'static str,
}

/// Palette created by `--create-labels`, covering every label the formatter
/// can derive plus the common category labels.
pub const STANDARD_LABELS: &[LabelSpec] = &[
    LabelSpec { name: "🔥 critical", color: "B60205", description: "Critical severity bugs" },
    LabelSpec { name: "🚨 high severity", color: "D93F0B", description: "High severity bugs" },
    LabelSpec { name: "⚠️ medium severity", color: "FBCA04", description: "Medium severity bugs" },
    LabelSpec { name: "📝 low severity", color: "0E8A16", description: "Low severity bugs" },
    LabelSpec { name: "🎯 urgent", color: "B60205", description: "Urgent priority" },
    LabelSpec { name: "📈 high priority", color: "D93F0B", description: "High priority" },
    LabelSpec { name: "📊 medium priority", color: "FBCA04", description: "Medium priority" },
    LabelSpec { name: "📉 low priority", color: "0E8A16", description: "Low priority" },
    LabelSpec { name: "bug", color: "D73A49", description: "Something is not working" },
    LabelSpec { name: "ui", color: "1D76DB", description: "User interface related" },
    LabelSpec { name: "accessibility", color: "7057FF", description: "Accessibility improvements" },
    LabelSpec { name: "security", color: "B60205", description: "Security vulnerability" },
];
