use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority marker carried by warehouse orders
/// Higher values = more urgent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low = 1,
    #[default]
    Normal = 2,
    High = 3,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
    }

    #[test]
    fn test_display_matches_serde_label() {
        assert_eq!(Priority::High.to_string(), "high");
        assert_eq!(
            serde_json::to_value(Priority::Low).unwrap(),
            serde_json::json!("low")
        );
        assert_eq!(Priority::default(), Priority::Normal);
    }
}
