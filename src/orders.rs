use crate::priority::Priority;
use serde::{Deserialize, Serialize};

/// External request to pick and deliver a set of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub items: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
}

impl Order {
    pub fn new<I, S>(order_id: impl Into<String>, items: I, priority: Priority) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order_id: order_id.into(),
            items: items.into_iter().map(Into::into).collect(),
            priority,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_json_defaults_priority() {
        let order: Order =
            serde_json::from_str(r#"{"order_id":"ORD_009","items":["a","b"]}"#).unwrap();
        assert_eq!(order.priority, Priority::Normal);
        assert_eq!(order.item_count(), 2);
    }
}
