use serde_json::Value;

use crate::input::RequestInput;

pub const DEFAULT_POPULAR_LIMIT: i64 = 20;
pub const MAX_POPULAR_LIMIT: i64 = 100;

/// Paging for the popular-series listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopularSeriesDto {
    pub limit: i64,
}

impl Default for PopularSeriesDto {
    fn default() -> Self {
        Self {
            limit: DEFAULT_POPULAR_LIMIT,
        }
    }
}

impl PopularSeriesDto {
    pub fn from_input(input: &impl RequestInput) -> Self {
        let limit = match input.input("limit") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .unwrap_or(DEFAULT_POPULAR_LIMIT);

        Self {
            limit: limit.clamp(1, MAX_POPULAR_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::JsonInput;
    use serde_json::json;

    fn limit_for(value: serde_json::Value) -> i64 {
        PopularSeriesDto::from_input(&JsonInput::from_value(value)).limit
    }

    #[test]
    fn defaults_to_twenty() {
        assert_eq!(limit_for(json!({})), 20);
        assert_eq!(limit_for(json!({ "limit": "abc" })), 20);
        assert_eq!(PopularSeriesDto::default().limit, 20);
    }

    #[test]
    fn parses_and_clamps() {
        assert_eq!(limit_for(json!({ "limit": "5" })), 5);
        assert_eq!(limit_for(json!({ "limit": 0 })), 1);
        assert_eq!(limit_for(json!({ "limit": "500" })), 100);
    }
}
