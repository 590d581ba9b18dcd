use serde::{Deserialize, Serialize};

/// One flat expense record, built fresh from form-field values on each submit
/// intent and serialized as the `/recordExpense` request body.
///
/// `date` is the only guaranteed wire field and is carried verbatim from the
/// date control, exactly as read. The remaining fields are omitted from the
/// serialized JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Lenient amount parsing for raw control values. Anything that is not a plain
/// number becomes `None` rather than a submission failure.
pub fn parse_amount(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_date_only_record_without_optional_keys() {
        let record = ExpenseRecord {
            date: "2024-03-01".to_string(),
            amount: None,
            category: None,
            description: None,
        };

        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v, json!({"date": "2024-03-01"}));
    }

    #[test]
    fn date_is_carried_verbatim_even_when_empty() {
        let record = ExpenseRecord {
            date: "  ".to_string(),
            amount: None,
            category: None,
            description: None,
        };

        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v, json!({"date": "  "}));
    }

    #[test]
    fn round_trips_full_record() {
        let v = json!({
            "date": "2024-03-01",
            "amount": 12.5,
            "category": "food",
            "description": "lunch"
        });

        let record: ExpenseRecord = serde_json::from_value(v).unwrap();
        assert_eq!(record.amount, Some(12.5));
        assert_eq!(record.category.as_deref(), Some("food"));
    }

    #[test]
    fn parses_amounts_leniently() {
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("twelve"), None);
    }
}
