use serde::{Deserialize, Serialize};

use super::{Amount, Category, Direction, first_amount};

/// Substrings that mark a message as money coming in.
const INFLOW_KEYWORDS: &[&str] = &["gaji", "masuk", "+"];

/// Category keywords, checked in order. First match wins.
const CATEGORY_RULES: &[(&[&str], Category)] = &[
    (&["makan"], Category::Food),
    (&["bensin", "transport"], Category::Transport),
    (&["gaji"], Category::Salary),
];

/// Structured reading of a free-text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub direction: Direction,
    pub category: Category,
    pub amount: Amount,
}

/// Classify a free-text message into direction, category and amount.
///
/// Never fails: text without any keyword is an outflow in `Other`, and
/// text without any digit has amount 0. Matching is a case-insensitive
/// substring check with no word boundaries, so "masukan" counts as inflow.
pub fn classify(text: &str) -> Classification {
    let text = text.to_lowercase();

    let direction = if INFLOW_KEYWORDS.iter().any(|k| text.contains(k)) {
        Direction::Inflow
    } else {
        Direction::Outflow
    };

    let category = CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other);

    Classification {
        direction,
        category,
        amount: first_amount(&text),
    }
}
