/*!
 * Rendering of card field values as display text.
 *
 * Mapping fields are lists of requirement numbers; consecutive numbers are
 * shown as ranges (`1-3, 7, 9-10`).
 */

use crate::language_data::FieldValue;

/// Text used for a list field with no elements
pub const EMPTY_LIST_TEXT: &str = " - ";

/// Render a field value as one string, optionally compressing number ranges
pub fn field_text(value: &FieldValue, group_numbers: bool) -> String {
    match value {
        FieldValue::Scalar(text) => text.clone(),
        FieldValue::List(items) => list_into_text(items, group_numbers),
    }
}

/// Join list elements with `", "`; a blank result becomes [`EMPTY_LIST_TEXT`]
pub fn list_into_text(items: &[String], group_numbers: bool) -> String {
    let text = if group_numbers {
        group_number_ranges(items).join(", ")
    } else {
        items.join(", ")
    };

    if text.trim().is_empty() {
        EMPTY_LIST_TEXT.to_string()
    } else {
        text
    }
}

/// Collapse runs of consecutive integers into `start-end`.
///
/// Only lists of two or more non-negative integer literals are compressed;
/// anything else is returned unchanged. Runs keep their input order.
pub fn group_number_ranges(items: &[String]) -> Vec<String> {
    if items.len() < 2 || !items.iter().all(|s| is_integer_literal(s)) {
        return items.to_vec();
    }

    let numbers: Option<Vec<u64>> = items.iter().map(|s| s.parse::<u64>().ok()).collect();
    let Some(numbers) = numbers else {
        return items.to_vec();
    };

    let mut ranges = Vec::new();
    let mut start = numbers[0];
    let mut end = numbers[0];
    for &n in &numbers[1..] {
        if end.checked_add(1) == Some(n) {
            end = n;
        } else {
            ranges.push(format_range(start, end));
            start = n;
            end = n;
        }
    }
    ranges.push(format_range(start, end));
    ranges
}

fn format_range(start: u64, end: u64) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

fn is_integer_literal(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
