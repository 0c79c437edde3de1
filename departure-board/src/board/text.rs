//! String helpers for board text.

use crate::domain::contains_hhmm;

/// Operators whose names take "An" rather than "A".
const AN_OPERATORS: &[&str] = &["Elizabeth Line", "Avanti West Coast"];

/// Remove a parenthetical qualifier from a location name.
///
/// ```
/// use departure_board::board::text::strip_qualifier;
///
/// assert_eq!(strip_qualifier("Reading (Berks)"), "Reading");
/// assert_eq!(strip_qualifier("Bath Spa"), "Bath Spa");
/// ```
pub fn strip_qualifier(name: &str) -> &str {
    name.split(" (").next().unwrap_or(name)
}

/// Whether a value holds a real time rather than a status such as "On time".
pub fn looks_like_time(value: &str) -> bool {
    contains_hhmm(value)
}

/// Join the non-empty items with `separator`.
pub fn join_non_empty<I, S>(items: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for item in items {
        let item = item.as_ref();
        if item.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str(separator);
        }
        out.push_str(item);
    }
    out
}

/// "A, B and C": commas between items, "and" before the last.
pub fn join_with_and<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let init = init.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
            format!("{init} and {}", last.as_ref())
        }
    }
}

/// "A Great Western Railway Service", "An Avanti West Coast Service".
///
/// Empty when the operator is unknown.
pub fn service_phrase(operator: Option<&str>) -> String {
    match operator.map(str::trim) {
        None | Some("") => String::new(),
        Some(op) => {
            let article = if AN_OPERATORS.contains(&op) { "An" } else { "A" };
            format!("{article} {op} Service")
        }
    }
}

/// "formed of 8 coaches.", or empty when the length is unknown.
pub fn carriages_phrase(carriages: u32) -> String {
    if carriages == 0 {
        String::new()
    } else {
        format!("formed of {carriages} coaches.")
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn station_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{1,10}"
    }

    proptest! {
        /// Stripping is idempotent and never leaves a qualifier behind.
        #[test]
        fn strip_is_idempotent(name in "[A-Za-z ()]{0,30}") {
            let once = strip_qualifier(&name);
            prop_assert_eq!(strip_qualifier(once), once);
            prop_assert!(!once.contains(" ("));
        }

        /// Exactly one "and", and a comma between every other pair.
        #[test]
        fn and_before_last(names in proptest::collection::vec(station_name(), 2..8)) {
            let joined = join_with_and(&names);
            prop_assert_eq!(joined.matches(" and ").count(), 1);
            prop_assert_eq!(joined.matches(", ").count(), names.len() - 2);
            let last = names.last().unwrap();
            let expected_suffix = format!(" and {}", last);
            prop_assert!(joined.ends_with(&expected_suffix));
        }

        /// Joining never produces doubled or dangling separators.
        #[test]
        fn join_has_no_empty_tokens(items in proptest::collection::vec("[a-z]{0,3}", 0..10)) {
            let joined = join_non_empty(&items, "|");
            prop_assert!(!joined.starts_with('|'));
            prop_assert!(!joined.ends_with('|'));
            prop_assert!(!joined.contains("||"));
        }
    }
}
