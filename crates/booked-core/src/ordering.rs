//! Project id formatting and ordering.
//!
//! Ids are opaque strings. Purely numeric ids compare by value with no upper
//! bound on length; anything else compares chunk-wise, digit runs by value and
//! text case-insensitively. Ties fall back to a plain byte comparison so the
//! order is total.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Marker that makes a spreadsheet keep a value as literal text.
pub const TEXT_MARKER: char = '\'';

/// Returns true if `id` is a non-empty run of ASCII digits.
pub fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Formats a project id for the sheet.
///
/// Numeric ids and ids ending in `0` get a leading [`TEXT_MARKER`], otherwise
/// the store would turn them into numbers (losing digits or switching to
/// scientific notation).
pub fn format_project_id(id: &str) -> String {
    let needs_marker = is_numeric_id(id) || id.ends_with('0');
    if needs_marker && !id.starts_with(TEXT_MARKER) {
        format!("{TEXT_MARKER}{id}")
    } else {
        id.to_string()
    }
}

/// Formats a project name for the sheet.
///
/// Every non-empty name gets a leading [`TEXT_MARKER`] so the store keeps it
/// as typed: `=SUM(..)` stays text, `0012` keeps its zeros.
pub fn format_project_name(name: &str) -> String {
    if name.is_empty() || name.starts_with(TEXT_MARKER) {
        name.to_string()
    } else {
        format!("{TEXT_MARKER}{name}")
    }
}

/// Total order over raw project ids.
pub fn compare_project_ids(a: &str, b: &str) -> Ordering {
    let primary = if is_numeric_id(a) && is_numeric_id(b) {
        compare_digit_runs(a, b)
    } else {
        natural_cmp(a, b)
    };
    primary.then_with(|| a.cmp(b))
}

/// Case-insensitive ordering for column names, ties broken by byte order.
pub fn compare_column_names(a: &str, b: &str) -> Ordering {
    Iterator::cmp(
        a.chars().flat_map(char::to_lowercase),
        b.chars().flat_map(char::to_lowercase),
    )
    .then_with(|| a.cmp(b))
}

/// Compares two digit strings by numeric value, whatever their length.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        run.push(c);
        chars.next();
    }
    run
}

/// Numeric-substring-aware, case-insensitive comparison.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let l = take_digits(&mut left);
                let r = take_digits(&mut right);
                match compare_digit_runs(&l, &r) {
                    Ordering::Equal => continue,
                    ord => return ord,
                }
            }
            (Some(x), Some(y)) => {
                left.next();
                right.next();
                match Iterator::cmp(x.to_lowercase(), y.to_lowercase()) {
                    Ordering::Equal => continue,
                    ord => return ord,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numeric_and_trailing_zero() {
        assert_eq!(format_project_id("1207774466340577"), "'1207774466340577");
        assert_eq!(format_project_id("abc0"), "'abc0");
        assert_eq!(format_project_id("abc1"), "abc1");
        assert_eq!(format_project_id("'123"), "'123");
        assert_eq!(format_project_id(""), "");
    }

    #[test]
    fn test_format_project_name() {
        assert_eq!(format_project_name("Website"), "'Website");
        assert_eq!(format_project_name("=HYPERLINK(\"x\")"), "'=HYPERLINK(\"x\")");
        assert_eq!(format_project_name("+1 campaign"), "'+1 campaign");
        assert_eq!(format_project_name("0012"), "'0012");
        assert_eq!(format_project_name("'Quoted"), "'Quoted");
        assert_eq!(format_project_name(""), "");
    }

    #[test]
    fn test_numeric_ids_compare_by_value() {
        assert_eq!(compare_project_ids("2", "10"), Ordering::Less);
        assert_eq!(compare_project_ids("10", "2"), Ordering::Greater);
        assert_eq!(compare_project_ids("42", "42"), Ordering::Equal);
    }

    #[test]
    fn test_ids_beyond_u64() {
        let five = "12345";
        let fifteen = "123456789012345";
        let twenty = "98765432109876543210";
        let twenty_five = "1000000000000000000000000";

        assert!(twenty.parse::<u64>().is_err());
        assert_eq!(compare_project_ids(five, fifteen), Ordering::Less);
        assert_eq!(compare_project_ids(fifteen, twenty), Ordering::Less);
        assert_eq!(compare_project_ids(twenty, twenty_five), Ordering::Less);
        assert_eq!(
            compare_project_ids("98765432109876543211", twenty),
            Ordering::Greater
        );
    }

    #[test]
    fn test_leading_zeros_are_deterministic() {
        assert_eq!(compare_digit_runs("007", "7"), Ordering::Equal);
        assert_ne!(compare_project_ids("007", "7"), Ordering::Equal);
    }

    #[test]
    fn test_natural_order_for_mixed_ids() {
        let mut ids = vec!["proj-10", "Proj-9", "proj-1", "alpha", "42"];
        ids.sort_by(|a, b| compare_project_ids(a, b));
        assert_eq!(ids, vec!["42", "alpha", "proj-1", "Proj-9", "proj-10"]);
    }

    #[test]
    fn test_column_names_case_insensitive() {
        let mut names = vec!["bob@x.io", "Alice@x.io", "alice@x.io", "<unassigned>"];
        names.sort_by(|a, b| compare_column_names(a, b));
        assert_eq!(names, vec!["<unassigned>", "Alice@x.io", "alice@x.io", "bob@x.io"]);
    }
}
