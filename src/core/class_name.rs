//! Class identifier normalization.
//!
//! Class names arrive as either `<letter><digits>` ("ג2") or
//! `<digits><letter>` ("2ג"), with the grade letter written in Hebrew or in
//! its Latin equivalent. Storage keys are letter-first and Latin; display
//! names are letter-first and Hebrew.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TgError};

/// Digit-first form: leading number, optional spacing, then the grade part.
static DIGIT_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\s*([^0-9].*)?$").expect("valid regex"));

/// The standard classes of the school, in display form.
pub const GRADE_LEVELS: [&str; 12] = [
    "א1", "א2", "ב1", "ב2", "ג1", "ג2", "ד1", "ד2", "ה1", "ה2", "ו1", "ו2",
];

/// Grade letters with a fixed Hebrew/Latin correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    pub const ALL: [Self; 6] = [Self::A, Self::B, Self::C, Self::D, Self::E, Self::F];

    #[must_use]
    pub const fn hebrew(self) -> char {
        match self {
            Self::A => 'א',
            Self::B => 'ב',
            Self::C => 'ג',
            Self::D => 'ד',
            Self::E => 'ה',
            Self::F => 'ו',
        }
    }

    #[must_use]
    pub const fn latin(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
        }
    }

    /// Look up a grade from either alphabet. Lowercase Latin is accepted.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|grade| grade.hebrew() == c || grade.latin() == upper)
    }

    const fn in_alphabet(self, alphabet: Alphabet) -> char {
        match alphabet {
            Alphabet::Latin => self.latin(),
            Alphabet::Hebrew => self.hebrew(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alphabet {
    Latin,
    Hebrew,
}

/// Reorder a digit-first class name to letter-first. The alphabet is kept.
#[must_use]
pub fn standardize(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        warn!("received empty class name for standardization");
        return String::new();
    }

    if let Some(caps) = DIGIT_FIRST.captures(trimmed) {
        let number = &caps[1];
        let grade = caps.get(2).map_or("", |m| m.as_str().trim());
        return format!("{grade}{number}");
    }

    trimmed.to_string()
}

/// Canonical storage key: letter-first, Latin grade letter.
#[must_use]
pub fn to_canonical_alphabet(name: &str) -> String {
    convert(name, Alphabet::Latin)
}

/// Display form: letter-first, Hebrew grade letter.
#[must_use]
pub fn to_display_alphabet(name: &str) -> String {
    convert(name, Alphabet::Hebrew)
}

fn convert(name: &str, alphabet: Alphabet) -> String {
    let standardized = standardize(name);
    let mut chars = standardized.chars();
    let Some(first) = chars.next() else {
        return standardized;
    };

    match Grade::from_char(first) {
        Some(grade) => format!("{}{}", grade.in_alphabet(alphabet), chars.as_str()),
        None => {
            warn!(class = %name, letter = %first, "no grade mapping for class name");
            standardized
        }
    }
}

/// True when `literal` is already in canonical storage form.
#[must_use]
pub fn is_canonical(literal: &str) -> bool {
    !literal.is_empty() && to_canonical_alphabet(literal) == literal
}

/// Display grade letter of a class name, if it has a known one.
#[must_use]
pub fn grade_of(name: &str) -> Option<char> {
    to_display_alphabet(name)
        .chars()
        .next()
        .and_then(Grade::from_char)
        .map(Grade::hebrew)
}

/// A validated class identifier carrying both its storage key and display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassName {
    key: String,
    display: String,
}

impl ClassName {
    /// Normalize a raw class identifier.
    ///
    /// Empty input is rejected. Unknown grade letters are tolerated and kept
    /// as-is after reordering.
    pub fn parse(raw: &str) -> Result<Self> {
        let key = to_canonical_alphabet(raw);
        if key.is_empty() {
            return Err(TgError::InvalidClassName(raw.to_string()));
        }
        let display = to_display_alphabet(&key);
        Ok(Self { key, display })
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }
}

impl std::fmt::Display for ClassName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestCase, run_table_tests};

    fn case(name: &'static str, input: &str, expected: &str) -> TestCase<String, String> {
        TestCase {
            name,
            input: input.to_string(),
            expected: expected.to_string(),
            should_panic: false,
        }
    }

    #[test]
    fn standardize_table() {
        run_table_tests(
            vec![
                case("hebrew letter first", "ג2", "ג2"),
                case("hebrew digit first", "2ג", "ג2"),
                case("latin digit first", "1A", "A1"),
                case("latin letter first", "A1", "A1"),
                case("multi digit", "12ב", "ב12"),
                case("surrounding space", "  2ג ", "ג2"),
                case("inner space", "2 ג", "ג2"),
                case("digits only", "22", "22"),
                case("empty", "", ""),
            ],
            |input| standardize(&input),
        );
    }

    #[test]
    fn canonical_table() {
        run_table_tests(
            vec![
                case("hebrew letter first", "ג2", "C2"),
                case("hebrew digit first", "1א", "A1"),
                case("already latin", "D1", "D1"),
                case("latin digit first", "2F", "F2"),
                case("lowercase latin", "c2", "C2"),
                case("unknown letter kept", "ז1", "ז1"),
                case("unknown letter reordered", "1G", "G1"),
                case("empty", "", ""),
            ],
            |input| to_canonical_alphabet(&input),
        );
    }

    #[test]
    fn display_table() {
        run_table_tests(
            vec![
                case("latin", "C2", "ג2"),
                case("latin digit first", "1A", "א1"),
                case("already hebrew", "ו2", "ו2"),
                case("unknown letter", "G1", "G1"),
            ],
            |input| to_display_alphabet(&input),
        );
    }

    #[test]
    fn grade_levels_round_trip_through_canonical_form() {
        for level in GRADE_LEVELS {
            assert_eq!(to_display_alphabet(&to_canonical_alphabet(level)), level);
        }
    }

    #[test]
    fn class_name_parse_both_orders_share_a_key() {
        let a = ClassName::parse("ג2").unwrap();
        let b = ClassName::parse("2ג").unwrap();
        let c = ClassName::parse("C2").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.key(), "C2");
        assert_eq!(a.display(), "ג2");
        assert_eq!(a.to_string(), "ג2");
    }

    #[test]
    fn class_name_parse_rejects_empty() {
        let err = ClassName::parse("   ").unwrap_err();
        assert!(matches!(err, TgError::InvalidClassName(_)));
    }

    #[test]
    fn is_canonical_checks_literal_form() {
        assert!(is_canonical("A1"));
        assert!(!is_canonical("1א"));
        assert!(!is_canonical("א1"));
        assert!(!is_canonical(""));
    }

    #[test]
    fn grade_of_uses_display_letter() {
        assert_eq!(grade_of("C2"), Some('ג'));
        assert_eq!(grade_of("1ו"), Some('ו'));
        assert_eq!(grade_of("Z9"), None);
    }
}
