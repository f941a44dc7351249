use proptest::prelude::*;

use treeguard::core::class_name::{
    ClassName, is_canonical, standardize, to_canonical_alphabet, to_display_alphabet,
};

const HEBREW: [&str; 6] = ["א", "ב", "ג", "ד", "ה", "ו"];
const LATIN: [&str; 12] = ["A", "B", "C", "D", "E", "F", "a", "b", "c", "d", "e", "f"];

/// Class identifiers in either token order, with optional spacing in the
/// digit-first form.
fn arb_class_name(letters: &'static [&'static str]) -> impl Strategy<Value = String> {
    (
        prop::sample::select(letters),
        "[1-9][0-9]?",
        any::<bool>(),
        prop::sample::select(&["", " "][..]),
    )
        .prop_map(|(letter, number, digit_first, gap)| {
            if digit_first {
                format!("{number}{gap}{letter}")
            } else {
                format!("{letter}{number}")
            }
        })
}

fn arb_any_class_name() -> impl Strategy<Value = String> {
    prop_oneof![arb_class_name(&HEBREW), arb_class_name(&LATIN)]
}

proptest! {
    #[test]
    fn standardize_is_idempotent(name in arb_any_class_name()) {
        let once = standardize(&name);
        prop_assert_eq!(standardize(&once), once);
    }

    #[test]
    fn display_of_canonical_matches_standardized_hebrew(name in arb_class_name(&HEBREW)) {
        prop_assert_eq!(to_display_alphabet(&to_canonical_alphabet(&name)), standardize(&name));
    }

    #[test]
    fn canonical_form_is_stable(name in arb_any_class_name()) {
        let key = to_canonical_alphabet(&name);
        prop_assert!(is_canonical(&key));
        prop_assert_eq!(to_canonical_alphabet(&to_display_alphabet(&key)), key.clone());

        let parsed = ClassName::parse(&name).unwrap();
        prop_assert_eq!(parsed.key(), key.as_str());
    }

    #[test]
    fn surrounding_whitespace_is_ignored(name in arb_any_class_name(), pad in "[ \t]{0,3}") {
        let padded = format!("{pad}{name}{pad}");
        prop_assert_eq!(to_canonical_alphabet(&padded), to_canonical_alphabet(&name));
    }
}
