use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use treeguard::core::class_name::to_canonical_alphabet;
use treeguard::core::documentation::{DocumentationPatch, NewDocumentation};
use treeguard::core::skills::SkillPolicy;
use treeguard::test_utils::fixtures::{TestStore, day};

const CLASS_SPELLINGS: [&str; 6] = ["ג2", "2ג", "C2", "c2", "ד1", "1 ד"];
const SKILLS: [&str; 4] = ["תקשורת", "אמפתיה", "התמדה", "גישוש"];

#[derive(Debug, Clone)]
enum Op {
    Add { class: usize, skills: Vec<usize>, day: u32 },
    Update { target: usize, class: Option<usize>, skills: Option<Vec<usize>> },
    Delete { target: usize },
}

fn arb_skills() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..SKILLS.len(), 0..4)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..CLASS_SPELLINGS.len(), arb_skills(), 1u32..28)
            .prop_map(|(class, skills, day)| Op::Add { class, skills, day }),
        2 => (
            any::<usize>(),
            prop::option::of(0..CLASS_SPELLINGS.len()),
            prop::option::of(arb_skills()),
        )
            .prop_map(|(target, class, skills)| Op::Update { target, class, skills }),
        1 => any::<usize>().prop_map(|target| Op::Delete { target }),
    ]
}

fn skill_names(indices: &[usize]) -> Vec<String> {
    indices.iter().map(|&i| SKILLS[i].to_string()).collect()
}

/// Model entry: canonical class key and skill tags.
type Model = BTreeMap<String, (String, Vec<String>)>;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn aggregates_match_live_entries(ops in prop::collection::vec(arb_op(), 1..12)) {
        let store = TestStore::new();
        let mut sync = store.synchronizer(SkillPolicy::Promote);
        let mut model: Model = BTreeMap::new();

        for op in ops {
            match op {
                Op::Add { class, skills, day: d } => {
                    let doc = sync
                        .add_documentation(
                            NewDocumentation::new("activity", CLASS_SPELLINGS[class], day(d))
                                .skills(skill_names(&skills)),
                        )
                        .unwrap();
                    model.insert(doc.id, (to_canonical_alphabet(CLASS_SPELLINGS[class]), doc.skill_ids));
                }
                Op::Update { target, class, skills } => {
                    if model.is_empty() {
                        continue;
                    }
                    let id = model.keys().nth(target % model.len()).unwrap().clone();
                    let patch = DocumentationPatch {
                        class_name: class.map(|c| CLASS_SPELLINGS[c].to_string()),
                        skill_ids: skills.map(|s| skill_names(&s)),
                        ..DocumentationPatch::default()
                    };
                    if patch.is_empty() {
                        continue;
                    }
                    let doc = sync.update_documentation(&id, patch).unwrap();
                    model.insert(id, (doc.class_name, doc.skill_ids));
                }
                Op::Delete { target } => {
                    if model.is_empty() {
                        continue;
                    }
                    let id = model.keys().nth(target % model.len()).unwrap().clone();
                    sync.delete_documentation(&id).unwrap();
                    model.remove(&id);
                }
            }
        }

        for key in ["C2", "D1"] {
            let live: Vec<&Vec<String>> = model
                .values()
                .filter(|(class, _)| class == key)
                .map(|(_, skills)| skills)
                .collect();
            let expected: BTreeSet<String> = live.iter().flat_map(|s| s.iter().cloned()).collect();

            match sync.find_class(key).unwrap() {
                Some(class) => {
                    prop_assert_eq!(class.total_activities as usize, live.len());
                    prop_assert_eq!(class.acquired_skills, expected.into_iter().collect::<Vec<_>>());
                }
                None => prop_assert!(live.is_empty()),
            }
        }

        prop_assert!(store.db.list_classes().unwrap().len() <= 2);
    }
}
