use proptest::prelude::*;
use schnizzle::{ApplicationModel, Diagram, DiagramType};

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    DeleteStored(usize),
    DeleteUnknown(usize),
    Replace(usize),
    DeleteAll,
    MarkClean,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize).prop_map(Op::Add),
        any::<usize>().prop_map(Op::DeleteStored),
        (0..4usize).prop_map(Op::DeleteUnknown),
        any::<usize>().prop_map(Op::Replace),
        Just(Op::DeleteAll),
        Just(Op::MarkClean),
    ]
}

fn stored(model: &ApplicationModel, pick: usize) -> Option<Diagram> {
    let all: Vec<_> = model.all_diagrams().cloned().collect();
    (!all.is_empty()).then(|| all[pick % all.len()].clone())
}

proptest! {
    #[test]
    fn test_dirty_tracks_mutations(ops in prop::collection::vec(op(), 1..40)) {
        let mut model = ApplicationModel::new();
        prop_assert!(!model.is_dirty());

        for op in ops {
            let expected = match op {
                Op::Add(ty) => {
                    model.add_diagram(Diagram::new(DiagramType::ALL[ty], "d"));
                    true
                }
                Op::DeleteStored(pick) => {
                    if let Some(diagram) = stored(&model, pick) {
                        prop_assert!(model.delete_diagram(&diagram));
                    } else {
                        model.delete_diagram(&Diagram::new(DiagramType::Class, "none"));
                    }
                    true
                }
                Op::DeleteUnknown(ty) => {
                    prop_assert!(!model.delete_diagram(&Diagram::new(DiagramType::ALL[ty], "ghost")));
                    true
                }
                Op::Replace(pick) => match stored(&model, pick) {
                    Some(mut diagram) => {
                        diagram.set_name("renamed");
                        prop_assert!(model.replace_diagram(diagram));
                        true
                    }
                    None => model.is_dirty(),
                },
                Op::DeleteAll => {
                    model.delete_all_diagrams();
                    prop_assert!(model.is_empty());
                    false
                }
                Op::MarkClean => {
                    model.mark_clean();
                    false
                }
            };
            prop_assert_eq!(model.is_dirty(), expected);
        }
    }

    #[test]
    fn test_collections_stay_partitioned(types in prop::collection::vec(0..4usize, 0..30)) {
        let mut model = ApplicationModel::new();
        for (i, ty) in types.iter().enumerate() {
            model.add_diagram(Diagram::new(DiagramType::ALL[*ty], format!("d{i}")));
        }
        prop_assert_eq!(model.len(), types.len());
        for ty in DiagramType::ALL {
            prop_assert!(model.diagrams(ty).iter().all(|d| d.diagram_type() == ty));
        }
    }
}

#[test]
fn test_delete_all_empties_every_collection() {
    let mut model = ApplicationModel::new();
    for ty in DiagramType::ALL {
        model.add_diagram(Diagram::new(ty, "first"));
        model.add_diagram(Diagram::new(ty, "second"));
    }
    assert!(model.is_dirty());

    model.delete_all_diagrams();
    for ty in DiagramType::ALL {
        assert!(model.diagrams(ty).is_empty());
    }
    assert!(!model.is_dirty());
}
