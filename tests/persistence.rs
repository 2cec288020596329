use schnizzle::state::{PersistenceError, load_diagrams, save_diagrams};
use schnizzle::{ApplicationModel, Diagram, DiagramStyle, DiagramType};

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"/>"#;

fn populated_model() -> ApplicationModel {
    let mut model = ApplicationModel::new();
    for ty in DiagramType::ALL {
        for n in 0..3 {
            let mut diagram = Diagram::new(ty, format!("{ty} {n}"));
            diagram.set_script(format!("script {n}"));
            diagram.set_style(DiagramStyle::new("Plain", "plain;"));
            if n == 1 {
                diagram.set_note(Some(format!("note for {ty}")));
                diagram.set_encoded_image(SVG);
            }
            model.add_diagram(diagram);
        }
    }
    model
}

#[test]
fn test_round_trip_preserves_collections_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let model = populated_model();

    let written = save_diagrams(&dir.path().join("all"), model.all_diagrams().cloned().collect()).unwrap();
    assert_eq!(written.file_name().unwrap(), "all.jsl");

    let mut reloaded = ApplicationModel::new();
    for diagram in load_diagrams(&written).unwrap() {
        reloaded.add_diagram(diagram);
    }

    for ty in DiagramType::ALL {
        assert_eq!(reloaded.diagrams(ty), model.diagrams(ty), "{ty} differs");
    }
}

#[test]
fn test_garbage_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.jsl");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_diagrams(&path), Err(PersistenceError::SerializationError(_))));
}

#[test]
fn test_unwritable_location_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let result = save_diagrams(&dir.path().join("missing").join("x"), Vec::new());
    assert!(matches!(result, Err(PersistenceError::WriteError { .. })));
}
