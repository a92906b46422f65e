//! Tests for ConversionService, Converter and run_conversion

use std::rc::Rc;
use std::sync::Arc;

use tempfile::TempDir;

use tabtree::application::render::json;
use tabtree::application::services::{run_conversion, ConversionService, Converter, ConverterConfig};
use tabtree::application::{ApplicationError, Format};
use tabtree::domain::{DepthPolicy, DomainError, NullObserver, TreeNode};
use tabtree::infrastructure::traits::RealFileSystem;
use tabtree::util::testing::{init_test_setup, write_input, ObservedEvent, RecordingObserver, SAMPLE_CSV};

fn node(label: &str, id: &str, link: &str, children: Vec<TreeNode>) -> TreeNode {
    TreeNode {
        label: label.into(),
        id: id.into(),
        link: link.into(),
        children,
    }
}

fn sample_forest() -> Vec<TreeNode> {
    vec![node(
        "Meat & Fish",
        "179549",
        "browse/179549",
        vec![node("Fish", "176741", "browse/179549/176741", vec![])],
    )]
}

fn service() -> ConversionService {
    ConversionService::new(Arc::new(RealFileSystem))
}

#[test]
fn given_sample_csv_when_converting_then_two_level_forest() {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "sample.csv", SAMPLE_CSV);
    let config = ConverterConfig::new(&input, ",", 1, 0);

    // Act
    let output = service().run(&config, Format::Json, &NullObserver).unwrap();

    // Assert
    assert_eq!(output.forest, sample_forest());
    assert_eq!(output.format, Format::Json);
}

#[test]
fn given_sample_csv_when_converting_to_json_then_pretty_printed_with_four_spaces() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "sample.csv", SAMPLE_CSV);
    let config = ConverterConfig::new(&input, ",", 1, 0);

    // Act
    let output = run_conversion(&config, Format::Json, &NullObserver).unwrap();

    // Assert
    let expected = r#"[
    {
        "label": "Meat & Fish",
        "Id": "179549",
        "link": "browse/179549",
        "children": [
            {
                "label": "Fish",
                "Id": "176741",
                "link": "browse/179549/176741",
                "children": []
            }
        ]
    }
]"#;
    assert_eq!(output.text, expected);
    assert_eq!(json::parse(&output.text).unwrap(), output.forest);
}

#[test]
fn given_sample_csv_when_converting_to_xml_then_well_formed_document() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "sample.csv", SAMPLE_CSV);
    let config = ConverterConfig::new(&input, ",", 1, 0);

    // Act
    let output = run_conversion(&config, Format::Xml, &NullObserver).unwrap();

    // Assert
    assert!(output.text.starts_with("<?xml version=\"1.0\" ?>\n<root>\n"));
    let doc = roxmltree::Document::parse(&output.text).expect("well-formed xml");
    let labels: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("label"))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(labels, vec!["Meat & Fish", "Fish"]);
}

#[test]
fn given_sample_csv_when_converting_to_tree_then_nested_lines() {
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "sample.csv", SAMPLE_CSV);
    let config = ConverterConfig::new(&input, ",", 1, 0);

    let output = run_conversion(&config, Format::Tree, &NullObserver).unwrap();

    let lines: Vec<_> = output.text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Meat & Fish"));
    assert!(lines[1].contains("Fish (176741)"));
}

#[test]
fn given_missing_input_when_running_conversion_then_file_not_found() {
    let temp = TempDir::new().unwrap();
    let config = ConverterConfig::new(temp.path().join("absent.csv"), ",", 1, 0);

    let err = run_conversion(&config, Format::Json, &NullObserver).unwrap_err();

    assert!(matches!(err, ApplicationError::FileNotFound(_)));
    assert!(err.is_missing_input());
}

#[test]
fn given_missing_input_when_converter_converts_then_empty_output_and_observer_notified() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent.csv");
    let observer = Rc::new(RecordingObserver::default());
    let mut converter = Converter::with_deps(
        ConverterConfig::new(&missing, ",", 1, 0),
        Format::Json,
        Arc::new(RealFileSystem),
        Box::new(Rc::clone(&observer)),
    );

    // Act
    converter.convert().unwrap();

    // Assert
    assert!(converter.forest().is_empty());
    assert_eq!(converter.rendered(), "[]");
    assert_eq!(observer.events(), vec![ObservedEvent::InputMissing(missing)]);
}

#[test]
fn given_converter_when_converting_twice_then_identical_results() {
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "sample.csv", SAMPLE_CSV);
    let mut converter = Converter::new(ConverterConfig::new(&input, ",", 1, 0), Format::Xml);

    converter.convert().unwrap();
    let first = (converter.forest().to_vec(), converter.rendered().to_string());
    converter.convert().unwrap();

    assert_eq!(converter.forest(), first.0.as_slice());
    assert_eq!(converter.rendered(), first.1);
}

#[test]
fn given_converted_forest_when_writing_then_file_holds_rendered_text() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "sample.csv", SAMPLE_CSV);
    let target = temp.path().join("out/nested/sample.json");
    let mut converter = Converter::new(ConverterConfig::new(&input, ",", 1, 0), Format::Json);
    converter.convert().unwrap();

    // Act
    converter.write(&target).unwrap();

    // Assert
    let written = std::fs::read_to_string(&target).unwrap();
    assert_eq!(written, converter.rendered());
}

#[test]
fn given_stale_jump_when_permissive_then_attached_to_earlier_branch() {
    // Arrange: the depth-3 row follows a fresh root, its parent slot still
    // holds the depth-2 node of the first tree.
    let temp = TempDir::new().unwrap();
    let content = "\
header
A,1,a,,,,,,
A,1,a,B,2,b,,,
C,3,c,,,,,,
C,3,c,D,4,d,E,5,e
";
    let input = write_input(temp.path(), "stale.csv", content);
    let config = ConverterConfig::new(&input, ",", 1, 0);

    // Act
    let output = service().run(&config, Format::Json, &NullObserver).unwrap();

    // Assert
    assert_eq!(output.forest.len(), 2);
    assert_eq!(output.forest[0].children[0].children[0].label, "E");
    assert!(output.forest[1].children.is_empty());
}

#[test]
fn given_stale_jump_when_strict_then_depth_jump_error() {
    let temp = TempDir::new().unwrap();
    let content = "header\nA,1,a,,,,,,\nA,1,a,B,2,b,C,3,c\n";
    let input = write_input(temp.path(), "jump.csv", content);
    let config = ConverterConfig::new(&input, ",", 1, 0).with_depth_policy(DepthPolicy::Strict);

    let err = service().run(&config, Format::Json, &NullObserver).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::DepthJump {
            row: 2,
            depth: 3,
            previous: 1
        })
    ));
}

#[test]
fn given_failing_conversion_when_converter_converts_then_state_cleared() {
    // Arrange: first run succeeds, then the input is replaced by a jumping one
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "sample.csv", SAMPLE_CSV);
    let config = ConverterConfig::new(&input, ",", 1, 0).with_depth_policy(DepthPolicy::Strict);
    let mut converter = Converter::new(config, Format::Json);
    converter.convert().unwrap();
    assert!(!converter.forest().is_empty());

    write_input(temp.path(), "sample.csv", "header\nA,1,a,B,2,b\n");

    // Act
    let result = converter.convert();

    // Assert
    assert!(result.is_err());
    assert!(converter.forest().is_empty());
    assert!(converter.rendered().is_empty());
}

#[test]
fn given_leading_columns_when_skipping_them_then_same_forest() {
    let temp = TempDir::new().unwrap();
    let content = "\
row,label,Id,link,label,Id,link
1,Meat & Fish,179549,browse/179549,,,
2,Meat & Fish,179549,browse/179549,Fish,176741,browse/179549/176741
";
    let input = write_input(temp.path(), "numbered.csv", content);
    let config = ConverterConfig::new(&input, ",", 1, 1);

    let output = service().run(&config, Format::Json, &NullObserver).unwrap();

    assert_eq!(output.forest, sample_forest());
}

#[test]
fn given_semicolon_delimiter_when_converting_then_split_on_it() {
    let temp = TempDir::new().unwrap();
    let content = SAMPLE_CSV.replace(',', ";");
    let input = write_input(temp.path(), "sample.csv", &content);
    let config = ConverterConfig::new(&input, ";", 1, 0);

    let output = service().run(&config, Format::Json, &NullObserver).unwrap();

    assert_eq!(output.forest, sample_forest());
}

#[test]
fn given_invalid_delimiter_when_converting_then_rejected_before_reading() {
    let temp = TempDir::new().unwrap();
    let config = ConverterConfig::new(temp.path().join("absent.csv"), "::", 1, 0);

    let err = service().run(&config, Format::Json, &NullObserver).unwrap_err();

    assert!(matches!(err, ApplicationError::InvalidDelimiter(ref d) if d == "::"));
}

#[test]
fn given_orphan_and_empty_rows_when_permissive_then_skipped_and_reported() {
    // Arrange: row 1 has no first group, row 2 is depth 2 without any root
    let temp = TempDir::new().unwrap();
    let content = "\
header
,,,x,y,z
A,1,a,B,2,b
C,3,c
";
    let input = write_input(temp.path(), "orphans.csv", content);
    let config = ConverterConfig::new(&input, ",", 1, 0);
    let observer = RecordingObserver::default();

    // Act
    let output = service().run(&config, Format::Json, &observer).unwrap();

    // Assert
    assert_eq!(output.forest, vec![node("C", "3", "c", vec![])]);
    assert_eq!(observer.skipped_rows(), vec![1, 2]);
    assert_eq!(observer.events()[0], ObservedEvent::RowsLoaded(3));
    assert!(observer.events().contains(&ObservedEvent::NodeAdded {
        row: 3,
        depth: 1,
        label: "C".into()
    }));
}

#[test]
fn given_header_only_input_when_converting_then_empty_outputs() {
    let temp = TempDir::new().unwrap();
    let input = write_input(temp.path(), "empty.csv", "label,Id,link\n");
    let config = ConverterConfig::new(&input, ",", 1, 0);

    let json = run_conversion(&config, Format::Json, &NullObserver).unwrap();
    let xml = run_conversion(&config, Format::Xml, &NullObserver).unwrap();

    assert!(json.forest.is_empty());
    assert_eq!(json.text, "[]");
    assert_eq!(xml.text, "<?xml version=\"1.0\" ?>\n<root/>\n");
}
