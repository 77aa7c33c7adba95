//! Tests for the bar chart service against real temp files

use std::fs;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use rsviz::application::ApplicationError;
use rsviz::config::{ChartSettings, Settings};
use rsviz::domain::{Document, HostTree};
use rsviz::infrastructure::ServiceContainer;
use rsviz::tree_traits::TreeNodeConvert;
use rsviz::util::testing;

const ROWS_JSON: &str = r#"[
  {"label": "a", "value": 10},
  {"label": "b", "value": 20},
  {"label": "c", "value": 40},
  {"label": "d", "value": 0}
]"#;

/// 400 x 360 plot area, one 100px band per row.
fn settings() -> ChartSettings {
    ChartSettings {
        width: 440.0,
        height: 400.0,
        margin: 20.0,
        padding: 0.0,
        ticks: 0,
        ..ChartSettings::default()
    }
}

#[fixture]
fn container() -> ServiceContainer {
    testing::init_test_setup();
    ServiceContainer::new(Settings::default())
}

fn write_data(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn bar_attributes(doc: &Document, name: &str) -> Vec<String> {
    doc.query_selector_all(doc.root(), "rect.bar")
        .unwrap()
        .into_iter()
        .map(|n| doc.get_attribute(n, name).unwrap().unwrap_or_default())
        .collect()
}

#[rstest]
fn given_json_rows_when_rendering_then_one_scaled_bar_per_row(container: ServiceContainer) {
    // Arrange
    let dir = TempDir::new().unwrap();
    let data = write_data(&dir, "sales.json", ROWS_JSON);

    // Act
    let chart = container
        .chart_service
        .bar_chart_from_file(&data, &settings())
        .unwrap();

    // Assert
    let doc = &chart.document;
    assert_eq!(chart.bars, 4);
    assert_eq!(chart.y_domain, [0.0, 40.0]);
    assert_eq!(bar_attributes(doc, "x"), vec!["0", "100", "200", "300"]);
    assert_eq!(bar_attributes(doc, "width"), vec!["100"; 4]);
    assert_eq!(bar_attributes(doc, "y"), vec!["270", "180", "0", "360"]);
    assert_eq!(bar_attributes(doc, "height"), vec!["90", "180", "360", "0"]);
    let labels: Vec<String> = doc
        .query_selector_all(doc.root(), "text.label")
        .unwrap()
        .into_iter()
        .map(|n| doc.text_content(n).unwrap())
        .collect();
    assert_eq!(labels, vec!["a", "b", "c", "d"]);
}

#[rstest]
fn given_toml_rows_when_rendering_then_same_chart_as_json(container: ServiceContainer) {
    let dir = TempDir::new().unwrap();
    let json = write_data(&dir, "sales.json", ROWS_JSON);
    let toml = write_data(
        &dir,
        "sales.toml",
        r#"
[[rows]]
label = "a"
value = 10
[[rows]]
label = "b"
value = 20
[[rows]]
label = "c"
value = 40
[[rows]]
label = "d"
value = 0
"#,
    );

    let from_json = container.chart_service.bar_chart_from_file(&json, &settings()).unwrap();
    let from_toml = container.chart_service.bar_chart_from_file(&toml, &settings()).unwrap();

    assert_eq!(from_json.to_markup(), from_toml.to_markup());
}

#[rstest]
fn given_negative_values_when_rendering_then_bars_hang_from_zero(container: ServiceContainer) {
    let rows = rsviz::application::parse_rows(
        "[-10, 30]",
        rsviz::application::DataFormat::Json,
        Path::new("inline.json"),
    )
    .unwrap();

    let chart = container.chart_service.bar_chart(&rows, &settings()).unwrap();

    // zero sits at 270 in a [-10, 30] domain over 360px
    assert_eq!(chart.y_domain, [-10.0, 30.0]);
    assert_eq!(bar_attributes(&chart.document, "y"), vec!["270", "0"]);
    assert_eq!(bar_attributes(&chart.document, "height"), vec!["90", "270"]);
}

#[rstest]
fn given_ticks_and_title_when_rendering_then_axis_and_title_present(container: ServiceContainer) {
    let dir = TempDir::new().unwrap();
    let data = write_data(&dir, "sales.json", ROWS_JSON);
    let settings = ChartSettings {
        ticks: 4,
        title: Some("Sales".to_string()),
        ..settings()
    };

    let chart = container.chart_service.bar_chart_from_file(&data, &settings).unwrap();

    let doc = &chart.document;
    let tick_labels: Vec<String> = doc
        .query_selector_all(doc.root(), "g.axis g.tick text")
        .unwrap()
        .into_iter()
        .map(|n| doc.text_content(n).unwrap())
        .collect();
    assert_eq!(tick_labels, vec!["0", "10", "20", "30", "40"]);
    let title = doc.query_selector(doc.root(), "svg > text.title").unwrap().unwrap();
    assert_eq!(doc.text_content(title).unwrap(), "Sales");
}

#[rstest]
fn given_chart_when_written_then_parent_directories_are_created(container: ServiceContainer) {
    // Arrange
    let dir = TempDir::new().unwrap();
    let data = write_data(&dir, "sales.json", ROWS_JSON);
    let chart = container.chart_service.bar_chart_from_file(&data, &settings()).unwrap();
    let target = dir.path().join("out/nested/chart.svg");

    // Act
    let written = container.chart_service.write_svg(&chart, &target).unwrap();

    // Assert
    let markup = fs::read_to_string(&written).unwrap();
    assert_eq!(written, target);
    assert!(markup.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert_eq!(markup.matches("<rect").count(), 4);
}

#[rstest]
#[case::empty_array("empty.json", "[]")]
#[case::empty_toml("empty.toml", "")]
#[case::wrapped_empty("wrapped.json", r#"{"rows": []}"#)]
fn given_no_rows_when_rendering_then_no_data_error(
    container: ServiceContainer,
    #[case] name: &str,
    #[case] content: &str,
) {
    let dir = TempDir::new().unwrap();
    let data = write_data(&dir, name, content);

    let err = container.chart_service.bar_chart_from_file(&data, &settings()).unwrap_err();

    assert!(matches!(err, ApplicationError::NoData(_)), "got {err:?}");
}

#[rstest]
fn given_missing_file_when_rendering_then_operation_failed(container: ServiceContainer) {
    let dir = TempDir::new().unwrap();

    let err = container
        .chart_service
        .bar_chart_from_file(&dir.path().join("missing.json"), &settings())
        .unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("missing.json"));
}

#[rstest]
#[case::unknown_extension("sales.csv", "label,value\na,1\n")]
#[case::malformed_json("sales.json", "{\"rows\": [1, 2")]
fn given_unreadable_data_when_rendering_then_data_format_error(
    container: ServiceContainer,
    #[case] name: &str,
    #[case] content: &str,
) {
    let dir = TempDir::new().unwrap();
    let data = write_data(&dir, name, content);

    let err = container.chart_service.bar_chart_from_file(&data, &settings()).unwrap_err();

    assert!(matches!(err, ApplicationError::DataFormat { .. }), "got {err:?}");
}

#[rstest]
fn given_invalid_settings_when_rendering_then_config_error(container: ServiceContainer) {
    let rows = vec![rsviz::Datum::from(1)];
    let settings = ChartSettings {
        padding: 1.5,
        ..settings()
    };

    let err = container.chart_service.bar_chart(&rows, &settings).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[rstest]
fn given_chart_when_outlined_then_shows_svg_with_plot_group(container: ServiceContainer) {
    let dir = TempDir::new().unwrap();
    let data = write_data(&dir, "sales.json", ROWS_JSON);
    let chart = container.chart_service.bar_chart_from_file(&data, &settings()).unwrap();

    let tree = chart.document.to_tree_string();

    let svg = &tree.leaves[0];
    assert!(svg.root.starts_with("svg width=440 height=400"));
    assert_eq!(svg.leaves.len(), 1);
    assert!(svg.leaves[0].root.starts_with("g class=plot"));
    // 4 bars + 4 labels
    assert_eq!(svg.leaves[0].leaves.len(), 8);
    // bound rows show up after the attributes
    assert!(svg.leaves[0].leaves[0].root.starts_with("rect class=bar"));
    assert!(svg.leaves[0].leaves[0].root.contains(" [{"));
}
