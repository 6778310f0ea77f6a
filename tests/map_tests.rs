//! BYM2 map preprocessing from a GeoJSON file

use std::fs;

use casestudy::commands::{execute_map, MapOptions};
use casestudy::config::Config;
use casestudy::map::Contiguity;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

fn square(id: &str, x: i32, y: i32) -> String {
    format!(
        r#"{{"type": "Feature", "properties": {{"NAME": "{id}"}},
            "geometry": {{"type": "Polygon", "coordinates":
              [[[{x0}, {y0}], [{x1}, {y0}], [{x1}, {y1}], [{x0}, {y1}], [{x0}, {y0}]]]}}}}"#,
        id = id,
        x0 = x,
        y0 = y,
        x1 = x + 1,
        y1 = y + 1
    )
}

/// Three squares in a row plus one touching the last only at a corner
fn write_map(dir: &TempDir) -> std::path::PathBuf {
    let features = [
        square("west", 0, 0),
        square("middle", 1, 0),
        square("east", 2, 0),
        square("corner", 3, 1),
    ];
    let json = format!(
        r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
        features.join(",")
    );
    let path = dir.path().join("regions.geojson");
    fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_queen_map_written_as_data_json() {
    let dir = TempDir::new().unwrap();
    let input = write_map(&dir);
    let output = dir.path().join("out").join("bym2.data.json");

    let data = execute_map(
        MapOptions {
            input,
            output: output.clone(),
            id_property: Some("NAME".to_string()),
            contiguity: None,
        },
        Config::default(),
    )
    .unwrap();

    assert_eq!(data.n, 4);
    assert_eq!(data.node1, vec![1, 2, 3]);
    assert_eq!(data.node2, vec![2, 3, 4]);

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["N"], 4);
    assert_eq!(json["N_edges"], 3);
    assert_eq!(json["node1"], serde_json::json!([1, 2, 3]));
    assert_eq!(json["node2"], serde_json::json!([2, 3, 4]));
    // a path of four regions
    let expected = {
        let variances: [f64; 4] = [0.875, 0.375, 0.375, 0.875];
        (variances.iter().map(|v| v.ln()).sum::<f64>() / 4.0).exp()
    };
    let scaling = json["scaling_factor"].as_f64().unwrap();
    assert!((scaling - expected).abs() < 1e-6, "scaling factor = {}", scaling);
}

#[test]
fn test_rook_map_with_corner_region_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_map(&dir);
    let output = dir.path().join("bym2.data.json");

    let mut config = Config::default();
    config.map.contiguity = Contiguity::Rook;
    let err = execute_map(
        MapOptions {
            input,
            output: output.clone(),
            id_property: None,
            contiguity: None,
        },
        config,
    )
    .unwrap_err();

    assert!(format!("{:#}", err).contains("disconnected"), "{:#}", err);
    assert!(!output.exists());
}

#[test]
fn test_missing_map_file() {
    let dir = TempDir::new().unwrap();
    let result = execute_map(
        MapOptions {
            input: dir.path().join("absent.geojson"),
            output: dir.path().join("out.json"),
            id_property: None,
            contiguity: Some(Contiguity::Queen),
        },
        Config::default(),
    );
    assert!(result.is_err());
}
