//! @acp:module "Map Regions"
//! @acp:summary "Reads polygon regions from a GeoJSON FeatureCollection"
//! @acp:domain stats
//! @acp:layer parse

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{CaseStudyError, Result};

/// One map area: an identifier and the rings of all its polygons
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    /// Every ring (outer boundaries and holes) as `[x, y]` vertices
    pub rings: Vec<Vec<[f64; 2]>>,
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
}

fn ring(positions: Vec<Vec<f64>>, feature: usize) -> Result<Vec<[f64; 2]>> {
    positions
        .into_iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok([*x, *y]),
            _ => Err(CaseStudyError::invalid(format!(
                "feature {}: position with fewer than two coordinates",
                feature
            ))),
        })
        .collect()
}

fn feature_id(properties: Option<&Map<String, Value>>, key: &str, feature: usize) -> Result<String> {
    match properties.and_then(|p| p.get(key)) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(CaseStudyError::MissingColumn(format!(
            "{} (feature {})",
            key, feature
        ))),
    }
}

/// @acp:summary "Parse regions, in feature order"
///
/// Ids come from the `id_property` of each feature, or are the 1-based
/// feature position when no property is named.
pub fn parse_regions(json: &str, id_property: Option<&str>) -> Result<Vec<Region>> {
    let collection: FeatureCollection = serde_json::from_str(json)?;

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| {
            let id = match id_property {
                Some(key) => feature_id(feature.properties.as_ref(), key, i + 1)?,
                None => (i + 1).to_string(),
            };
            let rings = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => coordinates
                    .into_iter()
                    .map(|r| ring(r, i + 1))
                    .collect::<Result<Vec<_>>>()?,
                Some(Geometry::MultiPolygon { coordinates }) => coordinates
                    .into_iter()
                    .flatten()
                    .map(|r| ring(r, i + 1))
                    .collect::<Result<Vec<_>>>()?,
                None => {
                    return Err(CaseStudyError::invalid(format!(
                        "feature {} ({}) has no geometry",
                        i + 1,
                        id
                    )))
                }
            };
            Ok(Region { id, rings })
        })
        .collect()
}

/// @acp:summary "Read regions from a GeoJSON file"
pub fn read_regions<P: AsRef<Path>>(path: P, id_property: Option<&str>) -> Result<Vec<Region>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    parse_regions(&content, id_property).map_err(|e| match e {
        CaseStudyError::Json(err) => CaseStudyError::parse(path, err.to_string()),
        other => other,
    })
}
