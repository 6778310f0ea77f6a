//! @acp:module "Map Preprocessing"
//! @acp:summary "Turns polygon maps into BYM2 model inputs"
//! @acp:domain stats
//! @acp:layer service
//!
//! Regions are read from GeoJSON, joined into a contiguity graph and
//! written as the `N`, `N_edges`, `node1`, `node2` and `scaling_factor`
//! variables the BYM2 models expect.

pub mod adjacency;
pub mod geojson;
pub mod scaling;

pub use adjacency::{AdjacencyGraph, Contiguity};
pub use geojson::{parse_regions, read_regions, Region};
pub use scaling::{bym2_scaling_factor, icar_marginal_variances};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// @acp:summary "Spatial structure of a map as BYM2 data"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bym2Data {
    #[serde(rename = "N")]
    pub n: usize,
    #[serde(rename = "N_edges")]
    pub n_edges: usize,
    pub node1: Vec<usize>,
    pub node2: Vec<usize>,
    pub scaling_factor: f64,
}

impl Bym2Data {
    /// @acp:summary "Edge list and scaling factor of a connected graph"
    pub fn from_graph(graph: &AdjacencyGraph) -> Result<Self> {
        let scaling_factor = bym2_scaling_factor(graph)?;
        let (node1, node2) = graph.edges();
        Ok(Self {
            n: graph.node_count(),
            n_edges: node1.len(),
            node1,
            node2,
            scaling_factor,
        })
    }

    pub fn write_data_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_graph_path() {
        let ids = vec!["a".into(), "b".into(), "c".into()];
        let graph = AdjacencyGraph::from_neighbours(ids, &[vec![1], vec![0, 2], vec![1]]).unwrap();
        let data = Bym2Data::from_graph(&graph).unwrap();
        assert_eq!(data.n, 3);
        assert_eq!(data.n_edges, 2);
        assert_eq!(data.node1, vec![1, 2]);
        assert_eq!(data.node2, vec![2, 3]);
        assert!(data.scaling_factor > 0.0);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["N_edges"], 2);
        assert!(json.get("scaling_factor").is_some());
    }
}
