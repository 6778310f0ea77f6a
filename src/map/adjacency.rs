//! @acp:module "Adjacency Graph"
//! @acp:summary "Neighbourhood graph of map regions and its edge list"
//! @acp:domain stats
//! @acp:layer core
//!
//! Two regions are neighbours under queen contiguity when their boundaries
//! share a vertex, under rook contiguity when they share a boundary
//! segment. Vertices are compared after snapping to a 1e-8 grid.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

use super::geojson::Region;
use crate::error::{CaseStudyError, Result};

/// Grid used to match shared vertices
const SNAP: f64 = 1e-8;

/// How shared boundaries make neighbours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contiguity {
    /// Shared vertex
    #[default]
    Queen,
    /// Shared edge
    Rook,
}

impl fmt::Display for Contiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contiguity::Queen => f.write_str("queen"),
            Contiguity::Rook => f.write_str("rook"),
        }
    }
}

impl FromStr for Contiguity {
    type Err = CaseStudyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "queen" => Ok(Contiguity::Queen),
            "rook" => Ok(Contiguity::Rook),
            _ => Err(CaseStudyError::invalid(format!("Unknown contiguity: {}", s))),
        }
    }
}

type VertexKey = (i64, i64);

fn snap(p: &[f64; 2]) -> VertexKey {
    ((p[0] / SNAP).round() as i64, (p[1] / SNAP).round() as i64)
}

/// Boundary keys of one region: vertices for queen, segments for rook
fn boundary_keys(region: &Region, contiguity: Contiguity) -> HashSet<(VertexKey, VertexKey)> {
    let mut keys = HashSet::new();
    for ring in &region.rings {
        let snapped: Vec<VertexKey> = ring.iter().map(snap).collect();
        match contiguity {
            Contiguity::Queen => keys.extend(snapped.iter().map(|&v| (v, v))),
            Contiguity::Rook => {
                for pair in snapped.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if a != b {
                        keys.insert(if a < b { (a, b) } else { (b, a) });
                    }
                }
            }
        }
    }
    keys
}

/// @acp:summary "Undirected graph with one node per region"
#[derive(Debug, Clone)]
pub struct AdjacencyGraph {
    graph: UnGraph<String, ()>,
}

impl AdjacencyGraph {
    /// Graph from region ids and already-sorted unique pairs `(i, j)`, `i < j`
    fn from_pairs(ids: Vec<String>, pairs: BTreeSet<(usize, usize)>) -> Self {
        let mut graph = UnGraph::with_capacity(ids.len(), pairs.len());
        let nodes: Vec<NodeIndex> = ids.into_iter().map(|id| graph.add_node(id)).collect();
        for (i, j) in pairs {
            graph.add_edge(nodes[i], nodes[j], ());
        }
        Self { graph }
    }

    /// @acp:summary "Contiguity graph of polygon regions"
    pub fn from_regions(regions: &[Region], contiguity: Contiguity) -> Self {
        let mut owners: HashMap<(VertexKey, VertexKey), Vec<usize>> = HashMap::new();
        for (i, region) in regions.iter().enumerate() {
            for key in boundary_keys(region, contiguity) {
                owners.entry(key).or_default().push(i);
            }
        }

        let mut pairs = BTreeSet::new();
        for shared in owners.values().filter(|o| o.len() > 1) {
            for (k, &a) in shared.iter().enumerate() {
                for &b in &shared[k + 1..] {
                    pairs.insert((a.min(b), a.max(b)));
                }
            }
        }

        tracing::debug!(
            regions = regions.len(),
            edges = pairs.len(),
            %contiguity,
            "Built contiguity graph"
        );
        let ids = regions.iter().map(|r| r.id.clone()).collect();
        Self::from_pairs(ids, pairs)
    }

    /// @acp:summary "Graph from 0-based neighbour lists"
    ///
    /// Lists must be symmetric and must not contain the region itself.
    pub fn from_neighbours(ids: Vec<String>, neighbours: &[Vec<usize>]) -> Result<Self> {
        if ids.len() != neighbours.len() {
            return Err(CaseStudyError::invalid(format!(
                "{} ids but {} neighbour lists",
                ids.len(),
                neighbours.len()
            )));
        }

        let n = ids.len();
        let mut pairs = BTreeSet::new();
        for (i, list) in neighbours.iter().enumerate() {
            for &j in list {
                if j >= n {
                    return Err(CaseStudyError::invalid(format!(
                        "region {} lists neighbour {} of only {}",
                        i, j, n
                    )));
                }
                if j == i {
                    return Err(CaseStudyError::invalid(format!("region {} lists itself", i)));
                }
                if !neighbours[j].contains(&i) {
                    return Err(CaseStudyError::invalid(format!(
                        "region {} lists {} but not the reverse",
                        i, j
                    )));
                }
                pairs.insert((i.min(j), i.max(j)));
            }
        }
        Ok(Self::from_pairs(ids, pairs))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.graph.node_weights().map(String::as_str).collect()
    }

    /// Sorted 0-based neighbours of region `i`
    pub fn neighbours(&self, i: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .graph
            .neighbors(NodeIndex::new(i))
            .map(|n| n.index())
            .collect();
        out.sort_unstable();
        out
    }

    /// Regions without any neighbour
    pub fn islands(&self) -> Vec<usize> {
        self.graph
            .node_indices()
            .filter(|&n| self.graph.neighbors(n).next().is_none())
            .map(|n| n.index())
            .collect()
    }

    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// @acp:summary "1-based `node1`/`node2` edge list with `node1 < node2`"
    ///
    /// Edges are ordered by `node1`, then `node2`.
    pub fn edges(&self) -> (Vec<usize>, Vec<usize>) {
        let mut pairs: Vec<(usize, usize)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| {
                let (a, b) = (a.index(), b.index());
                (a.min(b) + 1, a.max(b) + 1)
            })
            .collect();
        pairs.sort_unstable();
        pairs.into_iter().unzip()
    }
}
