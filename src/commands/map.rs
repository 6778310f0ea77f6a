//! @acp:module "Map Command"
//! @acp:summary "Write BYM2 spatial data for a GeoJSON map"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::config::Config;
use crate::map::{read_regions, AdjacencyGraph, Bym2Data, Contiguity};

/// Options for the map command
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// GeoJSON FeatureCollection of polygons
    pub input: PathBuf,
    /// Output .data.json path
    pub output: PathBuf,
    /// Feature property holding the region id (overrides config)
    pub id_property: Option<String>,
    /// Neighbour rule (overrides config)
    pub contiguity: Option<Contiguity>,
}

/// Execute the map command
pub fn execute_map(options: MapOptions, config: Config) -> Result<Bym2Data> {
    let id_property = options.id_property.or(config.map.id_property);
    let contiguity = options.contiguity.unwrap_or(config.map.contiguity);

    println!(
        "{} Reading regions from {}...",
        style("→").cyan(),
        options.input.display()
    );
    let regions = read_regions(&options.input, id_property.as_deref())
        .with_context(|| format!("Failed to read map {}", options.input.display()))?;

    let graph = AdjacencyGraph::from_regions(&regions, contiguity);
    println!(
        "  {} regions, {} {} contiguity edges",
        graph.node_count(),
        graph.edge_count(),
        contiguity
    );

    let islands = graph.islands();
    if !islands.is_empty() {
        let ids = graph.ids();
        let names: Vec<&str> = islands.iter().map(|&i| ids[i]).collect();
        eprintln!(
            "{} Regions without neighbours: {}",
            style("⚠").yellow(),
            names.join(", ")
        );
    }

    let data = Bym2Data::from_graph(&graph)?;
    data.write_data_json(&options.output)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    println!("{} Data written to {}", style("✓").green(), options.output.display());
    println!("  Scaling factor: {:.6}", data.scaling_factor);

    Ok(data)
}
