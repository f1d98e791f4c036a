use std::path::{Path, PathBuf};

use ahash::HashMap;
use serde::Deserialize;
use tracing::info;

use crate::routing::error::DatasetError;
use crate::routing::network::graph::{Graph, VertexId, Weight};

/// Marks a missing connection for one mode in the distances table.
const NO_EDGE: &str = "X";

#[derive(Debug, Deserialize)]
struct LocationRecord {
    #[serde(rename = "Location")]
    _name: String,
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Parking")]
    parking: String,
}

#[derive(Debug, Deserialize)]
struct DistanceRecord {
    #[serde(rename = "Location1")]
    from: String,
    #[serde(rename = "Location2")]
    to: String,
    #[serde(rename = "Driving")]
    driving: String,
    #[serde(rename = "Walking")]
    walking: String,
}

/// The road network of a dataset: one graph per mode over the same set of locations.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    pub drive: Graph,
    pub walk: Graph,
    /// location code -> vertex id
    pub codes: HashMap<String, VertexId>,
}

impl RoadNetwork {
    pub fn from_files(locations: &Path, distances: &Path) -> Result<Self, DatasetError> {
        let mut network = RoadNetwork::default();
        network.load_locations(locations)?;
        network.load_distances(distances)?;
        info!(
            "Loaded {} locations, {} driving and {} walking segments.",
            network.drive.number_of_vertices(),
            network.drive.number_of_edges(),
            network.walk.number_of_edges()
        );
        Ok(network)
    }

    fn load_locations(&mut self, path: &Path) -> Result<(), DatasetError> {
        let mut reader = open(path)?;
        for record in reader.deserialize::<LocationRecord>() {
            let record = record.map_err(|source| csv_error(path, source))?;
            let id = parse_id(path, &record.id)?;
            // any non-zero count means parking is available
            let has_parking = record.parking.trim().parse::<i64>().map_err(|_| {
                DatasetError::InvalidValue {
                    path: path.to_path_buf(),
                    field: "parking flag",
                    value: record.parking.clone(),
                }
            })? != 0;

            for graph in [&mut self.drive, &mut self.walk] {
                graph.add_vertex(id);
                graph.set_parking(id, has_parking)?;
            }
            self.codes.insert(record.code.trim().to_string(), id);
        }
        Ok(())
    }

    fn load_distances(&mut self, path: &Path) -> Result<(), DatasetError> {
        let mut reader = open(path)?;
        for record in reader.deserialize::<DistanceRecord>() {
            let record = record.map_err(|source| csv_error(path, source))?;
            let from = self.lookup(path, &record.from)?;
            let to = self.lookup(path, &record.to)?;

            if let Some(weight) = parse_weight(path, &record.driving)? {
                self.drive.add_edge(from, to, weight)?;
            }
            if let Some(weight) = parse_weight(path, &record.walking)? {
                self.walk.add_edge(from, to, weight)?;
            }
        }
        Ok(())
    }

    fn lookup(&self, path: &Path, code: &str) -> Result<VertexId, DatasetError> {
        self.codes
            .get(code.trim())
            .copied()
            .ok_or_else(|| DatasetError::UnknownLocation {
                path: path.to_path_buf(),
                code: code.trim().to_string(),
            })
    }
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, DatasetError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| csv_error(path, source))
}

fn csv_error(path: &Path, source: csv::Error) -> DatasetError {
    DatasetError::Csv {
        path: PathBuf::from(path),
        source,
    }
}

fn parse_id(path: &Path, value: &str) -> Result<VertexId, DatasetError> {
    value
        .trim()
        .parse()
        .map_err(|_| DatasetError::InvalidValue {
            path: path.to_path_buf(),
            field: "location id",
            value: value.to_string(),
        })
}

fn parse_weight(path: &Path, value: &str) -> Result<Option<Weight>, DatasetError> {
    let value = value.trim();
    if value == NO_EDGE {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| DatasetError::InvalidValue {
            path: path.to_path_buf(),
            field: "distance",
            value: value.to_string(),
        })
}
