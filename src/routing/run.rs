use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

use crate::routing::config::{Config, InputSource};
use crate::routing::error::BestRouteError;
use crate::routing::io::dataset::RoadNetwork;
use crate::routing::io::output::{format_result, write_result};
use crate::routing::io::query::{parse_query_tokens, read_query_file};
use crate::routing::planner::{Query, RoutePlanner, TravelMode};

pub const OUTPUT_FILE_NAME: &str = "output.txt";

/// Loads the dataset, answers the query from `input` and emits the result: command style queries
/// are answered on `out`, file style queries into their output file.
pub fn run(
    config: &Config,
    input: &InputSource,
    out: &mut dyn Write,
) -> Result<(), BestRouteError> {
    let query = read_query(input)?;
    info!("Query: {:?}", query);

    let network = RoadNetwork::from_files(&config.locations_path(), &config.distances_path())?;
    let result = answer(&network, &query)?;

    match input {
        InputSource::Cmd { .. } => {
            out.write_all(result.as_bytes())
                .map_err(|source| BestRouteError::Output {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
        InputSource::File { output, .. } => {
            let path = output
                .clone()
                .unwrap_or_else(|| config.output_dir().join(OUTPUT_FILE_NAME));
            write_result(&path, &result)?;
            info!("Result written to {:?}", path);
        }
    }
    Ok(())
}

/// Logs a failed run and maps it to a non-zero exit code.
pub fn exit_code<E: std::fmt::Display>(result: Result<(), E>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Plans the query on the graph of its mode and renders the result.
pub fn answer(network: &RoadNetwork, query: &Query) -> Result<String, BestRouteError> {
    let graph = match query.mode {
        TravelMode::Driving => &network.drive,
    };
    let routes = RoutePlanner::new(graph).plan(query)?;
    Ok(format_result(query, &routes))
}

fn read_query(input: &InputSource) -> Result<Query, BestRouteError> {
    let query = match input {
        InputSource::Cmd {
            mode,
            source,
            destination,
            avoid_nodes,
            avoid_segments,
            include_node,
        } => parse_query_tokens(&[
            mode,
            source,
            destination,
            avoid_nodes,
            avoid_segments,
            include_node,
        ])?,
        InputSource::File { input, .. } => read_query_file(input)?,
    };
    Ok(query)
}

#[cfg(test)]
mod tests {
    use std::process::ExitCode;

    use crate::routing::error::{BestRouteError, RoutingError};
    use crate::routing::run::exit_code;

    #[test]
    fn inconsistent_alternative_fails_the_run() {
        let result: Result<(), BestRouteError> =
            Err(RoutingError::InconsistentAlternative {
                primary: 4,
                alternative: 3,
            }
            .into());
        assert_eq!(exit_code(result), ExitCode::FAILURE);
        assert_eq!(exit_code(Ok::<(), BestRouteError>(())), ExitCode::SUCCESS);
    }
}
