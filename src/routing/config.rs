use std::any::Any;
use std::cell::RefCell;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ahash::HashMap;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::routing::error::ConfigError;
use crate::routing::io::query::EMPTY_TOKEN;
use crate::routing::io::resolve_path;

/// Macro to register an override handler for a specific config key
#[macro_export]
macro_rules! register_override {
    ($key:literal, $func:expr) => {
        inventory::submit! {
            $crate::routing::config::OverrideHandler {
                key: $key,
                apply: $func,
            }
        }
    };
}

pub struct OverrideHandler {
    pub key: &'static str,
    pub apply: fn(config: &mut Config, value: &str) -> Result<(), ConfigError>,
}

inventory::collect!(OverrideHandler);

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    #[arg(long = "set", value_parser = parse_key_val)]
    pub overrides: Vec<(String, String)>,
    #[command(subcommand)]
    pub input: InputSource,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum InputSource {
    /// Answer a query given on the command line and print the result. Use '_' for absent
    /// constraints.
    Cmd {
        mode: String,
        source: String,
        destination: String,
        #[arg(default_value = EMPTY_TOKEN)]
        avoid_nodes: String,
        #[arg(default_value = EMPTY_TOKEN)]
        avoid_segments: String,
        #[arg(default_value = EMPTY_TOKEN)]
        include_node: String,
    },
    /// Read the query from an input file and write the result to a file.
    File {
        #[arg(long, short, default_value = "input.txt")]
        input: PathBuf,
        /// Defaults to 'output.txt' in the configured output directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s.find('=');
    match pos {
        Some(pos) => Ok((s[..pos].to_string(), s[pos + 1..].to_string())),
        None => Err(format!("invalid KEY=VALUE: no `=` found in `{}`", s)),
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Config {
    modules: RefCell<HashMap<String, Box<dyn ConfigModule>>>,
    #[serde(skip)]
    context: Option<PathBuf>,
}

impl Config {
    /// Loads the config file given on the command line, or the defaults if there is none, and
    /// applies the `--set` overrides.
    pub fn from_args(args: &CommandLineArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_overrides(&args.overrides)?;
        Ok(config)
    }

    pub fn from_file(config_path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(config_path).map_err(|source| ConfigError::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| {
                ConfigError::Parse {
                    path: config_path.to_path_buf(),
                    source,
                }
            })?;
        config.set_context(Some(config_path.to_path_buf()));
        Ok(config)
    }

    pub fn set_context(&mut self, context: Option<PathBuf>) {
        self.context = context;
    }

    pub fn context(&self) -> Option<&Path> {
        self.context.as_deref()
    }

    /// Apply generic key-value overrides to the config, e.g. dataset.locations=path
    fn apply_overrides(&mut self, overrides: &[(String, String)]) -> Result<(), ConfigError> {
        if !overrides.is_empty() {
            info!("Applying overrides: {:?}", overrides);
        }

        for (key, value) in overrides {
            let key_str = key.as_str();

            if let Some(handler) = inventory::iter::<OverrideHandler>().find(|h| h.key == key_str) {
                (handler.apply)(self, value)?;
            } else {
                warn!("No override handler found for key: {}", key);
            }
        }
        Ok(())
    }

    pub fn dataset(&self) -> Dataset {
        self.module_or_default("dataset")
    }

    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.modules
            .get_mut()
            .insert("dataset".to_string(), Box::new(dataset));
    }

    pub fn output(&self) -> Output {
        self.module_or_default("output")
    }

    pub fn set_output(&mut self, output: Output) {
        self.modules
            .get_mut()
            .insert("output".to_string(), Box::new(output));
    }

    /// Dataset paths, resolved against the location of the config file.
    pub fn locations_path(&self) -> PathBuf {
        resolve_path(self.context(), &self.dataset().locations)
    }

    pub fn distances_path(&self) -> PathBuf {
        resolve_path(self.context(), &self.dataset().distances)
    }

    pub fn output_dir(&self) -> PathBuf {
        resolve_path(self.context(), &self.output().output_dir)
    }

    fn module_or_default<T>(&self, key: &str) -> T
    where
        T: ConfigModule + Clone + Default + 'static,
    {
        if let Some(module) = self.module::<T>(key) {
            module
        } else {
            let default = T::default();
            self.modules
                .borrow_mut()
                .insert(key.to_string(), Box::new(default.clone()));
            default
        }
    }

    fn module<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.modules
            .borrow()
            .get(key)
            .and_then(|boxed| boxed.as_ref().as_any().downcast_ref::<T>())
            .cloned()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Dataset {
    #[serde(default = "default_locations")]
    pub locations: PathBuf,
    #[serde(default = "default_distances")]
    pub distances: PathBuf,
}

impl Default for Dataset {
    fn default() -> Self {
        Dataset {
            locations: default_locations(),
            distances: default_distances(),
        }
    }
}

register_override!("dataset.locations", |config, value| {
    let mut dataset = config.dataset();
    dataset.locations = PathBuf::from(value);
    config.set_dataset(dataset);
    Ok(())
});

register_override!("dataset.distances", |config, value| {
    let mut dataset = config.dataset();
    dataset.distances = PathBuf::from(value);
    config.set_dataset(dataset);
    Ok(())
});

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Output {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            output_dir: PathBuf::from("./"),
            logging: Logging::None,
        }
    }
}

register_override!("output.output_dir", |config, value| {
    let mut output = config.output();
    output.output_dir = PathBuf::from(value);
    config.set_output(output);
    Ok(())
});

register_override!("output.logging", |config, value| {
    let mut output = config.output();
    output.logging = match value.to_lowercase().as_str() {
        "none" => Logging::None,
        "info" => Logging::Info,
        _ => {
            return Err(ConfigError::InvalidOverride {
                key: "output.logging".to_string(),
                value: value.to_string(),
            })
        }
    };
    config.set_output(output);
    Ok(())
});

/// Have this extra layer of log level enum, as tracing subscriber has no
/// off/none option by default. At least it can't be parsed
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub enum Logging {
    #[default]
    None,
    Info,
}

#[typetag::serde(tag = "type")]
pub trait ConfigModule: Debug {
    fn as_any(&self) -> &dyn Any;
}

#[typetag::serde]
impl ConfigModule for Dataset {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Output {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn default_locations() -> PathBuf {
    PathBuf::from("data/Locations.csv")
}

fn default_distances() -> PathBuf {
    PathBuf::from("data/Distances.csv")
}
