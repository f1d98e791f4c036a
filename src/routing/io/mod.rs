use std::path::{Path, PathBuf};

pub mod dataset;
pub mod output;
pub mod query;

/// Resolves `file_path` relative to the directory of the config file. Absolute paths and paths
/// starting with `./` are taken as they are.
pub fn resolve_path(config_path: Option<&Path>, file_path: &Path) -> PathBuf {
    if file_path.is_absolute() || file_path.starts_with("./") {
        return file_path.to_path_buf();
    }

    match config_path.and_then(|c| c.parent()) {
        Some(dir) => dir.join(file_path),
        None => file_path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::routing::io::resolve_path;

    #[test]
    fn resolve_relative_to_config() {
        let config = Path::new("scenarios/porto/config.yml");
        assert_eq!(
            resolve_path(Some(config), Path::new("data/Locations.csv")),
            PathBuf::from("scenarios/porto/data/Locations.csv")
        );
        assert_eq!(
            resolve_path(Some(config), Path::new("./data/Locations.csv")),
            PathBuf::from("./data/Locations.csv")
        );
        assert_eq!(
            resolve_path(None, Path::new("data/Locations.csv")),
            PathBuf::from("data/Locations.csv")
        );
    }
}
