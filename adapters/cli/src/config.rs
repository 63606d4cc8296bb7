use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use item_wheel_core::Layout;
use item_wheel_dump::{DEFAULT_REDIRECT_DUMP, DEFAULT_WHEEL_DUMP};
use serde::Deserialize;

/// Config file picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "item-wheel.toml";
const DEFAULT_HEATMAP_DIR: &str = "./graphs";

/// Contents of the optional TOML config file. Every field may be omitted.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Overrides for the dumped memory layout constants.
    pub(crate) layout: Layout,
    /// Locations of the two dumps.
    pub(crate) dumps: DumpPaths,
    /// Directory heatmaps are written into.
    pub(crate) heatmap_dir: Option<PathBuf>,
}

/// Dump locations read from the config file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DumpPaths {
    /// Wheel dump path.
    pub(crate) wheels: Option<PathBuf>,
    /// Redirect dump path.
    pub(crate) redirects: Option<PathBuf>,
}

impl FileConfig {
    /// Loads the config at `explicit`, or the default file when it exists.
    ///
    /// A missing explicit path is an error; a missing default file is not.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_path(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid config toml")?;
        config
            .layout
            .validate()
            .context("invalid [layout] section")?;
        Ok(config)
    }
}

/// Effective settings after layering command line flags over the config file.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) layout: Layout,
    pub(crate) wheel_dump: PathBuf,
    pub(crate) redirect_dump: PathBuf,
    pub(crate) heatmap_dir: PathBuf,
}

impl Settings {
    /// Command line values win over config values, which win over defaults.
    pub(crate) fn resolve(
        file: FileConfig,
        wheels: Option<PathBuf>,
        redirects: Option<PathBuf>,
    ) -> Self {
        Self {
            layout: file.layout,
            wheel_dump: wheels
                .or(file.dumps.wheels)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WHEEL_DUMP)),
            redirect_dump: redirects
                .or(file.dumps.redirects)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REDIRECT_DUMP)),
            heatmap_dir: file
                .heatmap_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HEATMAP_DIR)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use item_wheel_core::Layout;

    use super::{FileConfig, Settings};

    #[test]
    fn empty_config_uses_verified_layout() {
        let config = FileConfig::parse("").expect("empty config parses");
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.layout, Layout::default());
    }

    #[test]
    fn partial_layout_overrides_keep_other_defaults() {
        let config = FileConfig::parse(
            r#"
            heatmap_dir = "out"

            [layout]
            position_count = 8

            [dumps]
            wheels = "dumps/wheels.dmp"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.layout.position_count, 8);
        assert_eq!(config.layout.stride, 30);
        assert_eq!(config.layout.wheels_per_state, 3);
        assert_eq!(config.dumps.wheels, Some(PathBuf::from("dumps/wheels.dmp")));
        assert_eq!(config.heatmap_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("strides = 31").is_err());
    }

    #[test]
    fn layout_overrides_are_validated() {
        let laps = FileConfig::parse("[layout]\nlap_count = 128").expect_err("progress overflows");
        assert!(format!("{laps:#}").contains("lap_count = 128"));

        let wheels =
            FileConfig::parse("[layout]\nwheels_per_state = 256").expect_err("counts overflow");
        assert!(format!("{wheels:#}").starts_with("invalid [layout] section"));

        assert!(FileConfig::parse("[layout]\nposition_count = 0").is_err());
        assert!(FileConfig::parse("[layout]\nlap_count = 127").is_ok());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        assert!(FileConfig::load(Some(Path::new("no-such-config.toml"))).is_err());
    }

    #[test]
    fn command_line_paths_take_precedence() {
        let config = FileConfig::parse("[dumps]\nwheels = \"a.dmp\"\nredirects = \"b.dmp\"")
            .expect("config parses");

        let settings = Settings::resolve(config, Some(PathBuf::from("c.dmp")), None);

        assert_eq!(settings.wheel_dump, PathBuf::from("c.dmp"));
        assert_eq!(settings.redirect_dump, PathBuf::from("b.dmp"));
        assert_eq!(settings.heatmap_dir, PathBuf::from("./graphs"));
    }

    #[test]
    fn defaults_match_dump_file_names() {
        let settings = Settings::resolve(FileConfig::default(), None, None);
        assert_eq!(settings.wheel_dump, PathBuf::from("itemWheel.dmp"));
        assert_eq!(settings.redirect_dump, PathBuf::from("wheelindexRedirect.dmp"));
    }
}
