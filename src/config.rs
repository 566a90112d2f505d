//! Fixed geodetic parameters and processing defaults.
//!
//! The file is read once at startup; the resulting [`AppConfig`] is never
//! mutated afterwards. Changing a value requires a restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::data::model::{Channel, Point3D};
use crate::data::noise::SmoothingParams;
use crate::error::{DrillError, Result};

/// Environment variable overriding the config location.
pub const CONFIG_ENV: &str = "DRILLCLOUD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/fixed_parameters.yaml";

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlanCoordinate {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Main chainage.
    #[serde(rename = "C")]
    pub main: i64,
    /// Sub chainage.
    #[serde(rename = "E")]
    pub sub: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyPointSection {
    pub reference_point: ReferencePoint,
    #[serde(default = "default_conversion_factor")]
    pub conversion_factor: f64,
}

fn default_conversion_factor() -> f64 {
    100.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// On-disk representation, validated into [`AppConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub reference_distance: f64,
    pub direction_angle: f64,
    pub reference_coordinates: BTreeMap<String, PlanCoordinate>,
    pub z_elevations: BTreeMap<String, f64>,
    pub survey_point: SurveyPointSection,
    #[serde(default)]
    pub smoothing: SmoothingParams,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ConfigFile {
    /// The surveyed values of the first site, same as `config/fixed_parameters.yaml`.
    fn default() -> Self {
        let xy = |x, y| PlanCoordinate { x, y };
        Self {
            reference_distance: 967.0,
            direction_angle: 65.588,
            reference_coordinates: BTreeMap::from([
                ("L".to_string(), xy(-660689.7596, 733147.0996)),
                ("M".to_string(), xy(-658622.871, 737699.9102)),
                ("R".to_string(), xy(-656556.8108, 742253.072)),
            ]),
            z_elevations: BTreeMap::from([
                ("L".to_string(), 17.3),
                ("M".to_string(), 21.3),
                ("R".to_string(), 17.3),
            ]),
            survey_point: SurveyPointSection {
                reference_point: ReferencePoint { main: 255, sub: 4.0 },
                conversion_factor: default_conversion_factor(),
            },
            smoothing: SmoothingParams::default(),
            output_dir: default_output_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validated geometry
// ---------------------------------------------------------------------------

/// Reference geometry shared read-only by every calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceGeometry {
    pub reference_distance: f64,
    /// Tunnel direction in degrees.
    pub direction_angle: f64,
    /// Reference XY and fixed elevation, indexed by [`Channel::index`].
    anchors: [Point3D; 3],
    pub reference_main: i64,
    pub reference_sub: f64,
    /// Sub units per main unit.
    pub conversion_factor: f64,
}

impl ReferenceGeometry {
    pub fn anchor(&self, channel: Channel) -> Point3D {
        self.anchors[channel.index()]
    }

    fn from_file(file: &ConfigFile) -> Result<Self> {
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(v)
            } else {
                Err(DrillError::Configuration(format!("{name} must be a finite number")))
            }
        };
        let reference_distance = finite("reference_distance", file.reference_distance)?;
        let direction_angle = finite("direction_angle", file.direction_angle)?;
        let conversion_factor = finite("survey_point.conversion_factor", file.survey_point.conversion_factor)?;
        if conversion_factor <= 0.0 {
            return Err(DrillError::Configuration(
                "survey_point.conversion_factor must be positive".into(),
            ));
        }
        let reference_sub = finite("survey_point.reference_point.E", file.survey_point.reference_point.sub)?;
        if !(0.0..conversion_factor).contains(&reference_sub) {
            return Err(DrillError::Configuration(format!(
                "survey_point.reference_point.E must lie in [0, {conversion_factor}), got {reference_sub}"
            )));
        }

        for key in file.reference_coordinates.keys().chain(file.z_elevations.keys()) {
            if Channel::from_label(key).is_none() {
                return Err(DrillError::Configuration(format!("unknown channel '{key}'")));
            }
        }

        let mut anchors = [Point3D::default(); 3];
        for channel in Channel::ALL {
            let xy = lookup(&file.reference_coordinates, "reference_coordinates", channel)?;
            let z = lookup(&file.z_elevations, "z_elevations", channel)?;
            anchors[channel.index()] = Point3D {
                x: finite("reference_coordinates.X", xy.x)?,
                y: finite("reference_coordinates.Y", xy.y)?,
                z: finite("z_elevations", z)?,
            };
        }

        Ok(Self {
            reference_distance,
            direction_angle,
            anchors,
            reference_main: file.survey_point.reference_point.main,
            reference_sub,
            conversion_factor,
        })
    }
}

/// Config maps may key channels as `L`/`M`/`R` or by name, once per channel.
fn lookup<T: Copy>(map: &BTreeMap<String, T>, section: &str, channel: Channel) -> Result<T> {
    let mut entries = map.iter().filter(|(k, _)| Channel::from_label(k) == Some(channel));
    let (key, value) = entries
        .next()
        .ok_or_else(|| DrillError::Configuration(format!("{section}.{} is missing", channel.label())))?;
    if let Some((other, _)) = entries.next() {
        return Err(DrillError::Configuration(format!(
            "{section} names channel {} twice ('{key}' and '{other}')",
            channel.label()
        )));
    }
    Ok(*value)
}

impl Default for ReferenceGeometry {
    fn default() -> Self {
        // The built-in file is known to be complete.
        match Self::from_file(&ConfigFile::default()) {
            Ok(geometry) => geometry,
            Err(e) => unreachable!("built-in geometry is invalid: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub geometry: ReferenceGeometry,
    pub smoothing: SmoothingParams,
    pub output_dir: PathBuf,
    /// Where the values came from, `None` for built-in defaults.
    pub source: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let file = ConfigFile::default();
        Self {
            geometry: ReferenceGeometry::default(),
            smoothing: file.smoothing,
            output_dir: file.output_dir,
            source: None,
        }
    }
}

impl AppConfig {
    /// Validate a parsed document.
    pub fn from_file(file: ConfigFile) -> Result<Self> {
        let geometry = ReferenceGeometry::from_file(&file)?;
        file.smoothing.validate()?;
        Ok(Self {
            geometry,
            smoothing: file.smoothing,
            output_dir: file.output_dir,
            source: None,
        })
    }

    /// Load a YAML or JSON config. Dispatch by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = std::fs::read_to_string(path_ref)
            .with_context(|| format!("reading config {}", path_ref.display()))?;

        let ext = path_ref
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let file: ConfigFile = match ext.as_str() {
            "json" => serde_json::from_str(&contents)
                .map_err(|e| DrillError::Configuration(e.to_string()))
                .with_context(|| format!("parsing config {}", path_ref.display()))?,
            _ => serde_yaml::from_str(&contents)
                .map_err(|e| DrillError::Configuration(e.to_string()))
                .with_context(|| format!("parsing config {}", path_ref.display()))?,
        };

        let mut config = Self::from_file(file)
            .with_context(|| format!("validating config {}", path_ref.display()))?;
        config.source = Some(path_ref.to_path_buf());
        Ok(config)
    }

    /// Startup entry point: `$DRILLCLOUD_CONFIG`, then the default path, then
    /// built-in values when no file exists. A file that exists but is invalid
    /// is an error.
    pub fn load_startup() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        if path.exists() {
            let config = Self::load(&path)?;
            log::info!("Loaded reference geometry from {}", path.display());
            Ok(config)
        } else {
            log::warn!(
                "Config {} not found, using built-in reference geometry",
                path.display()
            );
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = "\
reference_distance: 967
direction_angle: 65.588
reference_coordinates:
  L: { X: -660689.7596, Y: 733147.0996 }
  M: { X: -658622.871, Y: 737699.9102 }
  R: { X: -656556.8108, Y: 742253.072 }
z_elevations: { L: 17.3, M: 21.3, R: 17.3 }
survey_point:
  reference_point: { C: 255, E: 4 }
";

    fn write_temp(contents: &str, suffix: &str) -> tempfile::TempPath {
        let mut temp = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        temp.write_all(contents.as_bytes()).unwrap();
        temp.into_temp_path()
    }

    #[test]
    fn load_reads_yaml() {
        let path = write_temp(YAML, ".yaml");
        let cfg = AppConfig::load(&path).unwrap();
        let g = &cfg.geometry;
        assert_eq!(g.reference_distance, 967.0);
        assert_eq!(g.reference_main, 255);
        assert_eq!(g.reference_sub, 4.0);
        assert_eq!(g.conversion_factor, 100.0);
        assert_eq!(g.anchor(Channel::Left).x, -660689.7596);
        assert_eq!(g.anchor(Channel::Center).z, 21.3);
        assert_eq!(cfg.smoothing, SmoothingParams::default());
        assert_eq!(cfg.source.as_deref(), Some(path.as_ref()));
    }

    #[test]
    fn load_reads_json() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        let path = write_temp(&json, ".json");
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.geometry, ReferenceGeometry::default());
    }

    #[test]
    fn missing_channel_is_a_configuration_error() {
        let yaml = YAML.replace("  R: { X: -656556.8108, Y: 742253.072 }\n", "");
        let path = write_temp(&yaml, ".yaml");
        let err = AppConfig::load(&path).unwrap_err();
        let drill = err.downcast_ref::<DrillError>().unwrap();
        assert!(matches!(drill, DrillError::Configuration(msg) if msg.contains("reference_coordinates.R")));
    }

    #[test]
    fn unknown_channel_key_is_rejected() {
        let yaml = YAML.replace("z_elevations: { L: 17.3,", "z_elevations: { Q: 1.0, L: 17.3,");
        let path = write_temp(&yaml, ".yml");
        let err = AppConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("unknown channel 'Q'"));
    }

    #[test]
    fn missing_field_is_reported() {
        let path = write_temp("direction_angle: 10\n", ".yaml");
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DrillError>(),
            Some(DrillError::Configuration(_))
        ));
    }

    #[test]
    fn invalid_smoothing_section_is_rejected() {
        let yaml = format!("{YAML}smoothing:\n  window: 4\n");
        let path = write_temp(&yaml, ".yaml");
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn named_channel_keys_are_accepted() {
        let mut file = ConfigFile::default();
        let right = file.reference_coordinates.remove("R").unwrap();
        file.reference_coordinates.insert("right".into(), right);
        let cfg = AppConfig::from_file(file).unwrap();
        assert_eq!(cfg.geometry.anchor(Channel::Right).x, -656556.8108);
    }

    #[test]
    fn duplicate_channel_keys_are_rejected() {
        let mut file = ConfigFile::default();
        let left = file.reference_coordinates["L"];
        file.reference_coordinates.insert("left".into(), left);
        let err = ReferenceGeometry::from_file(&file).unwrap_err();
        assert!(
            matches!(&err, DrillError::Configuration(msg) if msg.contains("channel L twice")),
            "{err}"
        );
    }

    #[test]
    fn reference_sub_outside_factor_is_rejected() {
        for sub in ["-1", "100", "250"] {
            let yaml = YAML.replace("E: 4", &format!("E: {sub}"));
            let path = write_temp(&yaml, ".yaml");
            let err = AppConfig::load(&path).unwrap_err();
            assert!(format!("{err:#}").contains("reference_point.E"), "{sub}: {err:#}");
        }
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let cfg = AppConfig::load(path).unwrap();
        assert_eq!(cfg.geometry, ReferenceGeometry::default());
    }
}
