//! Output writers: the point-cloud backend and tabular dumps.

pub mod table;
pub mod vtk;

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::data::model::CloudPoint;
use crate::error::{DrillError, Result};

pub use vtk::{VtkEncoding, VtkExporter};

/// Set to any value to run without the point-cloud backend.
pub const DISABLE_VTK_ENV: &str = "DRILLCLOUD_DISABLE_VTK";

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// A point-cloud file format the session can write.
///
/// Chosen once at startup by [`probe_exporter`]; when the backend is not
/// usable the session keeps working and only the export action fails.
pub trait PointCloudExporter {
    fn name(&self) -> &str;

    /// File extension without the dot.
    fn extension(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }

    fn export(&self, points: &[CloudPoint], path: &Path) -> Result<()>;
}

/// Stand-in used when no backend can write in this environment.
#[derive(Debug, Clone)]
pub struct UnavailableExporter {
    pub reason: String,
}

impl PointCloudExporter for UnavailableExporter {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn extension(&self) -> &str {
        "vtk"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn export(&self, _points: &[CloudPoint], _path: &Path) -> Result<()> {
        Err(DrillError::UnsupportedExport(self.reason.clone()))
    }
}

/// Pick the VTK backend unless it is disabled or `output_dir` is not writable.
pub fn probe_exporter(output_dir: &Path) -> Box<dyn PointCloudExporter> {
    if std::env::var_os(DISABLE_VTK_ENV).is_some() {
        log::warn!("{DISABLE_VTK_ENV} is set, point-cloud export disabled");
        return Box::new(UnavailableExporter {
            reason: format!("disabled by {DISABLE_VTK_ENV}"),
        });
    }
    match check_writable(output_dir) {
        Ok(()) => Box::new(VtkExporter::default()),
        Err(e) => {
            log::warn!("point-cloud export disabled: {e}");
            Box::new(UnavailableExporter { reason: e.to_string() })
        }
    }
}

fn check_writable(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| DrillError::io(dir, e))?;
    let probe = dir.join(".drillcloud_probe");
    fs::write(&probe, b"").map_err(|e| DrillError::io(&probe, e))?;
    fs::remove_file(&probe).map_err(|e| DrillError::io(&probe, e))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// `YYYYMMDD_<name>`, the naming used for every output file of a project.
pub fn output_stem(project_date: NaiveDate, name: &str) -> String {
    format!("{}_{}", project_date.format("%Y%m%d"), name)
}

/// Creates parent directories for a file path if they don't exist.
pub(crate) fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| DrillError::io(parent, e))?;
        }
    }
    Ok(())
}
