//! Legacy VTK (`# vtk DataFile Version 3.0`) POLYDATA writer.
//!
//! Layout:
//! - `POINTS n double`
//! - `VERTICES n 2n`, one vertex cell per point
//! - `LINES` (optional), one polyline per channel in row order
//! - `POINT_DATA n` with `energy` (double) and `channel` (int, L=0 M=1 R=2)
//!
//! The binary flavour writes the same sections with big-endian payloads, as
//! the legacy format requires.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{ensure_parent_dirs, PointCloudExporter};
use crate::data::model::{Channel, CloudPoint};
use crate::error::{DrillError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VtkEncoding {
    #[default]
    Ascii,
    Binary,
}

impl VtkEncoding {
    fn keyword(self) -> &'static str {
        match self {
            VtkEncoding::Ascii => "ASCII",
            VtkEncoding::Binary => "BINARY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VtkExporter {
    pub encoding: VtkEncoding,
    /// Connect each channel's points into a polyline.
    pub polylines: bool,
    pub title: String,
}

impl Default for VtkExporter {
    fn default() -> Self {
        Self {
            encoding: VtkEncoding::Ascii,
            polylines: true,
            title: "drillcloud LMR energy point cloud".into(),
        }
    }
}

impl PointCloudExporter for VtkExporter {
    fn name(&self) -> &str {
        "Legacy VTK"
    }

    fn extension(&self) -> &str {
        "vtk"
    }

    fn export(&self, points: &[CloudPoint], path: &Path) -> Result<()> {
        if points.is_empty() {
            return Err(DrillError::Export("no resolved points to write".into()));
        }
        ensure_parent_dirs(path)?;
        let file = File::create(path).map_err(|e| DrillError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, points)
            .and_then(|()| writer.flush())
            .map_err(|e| DrillError::io(path, e))?;
        log::info!("wrote {} points to {}", points.len(), path.display());
        Ok(())
    }
}

impl VtkExporter {
    /// Serialise `points` into any writer.
    pub fn write_to<W: Write>(&self, w: &mut W, points: &[CloudPoint]) -> std::io::Result<()> {
        let n = points.len();
        let binary = self.encoding == VtkEncoding::Binary;

        writeln!(w, "# vtk DataFile Version 3.0")?;
        // The title line is limited to 256 characters and must not contain newlines.
        let title: String = self.title.chars().filter(|c| *c != '\n').take(255).collect();
        writeln!(w, "{title}")?;
        writeln!(w, "{}", self.encoding.keyword())?;
        writeln!(w, "DATASET POLYDATA")?;

        writeln!(w, "POINTS {n} double")?;
        if binary {
            for p in points {
                for v in [p.position.x, p.position.y, p.position.z] {
                    w.write_all(&v.to_be_bytes())?;
                }
            }
            writeln!(w)?;
        } else {
            for p in points {
                writeln!(w, "{:.6} {:.6} {:.6}", p.position.x, p.position.y, p.position.z)?;
            }
        }

        writeln!(w, "VERTICES {n} {}", 2 * n)?;
        write_cells(w, binary, (0..n).map(|i| vec![i]))?;

        if self.polylines {
            let lines = channel_polylines(points);
            if !lines.is_empty() {
                let size: usize = lines.iter().map(|l| l.len() + 1).sum();
                writeln!(w, "LINES {} {size}", lines.len())?;
                write_cells(w, binary, lines.into_iter())?;
            }
        }

        writeln!(w, "POINT_DATA {n}")?;
        writeln!(w, "SCALARS energy double 1")?;
        writeln!(w, "LOOKUP_TABLE default")?;
        if binary {
            for p in points {
                w.write_all(&p.energy.to_be_bytes())?;
            }
            writeln!(w)?;
        } else {
            for p in points {
                writeln!(w, "{:.6}", p.energy)?;
            }
        }

        writeln!(w, "SCALARS channel int 1")?;
        writeln!(w, "LOOKUP_TABLE default")?;
        if binary {
            for p in points {
                w.write_all(&(p.channel.index() as i32).to_be_bytes())?;
            }
            writeln!(w)?;
        } else {
            for p in points {
                writeln!(w, "{}", p.channel.index())?;
            }
        }
        Ok(())
    }
}

/// Point indices per channel, skipping channels with fewer than two points.
fn channel_polylines(points: &[CloudPoint]) -> Vec<Vec<usize>> {
    Channel::ALL
        .iter()
        .map(|&c| {
            points
                .iter()
                .enumerate()
                .filter(|(_, p)| p.channel == c)
                .map(|(i, _)| i)
                .collect::<Vec<_>>()
        })
        .filter(|idx| idx.len() >= 2)
        .collect()
}

fn write_cells<W: Write>(w: &mut W, binary: bool, cells: impl Iterator<Item = Vec<usize>>) -> std::io::Result<()> {
    for cell in cells {
        if binary {
            w.write_all(&(cell.len() as i32).to_be_bytes())?;
            for i in &cell {
                w.write_all(&(*i as i32).to_be_bytes())?;
            }
        } else {
            let ids: Vec<String> = cell.iter().map(|i| i.to_string()).collect();
            writeln!(w, "{} {}", cell.len(), ids.join(" "))?;
        }
    }
    if binary {
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Point3D;
    use tempfile::TempDir;

    fn cloud() -> Vec<CloudPoint> {
        let mut pts = Vec::new();
        for (k, channel) in [Channel::Left, Channel::Left, Channel::Left, Channel::Right].into_iter().enumerate() {
            pts.push(CloudPoint {
                position: Point3D { x: k as f64, y: 2.0 * k as f64, z: 17.3 },
                energy: 100.0 + k as f64,
                channel,
                depth: k as f64 * 0.5,
            });
        }
        pts
    }

    #[test]
    fn ascii_file_has_all_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cloud.vtk");
        VtkExporter::default().export(&cloud(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# vtk DataFile Version 3.0");
        assert_eq!(lines[2], "ASCII");
        assert_eq!(lines[3], "DATASET POLYDATA");
        assert_eq!(lines[4], "POINTS 4 double");
        assert_eq!(lines[6], "1.000000 2.000000 17.300000");
        assert!(text.contains("VERTICES 4 8\n1 0\n1 1\n1 2\n1 3\n"));
        // Right has a single point, so only the Left polyline is written.
        assert!(text.contains("LINES 1 4\n3 0 1 2\n"));
        assert!(text.contains("POINT_DATA 4\nSCALARS energy double 1\nLOOKUP_TABLE default\n100.000000\n"));
        assert!(text.contains("SCALARS channel int 1\nLOOKUP_TABLE default\n0\n0\n0\n2\n"));
    }

    #[test]
    fn polylines_can_be_disabled() {
        let exporter = VtkExporter {
            polylines: false,
            ..VtkExporter::default()
        };
        let mut buf = Vec::new();
        exporter.write_to(&mut buf, &cloud()).unwrap();
        assert!(!String::from_utf8(buf).unwrap().contains("LINES"));
    }

    #[test]
    fn binary_payload_is_big_endian() {
        let exporter = VtkExporter {
            encoding: VtkEncoding::Binary,
            ..VtkExporter::default()
        };
        let mut buf = Vec::new();
        exporter.write_to(&mut buf, &cloud()).unwrap();

        let header = b"POINTS 4 double\n";
        let start = buf
            .windows(header.len())
            .position(|w| w == header)
            .unwrap()
            + header.len();
        // Second point, X = 1.0
        let x1 = f64::from_be_bytes(buf[start + 24..start + 32].try_into().unwrap());
        assert_eq!(x1, 1.0);
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("BINARY\nDATASET POLYDATA"));
        assert!(text.contains("VERTICES 4 8\n"));
        assert!(text.contains("SCALARS channel int 1"));
    }

    #[test]
    fn empty_cloud_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.vtk");
        let err = VtkExporter::default().export(&[], &path).unwrap_err();
        assert!(matches!(err, DrillError::Export(_)));
        assert!(!path.exists());
    }
}
