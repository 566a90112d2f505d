//! Tabular outputs: the point cloud as CSV or Parquet, and the per-channel
//! smoothing result as CSV.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use super::ensure_parent_dirs;
use crate::data::model::{Channel, CloudPoint, SmoothedSample};
use crate::error::{DrillError, Result};

#[derive(Serialize)]
struct PointRow {
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "Y")]
    y: f64,
    #[serde(rename = "Z")]
    z: f64,
    energy: f64,
    channel: Channel,
    depth: f64,
}

#[derive(Serialize)]
struct SmoothedRow {
    depth: f64,
    energy: f64,
    #[serde(rename = "Lowess_Trend")]
    trend: f64,
    noise: f64,
    is_spike: bool,
}

fn csv_error(path: &Path, source: csv::Error) -> DrillError {
    DrillError::Csv {
        path: path.display().to_string(),
        source,
    }
}

fn write_csv_rows<T: Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> Result<usize> {
    ensure_parent_dirs(path)?;
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(path, e))?;
        count += 1;
    }
    writer.flush().map_err(|e| DrillError::io(path, e))?;
    Ok(count)
}

/// `X,Y,Z,energy,channel,depth`, one row per point.
pub fn write_points_csv(path: &Path, points: &[CloudPoint]) -> Result<()> {
    let n = write_csv_rows(
        path,
        points.iter().map(|p| PointRow {
            x: p.position.x,
            y: p.position.y,
            z: p.position.z,
            energy: p.energy,
            channel: p.channel,
            depth: p.depth,
        }),
    )?;
    log::info!("wrote {n} points to {}", path.display());
    Ok(())
}

/// Same columns as [`write_points_csv`], as a single-batch Parquet file.
pub fn write_points_parquet(path: &Path, points: &[CloudPoint]) -> Result<()> {
    let column = |f: fn(&CloudPoint) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(points.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("X", DataType::Float64, false),
        Field::new("Y", DataType::Float64, false),
        Field::new("Z", DataType::Float64, false),
        Field::new("energy", DataType::Float64, false),
        Field::new("channel", DataType::Utf8, false),
        Field::new("depth", DataType::Float64, false),
    ]));

    let channel_array = StringArray::from(points.iter().map(|p| p.channel.label()).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            column(|p| p.position.x),
            column(|p| p.position.y),
            column(|p| p.position.z),
            column(|p| p.energy),
            Arc::new(channel_array) as ArrayRef,
            column(|p| p.depth),
        ],
    )
    .map_err(|e| DrillError::Export(format!("cannot build record batch: {e}")))?;

    ensure_parent_dirs(path)?;
    let file = File::create(path).map_err(|e| DrillError::io(path, e))?;
    let parquet_error = |source| DrillError::Parquet {
        path: path.display().to_string(),
        source,
    };
    let mut writer = ArrowWriter::try_new(file, schema, None).map_err(parquet_error)?;
    writer.write(&batch).map_err(parquet_error)?;
    writer.close().map_err(parquet_error)?;

    log::info!("wrote {} points to {}", points.len(), path.display());
    Ok(())
}

/// `depth,energy,Lowess_Trend,noise,is_spike` for one channel.
pub fn write_smoothed_csv(path: &Path, samples: &[SmoothedSample]) -> Result<()> {
    write_csv_rows(
        path,
        samples.iter().map(|s| SmoothedRow {
            depth: s.depth,
            energy: s.raw,
            trend: s.trend,
            noise: s.noise(),
            is_spike: s.is_spike,
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Point3D;
    use arrow::array::Array;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    fn points() -> Vec<CloudPoint> {
        vec![
            CloudPoint {
                position: Point3D { x: 1.5, y: -2.0, z: 17.3 },
                energy: 120.0,
                channel: Channel::Left,
                depth: 0.5,
            },
            CloudPoint {
                position: Point3D { x: 3.0, y: 4.0, z: 21.3 },
                energy: 95.5,
                channel: Channel::Center,
                depth: 1.0,
            },
        ]
    }

    #[test]
    fn points_csv_has_expected_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("cloud.csv");
        write_points_csv(&path, &points()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("X,Y,Z,energy,channel,depth"));
        assert_eq!(lines.next(), Some("1.5,-2.0,17.3,120.0,L,0.5"));
        assert_eq!(lines.next(), Some("3.0,4.0,21.3,95.5,M,1.0"));
    }

    #[test]
    fn points_parquet_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cloud.parquet");
        write_points_parquet(&path, &points()).unwrap();

        let file = File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file).unwrap().build().unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(4).name(), "channel");

        let energy = batch.column(3).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(energy.value(1), 95.5);
        let channel = batch.column(4).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(channel.value(0), "L");
    }

    #[test]
    fn smoothed_csv_includes_noise_and_spike_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("20240514_L_ana.csv");
        let samples = vec![
            SmoothedSample { depth: 0.0, raw: 10.0, trend: 9.0, is_spike: false },
            SmoothedSample { depth: 0.5, raw: 50.0, trend: 10.0, is_spike: true },
        ];
        write_smoothed_csv(&path, &samples).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "depth,energy,Lowess_Trend,noise,is_spike");
        assert_eq!(lines[2], "0.5,50.0,10.0,40.0,true");
    }
}
