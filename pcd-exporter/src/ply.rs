use std::{
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use pcd_core::pointcloud::{
    point::{ColoredPoint, PointCloud},
    store::ColoredPointStore,
};
use tempfile::NamedTempFile;

use crate::{config::ExportConfig, error::ExportError};

// how many vertex lines are written between cancellation checks
const CANCEL_CHECK_INTERVAL: usize = 4096;

/// Shared flag for aborting an export from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn ply_header(vertex_count: usize) -> String {
    format!(
        "ply\n\
         format ascii 1.0\n\
         element vertex {vertex_count}\n\
         property float x\n\
         property float y\n\
         property float z\n\
         property uchar red\n\
         property uchar green\n\
         property uchar blue\n\
         end_header\n"
    )
}

/// Writes `points` as an ASCII PLY with one `x y z red green blue` line per point.
pub fn write_ply<W: Write>(points: &[ColoredPoint], writer: W) -> Result<(), ExportError> {
    write_ply_with_cancel(points, writer, &CancelToken::new())
}

fn write_ply_with_cancel<W: Write>(
    points: &[ColoredPoint],
    mut writer: W,
    cancel: &CancelToken,
) -> Result<(), ExportError> {
    if points.is_empty() {
        return Err(ExportError::EmptyCloud);
    }

    writer.write_all(ply_header(points.len()).as_bytes())?;

    for (index, point) in points.iter().enumerate() {
        if index % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }
        let [r, g, b] = point.color.to_array();
        writeln!(writer, "{} {} {} {} {} {}", point.x, point.y, point.z, r, g, b)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes point clouds to `<output_dir>/<file_name>`.
///
/// Data goes to a temporary file next to the destination first, which is
/// renamed over it only once complete. A failed or cancelled export leaves
/// whatever was at the destination before.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn export(&self, store: &ColoredPointStore) -> Result<PathBuf, ExportError> {
        self.export_with_cancel(store, &CancelToken::new())
    }

    pub fn export_with_cancel(
        &self,
        store: &ColoredPointStore,
        cancel: &CancelToken,
    ) -> Result<PathBuf, ExportError> {
        self.export_cloud(&store.snapshot(), cancel)
    }

    pub fn export_cloud(
        &self,
        cloud: &PointCloud,
        cancel: &CancelToken,
    ) -> Result<PathBuf, ExportError> {
        if cloud.is_empty() {
            log::error!("No points to export");
            return Err(ExportError::EmptyCloud);
        }

        let bounds = &cloud.metadata.bounding_volume;
        log::info!(
            "exporting {} colored vertices (bounds min {:?}, max {:?})",
            cloud.metadata.point_count,
            bounds.min,
            bounds.max
        );

        let result = self.write_atomically(cloud, cancel);
        match &result {
            Ok(path) => log::info!("wrote point cloud: {:?}", path),
            Err(ExportError::Cancelled) => log::warn!("point cloud export cancelled"),
            Err(e) => log::error!("PLY export error: {}", e),
        }
        result
    }

    fn write_atomically(
        &self,
        cloud: &PointCloud,
        cancel: &CancelToken,
    ) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.config.output_dir)?;

        // the temp file is deleted on drop unless persisted
        let mut file = NamedTempFile::new_in(&self.config.output_dir)?;
        {
            let writer = BufWriter::new(file.as_file_mut());
            write_ply_with_cancel(&cloud.points, writer, cancel)?;
        }
        file.as_file().sync_all()?;

        if cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        let path = self.config.output_path();
        file.persist(&path).map_err(|e| ExportError::Io(e.error))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pcd_core::pointcloud::point::Color;

    use super::*;

    fn make_point(x: f32, y: f32, z: f32, rgb: [u8; 3]) -> ColoredPoint {
        ColoredPoint::new([x, y, z], Color::from(rgb))
    }

    fn make_store(count: usize) -> ColoredPointStore {
        let store = ColoredPointStore::new();
        store.extend((0..count).map(|i| make_point(i as f32, 0.5, -1.0, [i as u8, 0, 255])));
        store
    }

    fn dir_entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn header_is_byte_exact() {
        let mut out = Vec::new();
        write_ply(&[make_point(1.0, -0.5, 0.25, [255, 0, 128])], &mut out).unwrap();

        let expected = "ply\n\
                        format ascii 1.0\n\
                        element vertex 1\n\
                        property float x\n\
                        property float y\n\
                        property float z\n\
                        property uchar red\n\
                        property uchar green\n\
                        property uchar blue\n\
                        end_header\n\
                        1 -0.5 0.25 255 0 128\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn one_line_per_point_in_capture_order() {
        let store = make_store(5);
        let mut out = Vec::new();
        write_ply(&store.snapshot().points, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let (header, body) = text.split_once("end_header\n").unwrap();
        assert!(header.contains("element vertex 5\n"));

        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 5);
        for (i, line) in lines.iter().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(fields.len(), 6);
            assert_eq!(fields[0].parse::<f32>().unwrap(), i as f32);
            assert_eq!(fields[3], i.to_string());
        }
    }

    #[test]
    fn empty_cloud_is_never_written() {
        let mut out = Vec::new();
        assert!(matches!(write_ply(&[], &mut out), Err(ExportError::EmptyCloud)));
        assert!(out.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(ExportConfig::new(dir.path()));
        let result = exporter.export(&ColoredPointStore::new());

        assert!(matches!(result, Err(ExportError::EmptyCloud)));
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[test]
    fn reset_store_exports_like_a_fresh_one() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(ExportConfig::new(dir.path()));
        let store = make_store(3);
        store.reset();

        assert!(matches!(exporter.export(&store), Err(ExportError::EmptyCloud)));
    }

    #[test]
    fn export_writes_the_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter =
            Exporter::new(ExportConfig::new(dir.path().join("scans")).with_file_name("room.ply"));

        let path = exporter.export(&make_store(3)).unwrap();

        assert_eq!(path, dir.path().join("scans").join("room.ply"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("ply\nformat ascii 1.0\nelement vertex 3\n"));
        assert_eq!(text.lines().count(), 10 + 3);
        // only the finished file remains
        assert_eq!(dir_entries(&dir.path().join("scans")), 1);
    }

    #[test]
    fn export_replaces_a_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(ExportConfig::new(dir.path()));

        exporter.export(&make_store(4)).unwrap();
        let path = exporter.export(&make_store(2)).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("element vertex 2\n"));
    }

    #[test]
    fn cancelled_export_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(ExportConfig::new(dir.path()));
        let previous = exporter.export(&make_store(1)).unwrap();
        let before = fs::read_to_string(&previous).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let result = exporter.export_with_cancel(&make_store(10_000), &cancel);

        assert!(matches!(result, Err(ExportError::Cancelled)));
        assert_eq!(fs::read_to_string(&previous).unwrap(), before);
        assert_eq!(dir_entries(dir.path()), 1);
    }
}
