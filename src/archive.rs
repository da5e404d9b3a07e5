// src/archive.rs

//! Writing `.tar.zst` archives
//!
//! Supports regular files, directories (recursively) and symlinks.
//! Symlinks are stored as links, never followed. Ownership and other
//! extended metadata are not preserved beyond what `tar` records from
//! the file's metadata.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Archive-related errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    Unsupported(PathBuf),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Streaming writer for a zstd-compressed tar archive
pub struct ArchiveWriter {
    builder: tar::Builder<zstd::Encoder<'static, File>>,
}

impl ArchiveWriter {
    /// Create `out` and start a new archive in it
    pub fn create(out: &Path) -> Result<Self, ArchiveError> {
        let file = File::create(out)?;
        let encoder = zstd::Encoder::new(file, zstd::DEFAULT_COMPRESSION_LEVEL)?;
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);
        Ok(Self { builder })
    }

    /// Add `disk_path` to the archive as `archive_path`
    pub fn add_path(&mut self, disk_path: &Path, archive_path: &Path) -> Result<(), ArchiveError> {
        let file_type = match fs::symlink_metadata(disk_path) {
            Ok(meta) => meta.file_type(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArchiveError::NotFound(disk_path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        if file_type.is_file() || file_type.is_symlink() {
            self.write_entry(disk_path, archive_path)
        } else if file_type.is_dir() {
            self.write_directory_recursive(disk_path, archive_path)
        } else {
            Err(ArchiveError::Unsupported(disk_path.to_path_buf()))
        }
    }

    fn write_entry(&mut self, disk_path: &Path, archive_path: &Path) -> Result<(), ArchiveError> {
        debug!("Writing entry {} as {}", disk_path.display(), archive_path.display());
        self.builder.append_path_with_name(disk_path, archive_path)?;
        Ok(())
    }

    fn write_directory_recursive(
        &mut self,
        disk_path: &Path,
        archive_path: &Path,
    ) -> Result<(), ArchiveError> {
        debug!("Writing entry {} as {}", disk_path.display(), archive_path.display());
        self.builder.append_dir(archive_path, disk_path)?;

        for entry in WalkDir::new(disk_path).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(disk_path)
                .map_err(|_| ArchiveError::Unsupported(entry.path().to_path_buf()))?;
            let target = archive_path.join(relative);

            let file_type = entry.file_type();
            if file_type.is_dir() {
                debug!("Writing entry {} as {}", entry.path().display(), target.display());
                self.builder.append_dir(&target, entry.path())?;
            } else if file_type.is_file() || file_type.is_symlink() {
                self.write_entry(entry.path(), &target)?;
            } else {
                debug!("Skipping special file {}", entry.path().display());
            }
        }

        Ok(())
    }

    /// Finish the tar stream and flush the zstd frame
    pub fn finish(self) -> Result<(), ArchiveError> {
        let encoder = self.builder.into_inner()?;
        encoder.finish()?;
        Ok(())
    }
}

/// Create `out_path` containing every path in `paths` at the archive root
///
/// Nothing is written if any input path is missing.
pub fn create_tar_zst(out_path: &Path, paths: &[PathBuf]) -> Result<(), ArchiveError> {
    if let Some(missing) = paths.iter().find(|p| fs::symlink_metadata(p).is_err()) {
        return Err(ArchiveError::NotFound(missing.clone()));
    }

    let mut writer = ArchiveWriter::create(out_path)?;
    for path in paths {
        let name = path
            .file_name()
            .ok_or_else(|| ArchiveError::Unsupported(path.clone()))?;
        writer.add_path(path, Path::new(name))?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// List (path, entry type) of every entry in a .tar.zst file
    fn list_entries(archive: &Path) -> Vec<(String, tar::EntryType)> {
        let decoder = zstd::Decoder::new(File::open(archive).unwrap()).unwrap();
        let mut archive = tar::Archive::new(decoder);
        archive
            .entries()
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                let path = e.path().unwrap().to_string_lossy().trim_end_matches('/').to_string();
                (path, e.header().entry_type())
            })
            .collect()
    }

    #[test]
    fn test_archive_basic() {
        let wd = tempfile::tempdir().unwrap();
        let simple_file = wd.path().join("simple file");
        let simple_dir = wd.path().join("simple dir");
        let non_ascii_file = wd.path().join("中文文件");
        let non_ascii_dir = wd.path().join("中文目录");
        fs::write(&simple_file, b"hello").unwrap();
        fs::write(&non_ascii_file, "你好").unwrap();
        fs::create_dir_all(simple_dir.join("nested")).unwrap();
        fs::write(simple_dir.join("nested/inner.txt"), b"inner").unwrap();
        fs::create_dir_all(&non_ascii_dir).unwrap();

        let out = wd.path().join("basic.tar.zst");
        let mut w = ArchiveWriter::create(&out).unwrap();
        w.add_path(&simple_file, Path::new("simple file")).unwrap();
        w.add_path(&simple_dir, Path::new("simple dir")).unwrap();
        w.add_path(&non_ascii_file, Path::new("中文文件")).unwrap();
        w.add_path(&non_ascii_dir, Path::new("中文目录")).unwrap();
        w.finish().unwrap();

        let entries = list_entries(&out);
        let names: Vec<&str> = entries.iter().map(|(p, _)| p.as_str()).collect();
        assert!(names.contains(&"simple file"));
        assert!(names.contains(&"simple dir"));
        assert!(names.contains(&"simple dir/nested"));
        assert!(names.contains(&"simple dir/nested/inner.txt"));
        assert!(names.contains(&"中文文件"));
        assert!(names.contains(&"中文目录"));
    }

    #[test]
    fn test_archive_file_contents() {
        let wd = tempfile::tempdir().unwrap();
        let src = wd.path().join("a.txt");
        fs::write(&src, b"SB LJF").unwrap();

        let out = wd.path().join("out.tar.zst");
        let mut w = ArchiveWriter::create(&out).unwrap();
        w.add_path(&src, Path::new("dir/renamed.txt")).unwrap();
        w.finish().unwrap();

        let decoder = zstd::Decoder::new(File::open(&out).unwrap()).unwrap();
        let mut archive = tar::Archive::new(decoder);
        let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.path().unwrap(), Path::new("dir/renamed.txt"));
        let mut content = String::new();
        io::Read::read_to_string(&mut entry, &mut content).unwrap();
        assert_eq!(content, "SB LJF");
    }

    #[cfg(unix)]
    #[test]
    fn test_archive_symlink_not_followed() {
        let wd = tempfile::tempdir().unwrap();
        let target = wd.path().join("target.txt");
        fs::write(&target, b"data").unwrap();
        let link = wd.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let out = wd.path().join("links.tar.zst");
        let mut w = ArchiveWriter::create(&out).unwrap();
        w.add_path(&link, Path::new("link")).unwrap();
        w.finish().unwrap();

        let entries = list_entries(&out);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, tar::EntryType::Symlink);
    }

    #[test]
    fn test_add_missing_path() {
        let wd = tempfile::tempdir().unwrap();
        let out = wd.path().join("out.tar.zst");
        let mut w = ArchiveWriter::create(&out).unwrap();
        let err = w
            .add_path(&wd.path().join("missing"), Path::new("missing"))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::NotFound(_)));
    }

    #[test]
    fn test_create_tar_zst_checks_inputs_first() {
        let wd = tempfile::tempdir().unwrap();
        let present = wd.path().join("present");
        fs::write(&present, b"x").unwrap();
        let out = wd.path().join("out.tar.zst");

        let result = create_tar_zst(&out, &[present.clone(), wd.path().join("absent")]);
        assert!(matches!(result, Err(ArchiveError::NotFound(_))));
        assert!(!out.exists());

        create_tar_zst(&out, &[present]).unwrap();
        let entries = list_entries(&out);
        assert_eq!(entries, vec![("present".to_string(), tar::EntryType::Regular)]);
    }
}
