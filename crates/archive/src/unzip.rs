//! Blocking zip extraction

use grab_errors::{ArchiveError, Error};
use std::fs::File;
use std::path::Path;

/// Extract every entry of `archive_path` into `dest_dir`
///
/// Existing files with the same name are replaced, even when read-only;
/// anything else already in `dest_dir` is left alone. Unix modes stored in
/// the archive are applied, and failing to apply one fails the extraction. Entries whose names would escape `dest_dir`
/// are skipped. Returns the number of entries written.
pub(crate) fn extract_all(archive_path: &Path, dest_dir: &Path) -> Result<usize, Error> {
    let fail = |message: String| -> Error {
        ArchiveError::extraction_failed(archive_path, message).into()
    };

    let file =
        File::open(archive_path).map_err(|e| fail(format!("failed to open archive: {e}")))?;

    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| fail(format!("failed to read zip archive: {e}")))?;

    let mut written = 0;
    // Directory modes are applied last so read-only directories can be filled
    #[cfg(unix)]
    let mut dir_modes = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| fail(format!("failed to read zip entry: {e}")))?;

        let outpath = match entry.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| fail(format!("failed to create {}: {e}", outpath.display())))?;
            #[cfg(unix)]
            {
                if let Some(mode) = entry.unix_mode() {
                    set_mode(&outpath, mode | 0o700).map_err(|e| {
                        fail(format!("failed to set mode on {}: {e}", outpath.display()))
                    })?;
                    dir_modes.push((outpath, mode));
                }
            }
        } else {
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    fail(format!("failed to create {}: {e}", parent.display()))
                })?;
            }
            // A previous extraction may have left a read-only file here
            if std::fs::symlink_metadata(&outpath).is_ok_and(|meta| !meta.is_dir()) {
                std::fs::remove_file(&outpath).map_err(|e| {
                    fail(format!("failed to replace {}: {e}", outpath.display()))
                })?;
            }
            let mut outfile = File::create(&outpath)
                .map_err(|e| fail(format!("failed to create {}: {e}", outpath.display())))?;
            std::io::copy(&mut entry, &mut outfile)
                .map_err(|e| fail(format!("failed to extract {}: {e}", entry.name())))?;
            #[cfg(unix)]
            {
                if let Some(mode) = entry.unix_mode() {
                    set_mode(&outpath, mode).map_err(|e| {
                        fail(format!("failed to set mode on {}: {e}", outpath.display()))
                    })?;
                }
            }
        }

        written += 1;
    }

    #[cfg(unix)]
    {
        for (path, mode) in dir_modes.into_iter().rev() {
            set_mode(&path, mode)
                .map_err(|e| fail(format!("failed to set mode on {}: {e}", path.display())))?;
        }
    }

    Ok(written)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}
