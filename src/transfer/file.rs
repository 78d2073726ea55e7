//! File helpers for exports and uploads.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use super::types::{TransferError, TransferResult};

/// Write `content` to `path` atomically.
///
/// Content goes to a sibling `.tmp` file which is synced and then renamed
/// over the target. On failure the original file, if any, is untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> TransferResult<()> {
    let mut temp_name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Read an upload, refusing anything larger than `max_bytes`.
///
/// # Errors
///
/// Returns `TransferError::TooLarge` past the limit, or an I/O error.
pub fn read_upload(path: &Path, max_bytes: usize) -> TransferResult<Vec<u8>> {
    let file = File::open(path)?;
    let mut data = Vec::new();
    // One byte past the limit is enough to detect an oversized file.
    file.take(max_bytes as u64 + 1).read_to_end(&mut data)?;
    if data.len() > max_bytes {
        return Err(TransferError::TooLarge { max: max_bytes });
    }
    Ok(data)
}
