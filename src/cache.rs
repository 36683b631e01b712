//! Disk cache for fitted bundles, one entry per training directory.
//!
//! On-disk layout: 8 magic bytes, then a bincode-encoded format version,
//! then the bincode-encoded [`FaceBundle`]. Absence of the file is a miss,
//! not an error; anything unreadable or inconsistent is
//! [`EigenfacesError::CorruptCache`].

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::bundle::FaceBundle;
use crate::error::{EigenfacesError, Result};

/// File name of the persisted bundle inside a training directory.
pub const CACHE_FILE_NAME: &str = "saveddata.cache";

const CACHE_MAGIC: &[u8; 8] = b"EIGFACE\0";
const CACHE_FORMAT_VERSION: u32 = 1;

/// Path of the cache file for a training directory.
pub fn cache_path(training_dir: &Path) -> PathBuf {
    training_dir.join(CACHE_FILE_NAME)
}

/// Persists `bundle` as the cache entry for `training_dir`, replacing any
/// previous entry. The write is synchronous; when this returns the entry is
/// on disk.
pub fn save(training_dir: &Path, bundle: &FaceBundle) -> Result<()> {
    let path = cache_path(training_dir);
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(CACHE_MAGIC)?;
    bincode::serde::encode_into_std_write(
        CACHE_FORMAT_VERSION,
        &mut writer,
        bincode::config::standard(),
    )
    .map_err(io::Error::other)?;
    bincode::serde::encode_into_std_write(bundle, &mut writer, bincode::config::standard())
        .map_err(io::Error::other)?;
    writer.flush()?;
    info!(
        "Cached bundle for {} images at {:?}",
        bundle.num_images(),
        path
    );
    Ok(())
}

/// Loads the cache entry for `training_dir`. A missing file is `Ok(None)`;
/// a file that cannot be read back into a consistent bundle is
/// [`EigenfacesError::CorruptCache`].
pub fn load(training_dir: &Path) -> Result<Option<FaceBundle>> {
    let path = cache_path(training_dir);
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No cache entry at {:?}", path);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 8];
    reader
        .read_exact(&mut magic)
        .map_err(|e| EigenfacesError::CorruptCache {
            reason: format!("truncated header: {e}"),
        })?;
    if &magic != CACHE_MAGIC {
        return Err(EigenfacesError::CorruptCache {
            reason: "unrecognized magic bytes".to_string(),
        });
    }

    let version: u32 =
        bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard()).map_err(
            |e| EigenfacesError::CorruptCache {
                reason: format!("unreadable format version: {e}"),
            },
        )?;
    if version != CACHE_FORMAT_VERSION {
        return Err(EigenfacesError::CorruptCache {
            reason: format!("unsupported format version {version}"),
        });
    }

    let bundle: FaceBundle =
        bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard()).map_err(
            |e| EigenfacesError::CorruptCache {
                reason: format!("undecodable bundle: {e}"),
            },
        )?;
    bundle
        .validate()
        .map_err(|reason| EigenfacesError::CorruptCache { reason })?;

    info!(
        "Loaded cached bundle from {:?} ({} images)",
        path,
        bundle.num_images()
    );
    Ok(Some(bundle))
}

/// True when the cached bundle was built over a different ordered image
/// list than `current_list`; reordering alone makes it stale, since row
/// order is significant everywhere.
pub fn is_stale(bundle: &FaceBundle, current_list: &[PathBuf]) -> bool {
    bundle.image_list() != current_list
}
