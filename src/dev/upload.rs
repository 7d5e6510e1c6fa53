//! Zip archive extraction for uploaded bundles (spec §4.3).
//!
//! Grounded in `dev_server.py`'s use of Python's `zipfile` to unpack an
//! uploaded archive in place; `zip` is the idiomatic Rust equivalent.

use std::fs;
use std::path::{Path, PathBuf};

/// Extract `archive_path` into `dest_dir`, which must already exist.
/// Runs on a blocking thread since `zip` is a synchronous crate.
pub async fn extract_zip(archive_path: PathBuf, dest_dir: PathBuf) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || extract_zip_blocking(&archive_path, &dest_dir)).await?
}

fn extract_zip_blocking(archive_path: &Path, dest_dir: &Path) -> anyhow::Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative_path) = entry.enclosed_name() else {
            anyhow::bail!("zip entry {} has an unsafe path", entry.name());
        };
        let out_path = dest_dir.join(relative_path);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out_file = fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out_file)?;
    }

    Ok(())
}
