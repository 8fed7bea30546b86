use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use image::ImageFormat;

use crate::errors::{HermineError, Result};
use crate::seal::CertifiedImage;

pub const MIME_TYPE: &str = "image/png";

const FILE_PREFIX: &str = "hermine_certification";

/// Download name for a certificate issued at `issued_at`, e.g.
/// `hermine_certification_20260131_0942.png`.
pub fn file_name<Tz: TimeZone>(issued_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{FILE_PREFIX}_{}.png", issued_at.format("%Y%m%d_%H%M"))
}

/// Encode the certified image as PNG.
pub fn encode_png(image: &CertifiedImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| HermineError::ImageProcessing {
            path: "<memory>".to_string(),
            operation: "PNG encoding".to_string(),
            source: Box::new(e),
        })?;
    Ok(buffer.into_inner())
}

/// First path in `dir` named `name` that does not exist yet, inserting `_1`,
/// `_2`, ... before the extension when needed.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (name, None),
    };
    (1..)
        .map(|n| match extension {
            Some(extension) => dir.join(format!("{stem}_{n}.{extension}")),
            None => dir.join(format!("{stem}_{n}")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Write the certificate into `output_dir` under a timestamped name and
/// return the path it was written to.
pub fn save(image: &CertifiedImage, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|e| HermineError::FileSystem {
        path: output_dir.to_path_buf(),
        operation: "create output directory".to_string(),
        source: e,
    })?;

    let path = unique_path(output_dir, &file_name(&Local::now()));
    let bytes = encode_png(image)?;
    fs::write(&path, bytes).map_err(|e| HermineError::FileSystem {
        path: path.clone(),
        operation: "write certificate".to_string(),
        source: e,
    })?;

    tracing::info!("Certificate written to {}", path.display());
    Ok(path)
}
