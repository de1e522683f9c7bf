use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};

/// Delivers a finished file to the user.
pub trait FileExporter: Send + Sync {
    /// Writes `bytes` under `filename`, returning where the file ended up.
    fn export(&self, bytes: &[u8], mime: &str, filename: &str) -> Result<PathBuf>;
}

/// Saves exports into a single directory, the desktop stand-in for a browser
/// download. Existing files are never replaced: a taken name gets a ` (n)`
/// suffix before the extension.
pub struct DirectoryExporter {
    dir: PathBuf,
}

impl DirectoryExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileExporter for DirectoryExporter {
    fn export(&self, bytes: &[u8], _mime: &str, filename: &str) -> Result<PathBuf> {
        let plain = Path::new(filename)
            .file_name()
            .is_some_and(|name| name == filename);
        if !plain || filename.is_empty() {
            bail!("refusing to write outside the export directory: {filename:?}");
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create export directory {}", self.dir.display()))?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(numbered_name(filename, attempt));
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("Failed to create export {}", path.display()))
                }
            };
            file.write_all(bytes)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            return Ok(path);
        }

        bail!("no free file name for {filename} in {}", self.dir.display())
    }
}

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// `polygon_tokyo.csv` for attempt 0, `polygon_tokyo (2).csv` for attempt 2.
fn numbered_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({attempt}).{ext}"),
        _ => format!("{filename} ({attempt})"),
    }
}
