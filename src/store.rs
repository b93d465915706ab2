use std::fs;
use std::io::{self, Read, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::Builder;

use crate::error::MirrorError;

pub const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub path: Utf8PathBuf,
    pub exists: bool,
}

/// Local side of the mirror: maps remote URLs below the base onto `root`.
#[derive(Debug, Clone)]
pub struct Store {
    root: Utf8PathBuf,
}

impl Store {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn relative_path(file_url: &str, base_url: &str) -> Result<Utf8PathBuf, MirrorError> {
        let outside = || MirrorError::OutsideBase {
            url: file_url.to_string(),
            base: base_url.to_string(),
        };
        let rest = file_url.strip_prefix(base_url).ok_or_else(outside)?;
        if !base_url.ends_with('/') && !rest.starts_with('/') {
            return Err(outside());
        }

        let mut relative = Utf8PathBuf::new();
        for segment in rest.split('/').filter(|segment| !segment.is_empty()) {
            let decoded = urlencoding::decode(segment)
                .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
            if decoded == "." || decoded == ".." || decoded.contains(['/', '\\']) {
                return Err(outside());
            }
            relative.push(&*decoded);
        }
        if relative.as_str().is_empty() {
            return Err(outside());
        }
        Ok(relative)
    }

    pub fn target(&self, file_url: &str, base_url: &str) -> Result<DownloadTarget, MirrorError> {
        let path = self.root.join(Self::relative_path(file_url, base_url)?);
        let exists = path.as_std_path().is_file();
        Ok(DownloadTarget { path, exists })
    }

    /// Streams `body` into `path` through a temporary sibling file.
    ///
    /// The file only appears at `path` once the whole body has been read and
    /// its length matches `expected`. An existing file is never replaced.
    pub fn write_stream<R, F>(
        path: &Utf8Path,
        body: &mut R,
        expected: u64,
        mut on_chunk: F,
    ) -> Result<u64, MirrorError>
    where
        R: Read + ?Sized,
        F: FnMut(usize),
    {
        let parent = path
            .parent()
            .ok_or_else(|| MirrorError::Filesystem("invalid destination path".to_string()))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        let mut temp = Builder::new()
            .prefix(".iso-dl-")
            .suffix(".part")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;

        let mut buf = [0u8; CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let read = match body.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(MirrorError::Http(err.to_string())),
            };
            temp.write_all(&buf[..read])
                .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
            written += read as u64;
            on_chunk(read);
        }

        if written != expected {
            return Err(MirrorError::LengthMismatch {
                expected,
                actual: written,
            });
        }

        temp.as_file()
            .sync_all()
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        temp.persist_noclobber(path.as_std_path())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        Ok(written)
    }
}
