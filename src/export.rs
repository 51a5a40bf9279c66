//! Saving generated text as a downloadable [`Artifact`].

use std::path::{Path, PathBuf};

use crate::Generation;

/// A file offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name.
    pub file_name: &'static str,
    /// MIME type.
    pub mime: &'static str,
    /// File contents.
    pub contents: String,
}

impl Artifact {
    /// Fixed file name for press releases.
    pub const FILE_NAME: &'static str = "보도자료.txt";
    /// MIME type of the file.
    pub const MIME: &'static str = "text/plain";

    /// Press-release text artifact.
    pub fn new<S>(contents: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            file_name: Self::FILE_NAME,
            mime: Self::MIME,
            contents: contents.into(),
        }
    }

    /// Artifact for a [`Generation`]. Only [`Generation::Success`] text can be
    /// saved; warnings and failures are not content.
    pub fn from_generation(generation: &Generation) -> Option<Self> {
        generation.text().map(Self::new)
    }

    /// Write the artifact. If `target` is a directory the fixed file name is
    /// used inside it. An existing file is overwritten. Returns the path
    /// written.
    pub fn save<P>(&self, target: P) -> std::io::Result<PathBuf>
    where
        P: AsRef<Path>,
    {
        let target = target.as_ref();
        let path = if target.is_dir() {
            target.join(self.file_name)
        } else {
            target.to_path_buf()
        };

        std::fs::write(&path, self.contents.as_bytes())?;

        #[cfg(feature = "log")]
        log::info!("Saved {} bytes to {}", self.contents.len(), path.display());

        Ok(path)
    }
}
