//! Visual attachments and the temp files they are materialized into.

use std::{io, path::Path};

use async_trait::async_trait;
use tempfile::TempPath;

use crate::Result;

/// Attachment kinds the bot knows how to classify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
    VideoNote,
    Animation,
}

impl MediaKind {
    /// Diagnostic tag of the resolution strategy for this kind.
    pub fn strategy(self) -> &'static str {
        match self {
            MediaKind::Photo => "on_photo",
            MediaKind::Video => "on_video",
            MediaKind::VideoNote => "on_video_note",
            MediaKind::Animation => "on_animation",
        }
    }

    fn file_prefix(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::VideoNote => "video_note",
            MediaKind::Animation => "animation",
        }
    }
}

/// A visual attachment, pointing at the frame that gets classified.
///
/// For photos this is the largest size; for video-like kinds it is the
/// thumbnail. `file_id` is `None` when the platform sent no such frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub file_id: Option<String>,
}

impl MediaAttachment {
    pub fn new(kind: MediaKind, file_id: impl Into<String>) -> Self {
        Self {
            kind,
            file_id: Some(file_id.into()),
        }
    }

    pub fn without_frame(kind: MediaKind) -> Self {
        Self {
            kind,
            file_id: None,
        }
    }
}

/// Port for materializing an attachment as a local file.
///
/// Implementations create the file; they never delete it. Ownership passes
/// to the caller through [`TempMedia`].
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, media: &MediaAttachment) -> Result<TempMedia>;
}

/// Exclusive owner of a materialized media file.
///
/// Call [`TempMedia::release`] to remove the file and observe the outcome. If
/// the guard is dropped without release (early return, cancelled future) the
/// file is still removed, but a failure goes unreported.
#[derive(Debug)]
pub struct TempMedia {
    path: TempPath,
}

impl TempMedia {
    /// Create an empty, uniquely named file for `kind` under `dir`.
    pub fn create_in(dir: &Path, kind: MediaKind) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(&format!("{}_", kind.file_prefix()))
            .suffix(".jpg")
            .tempfile_in(dir)?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(self) -> io::Result<()> {
        self.path.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let media = TempMedia::create_in(dir.path(), MediaKind::Photo).unwrap();
        let path = media.path().to_path_buf();
        std::fs::write(&path, b"jpeg").unwrap();

        media.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn release_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let media = TempMedia::create_in(dir.path(), MediaKind::Video).unwrap();
        std::fs::remove_file(media.path()).unwrap();

        assert!(media.release().is_err());
    }

    #[test]
    fn drop_without_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let media = TempMedia::create_in(dir.path(), MediaKind::Animation).unwrap();
        let path = media.path().to_path_buf();
        std::fs::write(&path, b"gif-frame").unwrap();

        drop(media);
        assert!(!path.exists());
    }

    #[test]
    fn temp_files_are_unique_and_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let a = TempMedia::create_in(dir.path(), MediaKind::VideoNote).unwrap();
        let b = TempMedia::create_in(dir.path(), MediaKind::VideoNote).unwrap();

        assert_ne!(a.path(), b.path());
        assert!(a
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("video_note_"));
        assert_eq!(MediaKind::VideoNote.strategy(), "on_video_note");
    }

    #[test]
    fn create_in_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(TempMedia::create_in(&missing, MediaKind::Photo).is_err());
    }
}
