use std::path::PathBuf;

use async_trait::async_trait;
use teloxide::{net::Download, prelude::*};

use modesty_core::{
    errors::Error,
    media::{MediaAttachment, MediaResolver, TempMedia},
    Result,
};

/// Downloads the classified frame of an attachment into `temp_dir`.
pub struct TelegramMediaResolver {
    bot: Bot,
    temp_dir: PathBuf,
}

impl TelegramMediaResolver {
    pub fn new(bot: Bot, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            bot,
            temp_dir: temp_dir.into(),
        }
    }
}

#[async_trait]
impl MediaResolver for TelegramMediaResolver {
    async fn resolve(&self, media: &MediaAttachment) -> Result<TempMedia> {
        let file_id = media.file_id.clone().ok_or_else(|| {
            Error::MediaUnresolvable(format!("{:?} has no thumbnail", media.kind))
        })?;

        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|e| Error::MediaUnresolvable(format!("get_file failed: {e}")))?;

        // Guard first: a failed download removes the partial file on drop.
        let temp = TempMedia::create_in(&self.temp_dir, media.kind)?;
        let mut dst = tokio::fs::File::create(temp.path()).await?;
        self.bot
            .download_file(&file.path, &mut dst)
            .await
            .map_err(|e| Error::MediaUnresolvable(format!("download failed: {e}")))?;

        tracing::debug!(
            kind = ?media.kind,
            path = %temp.path().display(),
            "materialized media"
        );
        Ok(temp)
    }
}
