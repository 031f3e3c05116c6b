use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, instrument};

use crate::Result;
use crate::archive::Archive;

/// `image_01.jpg` 形式的文件名，序号至少两位
pub fn image_filename(position: usize, extension: &str) -> String {
    format!("image_{:02}{}", position, extension)
}

#[derive(Debug, Clone)]
pub struct Processor {
    archive: Archive,
}

impl Processor {
    pub fn new(archive: Archive) -> Self {
        Self { archive }
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// 已存在时不报错
    #[instrument(skip(self))]
    pub async fn prepare_chapter(&self, title: &str, chapter_id: &str) -> Result<PathBuf> {
        let chapter_dir = self.archive.chapter_dir(title, chapter_id);
        fs::create_dir_all(&chapter_dir).await?;
        debug!("章节目录: {}", chapter_dir.display());
        Ok(chapter_dir)
    }

    /// 同名文件直接覆盖
    #[instrument(skip(self, image_bytes))]
    pub async fn write_image(
        &self,
        chapter_dir: &Path,
        position: usize,
        extension: &str,
        image_bytes: Bytes,
    ) -> Result<PathBuf> {
        let image_path = chapter_dir.join(image_filename(position, extension));
        fs::write(&image_path, &image_bytes).await?;
        debug!("图片已保存到: {}", image_path.display());
        Ok(image_path)
    }
}
