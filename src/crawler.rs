pub mod downloader;
pub mod parser;
pub mod processor;

use std::time::Duration;

use regex::Regex;
use scraper::Selector;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use url::Url;

pub use downloader::Downloader;
pub use parser::{ImageSlot, Parser};
pub use processor::Processor;

use crate::archive::Archive;
use crate::config::Config;
use crate::extractor::{ScrapePolicy, parse_selector};
use crate::manga::{ChapterIndex, ChapterOutcome};
use crate::utils::url_extension;
use crate::{Error, Result};

/// 单章下载参数
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// 图片容器的 CSS 选择器，空白视为未设置
    pub container_selector: Option<String>,
    /// 每张图片请求前的等待时间
    pub delay: Duration,
    pub skip_existing: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            container_selector: None,
            delay: Duration::from_secs(1),
            skip_existing: true,
        }
    }
}

impl DownloadSettings {
    /// 选择器无效时记录警告并按未设置处理
    pub fn container(&self) -> Option<Selector> {
        let raw = self.container_selector.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match parse_selector(raw) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!("{}，改用默认图片查找规则", e);
                None
            }
        }
    }
}

pub struct MangaCrawler {
    parser: Parser,
    downloader: Downloader,
    processor: Processor,
}

impl MangaCrawler {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            parser: Parser::new(config.policy.clone()),
            downloader: Downloader::new(&config.user_agent)?,
            processor: Processor::new(Archive::new(config.archive_root.clone())),
        })
    }

    pub fn archive(&self) -> &Archive {
        self.processor.archive()
    }

    pub fn policy(&self) -> &ScrapePolicy {
        self.parser.policy()
    }

    /// 抓取目录页，返回标题与章节索引
    #[instrument(skip(self))]
    pub async fn extract(
        &self,
        index_url: &str,
        chapter_pattern: &str,
    ) -> Result<(String, ChapterIndex)> {
        let pattern = Regex::new(chapter_pattern)?;
        if pattern.captures_len() < 2 {
            return Err(Error::Parse(format!(
                "章节正则 '{}' 缺少捕获组",
                chapter_pattern
            )));
        }
        let index_url = Url::parse(index_url)
            .map_err(|e| Error::Parse(format!("无效的地址 '{}': {}", index_url, e)))?;

        let html = self.downloader.page(&index_url).await?;
        Ok(self.parser.index_page(&html, &index_url, &pattern))
    }

    /// 失败时报告错误并返回空索引，不保留部分结果
    pub async fn fetch_chapter_links(
        &self,
        index_url: &str,
        chapter_pattern: &str,
    ) -> (Option<String>, ChapterIndex) {
        match self.extract(index_url, chapter_pattern).await {
            Ok((title, chapters)) => (Some(title), chapters),
            Err(e) => {
                error!("获取章节列表失败: {}", e);
                (None, ChapterIndex::new())
            }
        }
    }

    /// 下载单章图片。单张图片失败只记警告，页面请求失败则整体返回错误
    #[instrument(skip(self, chapter_url, settings), fields(url = %chapter_url))]
    pub async fn try_download_chapter(
        &self,
        chapter_url: &Url,
        title: &str,
        chapter_id: &str,
        settings: &DownloadSettings,
    ) -> Result<ChapterOutcome> {
        let threshold = self.parser.policy().skip_threshold;
        if settings.skip_existing && self.archive().is_materialized(title, chapter_id, threshold) {
            info!("第 {} 章已下载，跳过", chapter_id);
            return Ok(ChapterOutcome::skipped());
        }

        let html = self.downloader.page(chapter_url).await?;
        let container = settings.container();
        let (total, slots) = self
            .parser
            .chapter_images(&html, chapter_url, container.as_ref());

        let chapter_dir = self.processor.prepare_chapter(title, chapter_id).await?;

        let mut downloaded = 0;
        for slot in slots {
            sleep(settings.delay).await;

            let image_bytes = match self.downloader.image(&slot.url).await {
                Ok(image_bytes) => image_bytes,
                Err(e) => {
                    warn!("第 {} 章第 {} 张图片下载失败: {}", chapter_id, slot.position, e);
                    continue;
                }
            };

            let extension = url_extension(&slot.url);
            if let Err(e) = self
                .processor
                .write_image(&chapter_dir, slot.position, &extension, image_bytes)
                .await
            {
                warn!("第 {} 章第 {} 张图片保存失败: {}", chapter_id, slot.position, e);
                continue;
            }

            downloaded += 1;
            info!("正在下载第 {} 章: {}/{}", chapter_id, downloaded, total);
        }

        Ok(ChapterOutcome::downloaded(downloaded))
    }

    /// 页面级失败时报告错误并返回 `(0, false)`
    pub async fn download_chapter(
        &self,
        chapter_url: &Url,
        title: &str,
        chapter_id: &str,
        settings: &DownloadSettings,
    ) -> ChapterOutcome {
        match self
            .try_download_chapter(chapter_url, title, chapter_id, settings)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("处理第 {} 章失败: {}", chapter_id, e);
                ChapterOutcome::default()
            }
        }
    }
}
