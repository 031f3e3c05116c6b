use tracing::{info, instrument, warn};

use crate::crawler::{DownloadSettings, MangaCrawler};
use crate::manga::{ChapterIndex, DownloadSummary};

/// 一次交互会话中的状态：当前标题、章节索引与下载参数
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub title: Option<String>,
    pub chapters: ChapterIndex,
    pub settings: DownloadSettings,
}

impl Session {
    pub fn new(settings: DownloadSettings) -> Self {
        Self {
            title: None,
            chapters: ChapterIndex::new(),
            settings,
        }
    }

    /// 重新抓取目录页并替换当前索引，返回章节数。失败时已报告错误，索引被清空
    #[instrument(skip(self, crawler))]
    pub async fn fetch_chapters(
        &mut self,
        crawler: &MangaCrawler,
        index_url: &str,
        chapter_pattern: &str,
    ) -> usize {
        let (title, chapters) = crawler.fetch_chapter_links(index_url, chapter_pattern).await;
        self.title = title;
        self.chapters = chapters;
        self.chapters.len()
    }

    pub fn chapter_ids(&self) -> Vec<String> {
        self.chapters.ids()
    }

    /// 按给定顺序逐章下载，未知编号记录警告后跳过
    #[instrument(skip_all)]
    pub async fn download(&self, crawler: &MangaCrawler, ids: &[String]) -> DownloadSummary {
        let mut summary = DownloadSummary::default();
        let Some(title) = self.title.as_deref() else {
            warn!("尚未获取章节列表");
            return summary;
        };

        for (i, id) in ids.iter().enumerate() {
            let Some(chapter_url) = self.chapters.get(id) else {
                warn!("章节 {} 不在列表中", id);
                continue;
            };
            info!("正在处理第 {} 章 ({}/{})", id, i + 1, ids.len());
            let outcome = crawler
                .download_chapter(chapter_url, title, id, &self.settings)
                .await;
            summary.record(outcome);
        }

        info!(
            "共处理 {} 章，跳过 {} 章，下载 {} 张图片",
            summary.chapters, summary.skipped, summary.images
        );
        summary
    }

    pub async fn download_all(&self, crawler: &MangaCrawler) -> DownloadSummary {
        let ids = self.chapter_ids();
        self.download(crawler, &ids).await
    }
}
