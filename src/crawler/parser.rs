use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::extractor::ScrapePolicy;
use crate::manga::ChapterIndex;
use crate::utils::host_title;

/// 待下载的图片，`position` 为其在原始元素列表中的序号(从 1 开始)
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSlot {
    pub position: usize,
    pub url: Url,
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    policy: ScrapePolicy,
}

impl Parser {
    pub fn new(policy: ScrapePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScrapePolicy {
        &self.policy
    }

    /// 解析目录页，返回标题和章节索引
    #[instrument(skip_all, fields(url = %index_url))]
    pub fn index_page(&self, html: &str, index_url: &Url, pattern: &Regex) -> (String, ChapterIndex) {
        let document = Html::parse_document(html);
        let title = self.title(&document, index_url);
        info!("提取到标题: {}", title);
        let chapters = self.chapter_links(&document, index_url, pattern);
        info!("找到 {} 个章节", chapters.len());
        (title, chapters)
    }

    pub fn title(&self, document: &Html, url: &Url) -> String {
        for selector in &self.policy.title_selectors {
            let Some(elem) = document.select(selector).next() else {
                continue;
            };
            let text = elem.text().collect::<String>();
            if text.trim().is_empty() {
                continue;
            }

            let title = self.policy.clean_title(&text);
            if title.is_empty() {
                debug!("标题 '{}' 去掉后缀后为空，改用域名", text.trim());
                break;
            }
            return title;
        }
        host_title(url)
    }

    pub fn chapter_links(&self, document: &Html, base: &Url, pattern: &Regex) -> ChapterIndex {
        let mut chapters = ChapterIndex::new();

        for link in document.select(&self.policy.link) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(id) = pattern.captures(href).and_then(|caps| caps.get(1)) else {
                continue;
            };
            let url = match base.join(href) {
                Ok(url) => url,
                Err(e) => {
                    warn!("无法解析章节链接 {}: {}", href, e);
                    continue;
                }
            };
            chapters.insert(id.as_str().to_string(), url);
        }
        chapters
    }

    /// 章节页中的图片元素：容器 > 段落内图片 > 全部图片
    pub fn image_elements<'a>(
        &self,
        document: &'a Html,
        container: Option<&Selector>,
    ) -> Vec<ElementRef<'a>> {
        if let Some(container) = container.and_then(|s| document.select(s).next()) {
            return container.select(&self.policy.image).collect();
        }

        let mut images = Vec::new();
        for paragraph in document.select(&self.policy.paragraph) {
            images.extend(paragraph.select(&self.policy.image));
        }
        if images.is_empty() {
            images = document.select(&self.policy.image).collect();
        }
        images
    }

    /// 过滤装饰图并补全地址。序号按原始元素位置计，被跳过的图片会留下空号
    #[instrument(skip_all, fields(url = %chapter_url))]
    pub fn chapter_images(
        &self,
        html: &str,
        chapter_url: &Url,
        container: Option<&Selector>,
    ) -> (usize, Vec<ImageSlot>) {
        let document = Html::parse_document(html);
        let elements = self.image_elements(&document, container);
        let total = elements.len();

        let mut slots = Vec::new();
        for (i, img) in elements.into_iter().enumerate() {
            let Some(src) = self.policy.image_source(img) else {
                continue;
            };
            if self.policy.is_decorative(src) {
                debug!("跳过装饰图: {}", src);
                continue;
            }
            match chapter_url.join(src) {
                Ok(url) => slots.push(ImageSlot {
                    position: i + 1,
                    url,
                }),
                Err(e) => warn!("无法解析图片地址 {}: {}", src, e),
            }
        }
        info!("章节页共 {} 个图片元素，{} 个待下载", total, slots.len());
        (total, slots)
    }
}
