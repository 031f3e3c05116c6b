//! 抓取启发式规则。
//!
//! 标题选择器、营销后缀、图片属性、广告关键字等全部集中在 [`ScrapePolicy`] 中，
//! 针对不同站点只需在配置文件的 `[policy]` 表里覆盖，不涉及请求与落盘逻辑。

use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Deserializer};

static DEFAULT_TITLE_SELECTORS: [&str; 4] = ["h1", ".manga-title", ".series-title", "title"];

static DEFAULT_TITLE_SUFFIX: &str = r"(?i)\s*-?\s*(manga|read online|free|scans).*$";

static DEFAULT_IMAGE_ATTRS: [&str; 3] = ["src", "data-src", "data-lazy-src"];

static DEFAULT_IGNORE_KEYWORDS: [&str; 3] = ["icon", "logo", "ad"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapePolicy {
    /// 按优先级尝试的标题选择器
    #[serde(deserialize_with = "deserialize_selectors")]
    pub title_selectors: Vec<Selector>,
    /// 从标题尾部剥离的营销后缀
    #[serde(deserialize_with = "deserialize_regex")]
    pub title_suffix: Regex,
    #[serde(deserialize_with = "deserialize_selector")]
    pub link: Selector,
    #[serde(deserialize_with = "deserialize_selector")]
    pub paragraph: Selector,
    #[serde(deserialize_with = "deserialize_selector")]
    pub image: Selector,
    /// 依次读取的图片地址属性
    pub image_attrs: Vec<String>,
    /// 地址中包含这些子串(不区分大小写)的图片视为装饰图
    pub ignore_keywords: Vec<String>,
    /// 章节目录中至少有这么多图片才算已下载
    pub skip_threshold: usize,
}

impl Default for ScrapePolicy {
    fn default() -> Self {
        Self {
            title_selectors: DEFAULT_TITLE_SELECTORS
                .iter()
                .map(|s| Selector::parse(s).expect("无法创建标题选择器"))
                .collect(),
            title_suffix: Regex::new(DEFAULT_TITLE_SUFFIX).expect("标题后缀正则编译失败"),
            link: Selector::parse("a[href]").expect("无法创建a选择器"),
            paragraph: Selector::parse("p").expect("无法创建p选择器"),
            image: Selector::parse("img").expect("无法创建img选择器"),
            image_attrs: DEFAULT_IMAGE_ATTRS.iter().map(|s| s.to_string()).collect(),
            ignore_keywords: DEFAULT_IGNORE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_threshold: 3,
        }
    }
}

impl ScrapePolicy {
    pub fn clean_title(&self, raw: &str) -> String {
        self.title_suffix
            .replace_all(raw.trim(), "")
            .trim()
            .to_string()
    }

    /// 第一个非空的图片地址属性
    pub fn image_source<'a>(&self, img: ElementRef<'a>) -> Option<&'a str> {
        self.image_attrs
            .iter()
            .filter_map(|name| img.value().attr(name))
            .find(|value| !value.is_empty())
    }

    /// 粗略的子串匹配，`gradient` 之类的文件名同样会被 `ad` 命中
    pub fn is_decorative(&self, src: &str) -> bool {
        let src = src.to_lowercase();
        self.ignore_keywords
            .iter()
            .any(|keyword| src.contains(&keyword.to_lowercase()))
    }
}

pub fn parse_selector(s: &str) -> crate::Result<Selector> {
    Selector::parse(s).map_err(|e| crate::Error::Parse(format!("无效的选择器 '{}': {}", s, e)))
}

fn deserialize_selector<'de, D>(deserializer: D) -> Result<Selector, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;

    Selector::parse(&s).map_err(|e| serde::de::Error::custom(format!("Invalid selector: {}", e)))
}

fn deserialize_selectors<'de, D>(deserializer: D) -> Result<Vec<Selector>, D::Error>
where
    D: Deserializer<'de>,
{
    let list: Vec<String> = Vec::deserialize(deserializer)?;

    list.iter()
        .map(|s| {
            Selector::parse(s)
                .map_err(|e| serde::de::Error::custom(format!("Invalid selector '{}': {}", s, e)))
        })
        .collect()
}

fn deserialize_regex<'de, D>(deserializer: D) -> Result<Regex, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;

    Regex::new(&s).map_err(|e| serde::de::Error::custom(format!("Invalid regex '{}': {}", s, e)))
}
