use std::cmp::Ordering;
use std::collections::HashMap;

use url::Url;

/// 章节编号 -> 章节绝对地址。
///
/// 迭代顺序不作保证，需要按章节顺序处理时使用 [`ChapterIndex::sorted`]。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterIndex {
    chapters: HashMap<String, Url>,
}

impl ChapterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 编号重复时后出现的地址覆盖先前的
    pub fn insert(&mut self, id: String, url: Url) {
        self.chapters.insert(id, url);
    }

    pub fn get(&self, id: &str) -> Option<&Url> {
        self.chapters.get(id)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Url)> {
        self.chapters.iter()
    }

    /// 按编号数值升序；无法解析为数字的编号排在最后并按字符串排序
    pub fn sorted(&self) -> Vec<(&str, &Url)> {
        let mut entries: Vec<_> = self
            .chapters
            .iter()
            .map(|(id, url)| (id.as_str(), url))
            .collect();
        entries.sort_by(|(a, _), (b, _)| compare_ids(a, b));
        entries
    }

    pub fn ids(&self) -> Vec<String> {
        self.sorted()
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// 单章下载结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChapterOutcome {
    pub downloaded: usize,
    pub skipped: bool,
}

impl ChapterOutcome {
    pub fn skipped() -> Self {
        Self {
            downloaded: 0,
            skipped: true,
        }
    }

    pub fn downloaded(count: usize) -> Self {
        Self {
            downloaded: count,
            skipped: false,
        }
    }
}

/// 多章下载汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub chapters: usize,
    pub skipped: usize,
    pub images: usize,
}

impl DownloadSummary {
    pub fn record(&mut self, outcome: ChapterOutcome) {
        self.chapters += 1;
        self.images += outcome.downloaded;
        if outcome.skipped {
            self.skipped += 1;
        }
    }
}
