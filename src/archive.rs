//! 本地归档布局：`<root>/<标题>/Chapter <N>/image_<NN><ext>`。
//!
//! 标题原样作为路径段使用，不做非法字符清理。

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::{Error, Result};

pub static IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

pub static CHAPTER_PREFIX: &str = "Chapter ";

#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manga_dir(&self, title: &str) -> PathBuf {
        self.root.join(title)
    }

    pub fn chapter_dir(&self, title: &str, chapter_id: &str) -> PathBuf {
        self.manga_dir(title)
            .join(format!("{}{}", CHAPTER_PREFIX, chapter_id))
    }

    /// 目录中受支持图片的数量，目录不存在时为 0
    pub fn image_count(&self, dir: &Path) -> usize {
        let Ok(entries) = fs::read_dir(dir) else {
            return 0;
        };
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image(path))
            .count()
    }

    /// 只看图片数量，不校验内容
    pub fn is_materialized(&self, title: &str, chapter_id: &str, threshold: usize) -> bool {
        let dir = self.chapter_dir(title, chapter_id);
        dir.is_dir() && self.image_count(&dir) >= threshold
    }

    #[instrument(skip(self))]
    pub fn list_manga(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut titles = subdirectories(&self.root)?;
        titles.sort();
        debug!("已下载漫画: {}", titles.len());
        Ok(titles)
    }

    /// 目录名后缀无法解析为整数时直接返回错误
    #[instrument(skip(self))]
    pub fn list_chapters(&self, title: &str) -> Result<Vec<String>> {
        let manga_dir = self.manga_dir(title);
        if !manga_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut chapters = Vec::new();
        for name in subdirectories(&manga_dir)? {
            let Some(suffix) = name.strip_prefix(CHAPTER_PREFIX) else {
                continue;
            };
            let number = suffix
                .parse::<i64>()
                .map_err(|e| Error::Parse(format!("章节目录名 '{}' 无效: {}", name, e)))?;
            chapters.push((number, name));
        }
        chapters.sort_by_key(|(number, _)| *number);
        Ok(chapters.into_iter().map(|(_, name)| name).collect())
    }

    /// 按文件名字典序排列。超过 99 张时序号位数不同，
    /// `image_100` 会排在 `image_11` 之前。
    #[instrument(skip(self))]
    pub fn list_images(&self, title: &str, chapter: &str) -> Result<Vec<PathBuf>> {
        let chapter_dir = self.manga_dir(title).join(chapter);
        if !chapter_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut images = Vec::new();
        for entry in fs::read_dir(&chapter_dir)? {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                images.push(path);
            }
        }
        images.sort();
        Ok(images)
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

fn subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    Ok(names)
}
