//! 已下载章节的分页浏览状态。只维护页码、缩放与全屏，具体显示交给调用方。

use std::path::{Path, PathBuf};

pub static MIN_ZOOM: u32 = 25;
pub static MAX_ZOOM: u32 = 400;
pub static ZOOM_STEP: u32 = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewer {
    images: Vec<PathBuf>,
    index: usize,
    zoom: u32,
    fullscreen: bool,
}

impl Viewer {
    pub fn new(images: Vec<PathBuf>) -> Self {
        Self {
            images,
            index: 0,
            zoom: 100,
            fullscreen: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn current(&self) -> Option<&Path> {
        self.images.get(self.index).map(PathBuf::as_path)
    }

    /// 从 1 开始的页码
    pub fn page(&self) -> usize {
        self.index + 1
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.images.len()
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// 页码超出范围时取最近的有效页
    pub fn goto(&mut self, page: usize) {
        if self.images.is_empty() {
            return;
        }
        self.index = page.clamp(1, self.images.len()) - 1;
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 100;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    pub fn caption(&self) -> String {
        format!("Image {} of {}", self.page(), self.images.len())
    }
}
