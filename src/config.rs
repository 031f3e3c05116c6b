use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::crawler::DownloadSettings;
use crate::crawler::downloader::DEFAULT_USER_AGENT;
use crate::extractor::ScrapePolicy;
use crate::{Error, Result};

static CONFIG_FILE: &str = "config";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 归档根目录
    pub archive_root: PathBuf,
    pub user_agent: String,
    /// 每张图片请求前的等待秒数
    pub delay_secs: f64,
    pub skip_existing: bool,
    /// 交互时默认使用的章节正则
    pub chapter_pattern: String,
    pub policy: ScrapePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_root: PathBuf::from("comics"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            delay_secs: 1.0,
            skip_existing: true,
            chapter_pattern: r"chapter-(\d+)".to_string(),
            policy: ScrapePolicy::default(),
        }
    }
}

impl Config {
    /// 读取工作目录下的 `config.toml`，文件不存在时使用默认值
    pub fn load() -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(
                config::File::with_name(CONFIG_FILE)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.delay().map(|_| ())
    }

    /// 负数、NaN 或超出 `Duration` 范围的间隔都视为配置错误
    pub fn delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.delay_secs).map_err(|e| {
            Error::Config(config::ConfigError::Message(format!(
                "delay_secs 无效 ({}): {}",
                self.delay_secs, e
            )))
        })
    }

    pub fn download_settings(&self) -> Result<DownloadSettings> {
        Ok(DownloadSettings {
            container_selector: None,
            delay: self.delay()?,
            skip_existing: self.skip_existing,
        })
    }
}
