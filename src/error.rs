use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// 网络错误或非 2xx 响应
    #[error("请求 {url} 失败: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 页面结构、选择器或目录名不符合预期
    #[error("解析失败: {0}")]
    Parse(String),

    #[error("正则表达式无效: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
