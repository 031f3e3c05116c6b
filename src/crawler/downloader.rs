use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::{Error, Result};

pub static DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// 只发 GET，固定 User-Agent，不重试
#[derive(Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::fetch("<client>", e))?;
        Ok(Self { client })
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn page(&self, url: &Url) -> Result<String> {
        debug!("正在请求页面");
        let response = self.get(url).await?;
        response
            .text()
            .await
            .map_err(|e| Error::fetch(url.as_str(), e))
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn image(&self, url: &Url) -> Result<Bytes> {
        debug!("正在下载图片");
        let response = self.get(url).await?;
        response
            .bytes()
            .await
            .map_err(|e| Error::fetch(url.as_str(), e))
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        self.client
            .get(url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::fetch(url.as_str(), e))
    }
}
