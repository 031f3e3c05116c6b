use std::io::{self, Write};
use std::time::Duration;

use tracing::{debug, info, instrument};
use url::Url;

use crate::Result;
use crate::manga::DownloadSummary;

#[instrument]
pub fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    debug!("用户输入: {}", input.trim_end());
    Ok(input.trim().to_owned())
}

/// 询问是/否，空输入取默认值
pub fn confirm(message: &str, default: bool) -> Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    let answer = prompt(&format!("{} ({}): ", message, hint))?;
    Ok(match answer.to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

/// 与 Python `str.title()` 一致：字母段首字母大写，其余小写
pub fn title_case(s: &str) -> String {
    let mut titled = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if prev_cased {
            titled.extend(c.to_lowercase());
        } else {
            titled.extend(c.to_uppercase());
        }
        prev_cased = c.is_alphabetic();
    }
    titled
}

/// 以域名推导标题：去掉开头的 `www.`，取第一段并转为标题格式
pub fn host_title(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().unwrap_or_default();
    title_case(label)
}

/// URL 路径最后一段的扩展名(含 `.`)，缺省为 `.jpg`
pub fn url_extension(url: &Url) -> String {
    let basename = url.path().rsplit('/').next().unwrap_or_default();
    // 与 splitext 相同，前导的点不算扩展名
    let stem = basename.trim_start_matches('.');
    match stem.rfind('.') {
        Some(idx) => stem[idx..].to_string(),
        None => ".jpg".to_string(),
    }
}

/// 解析交互输入的间隔秒数，负数、非数字或超出 `Duration` 范围时返回 `None`
pub fn parse_delay(input: &str) -> Option<Duration> {
    let secs = input.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

pub fn format_elapsed(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms >= 60000 {
        format!("{}分{}秒", total_ms / 60000, (total_ms % 60000) / 1000)
    } else if total_ms >= 1000 {
        match total_ms % 1000 {
            0 => format!("{}秒", total_ms / 1000),
            ms => format!("{}秒{}毫秒", total_ms / 1000, ms),
        }
    } else {
        format!("{}毫秒", total_ms)
    }
}

#[instrument(skip_all)]
pub fn display_summary(summary: &DownloadSummary, elapsed: Duration) {
    info!(
        "✅ 下载完成！{} 章 (跳过 {} 章)，共 {} 张图片，耗时: {}",
        summary.chapters,
        summary.skipped,
        summary.images,
        format_elapsed(elapsed)
    );
}
