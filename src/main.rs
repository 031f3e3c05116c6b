use std::time::{Duration, Instant};

use anyhow::Result;

use manga_fetch::utils::{confirm, display_summary, parse_delay, prompt};
use manga_fetch::{Archive, Config, DownloadSettings, MangaCrawler, Session, Viewer, logger};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logger::init();
    let config = Config::load()?;
    let crawler = MangaCrawler::new(&config)?;
    let mut session = Session::new(config.download_settings()?);

    loop {
        println!("\n=== manga-fetch ===");
        println!("1. 下载章节");
        println!("2. 浏览已下载");
        println!("q. 退出");
        match prompt("请选择: ")?.as_str() {
            "1" => download(&crawler, &mut session, &config).await?,
            "2" => browse(crawler.archive())?,
            "q" | "Q" => break,
            other => println!("无效的选项: {}", other),
        }
    }

    println!("程序结束。");
    Ok(())
}

async fn download(crawler: &MangaCrawler, session: &mut Session, config: &Config) -> Result<()> {
    let index_url = prompt("目录页地址: ")?;
    if index_url.is_empty() {
        println!("请输入目录页地址");
        return Ok(());
    }

    let pattern = prompt(&format!("章节编号正则 [{}]: ", config.chapter_pattern))?;
    let pattern = if pattern.is_empty() {
        config.chapter_pattern.clone()
    } else {
        pattern
    };

    let container = prompt("图片容器选择器 (可留空): ")?;
    let delay = read_delay(session.settings.delay)?;
    let skip_existing = confirm("跳过已下载的章节?", session.settings.skip_existing)?;
    session.settings = DownloadSettings {
        container_selector: Some(container).filter(|s| !s.is_empty()),
        delay,
        skip_existing,
    };

    let count = session.fetch_chapters(crawler, &index_url, &pattern).await;
    let Some(title) = session.title.clone().filter(|_| count > 0) else {
        println!("未找到章节，请检查地址和正则");
        return Ok(());
    };

    let ids = session.chapter_ids();
    println!("《{}》共 {} 章: {}", title, count, ids.join(" "));

    let selection = prompt("要下载的章节编号 (空格分隔，all 为全部): ")?;
    if selection.is_empty() {
        println!("请至少选择一个章节");
        return Ok(());
    }

    let start = Instant::now();
    let summary = if selection.eq_ignore_ascii_case("all") {
        session.download_all(crawler).await
    } else {
        let selected: Vec<String> = selection.split_whitespace().map(str::to_owned).collect();
        session.download(crawler, &selected).await
    };
    display_summary(&summary, start.elapsed());
    Ok(())
}

fn read_delay(current: Duration) -> Result<Duration> {
    let input = prompt(&format!("请求间隔秒数 [{}]: ", current.as_secs_f64()))?;
    if input.is_empty() {
        return Ok(current);
    }
    match parse_delay(&input) {
        Some(delay) => Ok(delay),
        None => {
            println!("无效的间隔 '{}'，保持 {} 秒", input, current.as_secs_f64());
            Ok(current)
        }
    }
}

fn choose<'a>(label: &str, items: &'a [String]) -> Result<Option<&'a String>> {
    for (i, item) in items.iter().enumerate() {
        println!("{:>3}. {}", i + 1, item);
    }
    let input = prompt(&format!("选择{} (序号): ", label))?;
    Ok(input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| items.get(i)))
}

fn browse(archive: &Archive) -> Result<()> {
    let titles = archive.list_manga()?;
    if titles.is_empty() {
        println!("还没有下载任何漫画");
        return Ok(());
    }
    let Some(title) = choose("漫画", &titles)? else {
        return Ok(());
    };

    let chapters = archive.list_chapters(title)?;
    if chapters.is_empty() {
        println!("《{}》没有章节", title);
        return Ok(());
    }
    let Some(chapter) = choose("章节", &chapters)? else {
        return Ok(());
    };

    let images = archive.list_images(title, chapter)?;
    if images.is_empty() {
        println!("{} 中没有图片", chapter);
        return Ok(());
    }

    let mut viewer = Viewer::new(images);
    loop {
        show(&viewer);
        let command = prompt("[n]下一页 [p]上一页 [页码] [+/-/0]缩放 [f]全屏 [q]返回: ")?;
        match command.as_str() {
            "n" => {
                if !viewer.next() {
                    println!("已是最后一页");
                }
            }
            "p" => {
                if !viewer.previous() {
                    println!("已是第一页");
                }
            }
            "+" => viewer.zoom_in(),
            "-" => viewer.zoom_out(),
            "0" => viewer.reset_zoom(),
            "f" => {
                viewer.toggle_fullscreen();
            }
            "q" => break,
            other => match other.parse::<usize>() {
                Ok(page) => viewer.goto(page),
                Err(_) => println!("无效的命令: {}", other),
            },
        }
    }
    Ok(())
}

fn show(viewer: &Viewer) {
    let Some(path) = viewer.current() else {
        return;
    };
    let mode = if viewer.is_fullscreen() { " 全屏" } else { "" };
    println!(
        "\n{}  {}  (缩放 {}%{})",
        viewer.caption(),
        path.display(),
        viewer.zoom(),
        mode
    );
}
