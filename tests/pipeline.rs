use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use manga_fetch::{Config, DownloadSettings, Error, MangaCrawler, Session};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_PAGE: &str = r#"<html>
<head><title>Ignored Title</title></head>
<body>
  <h1>Kaiju No. 8 Manga - Read Online Free</h1>
  <ul>
    <li><a href="/m/chapter-3">Chapter 3</a></li>
    <li><a href="/m/chapter-1">Chapter 1</a></li>
    <li><a href="/m/chapter-2">Chapter 2</a></li>
    <li><a href="/about">About</a></li>
  </ul>
</body>
</html>"#;

const CHAPTER_PAGE: &str = r#"<html><body>
  <header><img src="/static/site-logo.png"></header>
  <p><img src="/static/logo.png"></p>
  <p><img src="/img/p1.png"></p>
  <p><img alt="no source"></p>
  <p><img data-src="/img/raw"></p>
  <p><img src="/img/missing.jpg"></p>
</body></html>"#;

fn create_test_crawler() -> (MangaCrawler, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        archive_root: temp_dir.path().to_path_buf(),
        delay_secs: 0.0,
        ..Config::default()
    };
    (MangaCrawler::new(&config).unwrap(), temp_dir)
}

fn settings(skip_existing: bool) -> DownloadSettings {
    DownloadSettings {
        container_selector: None,
        delay: Duration::ZERO,
        skip_existing,
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

async fn mount_page(server: &MockServer, route: &str, body: &'static str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, route: &str, body: &'static [u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_extract_title_and_chapters() {
    let (crawler, _temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(&server, "/m/", INDEX_PAGE).await;

    let index_url = format!("{}/m/", server.uri());
    let (title, chapters) = crawler.extract(&index_url, r"chapter-(\d+)").await.unwrap();

    assert_eq!(title, "Kaiju No. 8");
    assert_eq!(chapters.len(), 3);
    assert_eq!(chapters.ids(), vec!["1", "2", "3"]);
    assert_eq!(
        chapters.get("2").unwrap().as_str(),
        format!("{}/m/chapter-2", server.uri())
    );
}

#[tokio::test]
async fn test_extract_without_matches_uses_host_title() {
    let (crawler, _temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(&server, "/list", "<html><body><div>empty</div></body></html>").await;

    let index_url = format!("{}/list", server.uri());
    let (title, chapters) = crawler.extract(&index_url, r"episode-(\d+)").await.unwrap();

    let host = Url::parse(&server.uri()).unwrap();
    assert_eq!(title, host.host_str().unwrap().split('.').next().unwrap());
    assert!(chapters.is_empty());
}

#[tokio::test]
async fn test_fetch_failure_returns_empty_index() {
    let (crawler, _temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let index_url = format!("{}/gone", server.uri());
    assert!(matches!(
        crawler.extract(&index_url, r"chapter-(\d+)").await,
        Err(Error::Fetch { .. })
    ));

    let (title, chapters) = crawler
        .fetch_chapter_links(&index_url, r"chapter-(\d+)")
        .await;
    assert!(title.is_none());
    assert!(chapters.is_empty());
}

#[tokio::test]
async fn test_pattern_without_group_sends_no_request() {
    let (crawler, _temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(&server, "/m/", INDEX_PAGE).await;

    let index_url = format!("{}/m/", server.uri());
    assert!(matches!(
        crawler.extract(&index_url, r"chapter-\d+").await,
        Err(Error::Parse(_))
    ));
    assert!(matches!(
        crawler.extract(&index_url, r"chapter-(\d+").await,
        Err(Error::Pattern(_))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_download_chapter_keeps_position_gaps() {
    let (crawler, temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(&server, "/read/chapter-1", CHAPTER_PAGE).await;
    mount_image(&server, "/img/p1.png", b"png-bytes").await;
    mount_image(&server, "/img/raw", b"raw-bytes").await;

    let chapter_url = Url::parse(&format!("{}/read/chapter-1", server.uri())).unwrap();
    let outcome = crawler
        .download_chapter(&chapter_url, "Kaiju No. 8", "1", &settings(true))
        .await;

    assert_eq!(outcome.downloaded, 2);
    assert!(!outcome.skipped);

    let chapter_dir = temp_dir.path().join("Kaiju No. 8").join("Chapter 1");
    // 段落内第 2、4 张，第 5 张请求失败
    assert_eq!(file_names(&chapter_dir), vec!["image_02.png", "image_04.jpg"]);
    assert_eq!(fs::read(chapter_dir.join("image_02.png")).unwrap(), b"png-bytes");
}

#[tokio::test]
async fn test_delay_precedes_every_image_request() {
    let (crawler, _temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/read/chapter-1",
        r#"<html><body>
          <p><img src="/img/a.png"></p>
          <p><img src="/img/b.png"></p>
          <p><img src="/img/c.png"></p>
        </body></html>"#,
    )
    .await;
    for route in ["/img/a.png", "/img/b.png", "/img/c.png"] {
        mount_image(&server, route, b"bytes").await;
    }

    let delay = Duration::from_millis(50);
    let paced = DownloadSettings {
        delay,
        ..settings(false)
    };
    let chapter_url = Url::parse(&format!("{}/read/chapter-1", server.uri())).unwrap();
    let start = Instant::now();
    let outcome = crawler
        .download_chapter(&chapter_url, "Paced", "1", &paced)
        .await;

    assert_eq!(outcome.downloaded, 3);
    // 每张图片请求前各等待一次
    assert!(start.elapsed() >= delay * 3);
}

#[tokio::test]
async fn test_container_selector_wins_over_paragraphs() {
    let (crawler, temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/read/chapter-5",
        r#"<html><body>
          <p><img src="/img/outside.jpg"></p>
          <section id="reader"><img src="/img/a.webp"><img src="/img/b.webp"></section>
        </body></html>"#,
    )
    .await;
    mount_image(&server, "/img/a.webp", b"a").await;
    mount_image(&server, "/img/b.webp", b"b").await;

    let chapter_url = Url::parse(&format!("{}/read/chapter-5", server.uri())).unwrap();
    let settings = DownloadSettings {
        container_selector: Some("#reader".to_string()),
        ..settings(false)
    };
    let outcome = crawler
        .download_chapter(&chapter_url, "Frieren", "5", &settings)
        .await;

    assert_eq!(outcome.downloaded, 2);
    let chapter_dir = temp_dir.path().join("Frieren").join("Chapter 5");
    assert_eq!(file_names(&chapter_dir), vec!["image_01.webp", "image_02.webp"]);
}

#[tokio::test]
async fn test_skip_existing_makes_no_requests() {
    let (crawler, temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(&server, "/read/chapter-1", CHAPTER_PAGE).await;

    let chapter_dir = temp_dir.path().join("Kaiju No. 8").join("Chapter 1");
    fs::create_dir_all(&chapter_dir).unwrap();
    for name in ["image_01.jpg", "image_02.png", "image_03.gif"] {
        fs::write(chapter_dir.join(name), b"old").unwrap();
    }

    let chapter_url = Url::parse(&format!("{}/read/chapter-1", server.uri())).unwrap();
    let outcome = crawler
        .download_chapter(&chapter_url, "Kaiju No. 8", "1", &settings(true))
        .await;

    assert_eq!(outcome.downloaded, 0);
    assert!(outcome.skipped);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_image_files_do_not_count_as_downloaded() {
    let (crawler, temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(&server, "/read/chapter-1", CHAPTER_PAGE).await;
    mount_image(&server, "/img/p1.png", b"png-bytes").await;
    mount_image(&server, "/img/raw", b"raw-bytes").await;

    let chapter_dir = temp_dir.path().join("Kaiju No. 8").join("Chapter 1");
    fs::create_dir_all(&chapter_dir).unwrap();
    for name in ["image_01.jpg", "image_02.png", "notes.txt", "cover.bmp"] {
        fs::write(chapter_dir.join(name), b"old").unwrap();
    }

    let chapter_url = Url::parse(&format!("{}/read/chapter-1", server.uri())).unwrap();
    let outcome = crawler
        .download_chapter(&chapter_url, "Kaiju No. 8", "1", &settings(true))
        .await;

    assert!(!outcome.skipped);
    assert_eq!(outcome.downloaded, 2);
    assert_eq!(fs::read(chapter_dir.join("image_02.png")).unwrap(), b"png-bytes");
}

#[tokio::test]
async fn test_chapter_page_failure_reports_zero() {
    let (crawler, temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/read/chapter-9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let chapter_url = Url::parse(&format!("{}/read/chapter-9", server.uri())).unwrap();
    let outcome = crawler
        .download_chapter(&chapter_url, "Kaiju No. 8", "9", &settings(false))
        .await;

    assert_eq!(outcome.downloaded, 0);
    assert!(!outcome.skipped);
    assert!(!temp_dir.path().join("Kaiju No. 8").join("Chapter 9").exists());
}

#[tokio::test]
async fn test_session_downloads_selection_then_browses() {
    let (crawler, _temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(&server, "/m/", INDEX_PAGE).await;
    for chapter in ["/m/chapter-1", "/m/chapter-2", "/m/chapter-3"] {
        mount_page(
            &server,
            chapter,
            r#"<html><body><p><img src="/img/p1.png"><img src="/img/p2.png"></p></body></html>"#,
        )
        .await;
    }
    mount_image(&server, "/img/p1.png", b"1").await;
    mount_image(&server, "/img/p2.png", b"2").await;

    let mut session = Session::new(settings(true));
    let index_url = format!("{}/m/", server.uri());
    let count = session
        .fetch_chapters(&crawler, &index_url, r"chapter-(\d+)")
        .await;
    assert_eq!(count, 3);
    assert_eq!(session.title.as_deref(), Some("Kaiju No. 8"));

    let summary = session
        .download(&crawler, &["3".to_string(), "42".to_string(), "1".to_string()])
        .await;
    assert_eq!(summary.chapters, 2);
    assert_eq!(summary.images, 4);
    assert_eq!(summary.skipped, 0);

    let archive = crawler.archive();
    assert_eq!(archive.list_manga().unwrap(), vec!["Kaiju No. 8"]);
    assert_eq!(
        archive.list_chapters("Kaiju No. 8").unwrap(),
        vec!["Chapter 1", "Chapter 3"]
    );
    let images = archive.list_images("Kaiju No. 8", "Chapter 3").unwrap();
    assert_eq!(images.len(), 2);
    assert!(images[0].ends_with("image_01.png"));

    // 两张图低于跳过阈值，download_all 会重新下载已有章节
    let summary = session.download_all(&crawler).await;
    assert_eq!(summary.chapters, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.images, 6);
}

#[tokio::test]
async fn test_failed_fetch_clears_previous_index() {
    let (crawler, _temp_dir) = create_test_crawler();
    let server = MockServer::start().await;
    mount_page(&server, "/m/", INDEX_PAGE).await;

    let mut session = Session::new(settings(true));
    let index_url = format!("{}/m/", server.uri());
    assert_eq!(
        session.fetch_chapters(&crawler, &index_url, r"chapter-(\d+)").await,
        3
    );

    let missing = format!("{}/missing", server.uri());
    assert_eq!(
        session.fetch_chapters(&crawler, &missing, r"chapter-(\d+)").await,
        0
    );
    assert!(session.title.is_none());
    assert!(session.chapter_ids().is_empty());
    assert_eq!(session.download_all(&crawler).await.chapters, 0);
}
