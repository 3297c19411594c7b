use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const SEARCH_BODY: &[u8] = br#"{"stat":"ok","photos":{"page":3,"pages":10,"perpage":15,"total":"150","photo":[{"id":"5121","server":"65535","secret":"ab12"},{"id":"5122","server":"65535","secret":"cd34"}]}}"#;
const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

/// Loopback stand-in for both the search endpoint and the image host.
struct MockFlickr {
    base_url: String,
    searches: Arc<AtomicUsize>,
    downloads: Arc<AtomicUsize>,
}

impl MockFlickr {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let port = listener.local_addr().unwrap().port();
        let searches = Arc::new(AtomicUsize::new(0));
        let downloads = Arc::new(AtomicUsize::new(0));

        let (s, d) = (searches.clone(), downloads.clone());
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let (s, d) = (s.clone(), d.clone());
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();

                    let (content_type, body) = if request.starts_with("GET /services/rest") {
                        s.fetch_add(1, Ordering::SeqCst);
                        ("application/json", SEARCH_BODY)
                    } else {
                        d.fetch_add(1, Ordering::SeqCst);
                        ("image/jpeg", JPEG)
                    };

                    let head = format!(
                        "HTTP/1.1 200 OK\r\n\
                         Content-Type: {content_type}\r\n\
                         Content-Length: {}\r\n\
                         Connection: close\r\n\
                         \r\n",
                        body.len()
                    );
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(body).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            searches,
            downloads,
        }
    }

    fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

fn tourist(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tourist").unwrap();
    cmd.env("TOURIST_HOME", home)
        .env("NO_COLOR", "1")
        .env("FLICKR_API_KEY", "test-key")
        .env_remove("RUST_LOG");
    cmd
}

/// Runs the binary off the async runtime so the mock server keeps serving.
async fn run_ok(home: &Path, args: &[&str]) -> String {
    let home: PathBuf = home.to_path_buf();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    tokio::task::spawn_blocking(move || {
        let output = tourist(&home).args(&args).assert().success();
        String::from_utf8_lossy(&output.get_output().stdout).into_owned()
    })
    .await
    .unwrap()
}

async fn setup(server: &MockFlickr, home: &Path) {
    let search_base = format!("{}/services/rest", server.base_url);
    run_ok(home, &["config", "search-base", &search_base]).await;
    run_ok(home, &["config", "photo-base", &server.base_url]).await;
    run_ok(home, &["pin", "add", "10", "20"]).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_photos_download_then_cached() {
    let server = MockFlickr::start().await;
    let home = tempfile::tempdir().unwrap();
    setup(&server, home.path()).await;

    let out = run_ok(home.path(), &["photos", "1", "-d"]).await;
    assert!(out.contains("Fetched 2 photos (page 3 of 10)"), "{out}");
    assert!(out.contains("Downloaded 2 of 2 images"), "{out}");
    assert!(
        out.contains(&format!("{}/65535/5121_ab12_q.jpg", server.base_url)),
        "{out}"
    );
    assert_eq!(server.searches(), 1);
    assert_eq!(server.downloads(), 2);

    // Second visit is served from the cache.
    let out = run_ok(home.path(), &["photos", "1", "--download"]).await;
    assert!(out.contains("All images already downloaded"), "{out}");
    assert_eq!(server.searches(), 1);
    assert_eq!(server.downloads(), 2);

    let saved = home.path().join("saved.jpg");
    run_ok(home.path(), &["photo", "save", "1", "2", saved.to_str().unwrap()]).await;
    assert_eq!(std::fs::read(&saved).unwrap(), JPEG);
    assert_eq!(server.downloads(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_refresh_and_images() {
    let server = MockFlickr::start().await;
    let home = tempfile::tempdir().unwrap();
    setup(&server, home.path()).await;

    run_ok(home.path(), &["photos", "1"]).await;
    assert_eq!(server.searches(), 1);
    assert_eq!(server.downloads(), 0);

    let out = run_ok(home.path(), &["refresh", "1"]).await;
    assert!(out.contains("Removed 2 photos"), "{out}");
    assert!(out.contains("Fetched 2 photos"), "{out}");
    assert_eq!(server.searches(), 2);

    let out = run_ok(home.path(), &["images", "1"]).await;
    assert!(out.contains("Downloaded 2 of 2 images"), "{out}");
    assert_eq!(server.downloads(), 2);

    let out = run_ok(home.path(), &["pin", "list"]).await;
    assert!(out.contains("2 photos"), "{out}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_photo_save_downloads_missing_image() {
    let server = MockFlickr::start().await;
    let home = tempfile::tempdir().unwrap();
    setup(&server, home.path()).await;
    run_ok(home.path(), &["photos", "1"]).await;

    let saved = home.path().join("one.jpg");
    let out = run_ok(home.path(), &["photo", "save", "1", "1", saved.to_str().unwrap()]).await;
    assert!(out.contains("Saved"), "{out}");
    assert_eq!(std::fs::read(&saved).unwrap(), JPEG);
    assert_eq!(server.downloads(), 1);
}
