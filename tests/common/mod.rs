// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Relative location of the tracked descriptor inside a repository tree
pub const REPOMD_REL: &str = "r4.0/current/dom0/fc37/repodata/repomd.xml";

/// A repository tree laid out under a temporary base directory.
///
/// Keep the struct alive to prevent cleanup.
pub struct RepoTree {
    pub dir: TempDir,
    pub base: PathBuf,
}

impl RepoTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("yum");
        fs::create_dir_all(&base).unwrap();
        Self { dir, base }
    }

    /// Path of the descriptor, including the base directory
    pub fn repomd_path(&self) -> PathBuf {
        self.base.join(REPOMD_REL)
    }

    /// Write a descriptor whose newest data timestamp is `timestamp`
    pub fn write_repomd(&self, timestamp: u64) -> PathBuf {
        let path = self.repomd_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, repomd_xml(timestamp)).unwrap();
        path
    }

    /// Write a mirror list next to the tree
    pub fn write_mirrors(&self, text: &str) -> PathBuf {
        let path = self.dir.path().join("mirrors.list");
        fs::write(&path, text).unwrap();
        path
    }

    /// Any scratch file under the temporary directory
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn repomd_xml(timestamp: u64) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <repomd xmlns=\"http://linux.duke.edu/metadata/repo\" \
         xmlns:rpm=\"http://linux.duke.edu/metadata/rpm\">\n\
         \x20 <revision>{timestamp}</revision>\n\
         \x20 <data type=\"primary\">\n\
         \x20   <location href=\"repodata/primary.xml.gz\"/>\n\
         \x20   <timestamp>{older}</timestamp>\n\
         \x20 </data>\n\
         \x20 <data type=\"filelists\">\n\
         \x20   <location href=\"repodata/filelists.xml.gz\"/>\n\
         \x20   <timestamp>{timestamp}</timestamp>\n\
         \x20 </data>\n\
         </repomd>\n",
        older = timestamp.saturating_sub(60),
    )
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Canned HTTP response
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Canned {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: b"nope".to_vec(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }
}

/// Start a local HTTP/1.1 responder serving `routes` by request path.
///
/// Unknown paths get a 404. Returns the base URL, without trailing slash.
pub async fn serve(routes: Vec<(&str, Canned)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<String, Canned>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, canned)| (path.to_string(), canned))
            .collect(),
    );

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let mut stream = BufReader::new(stream);
                let mut request_line = String::new();
                if stream.read_line(&mut request_line).await.is_err() {
                    return;
                }
                loop {
                    let mut header = String::new();
                    match stream.read_line(&mut header).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) if header == "\r\n" || header == "\n" => break,
                        Ok(_) => {}
                    }
                }

                let path = request_line.split_whitespace().nth(1).unwrap_or("/");
                let canned = routes
                    .get(path)
                    .cloned()
                    .unwrap_or_else(|| Canned::status(404));

                let mut response = format!("HTTP/1.1 {} Canned\r\n", canned.status);
                for (name, value) in &canned.headers {
                    response.push_str(&format!("{name}: {value}\r\n"));
                }
                response.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    canned.body.len()
                ));

                let stream = stream.get_mut();
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.write_all(&canned.body).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// A local URL nothing listens on
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
