use axum::Router;
use axum::body::Body;
use axum::extract::{Path as UrlPath, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use axum::http::{HeaderMap, Method, Response, StatusCode};
use axum::routing::get;
use eyre::{Result, eyre};
use kca_lib::tools::{ToolError, Toolchain};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

pub const LISTING_PATH: &str = "/pool/main/l/linux/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub file: String,
    pub range: Option<String>,
}

#[derive(Clone)]
struct RepositoryState {
    listing: Arc<String>,
    files: Arc<HashMap<String, Vec<u8>>>,
    honor_ranges: bool,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RepositoryState {
    fn record(&self, method: Method, file: &str, headers: &HeaderMap) {
        let range = headers
            .get(RANGE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(RecordedRequest {
                method,
                file: file.to_string(),
                range,
            });
    }
}

/// Renders an Apache-style directory index linking to `hrefs`.
pub fn apache_listing<'a>(hrefs: impl IntoIterator<Item = &'a str>) -> String {
    let mut rows = String::new();
    for href in hrefs {
        rows.push_str(&format!(
            "<tr><td><a href=\"{href}\">{href}</a></td><td align=\"right\">2020-07-21 12:00</td></tr>\n"
        ));
    }
    format!(
        "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">\n\
         <html><head><title>Index of /pool/main/l/linux</title></head><body>\n\
         <h1>Index of /pool/main/l/linux</h1><table>\n\
         <tr><th><a href=\"?C=N;O=D\">Name</a></th><th><a href=\"?C=M;O=A\">Last modified</a></th></tr>\n\
         <tr><td><a href=\"/pool/main/l/\">Parent Directory</a></td></tr>\n\
         {rows}</table></body></html>\n"
    )
}

/// Parses `bytes=<start>-[<end>]` against a body of `len` bytes.
fn parse_range(value: &str, len: usize) -> Option<(usize, usize)> {
    let bounds = value.strip_prefix("bytes=")?;
    let (start, end) = bounds.split_once('-')?;
    let start: usize = start.parse().ok()?;
    let end: usize = if end.is_empty() {
        len.checked_sub(1)?
    } else {
        end.parse::<usize>().ok()?.min(len.checked_sub(1)?)
    };
    (start <= end).then_some((start, end))
}

async fn get_listing(State(state): State<RepositoryState>) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html;charset=UTF-8")
        .body(Body::from(state.listing.as_str().to_owned()))
        .expect("valid listing response")
}

async fn head_file(
    State(state): State<RepositoryState>,
    UrlPath(file): UrlPath<String>,
    headers: HeaderMap,
) -> Response<Body> {
    state.record(Method::HEAD, &file, &headers);
    match state.files.get(&file) {
        Some(body) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_LENGTH, body.len())
            .body(Body::empty())
            .expect("valid head response"),
        None => not_found(),
    }
}

async fn get_file(
    State(state): State<RepositoryState>,
    UrlPath(file): UrlPath<String>,
    headers: HeaderMap,
) -> Response<Body> {
    state.record(Method::GET, &file, &headers);
    let Some(body) = state.files.get(&file) else {
        return not_found();
    };

    let range = headers
        .get(RANGE)
        .and_then(|value| value.to_str().ok())
        .filter(|_| state.honor_ranges)
        .and_then(|value| parse_range(value, body.len()));

    match range {
        Some((start, end)) => Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(CONTENT_TYPE, "application/vnd.debian.binary-package")
            .header(CONTENT_LENGTH, end - start + 1)
            .header(CONTENT_RANGE, format!("bytes {start}-{end}/{}", body.len()))
            .body(Body::from(body[start..=end].to_vec()))
            .expect("valid partial response"),
        None => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "application/vnd.debian.binary-package")
            .header(CONTENT_LENGTH, body.len())
            .body(Body::from(body.clone()))
            .expect("valid file response"),
    }
}

fn not_found() -> Response<Body> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::empty())
        .expect("valid not-found response")
}

/// Serves a package listing and the packages it links to, recording every
/// package request.
pub struct TestRepositoryServer {
    base_url: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct TestRepositoryBuilder {
    listing: Option<String>,
    files: HashMap<String, Vec<u8>>,
    honor_ranges: bool,
}

impl TestRepositoryBuilder {
    pub fn file(mut self, name: &str, body: Vec<u8>) -> Self {
        self.files.insert(name.to_string(), body);
        self
    }

    /// Replaces the generated listing with a custom page.
    pub fn listing(mut self, html: String) -> Self {
        self.listing = Some(html);
        self
    }

    pub fn ignore_ranges(mut self) -> Self {
        self.honor_ranges = false;
        self
    }

    pub async fn spawn(self) -> TestRepositoryServer {
        let listing = self.listing.unwrap_or_else(|| {
            let mut names: Vec<&str> = self.files.keys().map(String::as_str).collect();
            names.sort_unstable();
            apache_listing(names)
        });

        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = RepositoryState {
            listing: Arc::new(listing),
            files: Arc::new(self.files),
            honor_ranges: self.honor_ranges,
            requests: requests.clone(),
        };

        let router = Router::new()
            .route(LISTING_PATH, get(get_listing))
            .route(
                &format!("{LISTING_PATH}{{file}}"),
                get(get_file).head(head_file),
            )
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = axum::serve(listener, router);
        tokio::spawn(async move {
            let _ = server.await;
        });

        TestRepositoryServer {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            requests,
        }
    }
}

impl TestRepositoryServer {
    pub fn builder() -> TestRepositoryBuilder {
        TestRepositoryBuilder {
            listing: None,
            files: HashMap::new(),
            honor_ranges: true,
        }
    }

    pub fn index_url(&self) -> Url {
        self.base_url.join(LISTING_PATH).unwrap()
    }

    /// Every HEAD and GET issued against a package, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    pub fn body_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == Method::GET)
            .collect()
    }
}

/// Deterministic, non-repeating-looking package bytes.
pub fn package_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Toolchain double that records calls and produces the files the real
/// tools would.
#[derive(Default)]
pub struct FakeToolchain {
    calls: Mutex<Vec<String>>,
}

impl FakeToolchain {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("call log poisoned").push(call);
    }
}

fn write_output(path: &Path, contents: &[u8]) -> Result<(), ToolError> {
    let io_error = |source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, contents).map_err(io_error)
}

impl Toolchain for FakeToolchain {
    async fn extract_ar_member(
        &self,
        archive: &Path,
        member: &str,
        destination: &Path,
    ) -> Result<(), ToolError> {
        self.record(format!("ar x {} {}", file_name(archive), member));
        write_output(&destination.join(member), b"xz")
    }

    async fn extract_tar_path(
        &self,
        tarball: &Path,
        member: &Path,
        destination: &Path,
    ) -> Result<(), ToolError> {
        self.record(format!("tar -xJf {} {}", file_name(tarball), member.display()));
        write_output(&destination.join(member), b"\x7fELF")
    }

    async fn disassemble(&self, binary: &Path, output: &Path) -> Result<(), ToolError> {
        self.record(format!("objdump -l -D {}", file_name(binary)));
        write_output(output, b"\nvmlinux:     file format elf64-x86-64\n")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether every program in `programs` can be found on `PATH`.
pub fn tools_available(programs: &[&str]) -> bool {
    programs.iter().all(|program| which::which(program).is_ok())
}

fn run(program: &str, args: &[&str], cwd: &Path) -> Result<()> {
    let status = std::process::Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()?;
    if !status.success() {
        return Err(eyre!("{program} {args:?} exited with {status}"));
    }
    Ok(())
}

/// Builds a `.ddeb` in `dir` whose `data.tar.xz` contains
/// `usr/lib/debug/boot/vmlinux-<version>` with `vmlinux` as contents.
///
/// Needs `ar`, `tar` and `xz` on `PATH`.
pub fn build_debug_package(
    dir: &Path,
    package_name: &str,
    version: &str,
    vmlinux: &[u8],
) -> Result<PathBuf> {
    let staging = tempfile::tempdir_in(dir)?;
    let boot = staging.path().join("usr/lib/debug/boot");
    std::fs::create_dir_all(&boot)?;
    std::fs::write(boot.join(format!("vmlinux-{version}")), vmlinux)?;
    std::fs::write(staging.path().join("debian-binary"), "2.0\n")?;

    run("tar", &["-cJf", "data.tar.xz", "usr"], staging.path())?;

    let package = dir.join(package_name);
    let package_arg = package.to_string_lossy().into_owned();
    run(
        "ar",
        &["rc", &package_arg, "debian-binary", "data.tar.xz"],
        staging.path(),
    )?;
    Ok(package)
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("kca_lib=debug,kca_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
