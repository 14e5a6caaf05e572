//! HTML → PDF conversion.
//!
//! [`PdfEngine`] is the seam between the report pipeline and whatever does
//! the conversion. [`ChromiumEngine`] runs a headless Chromium per request
//! and drives it over the DevTools protocol: the document is loaded into a
//! fresh page and printed with `Page.printToPDF`, which takes the paper
//! size, margins, background flag and page range directly.
//!
//! Every conversion happens inside a [`RenderSession`] that owns the browser
//! process and its profile directory. Dropping the session (success, error,
//! timeout or cancellation of the request future) kills the browser and
//! removes the directory.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::devtools::{endpoint_from_line, DevTools};
use crate::error::RenderError;

/// Default conversion budget.
pub const DEFAULT_PDF_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum stderr captured from the browser (64 KiB).
const MAX_STDERR_BYTES: usize = 64 * 1024;

/// How long to wait for stderr to close once the browser has exited.
const STDERR_GRACE: Duration = Duration::from_secs(1);

/// How long the browser gets to exit after `Browser.close` before the
/// session kills it.
const EXIT_GRACE: Duration = Duration::from_secs(1);

/// Page setup for a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    /// Applied to all four sides.
    pub margin_in: f64,
    pub print_background: bool,
    /// Print only the first page.
    pub single_page: bool,
    /// Hard limit for the conversion; exceeding it fails the render.
    pub timeout: Duration,
}

impl PdfOptions {
    /// US Letter, half-inch margins, backgrounds on, first page only.
    pub fn letter() -> Self {
        Self {
            paper_width_in: 8.5,
            paper_height_in: 11.0,
            margin_in: 0.5,
            print_background: true,
            single_page: true,
            timeout: DEFAULT_PDF_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `Page.printToPDF` parameters expressing these options.
    pub fn print_params(&self) -> PrintParams {
        PrintParams {
            paper_width: self.paper_width_in,
            paper_height: self.paper_height_in,
            margin_top: self.margin_in,
            margin_bottom: self.margin_in,
            margin_left: self.margin_in,
            margin_right: self.margin_in,
            print_background: self.print_background,
            page_ranges: self.single_page.then(|| "1".to_string()),
            prefer_css_page_size: false,
            display_header_footer: false,
        }
    }
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self::letter()
    }
}

/// Parameters of the DevTools `Page.printToPDF` command. Lengths in inches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintParams {
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub print_background: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_ranges: Option<String>,
    #[serde(rename = "preferCSSPageSize")]
    pub prefer_css_page_size: bool,
    pub display_header_footer: bool,
}

/// Converts an HTML document into PDF bytes.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn render_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError>;
}

// ---------------------------------------------------------------------------
// Chromium
// ---------------------------------------------------------------------------

/// Headless Chromium driven over its DevTools websocket.
#[derive(Debug, Clone)]
pub struct ChromiumEngine {
    binary: PathBuf,
    active: Arc<AtomicUsize>,
}

impl ChromiumEngine {
    /// `binary` is the Chromium/Chrome executable, e.g. `chromium`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            active: Arc::default(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Number of render sessions currently holding a browser or scratch
    /// directory. Zero whenever no conversion is in flight.
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn command(&self, session: &RenderSession) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args([
            "--headless",
            "--disable-gpu",
            "--no-sandbox",
            "--no-first-run",
            "--disable-extensions",
            "--font-render-hinting=none",
            "--remote-debugging-port=0",
        ])
        .arg(format!("--user-data-dir={}", session.path("profile").display()))
        .arg("about:blank")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
        cmd
    }

    /// Wait for the DevTools endpoint, then print `html` through it.
    async fn convert(
        &self,
        session: &mut RenderSession,
        stderr_task: &mut JoinHandle<String>,
        endpoint: oneshot::Receiver<String>,
        html: &str,
        options: &PdfOptions,
    ) -> Result<Vec<u8>, RenderError> {
        let endpoint = match endpoint.await {
            Ok(url) => url,
            Err(_) => {
                // stderr closed without announcing an endpoint.
                let status = session.wait().await?;
                let stderr = match tokio::time::timeout(STDERR_GRACE, stderr_task).await {
                    Ok(Ok(captured)) => captured,
                    _ => String::new(),
                };
                return Err(RenderError::BrowserFailed {
                    exit_code: status.code(),
                    stderr: stderr.trim().to_string(),
                });
            }
        };

        let mut devtools = DevTools::connect(&endpoint).await?;
        let pdf = devtools.print_html(html, &options.print_params()).await?;
        if !pdf.starts_with(b"%PDF-") {
            return Err(RenderError::InvalidOutput);
        }

        devtools.close_browser().await;
        let _ = tokio::time::timeout(EXIT_GRACE, session.wait()).await;
        Ok(pdf)
    }
}

#[async_trait]
impl PdfEngine for ChromiumEngine {
    async fn render_pdf(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        let start = Instant::now();
        let mut session = RenderSession::open(Arc::clone(&self.active))?;

        let mut cmd = self.command(&session);
        let stderr = session.launch(&mut cmd)?.stderr.take();
        let (endpoint_tx, endpoint_rx) = oneshot::channel();
        let mut stderr_task = tokio::spawn(watch_stderr(stderr, endpoint_tx));

        let outcome = tokio::time::timeout(
            options.timeout,
            self.convert(&mut session, &mut stderr_task, endpoint_rx, html, options),
        )
        .await;
        stderr_task.abort();

        match outcome {
            Ok(Ok(pdf)) => {
                tracing::debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    bytes = pdf.len(),
                    "Chromium conversion finished"
                );
                Ok(pdf)
            }
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => {
                let budget_ms = options.timeout.as_millis() as u64;
                tracing::warn!(budget_ms, binary = %self.binary.display(), "PDF conversion timed out");
                // `session` drops here, killing the browser.
                Err(RenderError::Timeout { budget_ms })
            }
        }
    }
}

/// Scoped ownership of everything one conversion acquires.
///
/// Counts itself in the engine's active-session gauge for its lifetime.
struct RenderSession {
    workdir: TempDir,
    browser: Option<Child>,
    active: Arc<AtomicUsize>,
}

impl RenderSession {
    fn open(active: Arc<AtomicUsize>) -> Result<Self, RenderError> {
        let workdir = tempfile::Builder::new()
            .prefix("priceopt-pdf-")
            .tempdir()?;
        active.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            workdir,
            browser: None,
            active,
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.workdir.path().join(name)
    }

    fn launch(&mut self, cmd: &mut Command) -> Result<&mut Child, RenderError> {
        let child = cmd.spawn().map_err(RenderError::Spawn)?;
        Ok(self.browser.insert(child))
    }

    async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        match self.browser.as_mut() {
            Some(browser) => browser.wait().await,
            None => Err(std::io::Error::other("browser not launched")),
        }
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        if let Some(browser) = self.browser.as_mut() {
            // Already exited on the success path; the error is irrelevant.
            let _ = browser.start_kill();
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Read the browser's stderr line by line. The first DevTools endpoint is
/// sent on `endpoint`; everything else is captured (bounded) and returned
/// once the stream closes.
async fn watch_stderr<R: AsyncRead + Unpin>(
    stderr: Option<R>,
    endpoint: oneshot::Sender<String>,
) -> String {
    let mut captured = String::new();
    let Some(stderr) = stderr else {
        return captured;
    };

    let mut endpoint = Some(endpoint);
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(url) = endpoint_from_line(&line) {
            if let Some(tx) = endpoint.take() {
                let _ = tx.send(url.to_string());
            }
            continue;
        }
        if captured.len() < MAX_STDERR_BYTES {
            captured.push_str(&line);
            captured.push('\n');
        }
    }
    captured
}
