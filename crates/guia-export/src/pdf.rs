//! Render driver: prints an assembled document to PDF with headless Chromium.
//!
//! Every job launches its own browser with a throwaway profile directory
//! and tears it down again, whatever the outcome. There is no pooling and
//! no retry.

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetEmulatedMediaParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::{Stream, StreamExt};
use tracing::instrument;

use guia_core::models::page::{A4_HEIGHT_INCHES, A4_WIDTH_INCHES, Orientation, PageDimensions};

use crate::bands::PrintBands;
use crate::error::ExportError;
use crate::styles::PrintLayout;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How long the network must stay quiet before the page counts as settled.
pub const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Everything the engine needs to print one document.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub html: String,
    pub orientation: Orientation,
    pub dimensions: PageDimensions,
    pub bands: PrintBands,
    pub layout: PrintLayout,
}

impl RenderJob {
    /// Print parameters for this job: A4 paper, the caller's orientation,
    /// backgrounds on, engine-native header and footer.
    pub fn print_params(&self) -> PrintToPdfParams {
        let margins = &self.layout.margins;
        PrintToPdfParams {
            landscape: Some(self.orientation.is_landscape()),
            display_header_footer: Some(true),
            print_background: Some(self.layout.print_background),
            scale: Some(self.layout.scale),
            paper_width: Some(A4_WIDTH_INCHES),
            paper_height: Some(A4_HEIGHT_INCHES),
            margin_top: Some(margins.top_inches()),
            margin_bottom: Some(margins.bottom_inches()),
            margin_left: Some(margins.left_inches()),
            margin_right: Some(margins.right_inches()),
            header_template: Some(self.bands.header.clone()),
            footer_template: Some(self.bands.footer.clone()),
            prefer_css_page_size: Some(self.layout.prefer_css_page_size),
            ..Default::default()
        }
    }
}

/// Something that can turn a [`RenderJob`] into PDF bytes.
pub trait PdfEngine: Send + Sync {
    fn render(&self, job: RenderJob) -> BoxFuture<'_, Result<Vec<u8>, ExportError>>;
}

/// Browser launch settings.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// Explicit browser executable. Auto-detected when `None`.
    pub executable: Option<PathBuf>,

    /// Pass `--no-sandbox`; needed when running as root in containers.
    pub no_sandbox: bool,

    /// Upper bound on the network-quiescence wait.
    pub settle_timeout: Duration,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            executable: None,
            no_sandbox: false,
            settle_timeout: Duration::from_secs(30),
        }
    }
}

/// [`PdfEngine`] backed by a fresh headless Chromium per job.
pub struct ChromeEngine {
    options: ChromeOptions,
}

impl ChromeEngine {
    pub fn new(options: ChromeOptions) -> Self {
        Self { options }
    }

    fn browser_config(
        &self,
        dimensions: PageDimensions,
        profile_dir: PathBuf,
    ) -> Result<BrowserConfig, ExportError> {
        let mut builder = BrowserConfig::builder()
            .window_size(dimensions.width, dimensions.height)
            .user_data_dir(profile_dir);
        if let Some(path) = &self.options.executable {
            builder = builder.chrome_executable(path);
        }
        if self.options.no_sandbox {
            builder = builder.no_sandbox();
        }
        builder.build().map_err(ExportError::Launch)
    }

    #[instrument(skip_all, fields(orientation = %job.orientation))]
    async fn run(&self, job: RenderJob) -> Result<Vec<u8>, ExportError> {
        let profile_dir = tempfile::Builder::new().prefix("guia-chrome-").tempdir()?;
        let config = self.browser_config(job.dimensions, profile_dir.path().to_path_buf())?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ExportError::Launch(e.to_string()))?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler event error");
                }
            }
        });
        tracing::debug!("browser launched");

        let result = self.print_in_new_page(&browser, &job).await;

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "failed to close browser");
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!(error = %e, "failed to reap browser process");
        }
        handler_task.abort();
        drop(profile_dir);

        result
    }

    async fn print_in_new_page(
        &self,
        browser: &Browser,
        job: &RenderJob,
    ) -> Result<Vec<u8>, ExportError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ExportError::Launch(e.to_string()))?;

        let result = self.print_page(&page, job).await;

        if let Err(e) = page.close().await {
            tracing::warn!(error = %e, "failed to close page");
        }
        result
    }

    async fn print_page(&self, page: &Page, job: &RenderJob) -> Result<Vec<u8>, ExportError> {
        let navigation = |e: chromiumoxide::error::CdpError| ExportError::Navigation(e.to_string());

        // Match the on-screen preview so responsive classes resolve the same way.
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(job.dimensions.width),
            i64::from(job.dimensions.height),
            1.0,
            false,
        ))
        .await
        .map_err(navigation)?;

        page.execute(SetEmulatedMediaParams::builder().media("print").build())
            .await
            .map_err(navigation)?;

        // Subscribe before loading so no request slips past the tracker.
        let started = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(navigation)?;
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(navigation)?;
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(navigation)?;

        page.set_content(&job.html).await.map_err(navigation)?;

        let started = started.map(|event| event.request_id.inner().clone());
        let completed = futures::stream::select(
            finished.map(|event| event.request_id.inner().clone()),
            failed.map(|event| event.request_id.inner().clone()),
        );
        wait_for_network_quiet(
            started,
            completed,
            NETWORK_QUIET_WINDOW,
            self.options.settle_timeout,
        )
        .await?;
        tracing::debug!("network settled");

        let bytes = page
            .pdf(job.print_params())
            .await
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        tracing::info!(bytes = bytes.len(), "pdf printed");
        Ok(bytes)
    }
}

impl PdfEngine for ChromeEngine {
    fn render(&self, job: RenderJob) -> BoxFuture<'_, Result<Vec<u8>, ExportError>> {
        Box::pin(self.run(job))
    }
}

/// Waits until no request has been in flight for `quiet`, giving up with
/// [`ExportError::Settle`] after `limit`.
///
/// `started` yields request ids as they are issued and `completed` as they
/// finish or fail. Both are fed from buffered CDP listeners, so a completion
/// can be observed before its start.
async fn wait_for_network_quiet<S, C>(
    mut started: S,
    mut completed: C,
    quiet: Duration,
    limit: Duration,
) -> Result<(), ExportError>
where
    S: Stream<Item = String> + Unpin,
    C: Stream<Item = String> + Unpin,
{
    let settle = async {
        let mut inflight = InflightRequests::default();
        loop {
            tokio::select! {
                biased;
                Some(id) = started.next() => inflight.started(id),
                Some(id) = completed.next() => inflight.finished(id),
                _ = tokio::time::sleep(quiet), if inflight.is_idle() => break,
                else => break,
            }
        }
    };
    tokio::time::timeout(limit, settle)
        .await
        .map_err(|_| ExportError::Settle(limit))
}

/// Requests the page has issued but not yet completed.
#[derive(Debug, Default)]
struct InflightRequests {
    ids: HashSet<String>,
    /// Completions whose start has not been seen yet.
    early: HashSet<String>,
}

impl InflightRequests {
    fn started(&mut self, id: String) {
        if !self.early.remove(&id) {
            self.ids.insert(id);
        }
    }

    fn finished(&mut self, id: String) {
        if !self.ids.remove(&id) {
            self.early.insert(id);
        }
    }

    fn is_idle(&self) -> bool {
        self.ids.is_empty()
    }
}
