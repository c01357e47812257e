use std::sync::{Arc, Mutex};
use std::time::Duration;

use guia_core::models::document::{EXPORT_FILENAME, PDF_CONTENT_TYPE};
use guia_core::models::page::Orientation;
use guia_core::models::request::ExportRequest;
use guia_export::brand::BrandMark;
use guia_export::document::DocumentAssembler;
use guia_export::error::ExportError;
use guia_export::pdf::{BoxFuture, PdfEngine, RenderJob};
use guia_export::pipeline::Pipeline;
use guia_export::styles::{PrintLayout, Theme};

/// Records every job and answers with a canned result.
#[derive(Default)]
struct RecordingEngine {
    jobs: Mutex<Vec<RenderJob>>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl PdfEngine for RecordingEngine {
    fn render(&self, job: RenderJob) -> BoxFuture<'_, Result<Vec<u8>, ExportError>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.jobs.lock().unwrap().push(job);
            match &self.fail_with {
                Some(msg) => Err(ExportError::Launch(msg.clone())),
                None => Ok(b"%PDF-1.4 fake".to_vec()),
            }
        })
    }
}

fn pipeline(engine: Arc<RecordingEngine>, deadline: Duration) -> Pipeline {
    let assembler = DocumentAssembler::new(Theme::default(), PrintLayout::default()).unwrap();
    Pipeline::new(assembler, engine, &BrandMark::Wordmark, deadline).unwrap()
}

#[tokio::test]
async fn export_hands_assembled_job_to_engine() {
    let engine = Arc::new(RecordingEngine::default());
    let pipeline = pipeline(engine.clone(), Duration::from_secs(5));

    let doc = pipeline
        .export(&ExportRequest::new("<h1>Test</h1><p>This is a test.</p>", Orientation::Portrait))
        .await
        .unwrap();

    assert_eq!(doc.bytes, b"%PDF-1.4 fake");
    assert_eq!(doc.filename, EXPORT_FILENAME);
    assert_eq!(doc.content_type, PDF_CONTENT_TYPE);

    let jobs = engine.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];
    assert!(job.html.contains("<h1>Test</h1><p>This is a test.</p>"));
    assert_eq!(job.dimensions.width, 794);
    assert_eq!(job.bands, *pipeline.bands());
}

#[tokio::test]
async fn landscape_job_sets_print_params() {
    let engine = Arc::new(RecordingEngine::default());
    let pipeline = pipeline(engine.clone(), Duration::from_secs(5));

    pipeline
        .export(&ExportRequest::new("<p>x</p>", Orientation::Landscape))
        .await
        .unwrap();

    let jobs = engine.jobs.lock().unwrap();
    let params = jobs[0].print_params();
    assert_eq!(params.landscape, Some(true));
    assert_eq!(params.display_header_footer, Some(true));
    assert_eq!(params.print_background, Some(true));
    assert_eq!(params.prefer_css_page_size, Some(true));
    assert_eq!(params.scale, Some(0.9));
    assert_eq!(params.paper_width, Some(8.27));
    assert_eq!(params.paper_height, Some(11.69));
    assert!(params.margin_top.unwrap() > params.margin_bottom.unwrap());
    assert!(params.header_template.unwrap().contains("ComunidadFeliz"));
    assert!(params.footer_template.unwrap().contains("totalPages"));
}

#[tokio::test]
async fn engine_failure_propagates_without_retry() {
    let engine = Arc::new(RecordingEngine {
        fail_with: Some("no chrome".to_string()),
        ..Default::default()
    });
    let pipeline = pipeline(engine.clone(), Duration::from_secs(5));

    let err = pipeline
        .export(&ExportRequest::new("<p>x</p>", Orientation::Portrait))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Launch(_)));
    assert_eq!(err.to_string(), "browser launch failed: no chrome");
    assert_eq!(engine.jobs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn slow_engine_hits_deadline() {
    let engine = Arc::new(RecordingEngine {
        delay: Some(Duration::from_secs(10)),
        ..Default::default()
    });
    let pipeline = pipeline(engine, Duration::from_millis(50));

    let err = pipeline
        .export(&ExportRequest::new("<p>x</p>", Orientation::Portrait))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Timeout(_)));
    assert_eq!(err.to_string(), "rendering exceeded the 50ms deadline");
}
