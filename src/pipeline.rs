//! Lot generation pipeline.
//!
//! One call to [`generate`] turns a [`GenerationRequest`] into a lot's
//! artifacts:
//!
//! ```text
//! validate ──✗──> InvalidAttributes (nothing written)
//!    │
//! reserve lot (LotLedger, directory locked)
//!    │
//! build slug ─> write QRCODE_<slug>.png ─> commit lot (lock released)
//!    │
//! annotate label     (skipped when no raster tool)
//!    │
//! write <slug>.html  (skipped when the output directory is missing)
//! ```
//!
//! The lot is committed as soon as its QR image exists, so a failure in a
//! later step never lets the next run reuse that number.
//!
//! Progress is reported through an optional channel of [`PipelineEvent`]s,
//! which the CLI prints on a separate thread.

use crate::config::GeneratorConfig;
use crate::imaging::{AnnotationOutcome, BackendError, RasterBackend, annotate, plan_annotation};
use crate::lot::{LotError, LotLedger, LotToken};
use crate::naming::Slug;
use crate::qr::{self, QrError};
use crate::render::{self, PageOutcome, RenderError};
use crate::vocabulary::{InvalidAttributes, WineAttributes, validate};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Invalid(#[from] InvalidAttributes),
    #[error("Lot sequencing failed: {0}")]
    Lot(#[from] LotError),
    #[error("QR generation failed: {0}")]
    Qr(#[from] QrError),
    #[error("Label annotation failed: {0}")]
    Annotation(#[from] BackendError),
    #[error("Page rendering failed: {0}")]
    Render(#[from] RenderError),
}

/// Raw inputs for one lot. `None` fields take their configured default.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub year: u16,
    pub appellation: String,
    pub color: String,
    pub climat: Option<String>,
    pub cru: Option<String>,
    /// Where the page goes; `[page] output_dir` when absent.
    pub output_dir: Option<PathBuf>,
    /// Energy per 100 ml; `[defaults] energy` when absent.
    pub energy: Option<String>,
    /// Overrides `[page] organic_logo`.
    pub organic_logo: Option<bool>,
}

impl GenerationRequest {
    pub fn new(year: u16, appellation: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            year,
            appellation: appellation.into(),
            color: color.into(),
            ..Self::default()
        }
    }

    pub fn climat(mut self, climat: impl Into<String>) -> Self {
        self.climat = Some(climat.into());
        self
    }

    pub fn cru(mut self, cru: impl Into<String>) -> Self {
        self.cru = Some(cru.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn energy(mut self, energy: impl Into<String>) -> Self {
        self.energy = Some(energy.into());
        self
    }

    pub fn organic_logo(mut self, enabled: bool) -> Self {
        self.organic_logo = Some(enabled);
        self
    }

    /// Validate against the vocabularies, filling defaults from `config`.
    pub fn validate(&self, config: &GeneratorConfig) -> Result<WineAttributes, InvalidAttributes> {
        validate(
            self.year,
            &self.appellation,
            &self.color,
            self.climat.as_deref(),
            self.cru.as_deref(),
            self.energy.as_deref().unwrap_or(&config.defaults.energy),
        )
    }

    fn resolved_output_dir(&self, config: &GeneratorConfig) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.page.output_dir))
    }
}

/// Everything produced for one lot.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub attributes: WineAttributes,
    pub lot: LotToken,
    pub slug: Slug,
    pub url: String,
    pub qr_path: PathBuf,
    pub annotation: AnnotationOutcome,
    pub page: PageOutcome,
}

/// What a generation would produce, computed without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub attributes: WineAttributes,
    pub lot: LotToken,
    pub slug: Slug,
    pub url: String,
    pub qr_filename: String,
    pub page_filename: String,
}

/// Progress reported while [`generate`] runs.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    LotReserved { lot: LotToken, slug: Slug },
    QrWritten { path: PathBuf, url: String },
    Annotated { tool: String, steps: usize },
    AnnotationSkipped,
    PageWritten { path: PathBuf, logo_copied: bool },
    PageSkipped { dir: PathBuf },
}

fn emit(progress: Option<&Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = progress {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}

/// Produce the QR image and product page for one new lot.
///
/// `artifact_dir` receives the QR image and the lot ledger files and is
/// created if needed. `backend` should be probed once by the caller; pass
/// [`crate::imaging::NoopBackend`] to leave labels unannotated.
pub fn generate(
    request: &GenerationRequest,
    config: &GeneratorConfig,
    artifact_dir: &Path,
    backend: &dyn RasterBackend,
    progress: Option<Sender<PipelineEvent>>,
) -> Result<GenerationReport, PipelineError> {
    let progress = progress.as_ref();
    let attributes = request.validate(config)?;

    let ledger = LotLedger::open(artifact_dir)?;
    let lot = ledger.next()?;
    let slug = Slug::build(&attributes, &lot);
    emit(
        progress,
        PipelineEvent::LotReserved {
            lot,
            slug: slug.clone(),
        },
    );

    let url = qr::product_url(&config.qr.host, &slug);
    let qr_path = qr::write_qr(artifact_dir, &slug, &url, &config.qr)?;
    ledger.commit(lot)?;
    emit(
        progress,
        PipelineEvent::QrWritten {
            path: qr_path.clone(),
            url: url.clone(),
        },
    );

    let ops = plan_annotation(&attributes.energy, &config.annotation);
    let annotation = annotate(backend, &qr_path, &ops)?;
    emit(
        progress,
        match &annotation {
            AnnotationOutcome::Applied { tool, steps } => PipelineEvent::Annotated {
                tool: tool.clone(),
                steps: *steps,
            },
            AnnotationOutcome::Skipped => PipelineEvent::AnnotationSkipped,
        },
    );

    let organic_logo = request.organic_logo.unwrap_or(config.page.organic_logo);
    let page = render::write_page(
        &request.resolved_output_dir(config),
        &attributes,
        &slug,
        &lot,
        organic_logo,
    )?;
    emit(
        progress,
        match &page {
            PageOutcome::Written { path, logo_copied } => PipelineEvent::PageWritten {
                path: path.clone(),
                logo_copied: *logo_copied,
            },
            PageOutcome::Skipped { dir } => PipelineEvent::PageSkipped { dir: dir.clone() },
        },
    );

    Ok(GenerationReport {
        attributes,
        lot,
        slug,
        url,
        qr_path,
        annotation,
        page,
    })
}

/// Validate `request` and name the artifacts the next lot would get.
///
/// Reads the lot counter and the artifact directory but takes no lock, so a
/// concurrent generation may claim the previewed lot first.
pub fn preview(
    request: &GenerationRequest,
    config: &GeneratorConfig,
    artifact_dir: &Path,
) -> Result<Preview, PipelineError> {
    let attributes = request.validate(config)?;
    let lot = crate::lot::next_lot(artifact_dir)?;
    let slug = Slug::build(&attributes, &lot);
    Ok(Preview {
        url: qr::product_url(&config.qr.host, &slug),
        qr_filename: slug.qr_filename(),
        page_filename: slug.page_filename(),
        attributes,
        lot,
        slug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::NoopBackend;
    use crate::imaging::backend::tests::MockBackend;
    use crate::lot::COUNTER_FILENAME;
    use crate::test_helpers::{list_files, touch_artifacts};
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn premier_cru(pages: &Path) -> GenerationRequest {
        GenerationRequest::new(2024, "mercurey", "red")
            .climat("Champs Martin")
            .cru("1er cru")
            .energy("312 kJ / 75 kcal")
            .output_dir(pages)
    }

    #[test]
    fn generates_first_lot_on_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let pages = tmp.path().join("pages");
        fs::create_dir(&pages).unwrap();
        let artifacts = tmp.path().join("labels");

        let report = generate(
            &premier_cru(&pages),
            &GeneratorConfig::default(),
            &artifacts,
            &NoopBackend,
            None,
        )
        .unwrap();

        assert_eq!(
            report.slug.as_str(),
            "mercurey_champs_martin_1er_cru_red_2024_lm0001"
        );
        assert_eq!(report.lot, LotToken::new(1));
        assert_eq!(
            report.url,
            "https://vins.example.com/mercurey_champs_martin_1er_cru_red_2024_lm0001.html"
        );
        assert_eq!(
            report.qr_path,
            artifacts.join("QRCODE_mercurey_champs_martin_1er_cru_red_2024_lm0001.png")
        );
        assert!(report.qr_path.is_file());
        assert_eq!(report.annotation, AnnotationOutcome::Skipped);
        assert!(matches!(report.page, PageOutcome::Written { logo_copied: true, .. }));
    }

    #[test]
    fn continues_after_existing_lots() {
        let tmp = TempDir::new().unwrap();
        touch_artifacts(tmp.path(), 1..=37);
        let report = generate(
            &premier_cru(&tmp.path().join("missing")),
            &GeneratorConfig::default(),
            tmp.path(),
            &NoopBackend,
            None,
        )
        .unwrap();
        assert_eq!(report.lot.to_string(), "LM0038");
        assert!(report.slug.as_str().ends_with("_lm0038"));
    }

    #[test]
    fn invalid_attributes_write_nothing() {
        let tmp = TempDir::new().unwrap();
        let pages = tmp.path().join("pages");
        fs::create_dir(&pages).unwrap();
        let artifacts = tmp.path().join("labels");
        let request = GenerationRequest::new(2024, "chablis", "rose").output_dir(&pages);

        let err = generate(
            &request,
            &GeneratorConfig::default(),
            &artifacts,
            &NoopBackend,
            None,
        )
        .unwrap_err();

        let PipelineError::Invalid(invalid) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(invalid.problems.len(), 2);
        assert!(!artifacts.exists());
        assert!(list_files(&pages).is_empty());
    }

    #[test]
    fn missing_page_directory_still_writes_qr() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let report = generate(
            &GenerationRequest::new(2022, "bourgogne", "white").output_dir(&missing),
            &GeneratorConfig::default(),
            tmp.path(),
            &NoopBackend,
            None,
        )
        .unwrap();

        assert_eq!(report.slug.as_str(), "bourgogne_white_2022_lm0001");
        assert_eq!(report.page, PageOutcome::Skipped { dir: missing.clone() });
        assert!(!missing.exists());
        let img = image::open(&report.qr_path).unwrap();
        assert!(img.width() >= 300);
    }

    #[test]
    fn annotation_runs_against_written_image() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let report = generate(
            &premier_cru(&tmp.path().join("missing")),
            &GeneratorConfig::default(),
            tmp.path(),
            &backend,
            None,
        )
        .unwrap();

        assert_eq!(
            report.annotation,
            AnnotationOutcome::Applied {
                tool: "mock".into(),
                steps: 5
            }
        );
        let expected = report.qr_path.to_string_lossy().into_owned();
        assert!(backend.get_paths().iter().all(|p| *p == expected));
        assert!(matches!(
            backend.get_operations().last(),
            Some(crate::imaging::RasterOp::Annotate { text, .. }) if text == "E(100ml)=312kJ/75kcal"
        ));
    }

    #[test]
    fn failed_annotation_still_consumes_the_lot() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::failing_at(1);
        let err = generate(
            &premier_cru(&tmp.path().join("missing")),
            &GeneratorConfig::default(),
            tmp.path(),
            &backend,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Annotation(_)));

        let counter = fs::read_to_string(tmp.path().join(COUNTER_FILENAME)).unwrap();
        assert_eq!(counter.trim(), "1");
        let next = preview(
            &premier_cru(tmp.path()),
            &GeneratorConfig::default(),
            tmp.path(),
        )
        .unwrap();
        assert_eq!(next.lot, LotToken::new(2));
    }

    #[test]
    fn energy_falls_back_to_config_default() {
        let tmp = TempDir::new().unwrap();
        let mut config = GeneratorConfig::default();
        config.defaults.energy = "280 kJ / 67 kcal".into();
        let backend = MockBackend::new();
        let report = generate(
            &GenerationRequest::new(2023, "rully", "white").output_dir(tmp.path().join("x")),
            &config,
            tmp.path(),
            &backend,
            None,
        )
        .unwrap();
        assert_eq!(report.attributes.energy.kj, "280");
        assert!(matches!(
            backend.get_operations().last(),
            Some(crate::imaging::RasterOp::Annotate { text, .. }) if text == "E(100ml)=280kJ/67kcal"
        ));
    }

    #[test]
    fn logo_override_disables_logo() {
        let tmp = TempDir::new().unwrap();
        let pages = tmp.path().join("pages");
        fs::create_dir(&pages).unwrap();
        let report = generate(
            &premier_cru(&pages).organic_logo(false),
            &GeneratorConfig::default(),
            tmp.path(),
            &NoopBackend,
            None,
        )
        .unwrap();
        assert!(matches!(report.page, PageOutcome::Written { logo_copied: false, .. }));
        assert!(!pages.join(render::LOGO_FILENAME).exists());
    }

    #[test]
    fn emits_events_in_pipeline_order() {
        let tmp = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        generate(
            &premier_cru(&tmp.path().join("missing")),
            &GeneratorConfig::default(),
            tmp.path(),
            &NoopBackend,
            Some(tx),
        )
        .unwrap();

        let events: Vec<PipelineEvent> = rx.iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], PipelineEvent::LotReserved { .. }));
        assert!(matches!(events[1], PipelineEvent::QrWritten { .. }));
        assert!(matches!(events[2], PipelineEvent::AnnotationSkipped));
        assert!(matches!(events[3], PipelineEvent::PageSkipped { .. }));
    }

    #[test]
    fn preview_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        touch_artifacts(tmp.path(), [4]);
        let before = list_files(tmp.path());

        let preview = preview(
            &GenerationRequest::new(2022, "Bourgogne", "WHITE"),
            &GeneratorConfig::default(),
            tmp.path(),
        )
        .unwrap();

        assert_eq!(preview.slug.as_str(), "bourgogne_white_2022_lm0005");
        assert_eq!(preview.qr_filename, "QRCODE_bourgogne_white_2022_lm0005.png");
        assert_eq!(preview.page_filename, "bourgogne_white_2022_lm0005.html");
        assert_eq!(list_files(tmp.path()), before);
    }

    #[test]
    fn preview_matches_generate_when_counter_is_ahead() {
        let tmp = TempDir::new().unwrap();
        touch_artifacts(tmp.path(), [4]);
        fs::write(tmp.path().join(COUNTER_FILENAME), "20").unwrap();
        let request = GenerationRequest::new(2022, "bourgogne", "white")
            .output_dir(tmp.path().join("missing"));
        let config = GeneratorConfig::default();

        let previewed = preview(&request, &config, tmp.path()).unwrap();
        let report = generate(&request, &config, tmp.path(), &NoopBackend, None).unwrap();

        assert_eq!(previewed.lot, LotToken::new(21));
        assert_eq!(previewed.lot, report.lot);
        assert_eq!(previewed.slug, report.slug);
        assert_eq!(report.slug.as_str(), "bourgogne_white_2022_lm0021");
    }

    #[test]
    fn report_serializes_outcomes() {
        let tmp = TempDir::new().unwrap();
        let report = generate(
            &premier_cru(&tmp.path().join("missing")),
            &GeneratorConfig::default(),
            tmp.path(),
            &NoopBackend,
            None,
        )
        .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["lot"], "LM0001");
        assert_eq!(json["slug"], "mercurey_champs_martin_1er_cru_red_2024_lm0001");
        assert_eq!(json["annotation"]["status"], "skipped");
        assert_eq!(json["page"]["status"], "skipped");
        assert_eq!(json["attributes"]["climat"], "Champs Martin");
    }
}
