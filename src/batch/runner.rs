//! Batch runner for detector-image collections.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tokio::runtime::Runtime as TokioRuntime;

use super::report::{BatchRecord, BatchReport, ItemStage, ItemState};
use super::writer::ResultWriter;
use crate::data::{DetectorImage, HeaderKeys, MetadataProvider};
use crate::geometry::GeometryState;
use crate::integrate::{
    IntegrationDispatcher, IntegrationKernel, IntegrationRequest, ValidatedRequest,
    ValidationError,
};

/// Configuration for the batch runner.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Number of worker threads for asynchronous execution.
    pub worker_count: usize,
    /// Header field names read per image.
    pub header_keys: HeaderKeys,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            header_keys: HeaderKeys::default(),
        }
    }
}

/// A validated request with the name it is keyed by in the output.
#[derive(Clone, Debug)]
pub struct NamedRequest {
    pub name: String,
    pub request: ValidatedRequest,
}

/// Runs a list of integration requests over a collection of images.
///
/// Each image is processed in its own geometry scope: workers clone the
/// calibrated [`GeometryState`] and mutate only the per-image angles, so
/// images never share mutable state and the fan-out is safe. One bad
/// request does not abort its image and one bad image does not abort the
/// batch; every failure lands in the report.
pub struct BatchRunner {
    config: RunnerConfig,
    dispatcher: IntegrationDispatcher,
    requests: Vec<NamedRequest>,
    writer: Option<Arc<dyn ResultWriter>>,
    tokio_runtime: TokioRuntime,
    cancelled: Arc<AtomicBool>,
}

impl BatchRunner {
    /// Create a runner around the given numerical kernel.
    pub fn new(config: RunnerConfig, kernel: Arc<dyn IntegrationKernel>) -> Self {
        let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_count)
            .enable_all()
            .build()
            .expect("Failed to create Tokio runtime");

        Self {
            config,
            dispatcher: IntegrationDispatcher::new(kernel),
            requests: Vec::new(),
            writer: None,
            tokio_runtime,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Add a named request to the batch list. The request is validated
    /// here; the dispatcher never sees an unvalidated one.
    pub fn add_request(
        &mut self,
        name: impl Into<String>,
        request: IntegrationRequest,
    ) -> Result<(), ValidationError> {
        let request = request.validate()?;
        self.requests.push(NamedRequest {
            name: name.into(),
            request,
        });
        Ok(())
    }

    /// Install a writer for finished profiles.
    pub fn set_writer(&mut self, writer: Arc<dyn ResultWriter>) {
        self.writer = Some(writer);
    }

    /// Number of requests in the batch list.
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Request cooperative cancellation. Checked before each image.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Run the batch synchronously, fanning out across images.
    pub fn run_sync(
        &self,
        images: &[DetectorImage],
        geometry: &GeometryState,
        metadata: &dyn MetadataProvider,
    ) -> BatchReport {
        self.cancelled.store(false, Ordering::SeqCst);

        let records: Vec<BatchRecord> = images
            .par_iter()
            .flat_map(|image| {
                if self.cancelled.load(Ordering::SeqCst) {
                    cancelled_records(image, &self.requests)
                } else {
                    process_image(
                        &self.dispatcher,
                        &self.requests,
                        &self.config.header_keys,
                        self.writer.as_deref(),
                        geometry,
                        metadata,
                        image,
                    )
                }
            })
            .collect();

        BatchReport::from_records(records)
    }

    /// Run the batch asynchronously with callbacks.
    ///
    /// `on_progress` receives (images done, images total) after each image;
    /// `on_record` fires once per finished work item; `on_complete`
    /// receives the full report.
    pub fn run_async<F, P, R>(
        &self,
        images: Vec<DetectorImage>,
        geometry: GeometryState,
        metadata: Arc<dyn MetadataProvider>,
        on_complete: F,
        on_progress: P,
        on_record: R,
    ) where
        F: FnOnce(BatchReport) + Send + 'static,
        P: Fn(usize, usize) + Send + Sync + 'static,
        R: Fn(&BatchRecord) + Send + Sync + 'static,
    {
        self.cancelled.store(false, Ordering::SeqCst);

        let dispatcher = self.dispatcher.clone();
        let requests = self.requests.clone();
        let header_keys = self.config.header_keys.clone();
        let writer = self.writer.clone();
        let cancelled = self.cancelled.clone();
        let total = images.len();

        self.tokio_runtime.spawn(async move {
            let mut records = Vec::new();

            for (done, image) in images.iter().enumerate() {
                let group = if cancelled.load(Ordering::SeqCst) {
                    cancelled_records(image, &requests)
                } else {
                    process_image(
                        &dispatcher,
                        &requests,
                        &header_keys,
                        writer.as_deref(),
                        &geometry,
                        metadata.as_ref(),
                        image,
                    )
                };

                for record in &group {
                    on_record(record);
                }
                on_progress(done + 1, total);
                records.extend(group);
            }

            on_complete(BatchReport::from_records(records));
        });
    }
}

/// Process one image: update its geometry scope from headers, then run
/// every request against it.
fn process_image(
    dispatcher: &IntegrationDispatcher,
    requests: &[NamedRequest],
    keys: &HeaderKeys,
    writer: Option<&dyn ResultWriter>,
    geometry: &GeometryState,
    metadata: &dyn MetadataProvider,
    image: &DetectorImage,
) -> Vec<BatchRecord> {
    // Independent geometry scope for this image; only angles are mutated.
    let mut local = geometry.clone();

    let incident = match metadata.header_value(&image.id, &keys.incident_angle) {
        Ok(value) => value,
        Err(err) => {
            return failed_records(image, requests, ItemStage::GeometryUpdated, err.to_string())
        }
    };
    let tilt = match metadata.header_value(&image.id, &keys.tilt_angle) {
        Ok(value) => value,
        Err(err) => {
            return failed_records(image, requests, ItemStage::GeometryUpdated, err.to_string())
        }
    };
    local.set_incident_angle_from_header(incident.as_ref());
    local.set_tilt_angle_from_header(tilt.as_ref());

    let normalization = match metadata.header_value(&image.id, &keys.normalization) {
        Ok(value) => value.and_then(|v| v.as_f64()).unwrap_or(1.0),
        Err(err) => {
            return failed_records(image, requests, ItemStage::GeometryUpdated, err.to_string())
        }
    };
    let exposure = match metadata.header_value(&image.id, &keys.exposure_time) {
        Ok(value) => value.and_then(|v| v.as_f64()),
        Err(err) => {
            return failed_records(image, requests, ItemStage::GeometryUpdated, err.to_string())
        }
    };

    requests
        .iter()
        .map(|named| {
            match dispatcher.run(&named.request, &local, &image.data, normalization) {
                Ok(result) => {
                    if let Some(writer) = writer {
                        let meta = result_metadata(image, named, &local, normalization, exposure);
                        match writer.write(&image.id, &named.name, &result, &meta) {
                            Ok(()) => BatchRecord {
                                image_id: image.id.clone(),
                                request_name: named.name.clone(),
                                result: Some(result),
                                state: ItemState::Written,
                            },
                            Err(err) => BatchRecord {
                                image_id: image.id.clone(),
                                request_name: named.name.clone(),
                                result: Some(result),
                                state: ItemState::Failed {
                                    stage: ItemStage::Written,
                                    reason: err.to_string(),
                                },
                            },
                        }
                    } else {
                        BatchRecord {
                            image_id: image.id.clone(),
                            request_name: named.name.clone(),
                            result: Some(result),
                            state: ItemState::Integrated,
                        }
                    }
                }
                Err(err) => BatchRecord {
                    image_id: image.id.clone(),
                    request_name: named.name.clone(),
                    result: None,
                    state: ItemState::Failed {
                        stage: ItemStage::Integrated,
                        reason: err.to_string(),
                    },
                },
            }
        })
        .collect()
}

/// Metadata block handed to the writer alongside each profile.
fn result_metadata(
    image: &DetectorImage,
    named: &NamedRequest,
    geometry: &GeometryState,
    normalization: f64,
    exposure: Option<f64>,
) -> HashMap<String, String> {
    let mut meta = HashMap::new();
    meta.insert("image".into(), image.id.clone());
    meta.insert("request".into(), named.name.clone());
    meta.insert(
        "variant".into(),
        named.request.request().variant_name().into(),
    );
    meta.insert(
        "unit".into(),
        named.request.request().output_unit().name().into(),
    );
    meta.insert(
        "incident_angle_deg".into(),
        format!("{:.6}", geometry.incident_angle().to_degrees()),
    );
    meta.insert("normalization".into(), format!("{normalization}"));
    if let Some(exposure) = exposure {
        meta.insert("exposure_time".into(), format!("{exposure}"));
    }
    meta
}

fn failed_records(
    image: &DetectorImage,
    requests: &[NamedRequest],
    stage: ItemStage,
    reason: String,
) -> Vec<BatchRecord> {
    requests
        .iter()
        .map(|named| BatchRecord {
            image_id: image.id.clone(),
            request_name: named.name.clone(),
            result: None,
            state: ItemState::Failed {
                stage,
                reason: reason.clone(),
            },
        })
        .collect()
}

fn cancelled_records(image: &DetectorImage, requests: &[NamedRequest]) -> Vec<BatchRecord> {
    failed_records(image, requests, ItemStage::Pending, "batch cancelled".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HeaderValue, MapMetadata, MetadataError};
    use crate::integrate::{KernelError, ProcessMode};
    use crate::units::Unit;
    use ndarray::Array2;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Kernel stub returning a flat profile; optionally fails chi calls.
    struct StubKernel {
        fail_chi: bool,
    }

    impl IntegrationKernel for StubKernel {
        fn integrate_1d(
            &self,
            mode: ProcessMode,
            _image: &Array2<f64>,
            bin_count: u32,
            primary_range: (f64, f64),
            _secondary_range: (f64, f64),
            _unit: Unit,
            normalization_factor: f64,
            _polarization_factor: f64,
        ) -> Result<(Vec<f64>, Vec<f64>), KernelError> {
            if self.fail_chi && mode == ProcessMode::Chi {
                Err(KernelError("chi mode unavailable".into()))
            } else {
                let n = bin_count as usize;
                let (lo, hi) = primary_range;
                let step = (hi - lo) / n.max(1) as f64;
                let x = (0..n).map(|i| lo + step * (i as f64 + 0.5)).collect();
                Ok((vec![normalization_factor; n], x))
            }
        }
    }

    /// Provider that fails every read for one image id.
    struct FailingProvider {
        inner: MapMetadata,
        broken_image: String,
    }

    impl MetadataProvider for FailingProvider {
        fn header_value(
            &self,
            image_id: &str,
            key: &str,
        ) -> Result<Option<HeaderValue>, MetadataError> {
            if image_id == self.broken_image {
                Err(MetadataError {
                    image_id: image_id.into(),
                    key: key.into(),
                    reason: "unreadable header".into(),
                })
            } else {
                self.inner.header_value(image_id, key)
            }
        }
    }

    #[derive(Default)]
    struct MemoryWriter {
        written: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl ResultWriter for MemoryWriter {
        fn write(
            &self,
            image_id: &str,
            request_name: &str,
            _result: &crate::data::IntegrationResult,
            _metadata: &HashMap<String, String>,
        ) -> Result<(), crate::batch::WriteError> {
            if self.fail {
                return Err(crate::batch::WriteError("disk full".into()));
            }
            self.written
                .lock()
                .unwrap()
                .push((image_id.into(), request_name.into()));
            Ok(())
        }
    }

    fn geometry() -> GeometryState {
        GeometryState::new(0.2, 1e-4, 1.0e-10, (10, 10))
    }

    fn images(ids: &[&str]) -> Vec<DetectorImage> {
        ids.iter()
            .map(|id| DetectorImage::new(*id, Array2::ones((10, 10))))
            .collect()
    }

    fn azimuthal_request() -> IntegrationRequest {
        IntegrationRequest::Azimuthal {
            radial_range: (0.1, 1.0),
            azimuth_range: (-10.0, 10.0),
            unit: Unit::QNm,
            bin_count: Some(50),
        }
    }

    fn runner(kernel: StubKernel) -> BatchRunner {
        let config = RunnerConfig {
            worker_count: 2,
            header_keys: HeaderKeys::default(),
        };
        let mut runner = BatchRunner::new(config, Arc::new(kernel));
        runner.add_request("cake", azimuthal_request()).unwrap();
        runner
    }

    #[test]
    fn test_batch_all_succeed() {
        let runner = runner(StubKernel { fail_chi: false });
        let report = runner.run_sync(&images(&["a", "b", "c"]), &geometry(), &MapMetadata::new());

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed, 0);
        assert!(report.records.iter().all(|r| r.result.is_some()));
    }

    #[test]
    fn test_batch_partial_failure_is_isolated() {
        let runner = runner(StubKernel { fail_chi: false });
        let provider = FailingProvider {
            inner: MapMetadata::new(),
            broken_image: "img_002".into(),
        };

        let report = runner.run_sync(
            &images(&["img_001", "img_002", "img_003"]),
            &geometry(),
            &provider,
        );

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);

        let broken = report
            .records
            .iter()
            .find(|r| r.image_id == "img_002")
            .unwrap();
        assert!(matches!(
            &broken.state,
            ItemState::Failed {
                stage: ItemStage::GeometryUpdated,
                ..
            }
        ));
        assert!(broken.result.is_none());
    }

    #[test]
    fn test_bad_request_does_not_abort_image() {
        let mut runner = runner(StubKernel { fail_chi: true });
        runner
            .add_request(
                "chi_cut",
                IntegrationRequest::Radial {
                    radial_range: (0.1, 1.0),
                    azimuth_range: (-90.0, 90.0),
                    unit: Unit::QNm,
                    bin_count: Some(90),
                },
            )
            .unwrap();

        let report = runner.run_sync(&images(&["a"]), &geometry(), &MapMetadata::new());

        assert_eq!(report.total(), 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);

        let failed = report
            .records
            .iter()
            .find(|r| r.request_name == "chi_cut")
            .unwrap();
        assert!(matches!(
            &failed.state,
            ItemState::Failed {
                stage: ItemStage::Integrated,
                ..
            }
        ));
    }

    #[test]
    fn test_records_ordered_by_image_id() {
        let runner = runner(StubKernel { fail_chi: false });
        let report = runner.run_sync(&images(&["c", "a", "b"]), &geometry(), &MapMetadata::new());

        let ids: Vec<_> = report.records.iter().map(|r| r.image_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_per_image_angles_come_from_headers() {
        let runner = runner(StubKernel { fail_chi: false });
        let mut provider = MapMetadata::new();
        provider.insert("a", "incident_angle", HeaderValue::Number(0.3));
        provider.insert("a", "norm", HeaderValue::Number(2.0));

        let report = runner.run_sync(&images(&["a"]), &geometry(), &provider);

        // Normalization reaches the kernel: the stub echoes it as y.
        let result = report.records[0].result.as_ref().unwrap();
        assert!(result.y.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_writer_receives_successes() {
        let mut runner = runner(StubKernel { fail_chi: false });
        let writer = Arc::new(MemoryWriter::default());
        runner.set_writer(writer.clone());

        let report = runner.run_sync(&images(&["a", "b"]), &geometry(), &MapMetadata::new());

        assert_eq!(report.succeeded, 2);
        assert!(report
            .records
            .iter()
            .all(|r| r.state == ItemState::Written));

        let written = writer.written.lock().unwrap();
        assert_eq!(written.len(), 2);
    }

    #[test]
    fn test_write_failure_keeps_result() {
        let mut runner = runner(StubKernel { fail_chi: false });
        runner.set_writer(Arc::new(MemoryWriter {
            written: Mutex::new(Vec::new()),
            fail: true,
        }));

        let report = runner.run_sync(&images(&["a"]), &geometry(), &MapMetadata::new());

        assert_eq!(report.failed, 1);
        let record = &report.records[0];
        assert!(record.result.is_some());
        assert!(matches!(
            &record.state,
            ItemState::Failed {
                stage: ItemStage::Written,
                ..
            }
        ));
    }

    #[test]
    fn test_run_async_completes_with_report() {
        let runner = runner(StubKernel { fail_chi: false });
        let (tx, rx) = mpsc::channel();

        runner.run_async(
            images(&["a", "b"]),
            geometry(),
            Arc::new(MapMetadata::new()),
            move |report| {
                tx.send((report.succeeded, report.failed)).unwrap();
            },
            |_done, _total| {},
            |_record| {},
        );

        let (succeeded, failed) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(succeeded, 2);
        assert_eq!(failed, 0);
    }
}
