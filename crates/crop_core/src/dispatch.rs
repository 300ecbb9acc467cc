//! Runs prediction requests off the UI thread and feeds results back.

use crate::client::{PredictError, PredictionService};
use crate::form::{Applied, PredictionForm, SubmitRejected};
use crate::model::PredictionResult;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

type Notify = Arc<dyn Fn() + Send + Sync>;

/// Why a submitted request produced no prediction.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error("could not start request worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("request worker panicked: {0}")]
    Panicked(String),
}

struct Completion {
    generation: u64,
    outcome: Result<PredictionResult, RequestError>,
    elapsed: Duration,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A response that has been handed to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub generation: u64,
    pub applied: Applied,
    pub elapsed: Duration,
}

pub struct Dispatcher {
    service: Arc<dyn PredictionService>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    notify: Notify,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn PredictionService>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            tx,
            rx,
            notify: Arc::new(|| {}),
        }
    }

    /// Callback run on the worker thread after each response, e.g. a repaint request.
    pub fn with_notify(mut self, notify: impl Fn() + Send + Sync + 'static) -> Self {
        self.notify = Arc::new(notify);
        self
    }

    /// Swaps the backend for future submissions. Requests already running keep the old one.
    pub fn set_service(&mut self, service: Arc<dyn PredictionService>) {
        self.service = service;
    }

    /// Validates the form and starts one request in the background.
    pub fn submit(&self, form: &mut PredictionForm) -> Result<u64, SubmitRejected> {
        let request = form.begin_submit()?;
        let generation = request.generation;
        tracing::info!(
            "Submitting {} as request #{generation}",
            request.file.file_name
        );

        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let notify = Arc::clone(&self.notify);
        let spawned = thread::Builder::new()
            .name(format!("predict-{generation}"))
            .spawn(move || {
                let start = Instant::now();
                // A panicking service must still resolve its request.
                let outcome =
                    match panic::catch_unwind(AssertUnwindSafe(|| service.predict(&request.file))) {
                        Ok(result) => result.map_err(RequestError::from),
                        Err(payload) => Err(RequestError::Panicked(panic_message(&*payload))),
                    };
                if let Err(e) = &outcome {
                    tracing::error!("Error during prediction #{generation}: {e}");
                }
                // The receiver is gone once the window closes.
                let _ = tx.send(Completion {
                    generation,
                    outcome,
                    elapsed: start.elapsed(),
                });
                notify();
            });

        if let Err(e) = spawned {
            tracing::error!("Error during prediction #{generation}: could not spawn worker: {e}");
            let _ = self.tx.send(Completion {
                generation,
                outcome: Err(RequestError::Spawn(e)),
                elapsed: Duration::ZERO,
            });
        }
        Ok(generation)
    }

    /// Applies every response that has arrived since the last call, in arrival order.
    pub fn poll(&self, form: &mut PredictionForm) -> Vec<Resolved> {
        self.rx
            .try_iter()
            .map(|c| Resolved {
                generation: c.generation,
                applied: form.complete(c.generation, c.outcome),
                elapsed: c.elapsed,
            })
            .collect()
    }
}
