//! State owned by the prediction form: selected file, last result, last error.

use crate::dispatch::RequestError;
use crate::model::{PREDICTION_FAILED_MESSAGE, PredictionResult, SelectedFile};
use crate::settings::StalePolicy;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("Please select a file first!")]
    NoFileSelected,
}

/// A submission that passed validation and still has to be sent.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub generation: u64,
    pub file: SelectedFile,
}

/// What happened to a response handed to [`PredictionForm::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Result,
    Error,
    /// A newer submission was issued; the response was dropped.
    Stale,
}

/// Result and error are never both set.
#[derive(Debug, Default)]
pub struct PredictionForm {
    selected: Option<SelectedFile>,
    result: Option<PredictionResult>,
    error: Option<String>,
    policy: StalePolicy,
    issued: u64,
    in_flight: usize,
}

impl PredictionForm {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: StalePolicy) {
        self.policy = policy;
    }

    /// Number of submissions whose response has not come back yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Stores a newly picked file. `None` means the picker was cancelled.
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        let Some(file) = file else {
            return;
        };
        tracing::info!("Selected {} ({} bytes)", file.file_name, file.bytes.len());
        self.selected = Some(file);
        self.result = None;
        self.error = None;
    }

    /// Validates the form and hands out the request to send.
    pub fn begin_submit(&mut self) -> Result<PendingRequest, SubmitRejected> {
        let file = self
            .selected
            .clone()
            .ok_or(SubmitRejected::NoFileSelected)?;
        self.issued += 1;
        self.in_flight += 1;
        Ok(PendingRequest {
            generation: self.issued,
            file,
        })
    }

    /// Applies the outcome of the request with the given generation.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<PredictionResult, RequestError>,
    ) -> Applied {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.policy == StalePolicy::LatestRequestWins && generation < self.issued {
            tracing::debug!(
                "Dropping response #{generation}; request #{} is newer",
                self.issued
            );
            return Applied::Stale;
        }
        match outcome {
            Ok(result) => {
                tracing::info!(
                    "Prediction #{generation}: {} ({})",
                    result.disease,
                    result.confidence_percent()
                );
                self.result = Some(result);
                self.error = None;
                Applied::Result
            }
            Err(_) => {
                self.result = None;
                self.error = Some(PREDICTION_FAILED_MESSAGE.to_string());
                Applied::Error
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PredictError;
    use reqwest::StatusCode;
    use rstest::rstest;

    fn blight() -> PredictionResult {
        PredictionResult {
            disease: "Blight".into(),
            confidence: 0.8734,
            pesticides: "Copper fungicide".into(),
            shop: "AgroMart".into(),
        }
    }

    fn failure() -> RequestError {
        RequestError::Predict(PredictError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "{\"error\":\"boom\"}".into(),
        })
    }

    fn named(disease: &str) -> PredictionResult {
        PredictionResult {
            disease: disease.into(),
            ..blight()
        }
    }

    fn leaf(name: &str) -> SelectedFile {
        SelectedFile::new(name, vec![0xff, 0xd8, 0xff])
    }

    fn assert_exclusive(form: &PredictionForm) {
        assert!(
            !(form.result().is_some() && form.error().is_some()),
            "result and error both set"
        );
    }

    #[test]
    fn starts_empty() {
        let form = PredictionForm::default();
        assert!(form.selected().is_none());
        assert!(form.result().is_none());
        assert!(form.error().is_none());
        assert_eq!(form.in_flight(), 0);
    }

    #[test]
    fn submit_without_file_is_rejected_and_changes_nothing() {
        let mut form = PredictionForm::default();
        let err = form.begin_submit().unwrap_err();
        assert_eq!(err, SubmitRejected::NoFileSelected);
        assert_eq!(err.to_string(), "Please select a file first!");
        assert!(form.result().is_none());
        assert!(form.error().is_none());
        assert_eq!(form.in_flight(), 0);
    }

    #[test]
    fn success_stores_result_and_clears_error() {
        let mut form = PredictionForm::default();
        form.select_file(Some(leaf("a.jpg")));
        let req = form.begin_submit().unwrap();
        assert_eq!(form.complete(req.generation, Err(failure())), Applied::Error);

        let req = form.begin_submit().unwrap();
        assert_eq!(form.complete(req.generation, Ok(blight())), Applied::Result);
        assert_eq!(form.result(), Some(&blight()));
        assert!(form.error().is_none());
        assert_eq!(form.in_flight(), 0);
    }

    #[test]
    fn failure_stores_generic_message_and_clears_result() {
        let mut form = PredictionForm::default();
        form.select_file(Some(leaf("a.jpg")));
        let req = form.begin_submit().unwrap();
        form.complete(req.generation, Ok(blight()));

        let req = form.begin_submit().unwrap();
        form.complete(req.generation, Err(failure()));
        assert_eq!(
            form.error(),
            Some("Failed to get prediction. Please try again.")
        );
        assert!(form.result().is_none());
    }

    #[rstest]
    #[case::after_result(true)]
    #[case::after_error(false)]
    fn selecting_a_file_resets_result_and_error(#[case] succeed: bool) {
        let mut form = PredictionForm::default();
        form.select_file(Some(leaf("a.jpg")));
        let req = form.begin_submit().unwrap();
        let outcome = if succeed { Ok(blight()) } else { Err(failure()) };
        form.complete(req.generation, outcome);

        form.select_file(Some(leaf("b.png")));
        assert!(form.result().is_none());
        assert!(form.error().is_none());
        assert_eq!(form.selected().map(|f| f.file_name.as_str()), Some("b.png"));
    }

    #[test]
    fn cancelled_pick_keeps_state() {
        let mut form = PredictionForm::default();
        form.select_file(Some(leaf("a.jpg")));
        let req = form.begin_submit().unwrap();
        form.complete(req.generation, Ok(blight()));

        form.select_file(None);
        assert_eq!(form.selected().map(|f| f.file_name.as_str()), Some("a.jpg"));
        assert_eq!(form.result(), Some(&blight()));
    }

    #[test]
    fn response_for_previous_file_still_lands_after_reselect() {
        let mut form = PredictionForm::new(StalePolicy::LatestRequestWins);
        form.select_file(Some(leaf("a.jpg")));
        let req = form.begin_submit().unwrap();
        form.select_file(Some(leaf("b.jpg")));

        assert_eq!(
            form.complete(req.generation, Ok(named("Leaf spot"))),
            Applied::Result
        );
        assert_eq!(form.selected().map(|f| f.file_name.as_str()), Some("b.jpg"));
        assert_eq!(form.result().map(|r| r.disease.as_str()), Some("Leaf spot"));
        assert!(form.error().is_none());
    }

    #[test]
    fn request_shares_the_selected_buffer() {
        let mut form = PredictionForm::default();
        form.select_file(Some(leaf("tomato.jpg")));
        let req = form.begin_submit().unwrap();
        let held = form.selected().unwrap();
        assert_eq!(req.file.bytes.as_ptr(), held.bytes.as_ptr());
    }

    #[test]
    fn request_carries_selected_file() {
        let mut form = PredictionForm::default();
        form.select_file(Some(leaf("tomato.jpg")));
        let first = form.begin_submit().unwrap();
        let second = form.begin_submit().unwrap();
        assert_eq!(first.file.file_name, "tomato.jpg");
        assert!(second.generation > first.generation);
        assert_eq!(form.in_flight(), 2);
    }

    #[test]
    fn latest_request_wins_drops_older_response() {
        let mut form = PredictionForm::new(StalePolicy::LatestRequestWins);
        form.select_file(Some(leaf("a.jpg")));
        let older = form.begin_submit().unwrap();
        let newer = form.begin_submit().unwrap();

        assert_eq!(form.complete(newer.generation, Ok(blight())), Applied::Result);
        assert_eq!(
            form.complete(older.generation, Err(failure())),
            Applied::Stale
        );
        assert_eq!(form.result(), Some(&blight()));
        assert!(form.error().is_none());
        assert_eq!(form.in_flight(), 0);
    }

    #[test]
    fn last_resolved_wins_applies_older_response() {
        let mut form = PredictionForm::new(StalePolicy::LastResolvedWins);
        form.select_file(Some(leaf("a.jpg")));
        let older = form.begin_submit().unwrap();
        let newer = form.begin_submit().unwrap();

        form.complete(newer.generation, Ok(blight()));
        assert_eq!(
            form.complete(older.generation, Err(failure())),
            Applied::Error
        );
        assert!(form.result().is_none());
        assert_eq!(
            form.error(),
            Some("Failed to get prediction. Please try again.")
        );
    }

    #[test]
    fn result_and_error_stay_exclusive_across_a_sequence() {
        let mut form = PredictionForm::new(StalePolicy::LastResolvedWins);
        assert_exclusive(&form);
        let _ = form.begin_submit();
        assert_exclusive(&form);
        for (i, succeed) in [true, false, false, true, false].into_iter().enumerate() {
            form.select_file(Some(leaf(&format!("{i}.jpg"))));
            assert_exclusive(&form);
            let req = form.begin_submit().unwrap();
            let outcome = if succeed { Ok(blight()) } else { Err(failure()) };
            form.complete(req.generation, outcome);
            assert_exclusive(&form);
        }
    }
}
