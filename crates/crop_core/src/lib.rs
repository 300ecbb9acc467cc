//! Core of the crop disease prediction client: form state, the HTTP client
//! for the prediction service, background dispatch and the view model.

pub mod client;
pub mod dispatch;
pub mod form;
pub mod model;
pub mod settings;
pub mod view;

pub use client::{HttpPredictionClient, PredictError, PredictionService};
pub use dispatch::{Dispatcher, RequestError, Resolved};
pub use form::{Applied, PendingRequest, PredictionForm, SubmitRejected};
pub use model::{PREDICTION_FAILED_MESSAGE, PredictionResult, SelectedFile};
pub use settings::{DEFAULT_ENDPOINT, Settings, SettingsError, StalePolicy};
pub use view::{Field, Node, View, render};
