//! Settings panel rendering for the prediction endpoint and response ordering.

use super::{Panel, UiApp};
use anyhow::{Context, Result};
use crop_core::{HttpPredictionClient, PredictionService, Settings, StalePolicy};
use directories_next::ProjectDirs;
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

/// Location of `settings.toml` in the per-user config directory.
pub(super) fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "cropdoc", "CropDoc")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
}

pub(super) fn build_service(settings: &Settings) -> Result<Arc<dyn PredictionService>> {
    let url = settings.endpoint_url()?;
    let client = HttpPredictionClient::new(url).context("cannot create HTTP client")?;
    tracing::info!("Prediction endpoint: {}", client.endpoint());
    Ok(Arc::new(client))
}

/// Trims the edited endpoint and checks it before anything is saved.
fn validated(pending: &Settings) -> Result<Settings> {
    let candidate = Settings {
        endpoint: pending.endpoint.trim().to_string(),
        stale_policy: pending.stale_policy,
    };
    candidate.endpoint_url()?;
    Ok(candidate)
}

fn policy_label(policy: StalePolicy) -> &'static str {
    match policy {
        StalePolicy::LatestRequestWins => "Latest request wins",
        StalePolicy::LastResolvedWins => "Last response wins",
    }
}

impl UiApp {
    fn apply_settings(&mut self) -> Result<()> {
        let candidate = validated(&self.pending_settings)?;
        let service = build_service(&candidate)?;
        if let Some(path) = &self.settings_path {
            candidate
                .save(path)
                .with_context(|| format!("cannot save {}", path.display()))?;
        }
        self.dispatcher.set_service(service);
        self.form.set_policy(candidate.stale_policy);
        self.pending_settings = candidate.clone();
        self.settings = candidate;
        Ok(())
    }

    /// Renders the settings screen.
    pub(super) fn render_settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Prediction endpoint");
            ui.text_edit_singleline(&mut self.pending_settings.endpoint);
        });
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Overlapping requests");
            let selected = &mut self.pending_settings.stale_policy;
            egui::ComboBox::from_id_salt("stale-policy")
                .selected_text(policy_label(*selected))
                .show_ui(ui, |ui| {
                    for policy in [StalePolicy::LatestRequestWins, StalePolicy::LastResolvedWins] {
                        ui.selectable_value(selected, policy, policy_label(policy));
                    }
                });
        });
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                match self.apply_settings() {
                    Ok(()) => {
                        self.status = "Settings saved.".to_string();
                        self.panel = Panel::Predict;
                    }
                    Err(e) => {
                        tracing::warn!("{e:#}");
                        self.status = format!("{e}");
                    }
                }
            }
            if ui.button("Reset").clicked() {
                self.pending_settings = self.settings.clone();
            }
        });

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(6.0);
        ui.label(format!("Active endpoint: {}", self.settings.endpoint));
        if let Some(path) = &self.settings_path {
            ui.label(format!("Settings file: {}", path.display()));
        }
        ui.label(format!("App version: {}", self.app_version));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn validated_trims_endpoint() -> Result<()> {
        let pending = Settings {
            endpoint: "  http://10.0.0.5:8000/predict \n".into(),
            stale_policy: StalePolicy::LastResolvedWins,
        };
        let settings = validated(&pending)?;
        assert_eq!(settings.endpoint, "http://10.0.0.5:8000/predict");
        assert_eq!(settings.stale_policy, StalePolicy::LastResolvedWins);
        Ok(())
    }

    #[rstest]
    #[case("")]
    #[case("localhost:8000/predict")]
    #[case("file:///tmp/predict")]
    fn validated_rejects_bad_endpoint(#[case] endpoint: &str) {
        let pending = Settings {
            endpoint: endpoint.into(),
            ..Settings::default()
        };
        assert!(validated(&pending).is_err());
    }

    #[test]
    fn default_settings_build_a_service() -> Result<()> {
        build_service(&Settings::default())?;
        Ok(())
    }
}
