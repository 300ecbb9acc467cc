//! Main window: the prediction form and the settings screen.

mod preview;
mod settings;

use anyhow::{Context, Result};
use crop_core::{
    Applied, Dispatcher, Node, PredictionForm, Resolved, SelectedFile, Settings, View, render,
};
use eframe::{App, CreationContext, Frame, egui};
use preview::Preview;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Predict,
    Settings,
}

enum Action {
    PickFile,
    Submit,
    CopyResults,
}

pub struct UiApp {
    form: PredictionForm,
    dispatcher: Dispatcher,
    settings: Settings,
    settings_path: Option<PathBuf>,
    pending_settings: Settings,
    panel: Panel,
    status: String,
    preview: Option<Preview>,
    app_version: &'static str,
}

impl UiApp {
    pub fn new(cc: &CreationContext<'_>) -> Result<Self> {
        let settings_path = settings::settings_path();
        let mut settings = match &settings_path {
            Some(path) => Settings::load_or_default(path),
            None => Settings::default(),
        };
        if let Err(e) = settings.endpoint_url() {
            tracing::warn!("{e}; using {}", crop_core::DEFAULT_ENDPOINT);
            settings.endpoint = crop_core::DEFAULT_ENDPOINT.to_string();
        }

        let service = settings::build_service(&settings)?;
        let ctx = cc.egui_ctx.clone();
        let dispatcher = Dispatcher::new(service).with_notify(move || ctx.request_repaint());

        Ok(Self {
            form: PredictionForm::new(settings.stale_policy),
            dispatcher,
            pending_settings: settings.clone(),
            settings,
            settings_path,
            panel: Panel::Predict,
            status: String::new(),
            preview: None,
            app_version: env!("CROPDOC_VERSION"),
        })
    }

    fn select(&mut self, ctx: &egui::Context, file: SelectedFile) {
        self.preview = Preview::load(ctx, &file);
        self.form.select_file(Some(file));
        self.status.clear();
    }

    fn pick_file(&mut self, ctx: &egui::Context) {
        let Some(path) = FileDialog::new().set_directory(".").pick_file() else {
            return;
        };
        match SelectedFile::from_path(&path) {
            Ok(file) => self.select(ctx, file),
            Err(e) => {
                tracing::warn!("{e:#}");
                self.status = format!("Could not read {}", path.display());
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let Some(dropped) = ctx.input(|i| i.raw.dropped_files.first().cloned()) else {
            return;
        };
        let file = if let Some(path) = &dropped.path {
            SelectedFile::from_path(path)
        } else if let Some(bytes) = &dropped.bytes {
            Ok(SelectedFile::new(dropped.name.clone(), bytes.to_vec()))
        } else {
            return;
        };
        match file {
            Ok(file) => self.select(ctx, file),
            Err(e) => {
                tracing::warn!("{e:#}");
                self.status = format!("Could not read {}", dropped.name);
            }
        }
    }

    fn submit(&mut self) {
        match self.dispatcher.submit(&mut self.form) {
            Ok(_) => self.status = "Waiting for prediction...".to_string(),
            Err(rejected) => {
                MessageDialog::new()
                    .set_level(MessageLevel::Warning)
                    .set_title(crop_core::view::TITLE)
                    .set_description(rejected.to_string())
                    .set_buttons(MessageButtons::Ok)
                    .show();
            }
        }
    }

    fn on_resolved(&mut self, resolved: Resolved) {
        match resolved.applied {
            Applied::Result => {
                self.status = format!("Prediction received ({:.1?})", resolved.elapsed);
            }
            Applied::Error => {
                self.status = format!("Request failed ({:.1?})", resolved.elapsed);
            }
            Applied::Stale => {}
        }
    }

    fn copy_results(&mut self, view: &View) {
        let Some(text) = view.to_plain_text() else {
            return;
        };
        match copy_to_clipboard(text) {
            Ok(()) => self.status = "Results copied to clipboard".to_string(),
            Err(e) => {
                tracing::warn!("{e:#}");
                self.status = "Could not copy results".to_string();
            }
        }
    }

    fn render_predict_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let view = render(&self.form);
        let mut actions = Vec::new();

        for node in &view.nodes {
            match node {
                Node::Heading(title) => {
                    ui.heading(*title);
                    ui.add_space(8.0);
                }
                Node::Form {
                    file_name,
                    submit_label,
                    pending,
                } => {
                    ui.horizontal(|ui| {
                        if ui.button("Choose file...").clicked() {
                            actions.push(Action::PickFile);
                        }
                        ui.label(file_name.as_deref().unwrap_or("No file chosen"));
                    });
                    if let Some(preview) = &self.preview {
                        ui.add_space(6.0);
                        preview.show(ui);
                    }
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        if ui.button(*submit_label).clicked() {
                            actions.push(Action::Submit);
                        }
                        if *pending > 0 {
                            ui.spinner();
                        }
                    });
                }
                Node::Error(message) => {
                    ui.add_space(8.0);
                    ui.colored_label(egui::Color32::RED, message);
                }
                Node::Results { heading, fields } => {
                    ui.add_space(12.0);
                    ui.heading(*heading);
                    for field in fields {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(format!("{}:", field.label)).strong());
                            ui.label(&field.value);
                        });
                    }
                    ui.add_space(6.0);
                    if ui.button("Copy results").clicked() {
                        actions.push(Action::CopyResults);
                    }
                }
            }
        }

        for action in actions {
            match action {
                Action::PickFile => self.pick_file(ctx),
                Action::Submit => self.submit(),
                Action::CopyResults => self.copy_results(&view),
            }
        }
    }
}

fn copy_to_clipboard(text: String) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard.set_text(text).context("clipboard write failed")?;
    Ok(())
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        for resolved in self.dispatcher.poll(&mut self.form) {
            self.on_resolved(resolved);
        }
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.panel, Panel::Predict, "Predict");
                ui.selectable_value(&mut self.panel, Panel::Settings, "Settings");
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.panel {
            Panel::Predict => self.render_predict_panel(ctx, ui),
            Panel::Settings => self.render_settings_panel(ui),
        });
    }
}
