// src/display/gui.rs
//! egui window showing the same screen as the terminal view

use super::{apply_action, drain_events, strings, Action, LocationView, UiEvent};
use crate::{
    controller::LocationDisplayController,
    error::{LocationError, Result},
};
use eframe::egui;
use std::{
    sync::mpsc::Receiver,
    time::{Duration, Instant},
};

pub struct GuiDisplay;

impl GuiDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GuiDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationView for GuiDisplay {
    fn run(self, controller: LocationDisplayController, events: Receiver<UiEvent>) -> Result<()> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([480.0, 420.0])
                .with_title("Location Display")
                .with_min_inner_size([360.0, 320.0]),
            ..Default::default()
        };

        eframe::run_native(
            "Location Display",
            options,
            Box::new(move |cc| {
                cc.egui_ctx.set_visuals(egui::Visuals::dark());
                Ok(Box::new(LocationGuiApp { controller, events }))
            }),
        )
        .map_err(|e| LocationError::Other(format!("GUI error: {}", e)))
    }
}

struct LocationGuiApp {
    controller: LocationDisplayController,
    events: Receiver<UiEvent>,
}

impl eframe::App for LocationGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll the queue even when there is no input
        ctx.request_repaint_after(Duration::from_millis(250));

        drain_events(&mut self.controller, &self.events);
        let screen = self.controller.screen().clone();
        let mut actions = Vec::new();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("📍 Location Display");
                ui.separator();
                match (&screen.last_fix, &screen.provider) {
                    (Some(ts), Some(provider)) => {
                        ui.label(format!("Last Update: {} ({})", ts.format("%H:%M:%S UTC"), provider))
                    }
                    _ => ui.label("No data"),
                };
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("❌ Exit").clicked() {
                        actions.push(Action::Quit);
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("notice_panel").show(ctx, |ui| {
            match screen.visible_notice(Instant::now()) {
                Some(message) => ui.label(message),
                None => ui.weak(" "),
            };
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Grid::new("location_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    for (label, value) in screen.fields() {
                        ui.label(format!("{}:", label));
                        ui.monospace(value);
                        ui.end_row();
                    }
                });

            ui.add_space(10.0);
            ui.separator();

            let mut high_accuracy = screen.high_accuracy;
            if ui.checkbox(&mut high_accuracy, "High accuracy (GPS)").changed() {
                actions.push(Action::ToggleAccuracy);
            }
            let mut updates = screen.updates_enabled;
            if ui.checkbox(&mut updates, "Location updates").changed() {
                actions.push(Action::ToggleUpdates);
            }
            if ui.button("Request location access").clicked() {
                actions.push(Action::RequestAccess);
            }
        });

        if let Some(prompt) = screen.prompt {
            egui::Window::new("Location permission")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    if prompt.rationale {
                        ui.label(strings::PERMISSION_RATIONALE);
                    }
                    ui.label(strings::PERMISSION_PROMPT);
                    ui.horizontal(|ui| {
                        if ui.button("Allow").clicked() {
                            actions.push(Action::AnswerPermission(true));
                        }
                        if ui.button("Deny").clicked() {
                            actions.push(Action::AnswerPermission(false));
                        }
                    });
                });
        }

        for action in actions {
            if !apply_action(&mut self.controller, action) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                break;
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.shutdown();
    }
}
