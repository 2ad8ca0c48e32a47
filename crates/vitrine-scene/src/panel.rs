//! Debug panel using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use vitrine_core::{ParamChange, ParamId, ParamValue, ToneMapping};

use crate::materials::MaterialRefreshStats;
use crate::models::{ModelState, ModelStatus};
use crate::types::{DebugSettings, ParamChanged};

pub struct PanelPlugin;

impl Plugin for PanelPlugin {
    fn build(&self, app: &mut App) {
        // Runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
        app.add_systems(EguiPrimaryContextPass, panel_system);
    }
}

fn panel_system(
    mut contexts: EguiContexts,
    settings: Res<DebugSettings>,
    model_state: Res<ModelState>,
    refresh_stats: Res<MaterialRefreshStats>,
    mut changes: MessageWriter<ParamChanged>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::Window::new("Réglages")
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .default_width(280.0)
        .show(ctx, |ui| {
            for id in ParamId::panel_order(model_state.is_loaded()) {
                match settings.0.get(id) {
                    ParamValue::Number(current) => {
                        let Some(spec) = id.numeric_spec() else { continue };
                        let mut value = current;
                        let response = ui.add(
                            egui::Slider::new(&mut value, spec.min..=spec.max)
                                .step_by(spec.step as f64)
                                .text(spec.label),
                        );
                        if response.changed() && value != current {
                            changes.write(ParamChanged(ParamChange::number(id, value)));
                        }
                    }
                    ParamValue::ToneMapping(current) => {
                        let mut selected = current;
                        egui::ComboBox::from_label(id.label())
                            .selected_text(current.label())
                            .show_ui(ui, |ui| {
                                for mode in ToneMapping::ALL {
                                    ui.selectable_value(&mut selected, mode, mode.label());
                                }
                            });
                        if selected != current {
                            changes.write(ParamChanged(ParamChange::tone_mapping(selected)));
                        }
                    }
                }
            }

            ui.separator();

            let status = model_state.status.label();
            match model_state.status {
                ModelStatus::Failed(_) => ui.colored_label(egui::Color32::RED, status),
                _ => ui.label(status),
            };
            ui.weak(format!(
                "Surfaces rafraîchies : {} / {}",
                refresh_stats.last.visited - refresh_stats.last.skipped,
                refresh_stats.last.visited
            ));

            if ui.button("Exporter").clicked() {
                match settings.0.to_json() {
                    Ok(json) => info!("Réglages exportés :\n{}", json),
                    Err(e) => error!("Failed to export settings: {}", e),
                }
            }
        });
}
