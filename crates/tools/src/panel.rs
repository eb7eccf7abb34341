use crate::TunableSource;
use egui::Context as EguiContext;

/// Debug side panel of live sliders, one collapsing section per tunable
/// group, all open by default.
pub struct DebugPanel {
    pub visible: bool,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self { visible: true }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Draw slider groups for `source`, preceded by caller-supplied status
    /// lines. Slider edits go straight through the source's bindings.
    pub fn show(&self, ctx: &EguiContext, source: &mut impl TunableSource, status: &[String]) {
        if !self.visible {
            return;
        }

        egui::SidePanel::right("debug_panel")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Grove");
                ui.separator();
                for line in status {
                    ui.label(line);
                }

                for group in source.tunables() {
                    ui.separator();
                    egui::CollapsingHeader::new(group.name)
                        .default_open(true)
                        .show(ui, |ui| {
                            for tunable in group.tunables {
                                ui.add(
                                    egui::Slider::new(tunable.value, tunable.min..=tunable.max)
                                        .text(tunable.label)
                                        .step_by(tunable.step as f64),
                                );
                            }
                        });
                }

                ui.separator();
                ui.small("F1: Toggle Panel | Click: Capture | WASD: Move | Esc: Release");
            });
    }
}

impl Default for DebugPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tunable, TunableGroup};

    struct OneKnob {
        level: f32,
    }

    impl TunableSource for OneKnob {
        fn tunables(&mut self) -> Vec<TunableGroup<'_>> {
            vec![TunableGroup {
                name: "Level",
                tunables: vec![Tunable::new("level", &mut self.level, 0.0, 1.0, 0.1)],
            }]
        }
    }

    #[test]
    fn hidden_panel_draws_nothing() {
        let ctx = EguiContext::default();
        let mut source = OneKnob { level: 0.5 };
        let mut panel = DebugPanel::new();
        panel.visible = false;

        let output = ctx.run(egui::RawInput::default(), |ctx| {
            panel.show(ctx, &mut source, &[]);
        });
        assert!(output.shapes.is_empty());
    }

    #[test]
    fn visible_panel_emits_shapes() {
        let ctx = EguiContext::default();
        let mut source = OneKnob { level: 0.5 };
        let panel = DebugPanel::new();

        let output = ctx.run(egui::RawInput::default(), |ctx| {
            panel.show(ctx, &mut source, &["status".to_string()]);
        });
        assert!(!output.shapes.is_empty());
    }

    #[test]
    fn toggle_flips_visibility() {
        let mut panel = DebugPanel::new();
        assert!(panel.visible);
        panel.toggle();
        assert!(!panel.visible);
        panel.toggle();
        assert!(panel.visible);
    }
}
