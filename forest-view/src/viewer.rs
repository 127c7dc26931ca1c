//! Token forest desktop app built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the configuration, the
//! explicit UI state and the current [`Forest`], and implements
//! [`eframe::App`] to route between the calculator, forest and
//! call-to-action screens.

use eframe::App;
use forest_core::{
    config::Config,
    emissions::{energy_joules, energy_kwh},
    forest::{Forest, group_thousands},
    scene::{PlacedObject, SceneCounts},
    types::Category,
    usage::TokenCount,
};
use glam::Vec2;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    platform::Platform,
    state::{CalculatorForm, UiState, View},
};

/// Trees drawn by the simple view before summarising the rest.
const SIMPLE_VIEW_MAX_TREES: u64 = 20;

/// Share of the shorter canvas edge the plot fills at zoom 1.
const PLOT_FILL: f32 = 0.8;

/// Main application state.
///
/// [`Viewer`] glues together:
/// - The core: [`Config`] and the current [`Forest`] (estimate + layout).
/// - UI state: the active [`View`], theme and overlay flags, the
///   calculator form, and the canvas pan/zoom.
/// - eframe/egui callbacks for drawing and user interaction.
///
/// ### Fields
/// - `cfg` - Constants for estimation, layout and CSV import.
/// - `rng` - Random source for every generated layout.
/// - `ui` - Current screen, theme and overlay flags.
/// - `form` - Calculator inputs and the last validation error.
/// - `forest` - Result for the last accepted token count, if any.
/// - `zoom` - Multiplier on the fit-to-canvas scale.
/// - `pan` - Screen-space pan offset in pixels.
pub struct Viewer {
    cfg: Config,
    rng: StdRng,
    ui: UiState,
    form: CalculatorForm,
    forest: Option<Forest>,
    zoom: f32,
    pan: egui::Vec2,
}

impl Viewer {
    /// Creates a viewer on the calculator screen.
    ///
    /// ### Parameters
    /// - `cfg` - Validated configuration.
    /// - `seed` - Seed for reproducible layouts; `None` seeds from the OS.
    pub fn new(cfg: Config, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            cfg,
            rng,
            ui: UiState::default(),
            form: CalculatorForm::default(),
            forest: None,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
        }
    }

    /// Grows a forest for `tokens` and switches to the forest screen.
    pub fn show_tokens(&mut self, tokens: TokenCount) {
        self.forest = Some(Forest::grow(tokens, &self.cfg, &mut self.rng));
        self.zoom = 1.0;
        self.pan = egui::vec2(0.0, 0.0);
        self.ui.view = View::Forest;
    }

    /// Validates the calculator form and, on success, shows the forest.
    fn submit(&mut self) {
        match self.form.resolve(&self.cfg.usage) {
            Ok(tokens) => {
                self.form.error = None;
                self.show_tokens(tokens);
            }
            Err(err) => {
                tracing::warn!(error = %err, "rejected token input");
                self.form.error = Some(err.to_string());
            }
        }
    }

    /// Lays out the current forest again with fresh randomness.
    fn regrow(&mut self) {
        if let Some(forest) = self.forest.as_mut() {
            forest.regrow(&self.cfg.scene, &mut self.rng);
        }
    }

    /// Drops the forest and returns to an empty calculator, keeping the platform.
    fn start_over(&mut self) {
        self.forest = None;
        self.form = CalculatorForm {
            platform: self.form.platform,
            ..CalculatorForm::default()
        };
        self.ui.view = View::Calculator;
    }

    /// Screen pixels per world unit for the given drawing area.
    fn pixels_per_unit(&self, rect: egui::Rect) -> f32 {
        let plot = self
            .forest
            .as_ref()
            .map_or(1.0, |f| f.layout.plot_size)
            .max(f32::EPSILON);
        rect.size().min_elem() * PLOT_FILL / plot * self.zoom
    }

    /// Converts a plot position to screen-space.
    ///
    /// World coordinates are scaled to fit the plot in `rect`, offset by
    /// `pan`, and centered inside `rect`. The y-axis is flipped so that
    /// positive y goes up.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let s = self.pixels_per_unit(rect);
        let center = rect.center();
        egui::pos2(
            center.x + p.x * s + self.pan.x,
            center.y - p.y * s + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let s = self.pixels_per_unit(rect);
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / s;
        let y = (center.y - p.y + self.pan.y) / s;
        Vec2::new(x, y)
    }

    /// Builds the top panel (title, per-view actions, theme, FAQ).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        let mut regrow = false;
        let mut start_over = false;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🌳 Token Forest");
                ui.separator();

                match self.ui.view {
                    View::Calculator => {}
                    View::Forest => {
                        if ui.button("↻ Regrow").clicked() {
                            regrow = true;
                        }
                        if let Some(forest) = &self.forest
                            && ui.button("Copy summary").clicked()
                        {
                            ctx.copy_text(forest.summary());
                            tracing::info!("copied share summary");
                        }
                        ui.checkbox(&mut self.ui.simple_view, "Simple view");
                        if ui.button("Continue ➡").clicked() {
                            self.ui.view = View::CallToAction;
                        }
                    }
                    View::CallToAction => {
                        if ui.button("⬅ Back to forest").clicked() {
                            self.ui.view = View::Forest;
                        }
                    }
                }

                if self.ui.view != View::Calculator && ui.button("Start over").clicked() {
                    start_over = true;
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("FAQ").clicked() {
                        self.ui.show_faq = true;
                    }
                    let theme = if self.ui.dark_mode { "☀ Light" } else { "🌙 Dark" };
                    if ui.button(theme).clicked() {
                        self.ui.dark_mode = !self.ui.dark_mode;
                    }
                });
            });
        });

        if regrow {
            self.regrow();
        }
        if start_over {
            self.start_over();
        }
    }

    /// Builds the calculator screen: platform help, token entry and CSV import.
    fn ui_calculator(&mut self, ctx: &egui::Context) {
        let mut submitted = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Calculate your impact");
                ui.label("Enter a token count or import a usage CSV to estimate emissions.");
            });
            ui.separator();

            egui::ComboBox::from_label("Platform")
                .selected_text(self.form.platform.label())
                .show_ui(ui, |ui| {
                    for p in Platform::ALL {
                        ui.selectable_value(&mut self.form.platform, p, p.label());
                    }
                });
            for (i, step) in self.form.platform.export_steps().iter().enumerate() {
                ui.label(format!("{}. {step}", i + 1));
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label("Token count:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.form.tokens_text)
                        .hint_text("e.g. 1000000"),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submitted = true;
                }
            });
            ui.horizontal(|ui| {
                ui.label("Usage CSV file:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.form.csv_path)
                        .hint_text("/path/to/usage-export.csv"),
                );
            });

            if let Some(err) = &self.form.error {
                ui.colored_label(ui.visuals().error_fg_color, err.as_str());
            }

            ui.add_space(8.0);
            if ui.button("Calculate environmental impact").clicked() {
                submitted = true;
            }
        });

        if submitted {
            self.submit();
        }
    }

    /// Builds the left-hand stats panel for the current forest.
    fn ui_stats_panel(&self, ctx: &egui::Context) {
        let Some(forest) = &self.forest else {
            return;
        };
        let e = &forest.estimate;
        let rows = stats_rows(forest, &self.cfg);

        egui::SidePanel::left("stats_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Your oak forest");
                ui.separator();

                egui::Grid::new("stats_grid").num_columns(2).show(ui, |ui| {
                    for (label, value) in rows {
                        ui.label(label);
                        ui.strong(value);
                        ui.end_row();
                    }
                });

                if forest.layout.is_truncated(e) {
                    ui.separator();
                    ui.label(format!(
                        "Showing {} of {} trees.",
                        forest.layout.counts.trees, e.trees_needed
                    ));
                }
            });
    }

    /// Builds the bottom status bar (plot size, object count, zoom).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let Some(forest) = &self.forest else {
            return;
        };
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("zoom = {:.2}", self.zoom));
                ui.separator();
                ui.label(format!("objects = {}", forest.layout.objects.len()));
                ui.label(format!("plot = {:.1}", forest.layout.plot_size));
            });
        });
    }

    /// Builds the central forest canvas, or the simple view when enabled.
    fn ui_forest(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.ui.simple_view {
                self.ui_simple_forest(ui);
                return;
            }

            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.2, 8.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            let Some(forest) = &self.forest else {
                return;
            };

            // Ground first, then undergrowth, trees on top.
            let ground = forest.layout.iter_category(Category::Ground);
            let undergrowth = forest
                .layout
                .objects
                .iter()
                .filter(|o| !matches!(o.category, Category::Ground | Category::Tree));
            let trees = forest.layout.iter_category(Category::Tree);
            for obj in ground.chain(undergrowth).chain(trees) {
                self.draw_object(&painter, rect, obj);
            }
        });
    }

    /// Paints one placed object top-down.
    fn draw_object(&self, painter: &egui::Painter, rect: egui::Rect, obj: &PlacedObject) {
        let color = object_color(obj);

        if obj.category == Category::Ground {
            let half = obj.scale * 0.5;
            let plot = egui::Rect::from_two_pos(
                self.world_to_screen(obj.pos + Vec2::new(-half, -half), rect),
                self.world_to_screen(obj.pos + Vec2::new(half, half), rect),
            );
            let rim = self.pixels_per_unit(rect) * 0.3;
            painter.rect_filled(plot.expand(rim), 4.0, egui::Color32::from_rgb(139, 115, 85));
            painter.rect_filled(plot, 2.0, color);
            return;
        }

        let radius_world = object_radius(obj.category) * obj.scale;
        let center = self.world_to_screen(obj.pos, rect);
        let radius = (radius_world * self.pixels_per_unit(rect)).max(1.5);
        painter.circle_filled(center, radius, color);

        if obj.category.rotates() {
            let tip = self.world_to_screen(obj.pos + Vec2::from_angle(obj.rotation) * radius_world, rect);
            painter.line_segment(
                [center, tip],
                egui::Stroke::new(1.5, egui::Color32::from_rgb(92, 64, 51)),
            );
        }
    }

    /// Glyph-grid forest used when the plot view is switched off.
    fn ui_simple_forest(&self, ui: &mut egui::Ui) {
        let Some(forest) = &self.forest else {
            return;
        };
        let trees = forest.estimate.trees_needed;
        let flowers = SceneCounts::from_trees(trees).flowers;

        ui.vertical_centered(|ui| {
            ui.heading("Your forest");
            ui.label(format!("{trees} oak trees and {flowers} flowers to offset your impact"));
            ui.add_space(12.0);
        });

        ui.horizontal_wrapped(|ui| {
            for _ in 0..trees.min(SIMPLE_VIEW_MAX_TREES) {
                ui.label(egui::RichText::new("🌳").size(28.0));
            }
        });

        if trees > SIMPLE_VIEW_MAX_TREES {
            ui.label(format!("... and {} more trees", trees - SIMPLE_VIEW_MAX_TREES));
        }
    }

    /// Builds the closing screen with offset suggestions.
    fn ui_call_to_action(&mut self, ctx: &egui::Context) {
        let mut start_over = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Offset your footprint");
                ui.add_space(8.0);

                if let Some(forest) = &self.forest {
                    let e = &forest.estimate;
                    ui.label(format!(
                        "Planting {} tree{} absorbs these emissions within a year.",
                        e.trees_needed,
                        if e.trees_needed == 1 { "" } else { "s" }
                    ));
                    ui.label(format!(
                        "A single tree would need about {:.0} days.",
                        e.tree_days()
                    ));
                }

                ui.add_space(12.0);
                ui.label("• Support a verified reforestation project.");
                ui.label("• Prefer smaller models and shorter prompts where they do the job.");
                ui.label("• Share your forest so others can measure theirs.");

                ui.add_space(12.0);
                if ui.button("Calculate again").clicked() {
                    start_over = true;
                }
            });
        });

        if start_over {
            self.start_over();
        }
    }

    /// Floating FAQ window describing the constants in use.
    fn ui_faq(&mut self, ctx: &egui::Context) {
        let e = self.cfg.emissions;

        egui::Window::new("FAQ")
            .open(&mut self.ui.show_faq)
            .collapsible(false)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.strong("How are emissions estimated?");
                ui.label(format!(
                    "Each token is counted as {} g of CO₂ and {} kWh of energy.",
                    e.co2_per_token_g, e.energy_per_token_kwh
                ));
                ui.add_space(6.0);
                ui.strong("How many trees?");
                ui.label(format!(
                    "A mature tree absorbs roughly {} kg of CO₂ per year. The forest \
                     holds enough trees to absorb your emissions within one year, \
                     and always at least one.",
                    e.tree_absorption_kg_year
                ));
                ui.add_space(6.0);
                ui.strong("Is my data uploaded?");
                ui.label("No. Usage files are read locally and nothing is stored.");
            });
    }
}

/// Radius, in world units, of an object at scale 1.
fn object_radius(category: Category) -> f32 {
    match category {
        Category::Tree => 0.5,
        Category::Flower | Category::Mushroom => 0.15,
        Category::Log => 0.3,
        Category::Plant => 0.25,
        Category::Ground => 0.0,
    }
}

/// Label/value pairs for the stats grid.
///
/// Every count is derived from the full `trees_needed`, so the grid stays
/// consistent when the layout is capped.
fn stats_rows(forest: &Forest, cfg: &Config) -> Vec<(&'static str, String)> {
    let e = &forest.estimate;
    let counts = SceneCounts::from_trees(e.trees_needed);
    let kwh = energy_kwh(forest.tokens, &cfg.emissions);
    let joules = energy_joules(forest.tokens, &cfg.emissions);

    vec![
        ("Tokens consumed:", group_thousands(e.tokens)),
        ("CO₂ emissions:", format!("{:.2} kg", e.co2_kg)),
        ("", format!("{:.0} g", e.co2_grams)),
        ("Energy:", format!("{kwh:.3} kWh")),
        ("", format!("{joules:.0} J")),
        ("Oak trees needed:", e.trees_needed.to_string()),
        ("Tree-years to absorb:", format!("{:.2}", e.tree_years)),
        ("Trees for one month:", format!("{:.2}", e.trees_per_month())),
        ("Trees for one day:", format!("{:.2}", e.trees_per_day())),
        ("Flowers:", counts.flowers.to_string()),
        ("Mushrooms:", counts.mushrooms.to_string()),
        ("Logs:", counts.logs.to_string()),
        ("Plants:", counts.plants.to_string()),
    ]
}

/// Fill colour for an object, derived from its category and variant.
fn object_color(obj: &PlacedObject) -> egui::Color32 {
    let v = obj.variant;
    let (r, g, b) = match obj.category {
        Category::Tree if v.ends_with("_dark") => (30, 90, 45),
        Category::Tree if v.ends_with("_fall") => (214, 124, 38),
        Category::Tree => (46, 139, 87),
        Category::Flower if v.contains("purple") => (155, 89, 182),
        Category::Flower if v.contains("red") => (220, 60, 60),
        Category::Flower => (240, 200, 40),
        Category::Mushroom if v.contains("red") => (200, 40, 40),
        Category::Mushroom => (210, 180, 140),
        Category::Log => (139, 90, 43),
        Category::Plant => (85, 160, 70),
        Category::Ground => (74, 124, 89),
    };
    egui::Color32::from_rgb(r, g, b)
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(if self.ui.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        self.ui_top_panel(ctx);
        match self.ui.view {
            View::Calculator => self.ui_calculator(ctx),
            View::Forest => {
                self.ui_stats_panel(ctx);
                self.ui_status_bar(ctx);
                self.ui_forest(ctx);
            }
            View::CallToAction => self.ui_call_to_action(ctx),
        }
        self.ui_faq(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn viewer_with_forest(tokens: f64) -> Viewer {
        let mut viewer = Viewer::new(Config::default(), Some(1));
        viewer.show_tokens(TokenCount::new(tokens).unwrap());
        viewer
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = viewer_with_forest(1_000_000.0);
        // Use non-trivial zoom and pan to exercise the math.
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        let world_points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, -1.5),
            Vec2::new(-2.25, 4.0),
        ];

        let eps = 1e-4;

        for p in world_points {
            let screen = viewer.world_to_screen(p, rect);
            let back = viewer.screen_to_world(screen, rect);

            assert!(
                (back.x - p.x).abs() < eps && (back.y - p.y).abs() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn plot_fits_canvas_at_default_zoom() {
        let viewer = viewer_with_forest(1_000_000.0);
        let rect = test_rect();
        let half = viewer.forest.as_ref().unwrap().layout.plot_size / 2.0;

        let left = viewer.world_to_screen(Vec2::new(-half, 0.0), rect);
        let right = viewer.world_to_screen(Vec2::new(half, 0.0), rect);
        assert!((right.x - left.x - 600.0 * PLOT_FILL).abs() < 1e-3);
    }

    #[test]
    fn show_tokens_grows_forest_and_switches_view() {
        let viewer = viewer_with_forest(1_000_000.0);

        assert_eq!(viewer.ui.view, View::Forest);
        let forest = viewer.forest.as_ref().unwrap();
        assert_eq!(forest.estimate.trees_needed, 5);
        assert_eq!(forest.layout.count(Category::Tree), 5);
    }

    #[test]
    fn invalid_submission_keeps_calculator_and_reports_error() {
        let mut viewer = Viewer::new(Config::default(), Some(1));
        viewer.form.tokens_text = "-12".into();

        viewer.submit();

        assert_eq!(viewer.ui.view, View::Calculator);
        assert!(viewer.forest.is_none());
        assert!(viewer.form.error.as_deref().unwrap().contains("greater than zero"));
    }

    #[test]
    fn valid_submission_clears_previous_error() {
        let mut viewer = Viewer::new(Config::default(), Some(1));
        viewer.form.error = Some("old".into());
        viewer.form.tokens_text = "100".into();

        viewer.submit();

        assert_eq!(viewer.ui.view, View::Forest);
        assert!(viewer.form.error.is_none());
    }

    #[test]
    fn start_over_resets_but_keeps_platform() {
        let mut viewer = viewer_with_forest(1_000_000.0);
        viewer.form.platform = Platform::Claude;
        viewer.form.tokens_text = "1000000".into();
        viewer.ui.view = View::CallToAction;

        viewer.start_over();

        assert_eq!(viewer.ui.view, View::Calculator);
        assert!(viewer.forest.is_none());
        assert_eq!(viewer.form.platform, Platform::Claude);
        assert!(viewer.form.tokens_text.is_empty());
    }

    #[test]
    fn regrow_keeps_counts_and_moves_trees() {
        let mut viewer = viewer_with_forest(50_000_000.0);
        let before = viewer.forest.as_ref().unwrap().layout.clone();

        viewer.regrow();

        let after = &viewer.forest.as_ref().unwrap().layout;
        assert_eq!(after.counts, before.counts);
        assert_ne!(after.objects, before.objects);
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let a = viewer_with_forest(10_000_000.0);
        let b = viewer_with_forest(10_000_000.0);
        assert_eq!(a.forest, b.forest);
    }

    #[test]
    fn stats_rows_follow_trees_needed_when_layout_is_capped() {
        let mut cfg = Config::default();
        cfg.scene.max_trees = Some(10);
        let mut viewer = Viewer::new(cfg, Some(1));
        viewer.show_tokens(TokenCount::new(50_000_000.0).unwrap());

        let forest = viewer.forest.as_ref().unwrap();
        assert_eq!(forest.estimate.trees_needed, 207);
        assert_eq!(forest.layout.counts.trees, 10);

        let rows = stats_rows(forest, &viewer.cfg);
        let value = |label: &str| {
            rows.iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(value("Oak trees needed:"), "207");
        assert_eq!(value("Flowers:"), "69");
        assert_eq!(value("Mushrooms:"), "20");
        assert_eq!(value("Logs:"), "20");
        assert_eq!(value("Plants:"), "41");
        assert!(rows.iter().any(|(l, _)| *l == "Trees for one day:"));
        assert!(rows.iter().any(|(_, v)| v.ends_with(" J")));
    }

    #[test]
    fn colors_distinguish_tree_variants() {
        let tree = |variant| PlacedObject {
            category: Category::Tree,
            variant,
            pos: Vec2::ZERO,
            scale: 1.0,
            rotation: 0.0,
        };
        let base = object_color(&tree("tree_oak"));
        let dark = object_color(&tree("tree_oak_dark"));
        let fall = object_color(&tree("tree_oak_fall"));
        assert_ne!(base, dark);
        assert_ne!(base, fall);
        assert_ne!(dark, fall);
    }
}
