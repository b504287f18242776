use eframe::egui;

use crate::model::{MediaType, SearchResult};

const CARD_WIDTH: f32 = 200.0;
const CARD_HEIGHT: f32 = 134.0;
const ROW_THUMB: f32 = 64.0;
const SCORE_COLOR: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
const SUBMIT_COLOR: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
    #[default]
    Grid,
    List,
}

/// What the results area shows for a given list and loading flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Content {
    Busy,
    Prompt,
    Results,
}

pub fn content(results: &[SearchResult], loading: bool) -> Content {
    if loading {
        Content::Busy
    } else if results.is_empty() {
        Content::Prompt
    } else {
        Content::Results
    }
}

/// Score as a percentage with one decimal, e.g. `87.3%`.
pub fn format_score(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}

/// How the preview overlay presents a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewMedia<'a> {
    Image { uri: &'a str },
    Video { uri: &'a str, poster: &'a str },
    Audio { uri: &'a str },
}

pub fn preview_media(result: &SearchResult) -> PreviewMedia<'_> {
    let uri = result.thumbnail.as_str();
    match result.media_type {
        MediaType::Image => PreviewMedia::Image { uri },
        MediaType::Video => PreviewMedia::Video { uri, poster: uri },
        MediaType::Audio => PreviewMedia::Audio { uri },
    }
}

/// Requests the results area hands back to the shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultAction {
    Submit(String),
    Retry,
}

#[derive(Debug, Default)]
pub struct ResultsView {
    pub layout: LayoutMode,
    preview: Option<SearchResult>,
}

impl ResultsView {
    pub fn preview(&self) -> Option<&SearchResult> {
        self.preview.as_ref()
    }

    pub fn open_preview(&mut self, result: &SearchResult) {
        self.preview = Some(result.clone());
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        results: &[SearchResult],
        loading: bool,
        error: Option<&str>,
    ) -> Option<ResultAction> {
        let mut action = None;

        if let Some(message) = error {
            ui.horizontal(|ui| {
                ui.colored_label(ui.visuals().error_fg_color, format!("Search failed: {message}"));
                if ui.button("Retry").clicked() {
                    action = Some(ResultAction::Retry);
                }
            });
            ui.add_space(8.0);
        }

        match content(results, loading) {
            Content::Busy => {
                placeholder(ui, |ui| {
                    ui.add(egui::Spinner::new().size(48.0));
                    ui.label("Searching for results...");
                });
            }
            Content::Prompt => {
                placeholder(ui, |ui| {
                    ui.label(egui::RichText::new("🔍").size(36.0));
                    ui.weak("Enter a query to start searching");
                });
            }
            Content::Results => {
                self.header(ui, results.len());
                ui.add_space(8.0);
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        let picked = match self.layout {
                            LayoutMode::Grid => grid(ui, results, &mut action),
                            LayoutMode::List => list(ui, results, &mut action),
                        };
                        if let Some(result) = picked {
                            self.open_preview(result);
                        }
                    });
            }
        }

        self.show_preview(ui.ctx());
        action
    }

    fn header(&mut self, ui: &mut egui::Ui, count: usize) {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.heading("Search results");
                ui.weak(format!("Found {count} results"));
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.selectable_value(&mut self.layout, LayoutMode::List, "☰")
                    .on_hover_text("Show as list");
                ui.selectable_value(&mut self.layout, LayoutMode::Grid, "⊞")
                    .on_hover_text("Show as grid");
            });
        });
    }

    fn show_preview(&mut self, ctx: &egui::Context) {
        let Some(result) = self.preview() else {
            return;
        };
        let mut close = false;
        let modal = egui::Modal::new(egui::Id::new("result_preview")).show(ctx, |ui| {
            ui.set_max_width(720.0);
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.heading(&result.title);
                    ui.label(details_line(result, "Accuracy: "));
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("✖").clicked() {
                        close = true;
                    }
                });
            });
            ui.add_space(12.0);
            ui.vertical_centered(|ui| match preview_media(result) {
                PreviewMedia::Image { uri } => {
                    ui.add(egui::Image::new(uri).max_height(384.0).max_width(680.0));
                }
                PreviewMedia::Video { uri, poster } => {
                    ui.add(egui::Image::new(poster).max_height(384.0).max_width(680.0));
                    if ui.button("▶ Play video").clicked() {
                        ui.ctx().open_url(egui::OpenUrl::new_tab(uri));
                    }
                }
                PreviewMedia::Audio { uri } => {
                    ui.label(egui::RichText::new("🔊").size(64.0));
                    if ui.button("▶ Play audio").clicked() {
                        ui.ctx().open_url(egui::OpenUrl::new_tab(uri));
                    }
                }
            });
        });
        if close || modal.should_close() {
            self.close_preview();
        }
    }
}

fn details_line(result: &SearchResult, score_prefix: &str) -> String {
    let mut line = format!(
        "{} {} • {}{}",
        result.media_type.icon(),
        result.media_type,
        score_prefix,
        format_score(result.score)
    );
    if let Some(duration) = &result.duration {
        line.push_str(" • ");
        line.push_str(duration);
    }
    line
}

fn placeholder(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.add_space(96.0);
    ui.vertical_centered(add_contents);
}

fn badge(painter: &egui::Painter, pos: egui::Pos2, align: egui::Align2, text: &str, fill: egui::Color32) {
    let galley = painter.layout_no_wrap(
        text.to_string(),
        egui::FontId::proportional(11.0),
        egui::Color32::WHITE,
    );
    let padding = egui::vec2(6.0, 3.0);
    let rect = align.anchor_size(pos, galley.size() + padding * 2.0);
    painter.rect_filled(rect, 3.0, fill);
    painter.galley(rect.min + padding, galley, egui::Color32::WHITE);
}

fn submit_button(ui: &mut egui::Ui, result: &SearchResult, action: &mut Option<ResultAction>) {
    let button = egui::Button::new(egui::RichText::new("Submit").color(egui::Color32::WHITE).small())
        .fill(SUBMIT_COLOR);
    if ui.add(button).clicked() {
        *action = Some(ResultAction::Submit(result.id.clone()));
    }
}

fn grid<'a>(
    ui: &mut egui::Ui,
    results: &'a [SearchResult],
    action: &mut Option<ResultAction>,
) -> Option<&'a SearchResult> {
    let spacing = ui.spacing().item_spacing.x;
    let columns = ((ui.available_width() + spacing) / (CARD_WIDTH + spacing)).floor().max(1.0) as usize;
    let mut picked = None;

    for row in results.chunks(columns) {
        ui.horizontal(|ui| {
            for result in row {
                ui.vertical(|ui| {
                    ui.set_width(CARD_WIDTH);
                    let response = ui.add(
                        egui::Image::new(result.thumbnail.as_str())
                            .fit_to_exact_size(egui::vec2(CARD_WIDTH, CARD_HEIGHT))
                            .sense(egui::Sense::click()),
                    );
                    let rect = response.rect;
                    let painter = ui.painter_at(rect);
                    badge(
                        &painter,
                        rect.right_top() + egui::vec2(-6.0, 6.0),
                        egui::Align2::RIGHT_TOP,
                        &format_score(result.score),
                        SCORE_COLOR,
                    );
                    if let Some(duration) = &result.duration {
                        badge(
                            &painter,
                            rect.left_bottom() + egui::vec2(6.0, -6.0),
                            egui::Align2::LEFT_BOTTOM,
                            duration,
                            egui::Color32::from_black_alpha(180),
                        );
                    }
                    if response.clicked() {
                        picked = Some(result);
                    }
                    submit_button(ui, result, action);
                });
            }
        });
        ui.add_space(8.0);
    }
    picked
}

fn list<'a>(
    ui: &mut egui::Ui,
    results: &'a [SearchResult],
    action: &mut Option<ResultAction>,
) -> Option<&'a SearchResult> {
    let mut picked = None;
    for result in results {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                let thumb = ui.add(
                    egui::Image::new(result.thumbnail.as_str())
                        .fit_to_exact_size(egui::vec2(ROW_THUMB, ROW_THUMB))
                        .sense(egui::Sense::click()),
                );
                let text = ui
                    .vertical(|ui| {
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(format!(
                                    "{} {}",
                                    result.media_type.icon(),
                                    result.title
                                ))
                                .strong(),
                            )
                            .truncate(),
                        );
                        ui.weak(details_line(result, ""));
                    })
                    .response
                    .interact(egui::Sense::click());
                if thumb.clicked() || text.clicked() {
                    picked = Some(result);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    submit_button(ui, result, action);
                    ui.label(
                        egui::RichText::new(format_score(result.score))
                            .color(egui::Color32::WHITE)
                            .background_color(SCORE_COLOR),
                    );
                });
            });
        });
    }
    picked
}
