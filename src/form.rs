use eframe::egui;

use crate::canvas::AnnotationCanvas;
use crate::color_grid::ColorGrid;
use crate::model::{
    Dataset, MediaType, SearchQuery, SearchToggles, TOP_K_DEFAULT, TOP_K_MAX, TOP_K_MIN,
    TOP_K_STEP,
};

/// What Enter does inside the query box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnterAction {
    Submit,
    Newline,
}

/// Plain Enter submits; Enter with any modifier held types a newline.
pub fn enter_action(modifiers: egui::Modifiers) -> EnterAction {
    if modifiers.any() {
        EnterAction::Newline
    } else {
        EnterAction::Submit
    }
}

/// Replaces the selected chars (or inserts at the end when nothing is
/// selected) with a newline. Returns the char index just after it.
fn insert_newline(text: &mut String, selection: Option<(usize, usize)>) -> usize {
    let len = text.chars().count();
    let (start, end) = selection.map_or((len, len), |(a, b)| (a.min(b).min(len), a.max(b).min(len)));
    let byte = |index: usize| text.char_indices().nth(index).map_or(text.len(), |(b, _)| b);
    let range = byte(start)..byte(end);
    text.replace_range(range, "\n");
    start + 1
}

fn query_text_id() -> egui::Id {
    egui::Id::new("query_text")
}

/// Left-hand search panel: free text, filters, and the two sketch widgets.
pub struct SearchForm {
    pub text: String,
    pub media_type: MediaType,
    pub dataset: Dataset,
    pub toggles: SearchToggles,
    pub top_k: u32,
    pub canvas: AnnotationCanvas,
    pub colors: ColorGrid,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self::new(MediaType::default(), Dataset::default(), TOP_K_DEFAULT)
    }
}

impl SearchForm {
    pub fn new(media_type: MediaType, dataset: Dataset, top_k: u32) -> Self {
        Self {
            text: String::new(),
            media_type,
            dataset,
            toggles: SearchToggles::default(),
            top_k,
            canvas: AnnotationCanvas::default(),
            colors: ColorGrid::default(),
        }
    }

    /// Snapshots the form into a query. Nothing is built while a search is
    /// still running. Empty text is fine: regions or colors alone can drive
    /// a search.
    pub fn submit(&self, busy: bool) -> Option<SearchQuery> {
        if busy {
            return None;
        }
        Some(SearchQuery {
            text: self.text.trim().to_string(),
            media_type: self.media_type,
            dataset: self.dataset,
            regions: self.canvas.regions().to_vec(),
            colors: self.colors.cells().to_vec(),
            toggles: self.toggles,
            top_k: self.top_k,
        })
    }

    /// Undoes every sketch and the text. Filters stay as they are.
    pub fn reset(&mut self) {
        self.text.clear();
        self.canvas.reset();
        self.colors.reset();
    }

    fn type_newline(&mut self, ctx: &egui::Context, id: egui::Id) {
        let mut state = egui::TextEdit::load_state(ctx, id).unwrap_or_default();
        let selection = state
            .cursor
            .char_range()
            .map(|range| (range.primary.index, range.secondary.index));
        let cursor = insert_newline(&mut self.text, selection);
        state
            .cursor
            .set_char_range(Some(egui::text::CCursorRange::one(egui::text::CCursor::new(cursor))));
        egui::TextEdit::store_state(ctx, id, state);
    }

    /// Draws the panel. Returns true when the user asked to search.
    pub fn show(&mut self, ui: &mut egui::Ui, busy: bool) -> bool {
        let mut wants_submit = false;

        ui.label("Search text");
        let query_id = query_text_id();
        let focused = ui.memory(|m| m.has_focus(query_id));
        if focused && !busy {
            // Every Enter is taken before the text box sees it.
            let action = ui.input_mut(|i| {
                if !i.key_pressed(egui::Key::Enter) {
                    return None;
                }
                let modifiers = i.modifiers;
                i.consume_key(modifiers, egui::Key::Enter);
                Some(enter_action(modifiers))
            });
            match action {
                Some(EnterAction::Submit) => wants_submit = true,
                Some(EnterAction::Newline) => self.type_newline(ui.ctx(), query_id),
                None => {}
            }
        }
        ui.add_enabled(
            !busy,
            egui::TextEdit::multiline(&mut self.text)
                .id(query_id)
                .hint_text("Describe what you are looking for")
                .desired_rows(2)
                .desired_width(f32::INFINITY)
                .return_key(None),
        );
        ui.add_space(8.0);

        ui.label("Media type");
        ui.add_enabled_ui(!busy, |ui| {
            ui.horizontal(|ui| {
                for media in MediaType::ALL {
                    ui.selectable_value(
                        &mut self.media_type,
                        media,
                        format!("{} {}", media.icon(), media.display_name()),
                    );
                }
            });
        });
        ui.add_space(8.0);

        ui.label("Dataset");
        ui.add_enabled_ui(!busy, |ui| {
            egui::ComboBox::from_id_salt("dataset")
                .selected_text(self.dataset.display_name())
                .show_ui(ui, |ui| {
                    for dataset in Dataset::ALL {
                        ui.selectable_value(&mut self.dataset, dataset, dataset.display_name());
                    }
                });
        });
        ui.add_space(12.0);

        egui::Frame::group(ui.style()).show(ui, |ui| self.canvas.show(ui));
        ui.add_space(12.0);
        egui::Frame::group(ui.style()).show(ui, |ui| self.colors.show(ui));
        ui.add_space(12.0);

        ui.label(format!("Top-K: {}", self.top_k));
        ui.add(
            egui::Slider::new(&mut self.top_k, TOP_K_MIN..=TOP_K_MAX)
                .step_by(f64::from(TOP_K_STEP))
                .show_value(false),
        );
        ui.add_space(8.0);

        ui.checkbox(&mut self.toggles.text, "Text search");
        ui.checkbox(&mut self.toggles.ocr, "OCR search");
        ui.checkbox(&mut self.toggles.asr, "ASR search");
        ui.checkbox(&mut self.toggles.object, "Object search");
        ui.add_space(12.0);

        let label = if busy { "Searching..." } else { "🔍 Search" };
        let button = egui::Button::new(label).min_size(egui::vec2(ui.available_width(), 32.0));
        if ui.add_enabled(!busy, button).clicked() {
            wants_submit = true;
        }

        ui.separator();
        if ui
            .add_sized([ui.available_width(), 24.0], egui::Button::new("🔄 Start over").frame(false))
            .clicked()
        {
            self.reset();
        }

        wants_submit
    }
}
