use eframe::egui;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::form::SearchForm;
use crate::model::{SearchQuery, SearchResult};
use crate::results::{ResultAction, ResultsView};
use crate::search::{RequestId, SearchBackend, SearchDispatcher, SearchOutcome};

const PANEL_WIDTH: f32 = 400.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Loading,
    Failed(String),
}

/// Top-level window: search panel on the left, results on the right.
pub struct SearchApp {
    form: SearchForm,
    results_view: ResultsView,
    results: Vec<SearchResult>,
    status: SearchStatus,
    last_query: Option<SearchQuery>,
    dispatcher: SearchDispatcher,
}

impl SearchApp {
    pub fn new(backend: Arc<dyn SearchBackend>, config: &AppConfig) -> Self {
        Self {
            form: SearchForm::new(
                config.default_media_type,
                config.default_dataset,
                config.default_top_k,
            ),
            results_view: ResultsView::default(),
            results: Vec::new(),
            status: SearchStatus::Idle,
            last_query: None,
            dispatcher: SearchDispatcher::new(backend),
        }
    }

    pub fn with_repaint(self, ctx: egui::Context) -> Self {
        Self {
            dispatcher: self.dispatcher.with_repaint(ctx),
            ..self
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }

    /// Sends the current form. Returns false when a search is already running.
    pub fn submit(&mut self) -> bool {
        match self.form.submit(self.is_loading()) {
            Some(query) => {
                self.start_search(query);
                true
            }
            None => false,
        }
    }

    /// Re-sends the query that failed.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.status, SearchStatus::Failed(_)) {
            return false;
        }
        match self.last_query.clone() {
            Some(query) => {
                self.start_search(query);
                true
            }
            None => false,
        }
    }

    fn start_search(&mut self, query: SearchQuery) {
        match serde_json::to_string(&query) {
            Ok(json) => debug!("query: {json}"),
            Err(err) => debug!("query not serializable: {err}"),
        }
        let id = self.dispatcher.dispatch(query.clone());
        info!(
            "search {id}: {:?} in {} using {}",
            query.text, query.media_type, query.dataset
        );
        self.last_query = Some(query);
        self.status = SearchStatus::Loading;
    }

    pub fn poll_search(&mut self) {
        if let Some((id, outcome)) = self.dispatcher.poll() {
            self.apply_outcome(id, outcome);
        }
    }

    fn apply_outcome(&mut self, id: RequestId, outcome: SearchOutcome) {
        match outcome {
            Ok(results) => {
                info!("search {id} returned {} results", results.len());
                self.results = results;
                self.status = SearchStatus::Idle;
            }
            Err(err) => {
                warn!("search {id} failed: {err}");
                self.status = SearchStatus::Failed(err.to_string());
            }
        }
    }

    fn handle_action(&mut self, action: ResultAction) {
        match action {
            ResultAction::Submit(id) => info!("submitting result {id}"),
            ResultAction::Retry => {
                self.retry();
            }
        }
    }
}

impl eframe::App for SearchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_search();
        let busy = self.is_loading();

        let wants_submit = egui::SidePanel::left("search_panel")
            .resizable(false)
            .exact_width(PANEL_WIDTH)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .show(ui, |ui| {
                        ui.add_space(8.0);
                        self.form.show(ui, busy)
                    })
                    .inner
            })
            .inner;
        if wants_submit {
            self.submit();
        }

        let error = match &self.status {
            SearchStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        };
        let action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                self.results_view
                    .show(ui, &self.results, self.status == SearchStatus::Loading, error)
            })
            .inner;
        if let Some(action) = action {
            self.handle_action(action);
        }
    }
}
