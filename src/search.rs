use eframe::egui;
use log::warn;
use rand::Rng;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use crate::error::SearchError;
use crate::model::{SearchQuery, SearchResult};

pub type RequestId = u64;
pub type SearchOutcome = Result<Vec<SearchResult>, SearchError>;

/// Whatever answers queries: the demo mock, or a retrieval service client.
/// Called on a worker thread, so it may block.
pub trait SearchBackend: Send + Sync {
    fn search(&self, query: &SearchQuery) -> SearchOutcome;
}

// ── Mock Backend ────────────────────────────────────────────────────────────

/// Fabricates `top_k` results with random scores after a fixed delay.
pub struct MockBackend {
    latency: Duration,
    failure_rate: f32,
}

impl MockBackend {
    pub fn new(latency: Duration, failure_rate: f32) -> Self {
        Self {
            latency,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    fn fabricate(query: &SearchQuery, rng: &mut impl Rng) -> Vec<SearchResult> {
        let nonce: u32 = rng.random();
        (0..query.top_k)
            .map(|i| SearchResult {
                id: format!("result-{i}"),
                media_type: query.media_type,
                thumbnail: format!(
                    "https://picsum.photos/300/200?random={}",
                    nonce.wrapping_add(i)
                ),
                title: format!(
                    "{} {} - {} ({})",
                    query.media_type,
                    i + 1,
                    query.text,
                    query.dataset
                ),
                duration: query
                    .media_type
                    .is_timed()
                    .then(|| format!("{}s", rng.random_range(0..300))),
                score: rng.random::<f32>(),
            })
            .collect()
    }
}

impl SearchBackend for MockBackend {
    fn search(&self, query: &SearchQuery) -> SearchOutcome {
        std::thread::sleep(self.latency);
        let mut rng = rand::rng();
        if self.failure_rate > 0.0 && rng.random::<f32>() < self.failure_rate {
            return Err(SearchError::Backend("simulated outage".to_string()));
        }
        Ok(Self::fabricate(query, &mut rng))
    }
}

// ── Dispatcher ──────────────────────────────────────────────────────────────

struct InFlight {
    id: RequestId,
    rx: Receiver<SearchOutcome>,
}

/// Runs each search on its own worker thread. Only the most recent request
/// is listened to; replies to earlier ones go nowhere.
pub struct SearchDispatcher {
    backend: Arc<dyn SearchBackend>,
    next_id: RequestId,
    in_flight: Option<InFlight>,
    repaint: Option<egui::Context>,
}

impl SearchDispatcher {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            next_id: 1,
            in_flight: None,
            repaint: None,
        }
    }

    /// Wake the UI when a reply lands.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    pub fn dispatch(&mut self, query: SearchQuery) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        if let Some(previous) = self.in_flight.take() {
            warn!("request {} superseded by {}, its reply will be dropped", previous.id, id);
        }

        let (tx, rx) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        let repaint = self.repaint.clone();
        std::thread::spawn(move || {
            let outcome = backend.search(&query);
            if tx.send(outcome).is_err() {
                warn!("dropping stale reply to request {id}");
            }
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });

        self.in_flight = Some(InFlight { id, rx });
        id
    }

    /// Non-blocking check for the latest request's reply.
    pub fn poll(&mut self) -> Option<(RequestId, SearchOutcome)> {
        let in_flight = self.in_flight.as_ref()?;
        let outcome = match in_flight.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(SearchError::Disconnected),
        };
        let id = in_flight.id;
        self.in_flight = None;
        Some((id, outcome))
    }
}

#[cfg(test)]
impl SearchDispatcher {
    /// Blocks until the latest request replies or the timeout passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<(RequestId, SearchOutcome)> {
        let in_flight = self.in_flight.take()?;
        let outcome = match in_flight.rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.in_flight = Some(in_flight);
                return None;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(SearchError::Disconnected),
        };
        Some((in_flight.id, outcome))
    }
}
