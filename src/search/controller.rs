use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Sleep};

use super::dispatcher::{run_until_cancelled, LatestWins, DEFAULT_QUIET_PERIOD};
use super::recent::RecentSearches;
use super::{SearchError, SearchResult, Searcher};

/// The dropdown never shows more than this many results.
pub const DEFAULT_MAX_RESULTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Escape,
}

#[derive(Debug, Clone)]
enum SearchEvent {
    Input(String),
    Key(Key),
    Focus,
    Clear,
    ClickOutside,
    PickRecent(String),
}

/// Side effects the host is expected to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    Navigate(String),
    Blur,
    Focus,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// Selection cursor; `None` means nothing highlighted.
    pub selected: Option<usize>,
    pub panel_open: bool,
    pub loading: bool,
    /// Set when the lookup fails for a reason other than cancellation.
    pub error: Option<String>,
    pub recents: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub quiet_period: Duration,
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Handle to a running search box. Dropping it tears the task down, which
/// cancels any in-flight lookup and releases every subscription.
pub struct SearchBox {
    events: mpsc::UnboundedSender<SearchEvent>,
    state: watch::Receiver<SearchState>,
}

impl SearchBox {
    pub fn spawn(
        searcher: Arc<dyn Searcher>,
        recents: RecentSearches,
        options: SearchOptions,
    ) -> (SearchBox, mpsc::UnboundedReceiver<SearchAction>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let state = SearchState {
            recents: recents.entries().to_vec(),
            ..SearchState::default()
        };
        let (state_tx, state_rx) = watch::channel(state.clone());

        let task = SearchTask {
            searcher,
            recents,
            options,
            state,
            state_tx,
            actions: action_tx,
            tokens: LatestWins::new(),
        };
        tokio::spawn(task.run(event_rx));

        (
            SearchBox {
                events: event_tx,
                state: state_rx,
            },
            action_rx,
        )
    }

    /// Replace the query text with the latest input value.
    pub fn input(&self, text: impl Into<String>) {
        let _ = self.events.send(SearchEvent::Input(text.into()));
    }

    pub fn key(&self, key: Key) {
        let _ = self.events.send(SearchEvent::Key(key));
    }

    pub fn focus(&self) {
        let _ = self.events.send(SearchEvent::Focus);
    }

    pub fn clear(&self) {
        let _ = self.events.send(SearchEvent::Clear);
    }

    pub fn click_outside(&self) {
        let _ = self.events.send(SearchEvent::ClickOutside);
    }

    pub fn pick_recent(&self, query: impl Into<String>) {
        let _ = self.events.send(SearchEvent::PickRecent(query.into()));
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Wait for the next state change and return the new state.
    pub async fn changed(&mut self) -> SearchState {
        let _ = self.state.changed().await;
        self.state.borrow_and_update().clone()
    }
}

type Inflight = Pin<Box<dyn Future<Output = Result<Vec<SearchResult>, SearchError>> + Send>>;

enum Step {
    Event(Option<SearchEvent>),
    QuietPeriodOver,
    Settled(Result<Vec<SearchResult>, SearchError>),
}

struct SearchTask {
    searcher: Arc<dyn Searcher>,
    recents: RecentSearches,
    options: SearchOptions,
    state: SearchState,
    state_tx: watch::Sender<SearchState>,
    actions: mpsc::UnboundedSender<SearchAction>,
    tokens: LatestWins,
}

impl SearchTask {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<SearchEvent>) {
        let mut debounce: Option<Pin<Box<Sleep>>> = None;
        let mut inflight: Option<Inflight> = None;

        loop {
            let step = tokio::select! {
                event = events.recv() => Step::Event(event),
                _ = wait_some(debounce.as_mut()) => Step::QuietPeriodOver,
                outcome = wait_some(inflight.as_mut()) => Step::Settled(outcome),
            };

            match step {
                Step::Event(Some(event)) => self.handle(event, &mut debounce, &mut inflight),
                // every handle dropped: tear down
                Step::Event(None) => break,
                Step::QuietPeriodOver => {
                    debounce = None;
                    self.fire(&mut inflight);
                }
                Step::Settled(outcome) => {
                    inflight = None;
                    self.settle(outcome);
                }
            }
        }

        self.tokens.cancel();
    }

    fn handle(
        &mut self,
        event: SearchEvent,
        debounce: &mut Option<Pin<Box<Sleep>>>,
        inflight: &mut Option<Inflight>,
    ) {
        match event {
            SearchEvent::Input(text) => {
                self.state.query = text;
                self.state.selected = None;
                self.state.error = None;
                // every keystroke restarts the quiet period
                *debounce = Some(Box::pin(sleep(self.options.quiet_period)));
            }
            SearchEvent::Key(Key::Down) => {
                if self.state.results.is_empty() {
                    return;
                }
                let last = self.state.results.len() - 1;
                self.state.selected = Some(match self.state.selected {
                    None => 0,
                    Some(index) => (index + 1).min(last),
                });
            }
            SearchEvent::Key(Key::Up) => {
                if self.state.results.is_empty() {
                    return;
                }
                self.state.selected = match self.state.selected {
                    None | Some(0) => None,
                    Some(index) => Some(index - 1),
                };
            }
            SearchEvent::Key(Key::Enter) => {
                if let Some(index) = self.state.selected {
                    if let Some(result) = self.state.results.get(index) {
                        let _ = self
                            .actions
                            .send(SearchAction::Navigate(result.url.clone()));
                        self.state.panel_open = false;
                    }
                } else {
                    let query = self.state.query.trim().to_string();
                    if !query.is_empty() {
                        self.recents.record(&query);
                        self.state.recents = self.recents.entries().to_vec();
                        let _ = self.actions.send(SearchAction::Navigate(format!(
                            "/search?q={}",
                            urlencoding::encode(&query)
                        )));
                        self.state.panel_open = false;
                    }
                }
            }
            SearchEvent::Key(Key::Escape) => {
                self.state.panel_open = false;
                self.state.selected = None;
                let _ = self.actions.send(SearchAction::Blur);
            }
            SearchEvent::Focus => {
                self.state.panel_open = true;
            }
            SearchEvent::Clear => {
                self.state.query.clear();
                self.state.results.clear();
                self.state.selected = None;
                self.state.panel_open = false;
                self.state.loading = false;
                self.state.error = None;
                *debounce = None;
                *inflight = None;
                self.tokens.cancel();
                let _ = self.actions.send(SearchAction::Focus);
            }
            SearchEvent::ClickOutside => {
                self.state.panel_open = false;
            }
            SearchEvent::PickRecent(query) => {
                self.state.query = query;
                self.state.selected = None;
                self.state.error = None;
                *debounce = None;
                // picking a recent search skips the quiet period
                self.fire(inflight);
            }
        }

        self.publish();
    }

    fn fire(&mut self, inflight: &mut Option<Inflight>) {
        let query = self.state.query.trim().to_string();
        if query.is_empty() {
            self.state.results.clear();
            self.state.panel_open = false;
            self.state.loading = false;
            *inflight = None;
            self.tokens.cancel();
            self.publish();
            return;
        }

        self.state.loading = true;
        let token = self.tokens.begin();
        let searcher = self.searcher.clone();
        *inflight = Some(Box::pin(async move {
            run_until_cancelled(token, async move { searcher.search(&query).await }).await
        }));
        self.publish();
    }

    fn settle(&mut self, outcome: Result<Vec<SearchResult>, SearchError>) {
        match outcome {
            Ok(mut results) => {
                results.truncate(self.options.max_results);
                if self
                    .state
                    .selected
                    .is_some_and(|index| index >= results.len())
                {
                    self.state.selected = None;
                }
                self.state.results = results;
                self.state.panel_open = true;
                self.state.loading = false;
                self.state.error = None;
            }
            // superseded; the newest invocation owns the displayed state
            Err(SearchError::Cancelled) => {}
            Err(SearchError::Failed(err)) => {
                tracing::warn!("search failed: {}", err);
                self.state.loading = false;
                self.state.error = Some(err.to_string());
            }
        }
        self.publish();
    }

    fn publish(&self) {
        let _ = self.state_tx.send(self.state.clone());
    }
}

async fn wait_some<F>(fut: Option<&mut F>) -> F::Output
where
    F: Future + Unpin,
{
    match fut {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::search::recent::MemoryStore;
    use crate::search::SearchResultKind;

    struct Scripted {
        calls: Mutex<Vec<String>>,
        completions: Mutex<Vec<String>>,
        delays: HashMap<String, Duration>,
        result_count: usize,
    }

    impl Scripted {
        fn new(result_count: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                completions: Mutex::new(Vec::new()),
                delays: HashMap::new(),
                result_count,
            }
        }

        fn with_delay(mut self, query: &str, delay: Duration) -> Self {
            self.delays.insert(query.to_string(), delay);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn completions(&self) -> Vec<String> {
            self.completions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Searcher for Scripted {
        async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchResult>> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                sleep(*delay).await;
            }
            self.completions.lock().unwrap().push(query.to_string());

            Ok((0..self.result_count)
                .map(|index| SearchResult {
                    id: format!("{}-{}", query, index),
                    kind: SearchResultKind::Post,
                    title: format!("{} #{}", query, index),
                    subtitle: None,
                    thumbnail: None,
                    url: format!("/posts/{}-{}", query, index),
                })
                .collect())
        }
    }

    struct Failing;

    #[async_trait]
    impl Searcher for Failing {
        async fn search(&self, _query: &str) -> anyhow::Result<Vec<SearchResult>> {
            Err(anyhow::anyhow!("backend unavailable"))
        }
    }

    fn spawn_box(
        searcher: Arc<dyn Searcher>,
    ) -> (SearchBox, mpsc::UnboundedReceiver<SearchAction>) {
        let recents = RecentSearches::load(Arc::new(MemoryStore::new()));
        SearchBox::spawn(searcher, recents, SearchOptions::default())
    }

    /// Let the component task drain its event queue (virtual time).
    async fn tick() {
        sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_coalesce_into_one_lookup() {
        let searcher = Arc::new(Scripted::new(3));
        let (search_box, _actions) = spawn_box(searcher.clone());

        search_box.input("c");
        sleep(Duration::from_millis(100)).await;
        search_box.input("ca");
        sleep(Duration::from_millis(100)).await;
        search_box.input("cat");
        sleep(Duration::from_millis(400)).await;

        assert_eq!(searcher.calls(), ["cat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_keystrokes_each_trigger_a_lookup() {
        let searcher = Arc::new(Scripted::new(1));
        let (search_box, _actions) = spawn_box(searcher.clone());

        search_box.input("a");
        sleep(Duration::from_millis(400)).await;
        search_box.input("ab");
        sleep(Duration::from_millis(400)).await;

        assert_eq!(searcher.calls(), ["a", "ab"]);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_lookup_never_lands() {
        let searcher = Arc::new(
            Scripted::new(2)
                .with_delay("cat", Duration::from_millis(500))
                .with_delay("cats", Duration::from_millis(10)),
        );
        let (search_box, _actions) = spawn_box(searcher.clone());

        search_box.input("cat");
        sleep(Duration::from_millis(350)).await;
        // "cat" is now in flight and slow; a new keystroke supersedes it
        search_box.input("cats");
        sleep(Duration::from_millis(1000)).await;

        assert_eq!(searcher.calls(), ["cat", "cats"]);
        assert_eq!(searcher.completions(), ["cats"]);

        let state = search_box.state();
        assert!(state.results.iter().all(|r| r.id.starts_with("cats-")));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_clears_without_a_lookup() {
        let searcher = Arc::new(Scripted::new(2));
        let (search_box, _actions) = spawn_box(searcher.clone());

        search_box.input("cat");
        sleep(Duration::from_millis(400)).await;
        assert!(!search_box.state().results.is_empty());

        search_box.input("   ");
        sleep(Duration::from_millis(400)).await;

        let state = search_box.state();
        assert!(state.results.is_empty());
        assert!(!state.panel_open);
        assert_eq!(searcher.calls(), ["cat"]);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_is_bounded_and_does_not_wrap() {
        let searcher = Arc::new(Scripted::new(3));
        let (search_box, _actions) = spawn_box(searcher);

        search_box.input("abc");
        sleep(Duration::from_millis(400)).await;
        assert_eq!(search_box.state().results.len(), 3);
        assert_eq!(search_box.state().selected, None);

        let expected = [Some(0), Some(1), Some(2), Some(2)];
        for want in expected {
            search_box.key(Key::Down);
            tick().await;
            assert_eq!(search_box.state().selected, want);
        }

        let expected = [Some(1), Some(0), None, None];
        for want in expected {
            search_box.key(Key::Up);
            tick().await;
            assert_eq!(search_box.state().selected, want);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn enter_on_a_selection_navigates_without_recording() {
        let searcher = Arc::new(Scripted::new(2));
        let (search_box, mut actions) = spawn_box(searcher);

        search_box.input("abc");
        sleep(Duration::from_millis(400)).await;
        search_box.key(Key::Down);
        tick().await;
        search_box.key(Key::Enter);

        assert_eq!(
            actions.recv().await,
            Some(SearchAction::Navigate("/posts/abc-0".to_string()))
        );
        let state = search_box.state();
        assert!(!state.panel_open);
        assert!(state.recents.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn enter_without_a_selection_records_and_navigates() {
        let searcher = Arc::new(Scripted::new(2));
        let (search_box, mut actions) = spawn_box(searcher);

        search_box.input("nextjs");
        sleep(Duration::from_millis(400)).await;
        search_box.key(Key::Enter);

        assert_eq!(
            actions.recv().await,
            Some(SearchAction::Navigate("/search?q=nextjs".to_string()))
        );
        assert_eq!(search_box.state().recents, ["nextjs"]);

        // resubmitting the same query must not duplicate the entry
        search_box.input("nextjs");
        sleep(Duration::from_millis(400)).await;
        search_box.key(Key::Enter);
        actions.recv().await;
        assert_eq!(search_box.state().recents, ["nextjs"]);
    }

    #[tokio::test(start_paused = true)]
    async fn escape_closes_the_panel_but_keeps_the_query() {
        let searcher = Arc::new(Scripted::new(2));
        let (search_box, mut actions) = spawn_box(searcher);

        search_box.input("cats");
        sleep(Duration::from_millis(400)).await;
        assert!(search_box.state().panel_open);

        search_box.key(Key::Escape);
        assert_eq!(actions.recv().await, Some(SearchAction::Blur));

        let state = search_box.state();
        assert!(!state.panel_open);
        assert_eq!(state.query, "cats");
    }

    #[tokio::test(start_paused = true)]
    async fn click_outside_closes_the_panel_only() {
        let searcher = Arc::new(Scripted::new(2));
        let (search_box, _actions) = spawn_box(searcher);

        search_box.input("cats");
        sleep(Duration::from_millis(400)).await;

        search_box.click_outside();
        tick().await;

        let state = search_box.state();
        assert!(!state.panel_open);
        assert_eq!(state.query, "cats");
        assert!(!state.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn picking_a_recent_search_skips_the_quiet_period() {
        let searcher = Arc::new(Scripted::new(1));
        let (search_box, _actions) = spawn_box(searcher.clone());

        search_box.pick_recent("dogs");
        sleep(Duration::from_millis(50)).await;

        assert_eq!(searcher.calls(), ["dogs"]);
        assert_eq!(search_box.state().query, "dogs");
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_failures_surface_on_the_state() {
        let (search_box, _actions) = spawn_box(Arc::new(Failing));

        search_box.input("anything");
        sleep(Duration::from_millis(400)).await;

        let state = search_box.state();
        assert!(state.error.is_some());
        assert!(!state.loading);
        assert!(state.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn results_are_capped_at_max_results() {
        let searcher = Arc::new(Scripted::new(20));
        let recents = RecentSearches::load(Arc::new(MemoryStore::new()));
        let (search_box, _actions) =
            SearchBox::spawn(searcher, recents, SearchOptions::default());

        search_box.input("many");
        sleep(Duration::from_millis(400)).await;

        assert_eq!(search_box.state().results.len(), DEFAULT_MAX_RESULTS);
    }
}
