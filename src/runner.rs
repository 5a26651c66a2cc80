use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::api::{AddEmployeeResponse, ApiClient, ApiError, Endpoints};
use crate::map::{MapView, RefreshSummary};
use crate::model::{Employee, FormError, NewEmployee};
use crate::query::{FuzzyMatcher, PageView, ViewState, DEFAULT_PAGE_SIZE, DEFAULT_THRESHOLD};
use crate::store::{ApplyOutcome, FetchTicket, RecordStore};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct Options {
    pub endpoints: Endpoints,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
    pub page_size: usize,
    pub search_threshold: f64,
    pub refresh_interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            proxy: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_threshold: DEFAULT_THRESHOLD,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid page_size {value}, expected positive integer")]
    InvalidPageSize { value: usize },

    #[error("invalid search_threshold {value}, expected a value between 0 and 1")]
    InvalidThreshold { value: f64 },

    #[error("invalid timeout {value}, expected positive number of seconds")]
    InvalidTimeout { value: u64 },

    #[error("refresh interval must be greater than zero")]
    InvalidRefreshInterval,

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("failed to write output file: {path}: {source}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render output: {source}")]
    Render {
        #[from]
        source: serde_json::Error,
    },

    #[error("output writer for {path} stopped")]
    OutputClosed { path: String },

    #[error("fetch task failed: {source}")]
    TaskJoin {
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Control messages for [`Runner::watch_map`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchEvent {
    /// Start a fetch cycle now, alongside any that are still in flight.
    Refresh,
    Stop,
}

#[derive(Debug)]
pub enum WatchUpdate<'a> {
    Refreshed {
        generation: u64,
        summary: RefreshSummary,
        map: &'a MapView,
    },
    Stale {
        generation: u64,
        current: u64,
    },
    Failed {
        generation: u64,
        error: &'a ApiError,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub started: usize,
    pub applied: usize,
    pub stale: usize,
    pub failed: usize,
}

/// Owns the API client and the record store.
#[derive(Debug)]
pub struct Runner {
    options: Options,
    client: ApiClient,
    store: RecordStore,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.page_size == 0 {
            return Err(RunnerError::InvalidPageSize {
                value: options.page_size,
            });
        }
        if !(0.0..=1.0).contains(&options.search_threshold) {
            return Err(RunnerError::InvalidThreshold {
                value: options.search_threshold,
            });
        }
        if options.timeout_seconds == 0 {
            return Err(RunnerError::InvalidTimeout {
                value: options.timeout_seconds,
            });
        }
        if options.refresh_interval.is_zero() {
            return Err(RunnerError::InvalidRefreshInterval);
        }
        options.endpoints.validate()?;

        let http = build_http_client(options.proxy.as_deref(), options.timeout_seconds)?;
        let client = ApiClient::new(http, options.endpoints.clone());
        Ok(Self {
            options,
            client,
            store: RecordStore::new(),
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn matcher(&self) -> FuzzyMatcher {
        FuzzyMatcher::new(self.options.search_threshold)
    }

    pub fn initial_view(&self) -> ViewState {
        ViewState::new(self.options.page_size)
    }

    /// Runs one fetch cycle. On failure the current snapshot is left untouched.
    pub async fn refresh(&mut self) -> Result<ApplyOutcome, RunnerError> {
        let ticket = self.store.begin_fetch();
        match self.client.fetch_employees().await {
            Ok(records) => Ok(self.store.apply(ticket, records)),
            Err(error) => {
                self.store.abandon(ticket);
                Err(error.into())
            }
        }
    }

    pub fn view(&self, state: &ViewState) -> PageView {
        state.render(self.store.records(), &self.matcher())
    }

    pub async fn add_employee(
        &self,
        form: &NewEmployee,
    ) -> Result<AddEmployeeResponse, RunnerError> {
        form.validate()?;
        Ok(self.client.add_employee(form).await?)
    }

    /// Keeps `map` in sync with the API until a [`WatchEvent::Stop`] arrives.
    ///
    /// A fetch starts immediately, then on every refresh interval and on every
    /// [`WatchEvent::Refresh`]. Fetches may overlap; each completed one goes
    /// through the store's generation check, so a response that lands after a
    /// newer one has been applied is reported as stale and ignored. Failed
    /// cycles leave the current markers in place. A closed event channel only
    /// disables manual refreshes.
    pub async fn watch_map<F>(
        &mut self,
        map: &mut MapView,
        mut events: mpsc::Receiver<WatchEvent>,
        mut on_update: F,
    ) -> Result<WatchSummary, RunnerError>
    where
        F: FnMut(WatchUpdate<'_>) -> Result<(), RunnerError>,
    {
        let mut ticker = tokio::time::interval(self.options.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut in_flight: JoinSet<(FetchTicket, Result<Vec<Employee>, ApiError>)> =
            JoinSet::new();
        let mut events_open = true;
        let mut summary = WatchSummary::default();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.spawn_fetch(&mut in_flight);
                    summary.started += 1;
                }
                event = events.recv(), if events_open => match event {
                    Some(WatchEvent::Refresh) => {
                        self.spawn_fetch(&mut in_flight);
                        summary.started += 1;
                    }
                    Some(WatchEvent::Stop) => break,
                    None => events_open = false,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    let (ticket, result) =
                        joined.map_err(|source| RunnerError::TaskJoin { source })?;
                    match result {
                        Ok(records) => match self.store.apply(ticket, records) {
                            ApplyOutcome::Applied { generation, .. } => {
                                let refreshed = map.refresh(self.store.records());
                                summary.applied += 1;
                                on_update(WatchUpdate::Refreshed {
                                    generation,
                                    summary: refreshed,
                                    map: &*map,
                                })?;
                            }
                            ApplyOutcome::Stale { generation, current } => {
                                summary.stale += 1;
                                on_update(WatchUpdate::Stale { generation, current })?;
                            }
                        },
                        Err(error) => {
                            summary.failed += 1;
                            self.store.abandon(ticket);
                            on_update(WatchUpdate::Failed {
                                generation: ticket.generation(),
                                error: &error,
                            })?;
                        }
                    }
                }
            }
        }

        in_flight.abort_all();
        self.store.abandon_all();
        Ok(summary)
    }

    fn spawn_fetch(
        &mut self,
        in_flight: &mut JoinSet<(FetchTicket, Result<Vec<Employee>, ApiError>)>,
    ) {
        let ticket = self.store.begin_fetch();
        let client = self.client.clone();
        in_flight.spawn(async move { (ticket, client.fetch_employees().await) });
    }
}

fn build_http_client(
    proxy: Option<&str>,
    timeout_seconds: u64,
) -> Result<reqwest::Client, RunnerError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "staffscope/",
            env!("CARGO_PKG_VERSION")
        )),
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_seconds));

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| RunnerError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| RunnerError::HttpClientBuild { source: e })
}
