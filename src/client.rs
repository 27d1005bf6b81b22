use crate::language::WordEntry;
use crate::runtime::PracticeEvent;
use crate::server::WordsResponse;
use std::fmt;
use std::future::Future;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Why a word list could not be retrieved. Always recoverable.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    Timeout(Duration),
    Transport(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout(after) => {
                write!(f, "word service did not answer within {}s", after.as_secs_f64())
            }
            FetchError::Transport(msg) => write!(f, "could not reach word service: {msg}"),
            FetchError::Status(code) => write!(f, "word service answered with HTTP {code}"),
            FetchError::Decode(msg) => write!(f, "unreadable word list: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// `timeout` is what the request was given; reqwest does not report it back.
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout)
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Anything that can answer a word list query.
pub trait WordSource: Send + Sync + 'static {
    /// `chars` is the raw pool; `None` asks for the whole catalog.
    fn fetch(
        &self,
        chars: Option<String>,
    ) -> impl Future<Output = Result<Vec<WordEntry>, FetchError>> + Send;
}

/// Talks to a running `kanatap serve`.
#[derive(Debug, Clone)]
pub struct HttpWordSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpWordSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kanatap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::from_reqwest(e, timeout))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    fn words_url(&self) -> String {
        format!("{}/words", self.base_url.trim_end_matches('/'))
    }
}

impl WordSource for HttpWordSource {
    async fn fetch(&self, chars: Option<String>) -> Result<Vec<WordEntry>, FetchError> {
        let mut request = self.client.get(self.words_url());
        if let Some(chars) = chars {
            request = request.query(&[("chars", chars)]);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        // Body reads share the client timeout
        let body: WordsResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Decode(e.to_string())
            }
        })?;
        Ok(body.words)
    }
}

/// A finished fetch, tagged with the request generation that started it.
#[derive(Debug, Clone)]
pub struct WordsLoaded {
    pub generation: u64,
    pub chars: Option<String>,
    pub result: Result<Vec<WordEntry>, FetchError>,
}

/// Runs one fetch at a time on the tokio runtime and reports completions as
/// [`PracticeEvent::Loaded`]. Starting a new request aborts the previous one.
pub struct WordLoader<S: WordSource> {
    source: Arc<S>,
    runtime: Handle,
    events: Sender<PracticeEvent>,
    timeout: Duration,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl<S: WordSource> WordLoader<S> {
    pub fn new(source: S, runtime: Handle, events: Sender<PracticeEvent>, timeout: Duration) -> Self {
        Self {
            source: Arc::new(source),
            runtime,
            events,
            timeout,
            generation: 0,
            in_flight: None,
        }
    }

    /// Start fetching `chars`, superseding any request still in flight.
    /// Returns the generation the completion will carry.
    pub fn request(&mut self, chars: Option<String>) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        let timeout = self.timeout;
        info!(generation, chars = ?chars, "requesting word list");

        self.in_flight = Some(self.runtime.spawn(async move {
            let result = match tokio::time::timeout(timeout, source.fetch(chars.clone())).await {
                Ok(Err(FetchError::Timeout(_))) | Err(_) => Err(FetchError::Timeout(timeout)),
                Ok(result) => result,
            };
            if let Err(err) = &result {
                warn!(generation, %err, "word list fetch failed");
            }
            let _ = events.send(PracticeEvent::Loaded(WordsLoaded {
                generation,
                chars,
                result,
            }));
        }));

        generation
    }

    pub fn cancel(&mut self) {
        if let Some(prev) = self.in_flight.take() {
            if !prev.is_finished() {
                debug!(generation = self.generation, "superseding in-flight fetch");
            }
            prev.abort();
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}

impl<S: WordSource> Drop for WordLoader<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
