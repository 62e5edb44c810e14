//! Debounced analysis scheduling
//!
//! One actor task owns the debounce deadline. Edits, dictionary updates and
//! bulk-edit locks reach it over a single FIFO command channel; analyzer
//! calls run on spawned tasks and report back over a second channel.
//!
//! The latest document version is shared through an atomic that callers
//! update before the command is queued. A completion is published only if
//! its snapshot version still equals that value.
//!
//! The bulk-edit lock depth is shared the same way: it is raised before
//! `lock_bulk_edit` returns, and lowered by the actor when it reaches the
//! matching `Unlock`, after any document queued ahead of it.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use proofing_engine::personalization::apply_to_result;
use proofing_engine::{Analyzer, ProviderError};
use shared_types::{AnalysisResult, Dictionary, DocVersion, Document};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

const RESULT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug)]
enum Command {
    Changed(Document),
    SetDictionary(Dictionary),
    Unlock,
    Shutdown,
}

struct Completion {
    version: DocVersion,
    result: Result<AnalysisResult, ProviderError>,
}

/// Handle to the scheduler actor
pub struct AnalysisScheduler {
    commands: mpsc::UnboundedSender<Command>,
    results: broadcast::Sender<Arc<AnalysisResult>>,
    latest: Arc<AtomicU64>,
    in_flight: Arc<AtomicUsize>,
    lock_depth: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl AnalysisScheduler {
    /// Start the actor on the current tokio runtime
    pub fn spawn(analyzer: Arc<dyn Analyzer>, debounce: Duration) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let (results, _) = broadcast::channel(RESULT_CHANNEL_CAPACITY);
        let latest = Arc::new(AtomicU64::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let lock_depth = Arc::new(AtomicUsize::new(0));

        let actor = SchedulerActor {
            analyzer,
            debounce,
            commands: command_rx,
            completions,
            completion_tx,
            results: results.clone(),
            latest: Arc::clone(&latest),
            in_flight: Arc::clone(&in_flight),
            deadline: None,
            current: None,
            dictionary: Dictionary::new(),
            lock_depth: Arc::clone(&lock_depth),
            parked: None,
        };
        let task = tokio::spawn(actor.run());
        tracing::debug!(debounce_ms = debounce.as_millis() as u64, "Analysis scheduler started");

        Self {
            commands,
            results,
            latest,
            in_flight,
            lock_depth,
            task,
        }
    }

    /// Record `doc` as the latest version and restart the debounce timer.
    ///
    /// Versions older than the latest recorded one are ignored.
    pub fn on_document_changed(&self, doc: &Document) {
        let version = doc.version().get();
        let previous = self.latest.fetch_max(version, Ordering::SeqCst);
        if version < previous {
            tracing::warn!(
                version = %doc.version(),
                latest = previous,
                "Ignoring out-of-order document version"
            );
            return;
        }
        self.send(Command::Changed(doc.clone()));
    }

    /// Replace the dictionary snapshot applied to future publishes
    pub fn set_dictionary(&self, dictionary: Dictionary) {
        self.send(Command::SetDictionary(dictionary));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<AnalysisResult>> {
        self.results.subscribe()
    }

    /// Whether at least one analyzer call is in flight
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn latest_version(&self) -> DocVersion {
        DocVersion(self.latest.load(Ordering::SeqCst))
    }

    /// Hold back publishing until the returned guard is dropped.
    ///
    /// The lock is in effect when this returns. Send the patched document before dropping the guard so that results
    /// parked during the patch are checked against it.
    pub fn lock_bulk_edit(&self) -> BulkEditGuard {
        self.lock_depth.fetch_add(1, Ordering::SeqCst);
        BulkEditGuard {
            commands: self.commands.clone(),
        }
    }

    /// Stop the actor; in-flight analyses are abandoned
    pub async fn shutdown(self) {
        self.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Scheduler task ended abnormally");
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("Scheduler is not running");
        }
    }
}

/// Releases the bulk-edit lock on drop
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct BulkEditGuard {
    commands: mpsc::UnboundedSender<Command>,
}

impl Drop for BulkEditGuard {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Unlock);
    }
}

struct SchedulerActor {
    analyzer: Arc<dyn Analyzer>,
    debounce: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    completions: mpsc::UnboundedReceiver<Completion>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    results: broadcast::Sender<Arc<AnalysisResult>>,
    latest: Arc<AtomicU64>,
    in_flight: Arc<AtomicUsize>,
    deadline: Option<Instant>,
    current: Option<Document>,
    dictionary: Dictionary,
    lock_depth: Arc<AtomicUsize>,
    parked: Option<AnalysisResult>,
}

impl SchedulerActor {
    async fn run(mut self) {
        loop {
            let deadline = self.deadline.unwrap_or_else(Instant::now);
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                Some(done) = self.completions.recv() => self.on_complete(done),
                _ = sleep_until(deadline), if self.deadline.is_some() => self.dispatch(),
            }
        }
        tracing::debug!("Analysis scheduler stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Changed(doc) => {
                if doc.version().get() < self.latest.load(Ordering::SeqCst) {
                    return;
                }
                self.current = Some(doc);
                self.deadline = Some(Instant::now() + self.debounce);
            }
            Command::SetDictionary(dictionary) => self.dictionary = dictionary,
            Command::Unlock => {
                let previous = self
                    .lock_depth
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |depth| {
                        Some(depth.saturating_sub(1))
                    })
                    .unwrap_or_default();
                if previous <= 1 {
                    if let Some(result) = self.parked.take() {
                        self.deliver(result);
                    }
                }
            }
            Command::Shutdown => {}
        }
    }

    fn dispatch(&mut self) {
        self.deadline = None;
        let Some(doc) = self.current.clone() else {
            return;
        };
        if doc.is_empty() {
            tracing::debug!(version = %doc.version(), "Skipping analysis of empty document");
            return;
        }

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(version = %doc.version(), analyzer = self.analyzer.name(), "Dispatching analysis");

        let analyzer = Arc::clone(&self.analyzer);
        let done = self.completion_tx.clone();
        tokio::spawn(async move {
            let version = doc.version();
            let result = analyzer.analyze(&doc).await;
            let _ = done.send(Completion { version, result });
        });
    }

    fn on_complete(&mut self, done: Completion) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match done.result {
            Ok(result) if result.for_doc_version == done.version => {
                if self.lock_depth.load(Ordering::SeqCst) > 0 {
                    tracing::debug!(version = %done.version, "Parking analysis during bulk edit");
                    self.parked = Some(result);
                } else {
                    self.deliver(result);
                }
            }
            Ok(result) => {
                tracing::warn!(
                    snapshot = %done.version,
                    tagged = %result.for_doc_version,
                    "Analyzer tagged result with the wrong version"
                );
            }
            Err(e) => {
                tracing::warn!(version = %done.version, error = %e, "Analysis failed");
            }
        }
    }

    /// Publish `result` if it is still for the latest version
    fn deliver(&mut self, result: AnalysisResult) {
        let latest = self.latest.load(Ordering::SeqCst);
        if result.for_doc_version.get() != latest {
            tracing::debug!(
                version = %result.for_doc_version,
                latest,
                "Discarding stale analysis"
            );
            return;
        }

        let result = apply_to_result(result, &self.dictionary);
        tracing::info!(
            version = %result.for_doc_version,
            issues = result.issues.len(),
            score = result.score,
            "Published analysis"
        );
        if self.results.send(Arc::new(result)).is_err() {
            tracing::debug!("No subscribers for analysis");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proofing_engine::ProofingEngine;
    use std::sync::Mutex;
    use tokio::sync::broadcast::error::TryRecvError;
    use tokio::sync::Notify;
    use tokio::time::sleep;

    const DEBOUNCE: Duration = Duration::from_millis(1000);

    /// Local engine that takes `delay` and records when and what it analyzed
    struct RecordingAnalyzer {
        engine: ProofingEngine,
        delay: Duration,
        started: Instant,
        calls: Mutex<Vec<(DocVersion, Duration)>>,
    }

    impl RecordingAnalyzer {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                engine: ProofingEngine::new(),
                delay,
                started: Instant::now(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(DocVersion, Duration)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Analyzer for RecordingAnalyzer {
        fn name(&self) -> &str {
            "recording"
        }

        async fn analyze(&self, doc: &Document) -> Result<AnalysisResult, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push((doc.version(), self.started.elapsed()));
            sleep(self.delay).await;
            Ok(self.engine.analyze_document(doc))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_fires_once_after_last_change() {
        let analyzer = RecordingAnalyzer::new(Duration::ZERO);
        let scheduler = AnalysisScheduler::spawn(analyzer.clone(), DEBOUNCE);

        let v1 = Document::new("I recieve");
        let v2 = v1.next("I recieve your");
        let v3 = v2.next("I recieve your thier gift");

        scheduler.on_document_changed(&v1);
        sleep(Duration::from_millis(200)).await;
        scheduler.on_document_changed(&v2);
        sleep(Duration::from_millis(700)).await;
        scheduler.on_document_changed(&v3);

        sleep(Duration::from_millis(999)).await;
        assert!(analyzer.calls().is_empty());

        sleep(Duration::from_millis(51)).await;
        let calls = analyzer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, v3.version());
        assert!(calls[0].1 >= Duration::from_millis(1900));
        assert!(calls[0].1 < Duration::from_millis(1950));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_in_flight_result_is_discarded() {
        let analyzer = RecordingAnalyzer::new(Duration::from_millis(500));
        let scheduler = AnalysisScheduler::spawn(analyzer.clone(), DEBOUNCE);
        let mut results = scheduler.subscribe();

        let v1 = Document::new("I recieve your gift");
        let v2 = v1.next("I recieve your thier gift");

        scheduler.on_document_changed(&v1);
        sleep(Duration::from_millis(1100)).await;
        assert!(scheduler.is_busy());

        scheduler.on_document_changed(&v2);
        let published = results.recv().await.unwrap();
        assert_eq!(published.for_doc_version, v2.version());
        assert_eq!(published.issues.len(), 2);
        assert_eq!(analyzer.calls().len(), 2);
        assert!(!scheduler.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parked_result_is_discarded_after_patch() {
        let analyzer = RecordingAnalyzer::new(Duration::from_millis(500));
        let scheduler = AnalysisScheduler::spawn(analyzer.clone(), DEBOUNCE);
        let mut results = scheduler.subscribe();

        let v1 = Document::new("I recieve your thier gift");
        scheduler.on_document_changed(&v1);
        sleep(Duration::from_millis(1200)).await;

        let guard = scheduler.lock_bulk_edit();
        // The v1 analysis completes while locked
        sleep(Duration::from_millis(400)).await;
        assert!(matches!(results.try_recv(), Err(TryRecvError::Empty)));

        let v2 = v1.next("I receive your their gift");
        scheduler.on_document_changed(&v2);
        drop(guard);

        let published = results.recv().await.unwrap();
        assert_eq!(published.for_doc_version, v2.version());
        assert!(published.issues.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parked_result_is_published_on_release() {
        let analyzer = RecordingAnalyzer::new(Duration::from_millis(500));
        let scheduler = AnalysisScheduler::spawn(analyzer, DEBOUNCE);
        let mut results = scheduler.subscribe();

        let v1 = Document::new("I recieve your gift");
        scheduler.on_document_changed(&v1);
        sleep(Duration::from_millis(1200)).await;

        let guard = scheduler.lock_bulk_edit();
        sleep(Duration::from_millis(400)).await;
        assert!(matches!(results.try_recv(), Err(TryRecvError::Empty)));
        drop(guard);

        let published = results.recv().await.unwrap();
        assert_eq!(published.for_doc_version, v1.version());
        assert_eq!(published.issues.len(), 1);
    }

    /// Local engine that waits for `gate` before each analysis
    struct GatedAnalyzer {
        engine: ProofingEngine,
        gate: Notify,
    }

    #[async_trait]
    impl Analyzer for GatedAnalyzer {
        fn name(&self) -> &str {
            "gated"
        }

        async fn analyze(&self, doc: &Document) -> Result<AnalysisResult, ProviderError> {
            self.gate.notified().await;
            Ok(self.engine.analyze_document(doc))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_holds_completion_racing_with_it() {
        let analyzer = Arc::new(GatedAnalyzer {
            engine: ProofingEngine::new(),
            gate: Notify::new(),
        });
        let scheduler = AnalysisScheduler::spawn(analyzer.clone(), DEBOUNCE);
        let mut results = scheduler.subscribe();

        let mut doc = Document::new("I recieve your gift");
        for round in 0..40 {
            if round > 0 {
                doc = doc.next(format!("I recieve your gift {}", round));
            }
            scheduler.on_document_changed(&doc);
            sleep(Duration::from_millis(1100)).await;
            assert!(scheduler.is_busy());

            // Completion and lock become ready together
            analyzer.gate.notify_one();
            let guard = scheduler.lock_bulk_edit();
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            assert!(
                matches!(results.try_recv(), Err(TryRecvError::Empty)),
                "published while locked in round {}",
                round
            );

            drop(guard);
            let published = results.recv().await.unwrap();
            assert_eq!(published.for_doc_version, doc.version());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_locks_release_on_last_guard() {
        let analyzer = RecordingAnalyzer::new(Duration::from_millis(500));
        let scheduler = AnalysisScheduler::spawn(analyzer, DEBOUNCE);
        let mut results = scheduler.subscribe();

        scheduler.on_document_changed(&Document::new("I recieve your gift"));
        sleep(Duration::from_millis(1200)).await;

        let outer = scheduler.lock_bulk_edit();
        let inner = scheduler.lock_bulk_edit();
        sleep(Duration::from_millis(400)).await;
        drop(inner);
        sleep(Duration::from_millis(10)).await;
        assert!(matches!(results.try_recv(), Err(TryRecvError::Empty)));

        drop(outer);
        let published = results.recv().await.unwrap();
        assert_eq!(published.issues.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_document_never_dispatches() {
        let analyzer = RecordingAnalyzer::new(Duration::ZERO);
        let scheduler = AnalysisScheduler::spawn(analyzer.clone(), DEBOUNCE);
        let mut results = scheduler.subscribe();

        scheduler.on_document_changed(&Document::new(""));
        sleep(Duration::from_millis(3000)).await;

        assert!(analyzer.calls().is_empty());
        assert!(!scheduler.is_busy());
        assert!(matches!(results.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dictionary_filters_published_results() {
        let analyzer = RecordingAnalyzer::new(Duration::ZERO);
        let scheduler = AnalysisScheduler::spawn(analyzer, DEBOUNCE);
        let mut results = scheduler.subscribe();

        scheduler.set_dictionary(["recieve"].into_iter().collect());
        scheduler.on_document_changed(&Document::new("I recieve your thier gift"));

        let published = results.recv().await.unwrap();
        assert_eq!(published.issues.len(), 1);
        assert_eq!(published.issues[0].original_text, "thier");
        assert_eq!(published.score, 95);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_versions_are_ignored() {
        let analyzer = RecordingAnalyzer::new(Duration::ZERO);
        let scheduler = AnalysisScheduler::spawn(analyzer.clone(), DEBOUNCE);

        let v5 = Document::with_version("newer text", DocVersion(5));
        let v3 = Document::with_version("older text", DocVersion(3));
        scheduler.on_document_changed(&v5);
        scheduler.on_document_changed(&v3);
        assert_eq!(scheduler.latest_version(), DocVersion(5));

        sleep(Duration::from_millis(1500)).await;
        let calls = analyzer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, DocVersion(5));
        scheduler.shutdown().await;
    }
}
