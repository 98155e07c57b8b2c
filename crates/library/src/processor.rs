//! Bounded worker pool that organizes submitted games.
//!
//! Games go through a bounded queue shared by a fixed number of workers.
//! A full queue makes [`Processor::submit`] wait, so a slow disk throttles
//! discovery instead of buffering every game in memory. [`Processor::wait`]
//! returns once every submitted game has been organized (or has failed and
//! been logged).

use crate::error::{ErrorKind, Result};
use crate::organize::{Action, organize_game};
use crate::{Context, organize};
use gsm_fetch::FetchHandle;
use gsm_games::Game;
use gsm_storage::BackendHandle;
use gsm_storage::backend::ReadOnlyBackend;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use time::UtcOffset;
use tokio::sync::{Mutex, Notify, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::instrument;

pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

#[derive(Clone, Debug)]
pub struct Options {
    /// Log planned copies without touching the output tree.
    pub dry_run: bool,
    pub download_covers: bool,
    /// Number of workers, at least one.
    pub workers: usize,
    /// Games that can wait in the queue before `submit` blocks, at least one.
    pub queue_capacity: usize,
    pub utc_offset: UtcOffset,
}
impl Default for Options {
    fn default() -> Self {
        Self {
            dry_run: false,
            download_covers: false,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            utc_offset: UtcOffset::UTC,
        }
    }
}

/// Running totals across every game a processor has organized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub games: usize,
    pub skipped: usize,
    pub failed_games: usize,
    pub copied: usize,
    pub planned: usize,
    pub present: usize,
    pub conflicts: usize,
    pub failed: usize,
}
impl Totals {
    fn record(&mut self, report: &organize::Report) {
        self.games += 1;
        if report.is_skipped() {
            self.skipped += 1;
        }
        self.copied += report.count(|a| matches!(a, Action::Copied(_)));
        self.planned += report.count(|a| matches!(a, Action::Planned(_)));
        self.present += report.count(|a| matches!(a, Action::AlreadyPresent(_)));
        self.conflicts += report.count(|a| matches!(a, Action::Conflict(_)));
        self.failed += report.failures();
    }
}

/// Outstanding-work counter.
///
/// Incremented before a game becomes visible to workers and decremented once
/// it has been handled, so a waiter can't observe zero while work is queued.
#[derive(Default)]
struct Pending {
    count: AtomicUsize,
    drained: Notify,
}
impl Pending {
    fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn done(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    async fn drained(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register interest before checking, otherwise a `done` landing
            // between the check and the await would be missed.
            notified.as_mut().enable();
            if self.get() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Marks one game as handled when dropped, even if organizing it panicked.
struct Handled<'a>(&'a Pending);
impl Drop for Handled<'_> {
    fn drop(&mut self) {
        self.0.done();
    }
}

pub struct Processor {
    ctx: Arc<Context>,
    workers: usize,
    sender: mpsc::Sender<Game>,
    receiver: Arc<Mutex<mpsc::Receiver<Game>>>,
    pending: Arc<Pending>,
    totals: Arc<std::sync::Mutex<Totals>>,
    tracker: TaskTracker,
    token: Option<CancellationToken>,
}
impl Processor {
    /// Creates a processor writing into `backend`.
    ///
    /// In a dry run the backend is wrapped in a [`ReadOnlyBackend`], so even
    /// a bug further down can't modify the output tree.
    pub fn new(options: Options, backend: BackendHandle, fetcher: FetchHandle) -> Self {
        let backend: BackendHandle = match options.dry_run {
            true => Arc::new(ReadOnlyBackend::new(backend)),
            false => backend,
        };
        let (sender, receiver) = mpsc::channel(options.queue_capacity.max(1));
        Self {
            ctx: Arc::new(Context {
                backend,
                fetcher,
                dry_run: options.dry_run,
                download_covers: options.download_covers,
                utc_offset: options.utc_offset,
            }),
            workers: options.workers.max(1),
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            pending: Arc::new(Pending::default()),
            totals: Arc::new(std::sync::Mutex::new(Totals::default())),
            tracker: TaskTracker::new(),
            token: None,
        }
    }

    /// Spawns the workers.
    ///
    /// Cancelling `token` stops workers from taking new games; a game that is
    /// already being organized is finished first. Must be called once, from
    /// within a Tokio runtime.
    pub fn start(&mut self, token: CancellationToken) {
        // A child token lets `wait` stop idle workers without cancelling the
        // caller's token.
        let token = token.child_token();
        for worker in 0..self.workers {
            let ctx = Arc::clone(&self.ctx);
            let receiver = Arc::clone(&self.receiver);
            let pending = Arc::clone(&self.pending);
            let totals = Arc::clone(&self.totals);
            let token = token.clone();
            self.tracker.spawn(async move {
                run_worker(worker, ctx, receiver, pending, totals, token).await;
            });
        }
        self.tracker.close();
        tracing::debug!(workers = self.workers, "Processor started");
        self.token = Some(token);
    }

    /// Queues `game`, waiting while the queue is full.
    ///
    /// # Errors
    /// [`NotStarted`](ErrorKind::NotStarted) before [`start`](Self::start);
    /// [`Cancelled`](ErrorKind::Cancelled) once cancelled or after
    /// [`wait`](Self::wait) returned. The game is dropped in both cases.
    pub async fn submit(&self, game: Game) -> Result<()> {
        let Some(token) = &self.token else {
            exn::bail!(ErrorKind::NotStarted);
        };
        if token.is_cancelled() {
            exn::bail!(ErrorKind::Cancelled);
        }
        self.pending.add();
        let sent = tokio::select! {
            biased;
            _ = token.cancelled() => false,
            sent = self.sender.send(game) => sent.is_ok(),
        };
        if !sent {
            self.pending.done();
            exn::bail!(ErrorKind::Cancelled);
        }
        Ok(())
    }

    /// Number of games submitted but not yet organized.
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Waits until every submitted game has been handled, then stops the
    /// workers and returns the totals.
    ///
    /// When cancelled instead, returns as soon as the workers have finished
    /// the game in hand; queued games are dropped. Call only once all
    /// submissions are done.
    pub async fn wait(&self) -> Totals {
        if let Some(token) = &self.token {
            tokio::select! {
                _ = self.pending.drained() => tracing::debug!("All games processed"),
                _ = token.cancelled() => tracing::warn!(pending = self.pending(), "Processing cancelled"),
            }
            token.cancel();
            self.tracker.wait().await;
        }
        self.totals()
    }

    pub fn totals(&self) -> Totals {
        *lock(&self.totals)
    }
}

async fn run_worker(
    worker: usize,
    ctx: Arc<Context>,
    receiver: Arc<Mutex<mpsc::Receiver<Game>>>,
    pending: Arc<Pending>,
    totals: Arc<std::sync::Mutex<Totals>>,
    token: CancellationToken,
) {
    loop {
        let game = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                game = receiver.recv() => game,
            }
        };
        let Some(game) = game else { break };
        let _handled = Handled(&pending);
        process(worker, &ctx, &game, &totals).await;
    }
    tracing::debug!(worker, "Worker stopped");
}

#[instrument(skip_all, fields(worker = worker, game = %game.directory_name(), platform = %game.platform))]
async fn process(worker: usize, ctx: &Context, game: &Game, totals: &std::sync::Mutex<Totals>) {
    if !game.notes.is_empty() {
        tracing::debug!(notes = %game.notes, "Organizing game");
    }
    let report = match organize_game(ctx, game).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = ?e, "Could not organize game");
            let mut totals = lock(totals);
            totals.games += 1;
            totals.failed_games += 1;
            return;
        },
    };
    if !report.is_skipped() {
        tracing::info!(
            screenshots = report.screenshots.len(),
            failed = report.failures(),
            "Organized game"
        );
    }
    lock(totals).record(&report);
}

/// Totals stay meaningful even if a worker panicked while holding the lock.
fn lock(totals: &std::sync::Mutex<Totals>) -> std::sync::MutexGuard<'_, Totals> {
    totals.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFetch, Fixture};
    use async_trait::async_trait;
    use gsm_games::Screenshot;
    use gsm_storage::ContentHash;
    use gsm_storage::StorageBackend;
    use gsm_storage::error::Result as StorageResult;
    use rstest::rstest;
    use std::path::Path;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Holds every directory creation until permits are released.
    struct Gate {
        inner: BackendHandle,
        permits: Arc<Semaphore>,
    }

    #[async_trait]
    impl StorageBackend for Gate {
        fn name(&self) -> &str {
            self.inner.name()
        }

        async fn exists(&self, path: &Path) -> StorageResult<bool> {
            self.inner.exists(path).await
        }

        async fn create_dir(&self, path: &Path) -> StorageResult<()> {
            self.permits.acquire().await.unwrap().forget();
            self.inner.create_dir(path).await
        }

        async fn import(&self, source: &Path, destination: &Path) -> StorageResult<u64> {
            self.inner.import(source, destination).await
        }

        async fn hash(&self, path: &Path) -> StorageResult<ContentHash> {
            self.inner.hash(path).await
        }
    }

    fn games(fixture: &Fixture, count: usize) -> Vec<Game> {
        (0..count)
            .map(|i| {
                let source = fixture.source(&format!("{i}.png"), format!("game {i}").as_bytes(), None);
                let mut game = Game::new(i.to_string(), format!("Game {i}"), "PC", "test");
                game.screenshots.push(Screenshot::with_destination(source, "shot.png"));
                game
            })
            .collect()
    }

    fn options(workers: usize, queue_capacity: usize) -> Options {
        Options { workers, queue_capacity, ..Options::default() }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_every_submitted_game_is_processed() {
        let fixture = Fixture::new();
        let mut processor = Processor::new(options(3, 2), fixture.backend(), FakeFetch::new(b""));
        processor.start(CancellationToken::new());
        for game in games(&fixture, 10) {
            processor.submit(game).await.unwrap();
        }
        let totals = processor.wait().await;

        assert_eq!(totals.games, 10);
        assert_eq!(totals.copied, 10);
        assert_eq!(processor.pending(), 0);
        for i in 0..10 {
            let copied = std::fs::read(fixture.output(format!("PC/Game {i}/shot.png"))).unwrap();
            assert_eq!(copied, format!("game {i}").as_bytes());
        }
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_backpressure_with_blocked_workers(#[case] workers: usize) {
        let fixture = Fixture::new();
        let permits = Arc::new(Semaphore::new(0));
        let backend: BackendHandle = Arc::new(Gate { inner: fixture.backend(), permits: Arc::clone(&permits) });
        let mut processor = Processor::new(options(workers, 1), backend, FakeFetch::new(b""));
        processor.start(CancellationToken::new());
        let processor = Arc::new(processor);

        // Blocked workers hold one game each and the queue holds one more;
        // anything beyond that must wait in `submit`.
        let count = workers + 4;
        let submitter = tokio::spawn({
            let processor = Arc::clone(&processor);
            let games = games(&fixture, count);
            async move {
                for game in games {
                    processor.submit(game).await.unwrap();
                }
            }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!submitter.is_finished());
        assert!(processor.pending() <= workers + 2);

        permits.add_permits(count);
        submitter.await.unwrap();
        let totals = processor.wait().await;

        assert_eq!(totals.games, count);
        assert_eq!(totals.copied, count);
        for i in 0..count {
            assert!(fixture.output(format!("PC/Game {i}/shot.png")).is_file());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_finishes_games_in_hand_and_drops_queue() {
        let fixture = Fixture::new();
        let permits = Arc::new(Semaphore::new(0));
        let backend: BackendHandle = Arc::new(Gate { inner: fixture.backend(), permits: Arc::clone(&permits) });
        let token = CancellationToken::new();
        let mut processor = Processor::new(options(2, 4), backend, FakeFetch::new(b""));
        processor.start(token.clone());
        for game in games(&fixture, 5) {
            processor.submit(game).await.unwrap();
        }
        // Let both workers pick up a game and block on the gate.
        tokio::time::sleep(Duration::from_millis(100)).await;

        token.cancel();
        permits.add_permits(5);
        let totals = tokio::time::timeout(Duration::from_secs(5), processor.wait()).await.unwrap();

        assert_eq!(totals.games, 2);
        assert_eq!(totals.copied, 2);
        for i in 0..2 {
            assert!(fixture.output(format!("PC/Game {i}/shot.png")).is_file());
        }
        for i in 2..5 {
            assert!(!fixture.output(format!("PC/Game {i}")).exists());
        }
    }

    #[tokio::test]
    async fn test_totals_survive_poisoned_lock() {
        let fixture = Fixture::new();
        let ctx = fixture.context(false, false, FakeFetch::new(b""));
        let totals = Arc::new(std::sync::Mutex::new(Totals::default()));
        let poisoner = Arc::clone(&totals);
        std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join()
        .unwrap_err();
        assert!(totals.is_poisoned());

        let mut broken = Game::new("broken", "..", "PC", "test");
        broken.screenshots.push(Screenshot::new(fixture.source("x.png", b"x", None)));
        process(0, &ctx, &broken, &totals).await;
        process(0, &ctx, &games(&fixture, 1).remove(0), &totals).await;

        let totals = *lock(&totals);
        assert_eq!(totals.games, 2);
        assert_eq!(totals.failed_games, 1);
        assert_eq!(totals.copied, 1);
    }

    #[tokio::test]
    async fn test_submit_before_start() {
        let fixture = Fixture::new();
        let processor = Processor::new(Options::default(), fixture.backend(), FakeFetch::new(b""));
        let err = processor.submit(Game::new("1", "One", "PC", "test")).await.unwrap_err();
        assert_eq!(*err, ErrorKind::NotStarted);
    }

    #[tokio::test]
    async fn test_cancelled_processor_rejects_games() {
        let fixture = Fixture::new();
        let token = CancellationToken::new();
        let mut processor = Processor::new(Options::default(), fixture.backend(), FakeFetch::new(b""));
        processor.start(token.clone());
        token.cancel();

        let err = processor.submit(Game::new("1", "One", "PC", "test")).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Cancelled);
        assert_eq!(processor.pending(), 0);
        assert_eq!(processor.wait().await, Totals::default());
    }

    #[tokio::test]
    async fn test_wait_without_games() {
        let fixture = Fixture::new();
        let mut processor = Processor::new(Options::default(), fixture.backend(), FakeFetch::new(b""));
        processor.start(CancellationToken::new());
        assert_eq!(processor.wait().await, Totals::default());
        // Draining is final.
        let err = processor.submit(Game::new("1", "One", "PC", "test")).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_totals_count_skipped_and_failed_games() {
        let fixture = Fixture::new();
        let mut processor = Processor::new(Options::default(), fixture.backend(), FakeFetch::new(b""));
        processor.start(CancellationToken::new());

        processor.submit(Game::new("empty", "Empty", "PC", "test")).await.unwrap();
        let mut broken = Game::new("broken", "..", "PC", "test");
        broken.screenshots.push(Screenshot::new(fixture.source("x.png", b"x", None)));
        processor.submit(broken).await.unwrap();
        let totals = processor.wait().await;

        assert_eq!(totals.games, 2);
        assert_eq!(totals.skipped, 1);
        assert_eq!(totals.failed_games, 1);
    }

    #[tokio::test]
    async fn test_dry_run_wraps_backend() {
        let fixture = Fixture::new();
        let options = Options { dry_run: true, ..Options::default() };
        let mut processor = Processor::new(options, fixture.backend(), FakeFetch::new(b""));
        processor.start(CancellationToken::new());
        for game in games(&fixture, 3) {
            processor.submit(game).await.unwrap();
        }
        let totals = processor.wait().await;
        assert_eq!(totals.planned, 3);
        assert_eq!(totals.copied, 0);
        assert!(!fixture.output.exists());
    }
}
