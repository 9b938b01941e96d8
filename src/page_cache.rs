// src/page_cache.rs
//! Revalidation window for the rendered page: absolute TTL, no sliding refresh.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tokio::sync::Mutex;

use crate::render::render_page;
use crate::trends::types::TrendBoard;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("page_cache_hits_total", "Page requests served from the current render.");
        describe_counter!("page_cache_misses_total", "Page requests that started a fetch cycle.");
        describe_gauge!("page_last_generated_ts", "Unix ts of the most recent page generation.");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// One generation: the board and the HTML rendered from it.
#[derive(Debug)]
pub struct PageSnapshot {
    pub board: TrendBoard,
    pub html: String,
    generated: Instant,
}

impl PageSnapshot {
    pub fn new(board: TrendBoard, generated: Instant) -> Self {
        let html = render_page(&board);
        Self {
            board,
            html,
            generated,
        }
    }

    pub fn is_fresh_at(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.generated) < window
    }
}

pub struct PageCache {
    window: Duration,
    current: Mutex<Option<Arc<PageSnapshot>>>,
}

impl PageCache {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            current: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Serve the current snapshot if it is still fresh at `now`, otherwise run
    /// `generate` and store the result. The lock is held while generating, so
    /// callers arriving during a regeneration reuse its result.
    ///
    /// A new snapshot is stamped when `generate` completes; the window counts
    /// from there, not from the request that triggered it.
    pub async fn get_or_generate<F, Fut>(&self, now: Instant, generate: F) -> (Arc<PageSnapshot>, CacheStatus)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = TrendBoard>,
    {
        ensure_metrics_described();

        let mut current = self.current.lock().await;
        if let Some(snap) = current.as_ref() {
            if snap.is_fresh_at(now, self.window) {
                counter!("page_cache_hits_total").increment(1);
                return (Arc::clone(snap), CacheStatus::Hit);
            }
        }

        let board = generate().await;
        let snap = Arc::new(PageSnapshot::new(board, Instant::now()));
        *current = Some(Arc::clone(&snap));

        counter!("page_cache_misses_total").increment(1);
        gauge!("page_last_generated_ts").set(snap.board.generated_at.timestamp() as f64);
        tracing::info!(
            target: "page",
            window_secs = self.window.as_secs(),
            bytes = snap.html.len(),
            "page regenerated"
        );
        (snap, CacheStatus::Miss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn board(counter: &AtomicUsize) -> TrendBoard {
        counter.fetch_add(1, Ordering::SeqCst);
        TrendBoard::empty(Utc::now())
    }

    #[tokio::test]
    async fn reuses_within_window_and_regenerates_after() {
        let cache = PageCache::new(Duration::from_secs(60));
        let cycles = AtomicUsize::new(0);

        let (first, s1) = cache.get_or_generate(Instant::now(), || board(&cycles)).await;
        let t0 = first.generated;
        let (_, s2) = cache
            .get_or_generate(t0 + Duration::from_secs(59), || board(&cycles))
            .await;
        assert_eq!((s1, s2), (CacheStatus::Miss, CacheStatus::Hit));
        assert_eq!(cycles.load(Ordering::SeqCst), 1);

        // boundary counts as stale
        let (_, s3) = cache
            .get_or_generate(t0 + Duration::from_secs(60), || board(&cycles))
            .await;
        assert_eq!(s3, CacheStatus::Miss);
        assert_eq!(cycles.load(Ordering::SeqCst), 2);

        // window restarts from the new generation
        let (_, s4) = cache.get_or_generate(Instant::now(), || board(&cycles)).await;
        assert_eq!(s4, CacheStatus::Hit);
        assert_eq!(cycles.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn slow_generation_stays_fresh_for_the_full_window() {
        let cache = PageCache::new(Duration::from_millis(100));
        let cycles = AtomicUsize::new(0);

        let (_, s1) = cache
            .get_or_generate(Instant::now(), || async {
                cycles.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(150)).await;
                TrendBoard::empty(Utc::now())
            })
            .await;
        assert_eq!(s1, CacheStatus::Miss);

        let (_, s2) = cache.get_or_generate(Instant::now(), || board(&cycles)).await;
        assert_eq!(s2, CacheStatus::Hit, "page generated just now must be fresh");
        assert_eq!(cycles.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_stale_requests_share_one_generation() {
        let cache = Arc::new(PageCache::new(Duration::from_secs(60)));
        let cycles = Arc::new(AtomicUsize::new(0));
        let now = Instant::now();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let cycles = Arc::clone(&cycles);
            tasks.push(tokio::spawn(async move {
                cache
                    .get_or_generate(now, || async {
                        cycles.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        TrendBoard::empty(Utc::now())
                    })
                    .await
                    .1
            }));
        }

        let mut misses = 0;
        for t in tasks {
            if t.await.unwrap() == CacheStatus::Miss {
                misses += 1;
            }
        }
        assert_eq!(misses, 1);
        assert_eq!(cycles.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn snapshot_holds_rendered_html() {
        let snap = PageSnapshot::new(TrendBoard::empty(Utc::now()), Instant::now());
        assert!(snap.html.starts_with("<!doctype html>"));
    }
}
