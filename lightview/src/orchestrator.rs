use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawPoolType {
    Map,
    ForegroundTile,
    Text,
}

/// Render pass bookkeeping: a lock held while the pass is drawn and a flag
/// raised when its contents are stale. The map pass is drawn on every online
/// frame, so only its lock is used.
#[derive(Debug)]
pub struct DrawPool {
    kind: DrawPoolType,
    lock: Mutex<()>,
    repaint: AtomicBool,
}

impl DrawPool {
    pub fn new(kind: DrawPoolType) -> Self {
        Self {
            kind,
            lock: Mutex::new(()),
            repaint: AtomicBool::new(true),
        }
    }

    pub fn kind(&self) -> DrawPoolType {
        self.kind
    }

    /// A panicked pass leaves nothing to protect, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn can_repaint(&self) -> bool {
        self.repaint.load(Ordering::Acquire)
    }

    pub fn request_repaint(&self) {
        self.repaint.store(true, Ordering::Release);
    }

    pub fn mark_painted(&self) {
        self.repaint.store(false, Ordering::Release);
    }
}

/// The map panel that owns the scene and knows how to paint each pass.
pub trait MapWidget: Send + Sync + 'static {
    fn draw_self(&self, pool: DrawPoolType);
}

/// Drives the per-frame passes of the map panel.
pub struct FrameOrchestrator<W: MapWidget> {
    runtime: Handle,
    map: Arc<DrawPool>,
    foreground_tile: Arc<DrawPool>,
    text: Arc<DrawPool>,
    widget: Option<Arc<W>>,
}

impl<W: MapWidget> FrameOrchestrator<W> {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            map: Arc::new(DrawPool::new(DrawPoolType::Map)),
            foreground_tile: Arc::new(DrawPool::new(DrawPoolType::ForegroundTile)),
            text: Arc::new(DrawPool::new(DrawPoolType::Text)),
            widget: None,
        }
    }

    pub fn pool(&self, kind: DrawPoolType) -> &Arc<DrawPool> {
        match kind {
            DrawPoolType::Map => &self.map,
            DrawPoolType::ForegroundTile => &self.foreground_tile,
            DrawPoolType::Text => &self.text,
        }
    }

    pub fn widget(&self) -> Option<&Arc<W>> {
        self.widget.as_ref()
    }

    /// Runs one frame of the map panel.
    ///
    /// Offline, the cached widget is dropped and nothing is drawn. Online,
    /// stale text and foreground passes are painted on a blocking worker
    /// under the text pool lock while the map pass is painted here under the
    /// map pool lock. The map pass ignores its repaint flag. The worker's
    /// handle is returned when one was started.
    pub fn draw_foreground_tile(
        &mut self,
        online: bool,
        resolve_widget: impl FnOnce() -> Option<Arc<W>>,
    ) -> Option<JoinHandle<()>> {
        if !online {
            self.widget = None;
            return None;
        }

        if self.widget.is_none() {
            self.widget = resolve_widget();
        }
        let Some(widget) = self.widget.clone() else {
            warn!("map widget not found; skipping frame");
            return None;
        };

        let overlay = if self.text.can_repaint() || self.foreground_tile.can_repaint() {
            let text = Arc::clone(&self.text);
            let foreground_tile = Arc::clone(&self.foreground_tile);
            let widget = Arc::clone(&widget);
            Some(self.runtime.spawn_blocking(move || {
                let _guard = text.lock();
                widget.draw_self(DrawPoolType::Text);
                text.mark_painted();
                widget.draw_self(DrawPoolType::ForegroundTile);
                foreground_tile.mark_painted();
            }))
        } else {
            None
        };

        let _guard = self.map.lock();
        widget.draw_self(DrawPoolType::Map);

        overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingWidget {
        passes: Mutex<Vec<DrawPoolType>>,
    }

    impl RecordingWidget {
        fn passes(&self) -> Vec<DrawPoolType> {
            self.passes.lock().expect("passes").clone()
        }
    }

    impl MapWidget for RecordingWidget {
        fn draw_self(&self, pool: DrawPoolType) {
            self.passes.lock().expect("passes").push(pool);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_draws_nothing_and_drops_widget() {
        let widget = Arc::new(RecordingWidget::default());
        let mut frames = FrameOrchestrator::new(Handle::current());

        frames.draw_foreground_tile(true, || Some(Arc::clone(&widget)));
        assert!(frames.widget().is_some());

        let before = widget.passes().len();
        let task = frames.draw_foreground_tile(false, || Some(Arc::clone(&widget)));
        assert!(task.is_none());
        assert!(frames.widget().is_none());
        assert_eq!(widget.passes().len(), before);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_frame_paints_all_passes() {
        let widget = Arc::new(RecordingWidget::default());
        let mut frames = FrameOrchestrator::new(Handle::current());

        let task = frames
            .draw_foreground_tile(true, || Some(Arc::clone(&widget)))
            .expect("overlay dispatched");
        task.await.expect("overlay task");

        let passes = widget.passes();
        assert_eq!(passes.len(), 3);
        assert!(passes.contains(&DrawPoolType::Map));
        let text = passes.iter().position(|pass| *pass == DrawPoolType::Text);
        let fg = passes
            .iter()
            .position(|pass| *pass == DrawPoolType::ForegroundTile);
        assert!(text < fg);
        assert!(!frames.pool(DrawPoolType::Text).can_repaint());
        assert!(!frames.pool(DrawPoolType::ForegroundTile).can_repaint());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clean_frame_paints_only_the_map() {
        let widget = Arc::new(RecordingWidget::default());
        let mut frames = FrameOrchestrator::new(Handle::current());
        if let Some(task) = frames.draw_foreground_tile(true, || Some(Arc::clone(&widget))) {
            task.await.expect("overlay task");
        }

        let task = frames.draw_foreground_tile(true, || None);
        assert!(task.is_none());
        assert_eq!(widget.passes().last(), Some(&DrawPoolType::Map));
        assert_eq!(widget.passes().len(), 4);

        frames.pool(DrawPoolType::Text).request_repaint();
        frames
            .draw_foreground_tile(true, || None)
            .expect("stale text dispatches")
            .await
            .expect("overlay task");
        assert_eq!(widget.passes().len(), 7);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn map_pass_runs_every_frame_regardless_of_its_flag() {
        let widget = Arc::new(RecordingWidget::default());
        let mut frames = FrameOrchestrator::new(Handle::current());
        for _ in 0..3 {
            if let Some(task) = frames.draw_foreground_tile(true, || Some(Arc::clone(&widget))) {
                task.await.expect("overlay task");
            }
        }
        let maps = widget
            .passes()
            .iter()
            .filter(|pass| **pass == DrawPoolType::Map)
            .count();
        assert_eq!(maps, 3);

        frames.pool(DrawPoolType::Map).mark_painted();
        assert!(frames.draw_foreground_tile(true, || None).is_none());
        assert_eq!(widget.passes().last(), Some(&DrawPoolType::Map));
        assert_eq!(widget.passes().len(), 6);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_widget_skips_the_frame() {
        let mut frames: FrameOrchestrator<RecordingWidget> =
            FrameOrchestrator::new(Handle::current());
        assert!(frames.draw_foreground_tile(true, || None).is_none());
        assert!(frames.pool(DrawPoolType::Map).can_repaint());
    }

    #[test]
    fn poisoned_pool_still_locks() {
        let pool = Arc::new(DrawPool::new(DrawPoolType::Text));
        let poisoner = Arc::clone(&pool);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("pass failed");
        })
        .join();
        drop(pool.lock());
        assert_eq!(pool.kind(), DrawPoolType::Text);
    }
}
