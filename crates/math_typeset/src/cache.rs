//! Font Cache - Shared, explicitly passed cache of loaded fonts
//!
//! Faces are loaded once per [`FontId`] through a [`FontLoader`]; sized
//! [`MathFont`]s are cached per `(FontId, size)`. Readers never block each
//! other, and two layout passes asking for the same unloaded face wait on a
//! single load instead of loading it twice.

use crate::config::FontCacheConfig;
use crate::error::MathResult;
use crate::font::{FontFace, FontId, MathFont};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// The external font service
pub trait FontLoader: Send + Sync {
    /// Load a face with its glyph metrics and (optional) math table
    fn load(&self, id: &FontId) -> MathResult<FontFace>;
}

type FaceSlot = Arc<Mutex<Option<Arc<FontFace>>>>;

/// Cache key for a sized font
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SizedKey {
    id: FontId,
    size_bits: u32,
}

/// Cache of loaded faces and sized fonts
pub struct FontCache {
    loader: Arc<dyn FontLoader>,
    config: FontCacheConfig,
    faces: RwLock<HashMap<FontId, FaceSlot>>,
    sized: RwLock<HashMap<SizedKey, MathFont>>,
}

impl FontCache {
    pub fn new(loader: Arc<dyn FontLoader>) -> Self {
        Self::with_config(loader, FontCacheConfig::default())
    }

    pub fn with_config(loader: Arc<dyn FontLoader>, config: FontCacheConfig) -> Self {
        Self {
            loader,
            config,
            faces: RwLock::new(HashMap::new()),
            sized: RwLock::new(HashMap::new()),
        }
    }

    /// Get a face, loading it on first use
    pub fn face(&self, id: &FontId) -> MathResult<Arc<FontFace>> {
        let slot = self.slot(id);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(face) = guard.as_ref() {
            return Ok(face.clone());
        }

        tracing::debug!(font = %id, "loading font face");
        let face = Arc::new(self.loader.load(id)?);
        *guard = Some(face.clone());
        Ok(face)
    }

    /// Get a face at a point size
    pub fn font(&self, id: &FontId, size: f32) -> MathResult<MathFont> {
        let key = SizedKey {
            id: id.clone(),
            size_bits: size.to_bits(),
        };

        {
            let sized = self.sized.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(font) = sized.get(&key) {
                return Ok(font.clone());
            }
        }

        let font = MathFont::new(self.face(id)?, size);

        let mut sized = self.sized.write().unwrap_or_else(PoisonError::into_inner);
        if sized.len() >= self.config.max_sized_fonts {
            tracing::trace!(entries = sized.len(), "flushing sized font cache");
            sized.clear();
        }
        Ok(sized.entry(key).or_insert(font).clone())
    }

    /// Whether a face has been loaded
    pub fn is_loaded(&self, id: &FontId) -> bool {
        // Release the map before waiting on a slot that may be mid-load
        let slot = {
            let faces = self.faces.read().unwrap_or_else(PoisonError::into_inner);
            faces.get(id).cloned()
        };
        slot.map(|slot| {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        })
        .unwrap_or(false)
    }

    /// Number of sized fonts currently cached
    pub fn sized_count(&self) -> usize {
        self.sized
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn slot(&self, id: &FontId) -> FaceSlot {
        {
            let faces = self.faces.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = faces.get(id) {
                return slot.clone();
            }
        }

        let mut faces = self.faces.write().unwrap_or_else(PoisonError::into_inner);
        faces.entry(id.clone()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MathError;
    use crate::metrics::StaticGlyphMetrics;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    struct CountingLoader {
        loads: AtomicUsize,
    }

    impl FontLoader for CountingLoader {
        fn load(&self, id: &FontId) -> MathResult<FontFace> {
            if id.0 == "missing" {
                return Err(MathError::FontLoad(format!("no such font: {}", id)));
            }
            self.loads.fetch_add(1, Ordering::SeqCst);
            // Widen the window in which concurrent callers could race
            thread::sleep(Duration::from_millis(20));
            let metrics = StaticGlyphMetrics::new(1000, 800.0, 200.0);
            Ok(FontFace::new(id.clone(), Arc::new(metrics), None))
        }
    }

    fn loader() -> Arc<CountingLoader> {
        Arc::new(CountingLoader {
            loads: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_face_loaded_once() {
        let loader = loader();
        let cache = FontCache::new(loader.clone());
        let id = FontId::new("latin-modern");

        assert!(!cache.is_loaded(&id));
        let a = cache.face(&id).unwrap();
        let b = cache.face(&id).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.is_loaded(&id));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_requests_share_one_load() {
        let loader = loader();
        let cache = Arc::new(FontCache::new(loader.clone()));
        let id = FontId::new("xits");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                let id = id.clone();
                thread::spawn(move || cache.font(&id, 10.0 + i as f32).unwrap().size())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap() >= 10.0);
        }
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sized_fonts_keyed_by_size() {
        let cache = FontCache::new(loader());
        let id = FontId::new("termes");

        let f12 = cache.font(&id, 12.0).unwrap();
        let again = cache.font(&id, 12.0).unwrap();
        let f20 = cache.font(&id, 20.0).unwrap();

        assert_eq!(f12.size(), again.size());
        assert_eq!(f20.size(), 20.0);
        assert!(Arc::ptr_eq(f12.face(), f20.face()));
        assert_eq!(cache.sized_count(), 2);
    }

    #[test]
    fn test_sized_cache_is_bounded() {
        let cache = FontCache::with_config(
            loader(),
            FontCacheConfig {
                max_sized_fonts: 2,
            },
        );
        let id = FontId::new("termes");
        for size in [8.0, 9.0, 10.0, 11.0, 12.0] {
            cache.font(&id, size).unwrap();
        }
        assert!(cache.sized_count() <= 2);
    }

    #[test]
    fn test_load_failure_is_not_cached() {
        let cache = FontCache::new(loader());
        let id = FontId::new("missing");
        assert!(matches!(cache.face(&id), Err(MathError::FontLoad(_))));
        assert!(!cache.is_loaded(&id));
    }

    /// Blocks loads of "slow" until released
    struct GatedLoader {
        started: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl FontLoader for GatedLoader {
        fn load(&self, id: &FontId) -> MathResult<FontFace> {
            if id.0 == "slow" {
                let _ = self.started.lock().unwrap().send(());
                let _ = self.release.lock().unwrap().recv();
            }
            let metrics = StaticGlyphMetrics::new(1000, 800.0, 200.0);
            Ok(FontFace::new(id.clone(), Arc::new(metrics), None))
        }
    }

    #[test]
    fn test_load_status_check_does_not_block_other_fonts() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let cache = Arc::new(FontCache::new(Arc::new(GatedLoader {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        })));

        let slow = {
            let cache = cache.clone();
            thread::spawn(move || cache.face(&FontId::new("slow")).is_ok())
        };
        started_rx.recv().unwrap();

        // Waits on the slot of the face being loaded
        let status = {
            let cache = cache.clone();
            thread::spawn(move || cache.is_loaded(&FontId::new("slow")))
        };
        thread::sleep(Duration::from_millis(20));

        let (done_tx, done_rx) = mpsc::channel();
        let fast = {
            let cache = cache.clone();
            thread::spawn(move || {
                let loaded = cache.face(&FontId::new("fast")).is_ok();
                let _ = done_tx.send(());
                loaded
            })
        };
        let finished = done_rx.recv_timeout(Duration::from_secs(2));

        release_tx.send(()).unwrap();
        assert!(slow.join().unwrap());
        assert!(fast.join().unwrap());
        status.join().unwrap();
        assert!(finished.is_ok(), "loading another font waited on the slow load");
    }
}
