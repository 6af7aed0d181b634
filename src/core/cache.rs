//=========================================================================
// Shared Resource Caches
//=========================================================================
//
// Lazily-populated, lock-protected caches for expensive derived resources
// shared by every character on a stage.
//
// The factory runs while the cache lock is held, so two requesters for the
// same key never both construct it. Creation of distinct keys is
// serialized as a consequence. Entries are never evicted.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use log::debug;

//=== Internal Dependencies ===============================================

use super::backend::{DeviceHandle, DeviceKind, FontHandle, HardwareBackend, Pin, Renderer};

//=== SharedCache =========================================================

/// Keyed, create-once mapping behind a mutex.
#[derive(Debug)]
pub struct SharedCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, creating it with `factory` on
    /// first request.
    pub fn get_or_create<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        let mut entries = self.lock();
        if let Some(value) = entries.get(&key) {
            return value.clone();
        }
        let value = factory(&key);
        entries.insert(key, value.clone());
        value
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, V>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K, V> Default for SharedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

//=== Resources ===========================================================

/// Process-wide resource service: one per stage, handed to every character.
#[derive(Debug, Default)]
pub struct Resources {
    fonts: SharedCache<u32, FontHandle>,
    devices: SharedCache<(DeviceKind, Pin), DeviceHandle>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterized font of `size`, created through `renderer` at most once.
    pub fn font(&self, renderer: &dyn Renderer, size: u32) -> FontHandle {
        self.fonts.get_or_create(size, |&size| {
            debug!(target: "stage", "Rasterizing font (size: {})", size);
            renderer.create_font(size)
        })
    }

    /// Device bound to `pin`, created through `hardware` at most once per
    /// `(kind, pin)`.
    pub fn device(&self, hardware: &dyn HardwareBackend, kind: DeviceKind, pin: &Pin) -> DeviceHandle {
        self.devices.get_or_create((kind, pin.clone()), |(kind, pin)| {
            debug!(target: "stage", "Creating {:?} device on pin {}", kind, pin);
            hardware.create_device(*kind, pin)
        })
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::headless::{HeadlessHardware, HeadlessRenderer};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    //=====================================================================
    // SharedCache Tests
    //=====================================================================

    #[test]
    fn factory_runs_once_per_key() {
        let cache = SharedCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_create("a", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            1
        });
        let second = cache.get_or_create("a", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            2
        });

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains(&"a"));
    }

    #[test]
    fn concurrent_requesters_share_one_creation() {
        let cache = Arc::new(SharedCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache.get_or_create(16u32, |_| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        "font"
                    })
                })
            })
            .collect();

        for worker in workers {
            assert_eq!(worker.join().unwrap(), "font");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    //=====================================================================
    // Resources Tests
    //=====================================================================

    #[test]
    fn fonts_are_created_once_per_size() {
        let renderer = HeadlessRenderer::default();
        let resources = Resources::new();

        let a = resources.font(&renderer, 16);
        let b = resources.font(&renderer, 16);
        resources.font(&renderer, 24);

        assert_eq!(a, b);
        assert_eq!(renderer.fonts_created(), 2);
        assert_eq!(resources.font_count(), 2);
    }

    #[test]
    fn devices_are_keyed_by_kind_and_pin() {
        let hardware = HeadlessHardware::new();
        let resources = Resources::new();
        let pin = Pin::from("D2");

        resources.device(&hardware, DeviceKind::Button, &pin);
        resources.device(&hardware, DeviceKind::Button, &pin);
        resources.device(&hardware, DeviceKind::Sensor, &pin);

        assert_eq!(hardware.created().len(), 2);
        assert_eq!(resources.device_count(), 2);
    }
}
