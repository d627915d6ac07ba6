use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Guarantees at most one mounted widget per page.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    mounted: Arc<AtomicBool>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the page; `None` if a widget already holds it.
    pub fn acquire(&self) -> Option<MountToken> {
        self.mounted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| MountToken {
                mounted: Arc::clone(&self.mounted),
            })
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }
}

/// Held by the mounted controller; dropping it frees the page.
#[derive(Debug)]
pub struct MountToken {
    mounted: Arc<AtomicBool>,
}

impl Drop for MountToken {
    fn drop(&mut self) {
        self.mounted.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_mount() {
        let lifecycle = Lifecycle::new();
        let token = lifecycle.acquire();
        assert!(token.is_some());
        assert!(lifecycle.is_mounted());
        assert!(lifecycle.acquire().is_none());
        assert!(lifecycle.clone().acquire().is_none());
    }

    #[test]
    fn test_drop_releases() {
        let lifecycle = Lifecycle::new();
        drop(lifecycle.acquire());
        assert!(!lifecycle.is_mounted());
        assert!(lifecycle.acquire().is_some());
    }
}
