//! Pointer ownership between concurrent detectors

use smallvec::SmallVec;

/// Pointer ids claimed by active gestures.
///
/// A detector retains its pointers when its gesture starts and releases them
/// when the gesture ends; other detectors refuse to start on retained
/// pointers.
#[derive(Debug, Default, Clone)]
pub struct PointerRetainer {
    retained: SmallVec<[i32; 4]>,
}

impl PointerRetainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retain(&mut self, id: i32) {
        if !self.retained.contains(&id) {
            self.retained.push(id);
        }
    }

    pub fn release(&mut self, id: i32) {
        self.retained.retain(|retained| *retained != id);
    }

    pub fn is_retained(&self, id: i32) -> bool {
        self.retained.contains(&id)
    }

    pub fn clear(&mut self) {
        self.retained.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_is_idempotent() {
        let mut retainer = PointerRetainer::new();
        retainer.retain(2);
        retainer.retain(2);
        assert!(retainer.is_retained(2));
        retainer.release(2);
        assert!(!retainer.is_retained(2));
        assert!(retainer.is_empty());
    }
}
