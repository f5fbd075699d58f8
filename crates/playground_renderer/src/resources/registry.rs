/// Maps [`BufferHandle`]s handed to the frame loop onto live GPU objects.
///
/// Handles are never reused: a released handle stays unknown forever, so a
/// stale handle is reported instead of silently aliasing a newer buffer.
use std::collections::HashMap;

use playground_core::BufferHandle;

#[derive(Debug)]
pub struct HandleRegistry<T> {
    next: u64,
    entries: HashMap<BufferHandle, T>,
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self {
            next: 1,
            entries: HashMap::new(),
        }
    }
}

impl<T> HandleRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> BufferHandle {
        let handle = BufferHandle(self.next);
        self.next += 1;
        self.entries.insert(handle, value);
        handle
    }

    pub fn get(&self, handle: BufferHandle) -> Option<&T> {
        self.entries.get(&handle)
    }

    /// Swaps the value behind a live handle.  Returns the old value, or
    /// `None` (leaving the registry untouched) if the handle is unknown.
    pub fn replace(&mut self, handle: BufferHandle, value: T) -> Option<T> {
        self.entries
            .get_mut(&handle)
            .map(|slot| std::mem::replace(slot, value))
    }

    pub fn remove(&mut self, handle: BufferHandle) -> Option<T> {
        self.entries.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
