//! The `Recyclable` trait: the one hook a caller-supplied type provides.

/// A type that can be managed by a [`crate::Recycler`].
///
/// The factory (`new_object`) is the caller's allocation function — the
/// recycler core never constructs a `T` except by calling it on a pool miss.
/// `on_acquire`/`on_release` are optional ambient hooks for resetting
/// object-specific state; the core recycling protocol does not call them
/// itself beyond the points documented below, and both default to no-ops.
///
/// # Examples
///
/// ```rust
/// use thread_recycler::{Recycler, RecyclerConfig, Recyclable};
///
/// struct Buffer {
///     data: Vec<u8>,
/// }
///
/// impl Recyclable for Buffer {
///     fn new_object(_recycler: &Recycler<Self>) -> Self {
///         Buffer { data: Vec::with_capacity(4096) }
///     }
///
///     fn on_acquire(&mut self) {
///         self.data.clear();
///     }
/// }
///
/// let recycler: Recycler<Buffer> = Recycler::new(RecyclerConfig::default());
/// let mut buf = recycler.get();
/// buf.data.extend_from_slice(b"hello");
/// ```
pub trait Recyclable {
    /// Constructs a fresh object on a pool miss. Called by the core only
    /// when `get()` finds nothing recycled to hand back.
    fn new_object(recycler: &crate::Recycler<Self>) -> Self
    where
        Self: Sized;

    /// Called on the object returned by `get()`, after it has been taken
    /// from the pool (or just constructed). The default does nothing.
    fn on_acquire(&mut self) {}

    /// Called once, at the start of [`crate::Handle::recycle`], before the
    /// admission-ratio and capacity filters decide whether to keep the
    /// object. Runs even for objects the filters go on to drop — treat it
    /// as "I am done with this object," not "this object was kept." The
    /// default does nothing.
    fn on_release(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Recycler, RecyclerConfig};

    struct Counter(i32);

    impl Recyclable for Counter {
        fn new_object(_recycler: &Recycler<Self>) -> Self {
            Counter(0)
        }

        fn on_acquire(&mut self) {
            self.0 = 0;
        }
    }

    #[test]
    fn default_hooks_are_noops_unless_overridden() {
        let recycler: Recycler<Counter> = Recycler::new(RecyclerConfig::default());
        let mut c = recycler.get();
        c.0 = 42;
        assert_eq!(c.0, 42);
    }
}
