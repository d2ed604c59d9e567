//! Interpreter configuration.

use scx_mem::{Exhaustion, MAX_CAPACITY};

/// Default arena capacity in bytes.
pub const DEFAULT_HEAP_SIZE: usize = i16::MAX as usize;

/// Default limit on expression nesting during evaluation.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Settings for a [`Context`](crate::Context).
///
/// # Examples
///
/// ```
/// use scx::{Config, Exhaustion};
///
/// let config = Config::default()
///     .with_heap_size(4096)
///     .with_persist_globals(true)
///     .with_exhaustion(Exhaustion::Panic);
///
/// assert_eq!(config.heap_size, 4096);
/// assert_eq!(Config::default().with_heap_size(1 << 20).heap_size, 65535);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Arena capacity in bytes, at most [`MAX_CAPACITY`].
    pub heap_size: usize,

    /// Maximum nesting of expression evaluation. Deeper programs produce an
    /// error value instead of overflowing the native stack.
    pub max_depth: usize,

    /// Keep the arena, the program text and the global frame between calls
    /// to [`Context::evaluate`](crate::Context::evaluate).
    pub persist_globals: bool,

    /// What happens when the arena runs out of space.
    pub exhaustion: Exhaustion,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            heap_size: DEFAULT_HEAP_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            persist_globals: false,
            exhaustion: Exhaustion::Abort,
        }
    }
}

impl Config {
    /// Sets the arena capacity, clamping it to [`MAX_CAPACITY`].
    #[must_use]
    pub fn with_heap_size(mut self, heap_size: usize) -> Self {
        self.heap_size = clamp_heap_size(heap_size);
        self
    }

    /// Sets the maximum evaluation depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables persistence of globals between evaluations.
    #[must_use]
    pub fn with_persist_globals(mut self, persist_globals: bool) -> Self {
        self.persist_globals = persist_globals;
        self
    }

    /// Sets the arena exhaustion policy.
    #[must_use]
    pub fn with_exhaustion(mut self, exhaustion: Exhaustion) -> Self {
        self.exhaustion = exhaustion;
        self
    }
}

pub(crate) fn clamp_heap_size(heap_size: usize) -> usize {
    if heap_size > MAX_CAPACITY {
        scx_log::warn!(
            "heap size {} exceeds the {} byte limit, clamping",
            heap_size,
            MAX_CAPACITY
        );
    }
    heap_size.min(MAX_CAPACITY)
}
