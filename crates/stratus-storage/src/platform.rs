//! Runtime feature capabilities of the host platform.

use serde::{Deserialize, Serialize};

/// Features the current platform can honor.
///
/// Evaluated once and injected into every client; the resolver consults it
/// instead of branching per build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    /// Whether content MD5 can be computed and validated.
    pub content_md5: bool,
}

impl PlatformCapabilities {
    /// Every feature available.
    pub const fn full() -> Self {
        Self { content_md5: true }
    }

    /// A platform without content MD5 support.
    pub const fn restricted() -> Self {
        Self { content_md5: false }
    }

    /// Returns whether content MD5 is available.
    #[inline]
    pub fn supports_content_md5(&self) -> bool {
        self.content_md5
    }
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self::full()
    }
}
