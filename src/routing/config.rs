//! Router configuration.

use std::time::Duration;

/// Router configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// How long a single handler invocation may run before the request is
    /// answered with a server fault. `None` waits forever.
    pub handler_timeout: Option<Duration>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            handler_timeout: Some(Duration::from_secs(30)),
        }
    }
}
