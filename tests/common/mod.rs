#![allow(dead_code)]

use std::time::Duration;

use filebrowser_tunnel::engine::SessionOptions;

pub use filebrowser_tunnel_test_utils::{init_tracing, with_timeout};

/// Session options for tests: serve `dir`, no startup delay.
pub fn session_options(dir: &std::path::Path, url_timeout: Duration) -> SessionOptions {
    SessionOptions {
        directory: dir.to_string_lossy().into_owned(),
        url_timeout,
        startup_delay: Duration::ZERO,
    }
}
