// src/net.rs

use std::net::TcpListener;

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;

/// Ask the OS for a currently free TCP port.
///
/// The probe listener is dropped before returning, so another process could
/// take the port before the file server binds it.
pub fn free_port() -> Result<u16> {
    let listener = TcpListener::bind("0.0.0.0:0").context("binding probe listener")?;
    let port = listener
        .local_addr()
        .context("reading probe listener address")?
        .port();
    debug!(port, "picked free port");
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_a_bindable_port() {
        let port = free_port().unwrap();
        assert_ne!(port, 0);
        TcpListener::bind(("0.0.0.0", port)).unwrap();
    }
}
