// src/exec/scanner.rs

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::exec::manager::Shared;
use crate::tunnel_url::extract_tunnel_url;

/// Spawn the task that reads the tunnel client's diagnostic stream line by
/// line and reports every URL it finds.
///
/// The task ends on its own once the stream hits EOF (normally because the
/// process exited or was killed).
pub(crate) fn spawn_url_scanner<R>(reader: R, shared: Arc<Shared>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut found = 0usize;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "tunnel output stream failed");
                    break;
                }
            }

            // Banner lines may carry stray non-UTF-8 bytes; they are free text.
            let text = String::from_utf8_lossy(&buf);
            let line = text.trim_end_matches(['\r', '\n']);
            debug!("cloudflared: {}", line);

            if let Some(url) = extract_tunnel_url(line) {
                found += 1;
                info!(url, "tunnel URL discovered");
                shared.record_url(url.to_string()).await;
            }
        }

        debug!(urls_found = found, "tunnel output scanner ended");
    })
}
