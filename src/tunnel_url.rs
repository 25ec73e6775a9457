// src/tunnel_url.rs

//! Extraction of the public quick-tunnel URL from `cloudflared` output.
//!
//! `cloudflared` prints its URL inside a human-readable banner whose layout
//! changes between releases, so lines are treated as free text: every
//! occurrence of the hostname suffix is checked for a single-label host
//! directly preceded by the scheme.

/// Hostname suffix of quick-tunnel URLs.
pub const TUNNEL_HOST_SUFFIX: &str = ".trycloudflare.com";

const SCHEME: &str = "https://";

/// Return the first `https://<label>.trycloudflare.com` span in `line`, if
/// any. `<label>` is one or more ASCII letters, digits or `-`.
///
/// Pure and allocation-free; safe to call from any number of tasks.
pub fn extract_tunnel_url(line: &str) -> Option<&str> {
    line.match_indices(TUNNEL_HOST_SUFFIX)
        .find_map(|(suffix_at, suffix)| {
            let before = &line[..suffix_at];
            let label_len = before
                .bytes()
                .rev()
                .take_while(|b| is_label_byte(*b))
                .count();
            if label_len == 0 {
                return None;
            }
            // Byte-wise: the text before the label may be multi-byte.
            let label_at = suffix_at - label_len;
            if !line.as_bytes()[..label_at].ends_with(SCHEME.as_bytes()) {
                return None;
            }
            Some(&line[label_at - SCHEME.len()..suffix_at + suffix.len()])
        })
}

fn is_label_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_url_inside_banner() {
        let line = "2024/01/01 INFO  +--------------------------------------------------------------------------------+ | https://random-words-1234.trycloudflare.com |";
        assert_eq!(
            extract_tunnel_url(line),
            Some("https://random-words-1234.trycloudflare.com")
        );
    }

    #[test]
    fn suffix_without_scheme_is_ignored() {
        assert_eq!(
            extract_tunnel_url("some log line about trycloudflare.com pricing"),
            None
        );
        assert_eq!(extract_tunnel_url("visit foo.trycloudflare.com"), None);
    }

    #[test]
    fn other_hosts_are_ignored() {
        assert_eq!(extract_tunnel_url("https://example.com"), None);
        assert_eq!(extract_tunnel_url(""), None);
    }

    #[test]
    fn tolerates_ansi_styling() {
        let line = "\u{1b}[32mINF\u{1b}[0m |  https://abc-def.trycloudflare.com\u{1b}[0m  |";
        assert_eq!(
            extract_tunnel_url(line),
            Some("https://abc-def.trycloudflare.com")
        );
    }

    #[test]
    fn nearest_scheme_wins() {
        let line = "see https://docs.example.org then https://a-b-c.trycloudflare.com/path";
        assert_eq!(
            extract_tunnel_url(line),
            Some("https://a-b-c.trycloudflare.com")
        );
    }

    #[test]
    fn bare_suffix_before_the_url_is_skipped() {
        let line = "INF Requesting new quick Tunnel on api.trycloudflare.com... https://abc-def.trycloudflare.com";
        assert_eq!(
            extract_tunnel_url(line),
            Some("https://abc-def.trycloudflare.com")
        );
    }

    #[test]
    fn scheme_of_another_url_is_not_borrowed() {
        assert_eq!(
            extract_tunnel_url("https://docs.example.org/x about.trycloudflare.com"),
            None
        );
        assert_eq!(extract_tunnel_url("https://.trycloudflare.com"), None);
        assert_eq!(extract_tunnel_url("https://a.b.trycloudflare.com"), None);
    }

    #[test]
    fn multibyte_text_around_the_url() {
        let line = "✓ tunnel ready → https://ünïcode-free-1.trycloudflare.com ok https://plain-1.trycloudflare.com";
        assert_eq!(
            extract_tunnel_url(line),
            Some("https://plain-1.trycloudflare.com")
        );
    }
}
