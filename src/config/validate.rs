// src/config/validate.rs

use crate::config::duration::parse_duration;
use crate::config::model::{Config, RawConfigFile};
use crate::errors::{Result, TunnelError};

impl TryFrom<RawConfigFile> for Config {
    type Error = TunnelError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let url_timeout = duration_field("tunnel.url_timeout", &raw.tunnel.url_timeout)?;
        if url_timeout.is_zero() {
            return Err(TunnelError::Config(
                "[tunnel].url_timeout must be greater than zero".to_string(),
            ));
        }

        let startup_delay = duration_field("tunnel.startup_delay", &raw.tunnel.startup_delay)?;

        validate_template("download.filebrowser_url", raw.download.filebrowser_url.as_deref())?;
        validate_template("download.cloudflared_url", raw.download.cloudflared_url.as_deref())?;

        if let Some(dir) = &raw.cache.dir {
            if dir.as_os_str().is_empty() {
                return Err(TunnelError::Config(
                    "[cache].dir must not be empty".to_string(),
                ));
            }
        }

        Ok(Config {
            url_timeout,
            startup_delay,
            cache_dir: raw.cache.dir,
            filebrowser_url: raw.download.filebrowser_url,
            cloudflared_url: raw.download.cloudflared_url,
        })
    }
}

fn duration_field(key: &str, value: &str) -> Result<std::time::Duration> {
    parse_duration(value).map_err(|e| TunnelError::Config(format!("{key}: {e}")))
}

fn validate_template(key: &str, template: Option<&str>) -> Result<()> {
    let Some(template) = template else {
        return Ok(());
    };

    for placeholder in ["{os}", "{arch}"] {
        if !template.contains(placeholder) {
            return Err(TunnelError::Config(format!(
                "{key} must contain the {placeholder} placeholder (got '{template}')"
            )));
        }
    }

    if !(template.starts_with("https://") || template.starts_with("http://")) {
        return Err(TunnelError::Config(format!(
            "{key} must be an http(s) URL (got '{template}')"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::model::{DownloadSection, TunnelSection};

    #[test]
    fn defaults_validate() {
        let cfg = Config::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let raw = RawConfigFile {
            tunnel: TunnelSection {
                url_timeout: "0s".to_string(),
                ..TunnelSection::default()
            },
            ..RawConfigFile::default()
        };
        match Config::try_from(raw) {
            Err(TunnelError::Config(msg)) => assert!(msg.contains("url_timeout")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn zero_startup_delay_is_fine() {
        let raw = RawConfigFile {
            tunnel: TunnelSection {
                startup_delay: "0ms".to_string(),
                ..TunnelSection::default()
            },
            ..RawConfigFile::default()
        };
        let cfg = Config::try_from(raw).unwrap();
        assert_eq!(cfg.startup_delay, Duration::ZERO);
    }

    #[test]
    fn template_needs_placeholders() {
        let raw = RawConfigFile {
            download: DownloadSection {
                filebrowser_url: Some("https://mirror.example/{os}-filebrowser.tar.gz".into()),
                cloudflared_url: None,
            },
            ..RawConfigFile::default()
        };
        match Config::try_from(raw) {
            Err(TunnelError::Config(msg)) => assert!(msg.contains("{arch}")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
