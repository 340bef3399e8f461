use reqwest::Proxy;

use crate::DownloadError;

/// Proxy configuration types
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ProxyType {
    /// HTTP proxy
    Http,
    /// HTTPS proxy
    Https,
    /// SOCKS5 proxy
    Socks5,
}

/// Credentials for an authenticating proxy
#[derive(Debug, Clone)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

/// Explicit proxy used for every manifest and segment request
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Proxy server URL (e.g., "http://proxy.example.com:8080")
    pub url: String,
    pub proxy_type: ProxyType,
    pub auth: Option<ProxyAuth>,
}

impl ProxyConfig {
    pub fn new(url: impl Into<String>, proxy_type: ProxyType) -> Self {
        Self {
            url: url.into(),
            proxy_type,
            auth: None,
        }
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(ProxyAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Normalized proxy URL; SOCKS5 proxies get a `socks5://` scheme when none was given.
    fn normalized_url(&self) -> String {
        match self.proxy_type {
            ProxyType::Socks5
                if !(self.url.starts_with("socks5://") || self.url.starts_with("socks5h://")) =>
            {
                format!("socks5://{}", self.url)
            }
            _ => self.url.clone(),
        }
    }
}

/// Build a reqwest [`Proxy`] from a [`ProxyConfig`].
pub fn build_proxy_from_config(config: &ProxyConfig) -> Result<Proxy, DownloadError> {
    let url = config.normalized_url();

    let proxy = match config.proxy_type {
        ProxyType::Http => Proxy::http(&url),
        ProxyType::Https => Proxy::https(&url),
        ProxyType::Socks5 => Proxy::all(&url),
    }
    .map_err(|e| DownloadError::proxy_configuration(format!("invalid proxy URL `{url}`: {e}")))?;

    Ok(match &config.auth {
        Some(auth) => proxy.basic_auth(&auth.username, &auth.password),
        None => proxy,
    })
}
