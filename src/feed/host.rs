// src/feed/host.rs
use url::Url;

/// Display host for a link: hostname without a leading `www.`.
/// Returns an empty string when the url does not parse or has no host.
pub fn extract_host(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return String::new();
    };
    let host = parsed.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}
