use url::Url;

/// Extracts the host key used for per-host rate limiting
///
/// The key is the lowercase host, followed by `:port` when the URL carries an
/// explicit non-default port, so two servers on one machine are paced
/// independently.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use article_harvester::url::host_key;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(host_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns true if both URLs live on the same host key
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (host_key(a), host_key(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_host() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(host_key(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_subdomain() {
        let url = Url::parse("https://blog.example.com/post").unwrap();
        assert_eq!(host_key(&url), Some("blog.example.com".to_string()));
    }

    #[test]
    fn test_explicit_port_kept() {
        let url = Url::parse("https://example.com:8443/").unwrap();
        assert_eq!(host_key(&url), Some("example.com:8443".to_string()));
    }

    #[test]
    fn test_default_port_dropped() {
        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(host_key(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(host_key(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_same_host() {
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://EXAMPLE.com/b?x=1").unwrap();
        let c = Url::parse("https://other.com/a").unwrap();
        let d = Url::parse("https://example.com:8080/a").unwrap();

        assert!(same_host(&a, &b));
        assert!(!same_host(&a, &c));
        assert!(!same_host(&a, &d));
    }
}
