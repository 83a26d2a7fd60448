use url::Url;

/// Schemes whose links never lead to a fetchable page
const NON_FETCHABLE_SCHEMES: &[&str] = &["mailto:", "tel:", "data:"];

/// Cleans a piece of extracted text
///
/// Newlines are stripped, runs of whitespace collapse to a single space, and
/// surrounding whitespace is trimmed.
///
/// # Examples
///
/// ```
/// use article_harvester::url::clean_text;
///
/// assert_eq!(clean_text("  Breaking\n   News \r\n"), "Breaking News");
/// ```
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if the href is an inert `javascript:` link
///
/// The scheme check is case-insensitive and ignores leading whitespace.
pub fn is_inert_link(href: &str) -> bool {
    href.trim_start()
        .get(..11)
        .map(|prefix| prefix.eq_ignore_ascii_case("javascript:"))
        .unwrap_or(false)
}

/// Resolves an href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only links
/// - `javascript:` links
/// - `mailto:`, `tel:` and `data:` links
/// - hrefs that do not resolve to an HTTP(S) URL
///
/// Absolute HTTP(S) hrefs are returned unchanged; relative ones are joined
/// onto `base_url`.
///
/// # Examples
///
/// ```
/// use article_harvester::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("http://site.test").unwrap();
/// let resolved = resolve_link("/page?x=1", &base).unwrap();
/// assert_eq!(resolved.as_str(), "http://site.test/page?x=1");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') || is_inert_link(href) {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if NON_FETCHABLE_SCHEMES
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if is_http(&absolute_url) => Some(absolute_url),
        _ => None,
    }
}

/// Returns the key a URL is deduplicated under
///
/// The fragment is dropped since it is never sent to the server; everything
/// else is kept as-is, so two URLs collide only when they address the same
/// resource exactly.
pub fn visit_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}

/// Builds the URL of a given page of a paginated listing
///
/// Sets the `page` query parameter, replacing any existing one and keeping
/// all other parameters in order.
///
/// # Examples
///
/// ```
/// use article_harvester::url::paged_url;
/// use url::Url;
///
/// let base = Url::parse("https://news.test/list?cat=world").unwrap();
/// assert_eq!(paged_url(&base, 2).as_str(), "https://news.test/list?cat=world&page=2");
/// ```
pub fn paged_url(base_url: &Url, page: u32) -> Url {
    let kept: Vec<(String, String)> = base_url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base_url.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("page", &page.to_string());
    }
    url
}

/// Parses a seed URL, accepting only HTTP(S) URLs with a host
pub fn parse_seed_url(seed: &str) -> Result<Url, String> {
    let url = Url::parse(seed.trim()).map_err(|e| format!("'{}': {}", seed, e))?;

    if !is_http(&url) {
        return Err(format!(
            "'{}': only HTTP and HTTPS URLs can be crawled, got {}",
            seed,
            url.scheme()
        ));
    }

    if url.host_str().is_none() {
        return Err(format!("'{}': missing host", seed));
    }

    Ok(url)
}

fn is_http(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}
