use url::Url;

/// Result of fetching a URL
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub html: String,
    pub url: String,
    pub status: u16,
    pub content_type: String,
}

/// Error during fetch
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Client error: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Failed to read body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Add a scheme to bare host inputs (`example.com/page`).
pub fn normalize_url(url_str: &str) -> String {
    if !url_str.starts_with("http://") && !url_str.starts_with("https://") {
        format!("https://{}", url_str)
    } else {
        url_str.to_string()
    }
}

/// Fetch a URL and return the HTML content (blocking).
///
/// The fragment is never sent; callers read text directives from the
/// requested URL, not from `FetchResult::url`.
pub fn fetch_url(url_str: &str) -> Result<FetchResult, FetchError> {
    let parsed = Url::parse(&normalize_url(url_str))?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(
            "Mozilla/5.0 (compatible; ALICE-Anchor/0.2; ",
            "+https://github.com/ext-sakamoro/ALICE-Anchor)"
        ))
        .timeout(std::time::Duration::from_secs(15))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(FetchError::Client)?;

    log::debug!("GET {}", parsed);
    let response = client
        .get(parsed.as_str())
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .map_err(FetchError::Request)?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    let final_url = response.url().to_string();

    let html = response.text().map_err(FetchError::Body)?;
    log::debug!("{} -> {} ({} bytes, {})", parsed, status, html.len(), content_type);

    Ok(FetchResult {
        html,
        url: final_url,
        status,
        content_type,
    })
}
