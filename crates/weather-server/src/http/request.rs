use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    /// Anything else. Parsing still succeeds; the router answers 404.
    Other(String),
}

/// A structurally parsed request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    params: Vec<(String, String)>,
    pub body: String,
}

impl Request {
    /// First occurrence wins when a parameter name repeats.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Parse the raw bytes of one request.
///
/// The request line must split into exactly three whitespace-separated
/// tokens (method, target, version); anything else is malformed. Method
/// validity is a routing concern, not a parse concern.
pub fn parse_request(raw: &[u8]) -> Result<Request, ApiError> {
    let text = String::from_utf8_lossy(raw);
    let first_line = text.lines().next().unwrap_or("");

    let tokens: Vec<&str> = first_line.split_whitespace().collect();
    let &[method, target, _version] = tokens.as_slice() else {
        return Err(ApiError::MalformedRequest);
    };

    let method = match method {
        "GET" => Method::Get,
        "POST" => Method::Post,
        other => Method::Other(other.to_string()),
    };

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };

    let body = if method == Method::Post {
        // Body is everything after the first blank line; absent separator
        // means an empty body.
        text.split_once("\r\n\r\n")
            .map(|(_, b)| b.to_string())
            .unwrap_or_default()
    } else {
        String::new()
    };

    Ok(Request {
        method,
        path: path.to_string(),
        params: parse_query(query),
        body,
    })
}

/// Split a query string into name/value pairs. Values are taken literally:
/// no percent-decoding is performed, so "New%20York" stays "New%20York".
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}
