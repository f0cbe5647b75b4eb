use crate::dispatcher::HeaderVec;
use crate::router::ParamVec;
use may_minihttp::Request;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info};

/// Parsed HTTP request data used by [`AppService`](super::AppService).
///
/// Header and cookie names are lowercased; query parameters are URL-decoded.
#[derive(Debug)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path with the query string stripped
    pub path: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Parsed cookies from the Cookie header
    pub cookies: HeaderVec,
    /// Parsed query string parameters
    pub query_params: ParamVec,
    /// Parsed JSON body (if the body parses as JSON)
    pub body: Option<serde_json::Value>,
}

/// Split a Cookie header value into name/value pairs.
pub fn parse_cookies(headers: &HeaderVec) -> HeaderVec {
    let mut cookies = HeaderVec::new();
    let Some(raw) = headers
        .iter()
        .find(|(k, _)| k.as_ref() == "cookie")
        .map(|(_, v)| v.as_str())
    else {
        return cookies;
    };
    for pair in raw.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let Some(name) = parts.next() else { continue };
        if name.is_empty() {
            continue;
        }
        let value = parts.next().unwrap_or("").trim().to_string();
        cookies.push((Arc::from(name.trim()), value));
    }
    cookies
}

/// Parse and URL-decode the query string of a request path.
pub fn parse_query_params(path: &str) -> ParamVec {
    let mut params = ParamVec::new();
    if let Some(pos) = path.find('?') {
        let query_str = &path[pos + 1..];
        for (k, v) in url::form_urlencoded::parse(query_str.as_bytes()) {
            params.push((Arc::from(k.as_ref()), v.to_string()));
        }
    }
    params
}

/// Extract method, path, headers, cookies, query parameters and JSON body
/// from a raw `may_minihttp` request.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let mut headers = HeaderVec::new();
    for h in req.headers() {
        headers.push((
            Arc::from(h.name.to_ascii_lowercase().as_str()),
            String::from_utf8_lossy(h.value).to_string(),
        ));
    }
    debug!(header_count = headers.len(), "Headers extracted");

    let cookies = parse_cookies(&headers);
    let query_params = parse_query_params(&raw_path);

    let body = {
        let mut body_str = String::new();
        match req.body().read_to_string(&mut body_str) {
            Ok(size) if size > 0 => {
                let parsed: Result<serde_json::Value, _> = serde_json::from_str(&body_str);
                if parsed.is_err() {
                    debug!(body_size_bytes = size, "Body is not valid JSON");
                }
                parsed.ok()
            }
            _ => None,
        }
    };

    info!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        query_param_count = query_params.len(),
        has_body = body.is_some(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        cookies,
        query_params,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookies() {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("cookie"), "a=b; c=d".to_string()));
        let cookies = parse_cookies(&headers);
        let get = |name: &str| {
            cookies
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("a"), Some("b"));
        assert_eq!(get("c"), Some("d"));
    }

    #[test]
    fn test_parse_query_params() {
        let params = parse_query_params("/p?x=1&y=hello%20world");
        assert_eq!(params[0].0.as_ref(), "x");
        assert_eq!(params[0].1, "1");
        assert_eq!(params[1].1, "hello world");
    }

    #[test]
    fn test_no_query_string() {
        assert!(parse_query_params("/p").is_empty());
    }
}
