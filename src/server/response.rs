use crate::dispatcher::HandlerResponse;
use may_minihttp::Response;
use serde_json::Value;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Header lines present on virtually every response, interned as literals.
///
/// `res.header` wants `&'static str`; anything not matched here is leaked,
/// so only genuinely dynamic headers may miss.
fn static_header_line(name: &str, value: &str) -> Option<&'static str> {
    if name.eq_ignore_ascii_case("content-type") && value == "application/json" {
        return Some("Content-Type: application/json");
    }
    None
}

/// Write a handler (or responder) response to the wire.
///
/// Custom headers from the response are emitted first; the content type
/// defaults to JSON unless the handler set its own.
pub fn write_handler_response(res: &mut Response, response: &HandlerResponse) {
    res.status_code(response.status as usize, status_reason(response.status));
    let mut has_content_type = false;
    for (name, value) in &response.headers {
        if name.eq_ignore_ascii_case("content-type") {
            has_content_type = true;
        }
        if let Some(line) = static_header_line(name, value) {
            res.header(line);
            continue;
        }
        // leaked; only dynamic headers reach this path
        let header = format!("{name}: {value}").into_boxed_str();
        res.header(Box::leak(header));
    }
    if !has_content_type {
        res.header("Content-Type: application/json");
    }
    res.body_vec(serde_json::to_vec(&response.body).unwrap_or_default());
}

/// Write a bare JSON body, bypassing the responder. Used only for responses
/// produced before a request can be routed (the health shortcut and the
/// malformed-method 400).
pub fn write_json(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
