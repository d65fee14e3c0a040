use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum_client_ip::InsecureClientIp;
use tracing::instrument;

use crate::assets::Variant;
use crate::client::ClientId;
use crate::hit::Hit;
use crate::prometheus::report_dropped_hit;
use crate::router;

const COOKIE_NAME: &str = "cid";
const CID_HEADER: HeaderName = HeaderName::from_static("cid");
// Two years. The cookie contract is "long/indefinite"; deletion is a
// client-side concern.
const COOKIE_MAX_AGE_SECONDS: u64 = 63_072_000;

/// `GET /` carries no tracking id, redirect to the project page.
pub async fn index(State(state): State<router::State>) -> Response {
    redirect(&state.redirect_url)
}

/// `GET /{trackingId}/{pagePath...}` with the single-segment and empty-path
/// cases folded in, mirroring the one-controller shape of the original
/// service. The path is split exactly once: everything after the tracking id
/// is the page path.
#[instrument(skip_all, fields(tracking_id, page_path, client_id))]
pub async fn badge(
    State(state): State<router::State>,
    InsecureClientIp(ip): InsecureClientIp,
    Path(path): Path<String>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let query = parse_query(raw_query.as_deref());
    let referer = header_str(&headers, header::REFERER);
    let user_agent = header_str(&headers, header::USER_AGENT);

    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return redirect(&state.redirect_url);
    }

    let effective = effective_path(trimmed, &query, referer);
    let (tracking_id, page_path) = split_path(&effective);
    tracing::Span::current().record("tracking_id", tracking_id);

    let Some(page_path) = page_path else {
        // One segment: informational page, no hit, no cookie.
        return Html(state.assets.render_page(tracking_id, referer)).into_response();
    };
    tracing::Span::current().record("page_path", page_path);

    let (client_id, fresh) = match cookie_value(&headers, COOKIE_NAME) {
        Some(value) if !value.is_empty() => {
            tracing::debug!("existing cid found");
            (Some(ClientId::from_cookie(value)), false)
        }
        // An empty cookie counts as present: don't mint a replacement, but
        // there is no id to report with either.
        Some(_) => (None, false),
        None => match ClientId::generate() {
            Ok(id) => {
                tracing::debug!("generated new cid");
                (Some(id), true)
            }
            Err(err) => {
                // Serve the image anyway; without a client id the hit is
                // skipped entirely and no cookie is set.
                report_dropped_hit(err.cause());
                tracing::warn!("failed to generate client id: {}", err);
                (None, false)
            }
        },
    };

    let variant = Variant::from_query(&query);
    let mut response = (
        [(header::CONTENT_TYPE, variant.content_type())],
        state.assets.body(variant),
    )
        .into_response();

    if let Some(client_id) = client_id {
        tracing::Span::current().record("client_id", client_id.as_str());

        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        match HeaderValue::from_str(client_id.as_str()) {
            Ok(value) => {
                response.headers_mut().insert(CID_HEADER, value);
            }
            Err(err) => tracing::warn!("cid not representable as a header: {}", err),
        }

        if fresh {
            let cookie = format!(
                "{}={}; Path=/{}; Max-Age={}",
                COOKIE_NAME, client_id, tracking_id, COOKIE_MAX_AGE_SECONDS
            );
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                }
                Err(err) => tracing::warn!("failed to encode cid cookie: {}", err),
            }
        }

        let hit = Hit::build(
            tracking_id,
            page_path,
            client_id.as_str(),
            &ip.to_string(),
            &query,
            user_agent,
        );

        // Fire and forget: delivery runs detached from the response path,
        // failures are counted and logged, never surfaced to the caller.
        let sink = state.sink.clone();
        tokio::spawn(async move {
            if let Err(err) = sink.send(hit).await {
                report_dropped_hit(err.cause());
                tracing::warn!("failed to deliver hit: {}", err);
            }
        });
    }

    response
}

fn redirect(url: &str) -> Response {
    match Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, url)
        .body(axum::body::Body::empty())
    {
        Ok(response) => response.into_response(),
        Err(err) => {
            tracing::error!("failed to build redirect to {}: {}", url, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: HeaderName) -> &'h str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

/// Query pairs in request order. Bare keys (`?pixel`) parse to empty values;
/// nothing is ever rejected, unknown keys flow into the payload as-is.
fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    serde_urlencoded::from_str(raw).unwrap_or_else(|err| {
        tracing::debug!("failed to parse query string: {}", err);
        Vec::new()
    })
}

/// `useReferer` replaces the path-derived account/page with
/// `{trackingId}/{referer minus its leading scheme}` before the split. A
/// one-segment request can become reportable this way.
fn effective_path(trimmed: &str, query: &[(String, String)], referer: &str) -> String {
    if query.iter().any(|(key, _)| key == "useReferer") && !referer.is_empty() {
        let stripped = referer
            .strip_prefix("http://")
            .or_else(|| referer.strip_prefix("https://"))
            .unwrap_or(referer);
        if !stripped.is_empty() {
            let tracking_id = trimmed.split('/').next().unwrap_or(trimmed);
            return format!("{}/{}", tracking_id, stripped.trim_matches('/'));
        }
    }

    trimmed.to_string()
}

/// First segment is the tracking id; the remainder is the page path, not
/// re-split.
fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('/') {
        Some((tracking_id, page_path)) => (tracking_id, Some(page_path)),
        None => (path, None),
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderMap, HeaderValue};

    use super::{cookie_value, effective_path, parse_query, split_path};

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn path_splits_once_only() {
        assert_eq!(split_path("UA-12345-1"), ("UA-12345-1", None));
        assert_eq!(split_path("UA-12345-1/home"), ("UA-12345-1", Some("home")));
        assert_eq!(
            split_path("UA-12345-1/deep/nested/page"),
            ("UA-12345-1", Some("deep/nested/page"))
        );
    }

    #[test]
    fn bare_query_keys_parse_to_empty_values() {
        assert_eq!(
            parse_query(Some("pixel&utm_source=news")),
            query(&[("pixel", ""), ("utm_source", "news")])
        );
        assert_eq!(parse_query(None), Vec::new());
    }

    #[test]
    fn use_referer_rewrites_the_page_path() {
        let q = query(&[("useReferer", "")]);

        assert_eq!(
            effective_path("UA-12345-1/x", &q, "https://example.com/foo"),
            "UA-12345-1/example.com/foo"
        );
        assert_eq!(
            effective_path("UA-12345-1/x", &q, "http://example.com/foo"),
            "UA-12345-1/example.com/foo"
        );
    }

    #[test]
    fn use_referer_promotes_a_single_segment_path() {
        let q = query(&[("useReferer", "")]);

        assert_eq!(
            effective_path("UA-12345-1", &q, "https://example.com/foo"),
            "UA-12345-1/example.com/foo"
        );
    }

    #[test]
    fn use_referer_is_inert_without_a_referer() {
        let q = query(&[("useReferer", "")]);

        assert_eq!(effective_path("UA-12345-1/x", &q, ""), "UA-12345-1/x");
        assert_eq!(effective_path("UA-12345-1/x", &[], "https://e.com/"), "UA-12345-1/x");
    }

    #[test]
    fn cookie_lookup_handles_multiple_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; cid=abc123; lang=en"),
        );

        assert_eq!(cookie_value(&headers, "cid"), Some("abc123".to_string()));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
