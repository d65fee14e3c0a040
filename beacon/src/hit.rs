use std::collections::HashMap;

use crate::api::BeaconError;

/// A single pageview hit, ready for delivery to the collector.
///
/// The payload follows the measurement-protocol shape: six computed defaults,
/// with every inbound query parameter merged over them. Keys and values are
/// opaque strings; unknown or invalid keys are passed through so callers can
/// override any field, including `v` and `t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub payload: HashMap<String, String>,
    pub user_agent: String,
}

impl Hit {
    pub fn build(
        tracking_id: &str,
        page_path: &str,
        client_id: &str,
        client_ip: &str,
        query: &[(String, String)],
        user_agent: &str,
    ) -> Hit {
        let mut payload = HashMap::from([
            ("v".to_string(), "1".to_string()),
            ("t".to_string(), "pageview".to_string()),
            ("tid".to_string(), tracking_id.to_string()),
            ("cid".to_string(), client_id.to_string()),
            ("dp".to_string(), page_path.to_string()),
            ("uip".to_string(), client_ip.to_string()),
        ]);

        // Query overrides win over computed defaults. On repeated keys the
        // last value wins.
        for (key, value) in query {
            payload.insert(key.clone(), value.clone());
        }

        Hit {
            payload,
            user_agent: user_agent.to_string(),
        }
    }

    /// Encode the payload as `application/x-www-form-urlencoded` form data.
    pub fn form_body(&self) -> Result<String, BeaconError> {
        Ok(serde_urlencoded::to_string(&self.payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::Hit;

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_overrides_yield_exactly_the_six_defaults() {
        let hit = Hit::build("UA-12345-1", "home", "abc123", "10.0.0.1", &[], "curl/8");

        assert_eq!(hit.payload.len(), 6);
        assert_eq!(hit.payload["v"], "1");
        assert_eq!(hit.payload["t"], "pageview");
        assert_eq!(hit.payload["tid"], "UA-12345-1");
        assert_eq!(hit.payload["cid"], "abc123");
        assert_eq!(hit.payload["dp"], "home");
        assert_eq!(hit.payload["uip"], "10.0.0.1");
        assert_eq!(hit.user_agent, "curl/8");
    }

    #[test]
    fn overrides_win_over_every_computed_default() {
        let overrides = query(&[
            ("v", "2"),
            ("t", "event"),
            ("tid", "UA-other"),
            ("cid", "forced"),
            ("dp", "elsewhere"),
            ("uip", "192.168.0.9"),
        ]);
        let hit = Hit::build("UA-12345-1", "home", "abc123", "10.0.0.1", &overrides, "");

        for (key, value) in &overrides {
            assert_eq!(&hit.payload[key], value);
        }
        assert_eq!(hit.payload.len(), 6);
    }

    #[test]
    fn unknown_keys_pass_through_unvalidated() {
        let overrides = query(&[("utm_source", "newsletter"), ("pixel", ""), ("bogus", "x")]);
        let hit = Hit::build("UA-12345-1", "home", "abc123", "10.0.0.1", &overrides, "");

        assert_eq!(hit.payload["utm_source"], "newsletter");
        assert_eq!(hit.payload["pixel"], "");
        assert_eq!(hit.payload["bogus"], "x");
        assert_eq!(hit.payload.len(), 9);
    }

    #[test]
    fn merge_is_idempotent() {
        let overrides = query(&[("dp", "elsewhere"), ("utm_source", "newsletter")]);
        let first = Hit::build("UA-12345-1", "home", "abc123", "10.0.0.1", &overrides, "ua");
        let second = Hit::build("UA-12345-1", "home", "abc123", "10.0.0.1", &overrides, "ua");

        assert_eq!(first, second);
    }

    #[test]
    fn absent_page_path_defaults_to_empty_string() {
        let hit = Hit::build("UA-12345-1", "", "abc123", "10.0.0.1", &[], "");

        assert_eq!(hit.payload["dp"], "");
    }

    #[test]
    fn form_body_urlencodes_pairs() {
        let hit = Hit::build("UA-1", "a b", "abc", "::1", &[], "");
        let body = hit.form_body().expect("encodable payload");

        assert!(body.contains("dp=a+b") || body.contains("dp=a%20b"));
        assert!(body.contains("tid=UA-1"));
        assert!(body.contains("uip=%3A%3A1"));
    }
}
