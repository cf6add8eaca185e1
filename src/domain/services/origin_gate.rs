use crate::config::parse_origins;

/// Allow-list check on the `Origin` header, falling back to the origin part
/// of `Referer`. An empty allow-list disables the check.
#[derive(Debug, Clone, Default)]
pub struct OriginGate {
    allowed: Vec<String>,
}

impl OriginGate {
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed: allowed.into_iter().map(|o| o.trim_end_matches('/').to_ascii_lowercase()).collect(),
        }
    }

    pub fn from_list(raw: &str) -> Self {
        Self::new(parse_origins(raw))
    }

    pub fn is_enabled(&self) -> bool {
        !self.allowed.is_empty()
    }

    pub fn is_allowed_origin(&self, origin: Option<&str>, referer: Option<&str>) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let candidate = match (origin, referer) {
            (Some(o), _) if !o.is_empty() && o != "null" => Some(o.trim_end_matches('/').to_ascii_lowercase()),
            (_, Some(r)) => origin_of(r),
            _ => None,
        };

        candidate.is_some_and(|c| self.allowed.iter().any(|a| *a == c))
    }
}

/// `scheme://host[:port]` of a URL, lower-cased.
fn origin_of(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let host = rest.split(['/', '?', '#']).next().filter(|h| !h.is_empty())?;
    Some(format!("{}://{}", scheme, host).to_ascii_lowercase())
}
