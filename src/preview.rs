pub const PREVIEW_COOKIE: &str = "spacetraveling.preview";

const REF_KEY: &str = "ref";

/// Which revision a request reads. Built per request from the preview cookie.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewContext {
    pub active: bool,
    pub revision_ref: Option<String>,
}

impl PreviewContext {
    pub fn published() -> Self {
        PreviewContext::default()
    }

    pub fn with_ref(revision_ref: &str) -> Self {
        PreviewContext {
            active: true,
            revision_ref: Some(revision_ref.to_string()),
        }
    }

    pub fn revision_ref(&self) -> Option<&str> {
        self.revision_ref.as_deref()
    }

    pub fn from_cookie_header(header: Option<&str>) -> Self {
        let Some(header) = header else {
            return Self::published();
        };

        let value = header.split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == PREVIEW_COOKIE)
            .map(|(_, value)| value);

        match value.and_then(decode_ref) {
            Some(revision_ref) => Self::with_ref(&revision_ref),
            None => Self::published(),
        }
    }
}

const VALUE_KEY: &str = "v";

/// Percent-encodes a whole cookie value, so `ref=abc` travels as `ref%3Dabc`.
fn encode_cookie_value(value: &str) -> String {
    // Encoding a single string pair cannot fail
    let encoded = serde_urlencoded::to_string([(VALUE_KEY, value)]).unwrap_or_default();
    encoded.split_once('=')
        .map(|(_, v)| v.to_string())
        .unwrap_or_default()
}

fn decode_cookie_value(raw: &str) -> Option<String> {
    let items: Vec<(String, String)> = serde_urlencoded::from_str(&format!("{}={}", VALUE_KEY, raw)).ok()?;
    items.into_iter().next().map(|(_, v)| v)
}

fn decode_ref(cookie_value: &str) -> Option<String> {
    let value = decode_cookie_value(cookie_value)?;
    let items: Vec<(String, String)> = serde_urlencoded::from_str(&value).ok()?;
    items.into_iter()
        .find(|(k, _)| k == REF_KEY)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value starting a preview session on `revision_ref`.
pub fn enter_cookie(revision_ref: &str) -> String {
    let pair = serde_urlencoded::to_string([(REF_KEY, revision_ref)]).unwrap_or_default();
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", PREVIEW_COOKIE, encode_cookie_value(&pair))
}

/// `Set-Cookie` value ending the preview session.
pub fn exit_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", PREVIEW_COOKIE)
}

/// Where to send the user after leaving preview: back to the referring page
/// when it belongs to this site, home otherwise.
pub fn exit_redirect_target(referer: Option<&str>, site_url: Option<&str>) -> String {
    let Some(referer) = referer else {
        return "/".to_string();
    };

    if referer.starts_with('/') && !referer.starts_with("//") {
        return referer.to_string();
    }

    if let Some(site_url) = site_url {
        let site_url = site_url.trim_end_matches('/');
        if let Some(path) = referer.strip_prefix(site_url) {
            if path.is_empty() {
                return "/".to_string();
            }
            if path.starts_with('/') {
                return path.to_string();
            }
        }
    }

    "/".to_string()
}
