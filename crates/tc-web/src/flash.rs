use axum::http::{HeaderMap, HeaderValue, header};

pub const FLASH_COOKIE: &str = "tcgui_flash";
pub const FLASH_HEADER: &str = "x-flash";

/// One-shot status message shown to the user after a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Updated,
    Cleared,
    Invalid,
}

impl Flash {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Updated => "Successfully updated settings",
            Self::Cleared => "Successfully cleared settings",
            Self::Invalid => "Invalid settings",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Cleared => "cleared",
            Self::Invalid => "invalid",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "updated" => Some(Self::Updated),
            "cleared" => Some(Self::Cleared),
            "invalid" => Some(Self::Invalid),
            _ => None,
        }
    }
}

/// Messages queued in the request's flash cookie, oldest first
pub fn pending(headers: &HeaderMap) -> Vec<Flash> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(FLASH_COOKIE)?.strip_prefix('='))
        .flat_map(|codes| codes.split('.'))
        .filter_map(Flash::from_code)
        .collect()
}

/// Cookie that appends `flash` to whatever the browser already holds
pub fn push_cookie(headers: &HeaderMap, flash: Flash) -> HeaderValue {
    let mut codes: Vec<&str> = pending(headers).iter().map(Flash::code).collect();
    codes.push(flash.code());
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        FLASH_COOKIE,
        codes.join(".")
    );
    // Codes are fixed ASCII words
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| clear_cookie())
}

pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("tcgui_flash=; Path=/; Max-Age=0")
}
