//! Response-message localization.
//!
//! Catalogs are built once per process and are read-only afterwards.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header::ACCEPT_LANGUAGE, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

mod catalog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Vi,
}

/// Translatable message tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    Required,
    Email,
    Min,
    Max,
    Gte,
    AccountNotExist,
    WrongPassword,
    PasswordNotMatch,
    EmailExists,
}

impl Message {
    pub fn tag(&self) -> &'static str {
        match self {
            Message::Required => "required",
            Message::Email => "email",
            Message::Min => "min",
            Message::Max => "max",
            Message::Gte => "gte",
            Message::AccountNotExist => "accountNotExist",
            Message::WrongPassword => "wrongPassword",
            Message::PasswordNotMatch => "passwordNotMatch",
            Message::EmailExists => "emailExists",
        }
    }
}

static CATALOGS: Lazy<HashMap<Locale, HashMap<&'static str, &'static str>>> = Lazy::new(|| {
    let mut catalogs = HashMap::new();
    catalogs.insert(Locale::En, catalog::EN.iter().copied().collect());
    catalogs.insert(Locale::Vi, catalog::VI.iter().copied().collect());
    catalogs
});

impl Locale {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "vi" => Some(Locale::Vi),
            _ => None,
        }
    }

    /// Negotiate from an `Accept-Language` value, honoring q-values.
    /// Anything unsupported falls back to English.
    pub fn negotiate(header: &str) -> Self {
        let mut candidates: Vec<(f32, usize, Locale)> = header
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| {
                let mut parts = entry.split(';');
                let locale = Self::from_tag(parts.next()?)?;
                let quality = parts
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (quality > 0.0).then_some((quality, position, locale))
            })
            .collect();

        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        candidates.first().map(|c| c.2).unwrap_or_default()
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Self::negotiate)
            .unwrap_or_default()
    }

    /// Translate a message, substituting `{0}`, `{1}`, ... with `args`.
    pub fn translate(&self, message: Message, args: &[&str]) -> String {
        let tag = message.tag();
        let template = CATALOGS
            .get(self)
            .and_then(|c| c.get(tag))
            .copied()
            .unwrap_or(tag);

        args.iter().enumerate().fold(template.to_string(), |text, (i, arg)| {
            text.replace(&format!("{{{}}}", i), arg)
        })
    }
}

/// Middleware that resolves the request locale once and stores it on the request
pub async fn locale_middleware(mut request: Request, next: Next) -> Response {
    let locale = Locale::from_headers(request.headers());
    request.extensions_mut().insert(locale);
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Locale>()
            .copied()
            .unwrap_or_else(|| Locale::from_headers(&parts.headers)))
    }
}
