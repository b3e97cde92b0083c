//! Locale-aware form validation.
//!
//! Rules are checked in declaration order and only the first failing rule per
//! field is reported, so every field maps to exactly one message.

use std::collections::HashMap;

use crate::error::ApiError;
use crate::i18n::{Locale, Message};

pub type FieldErrors = HashMap<String, String>;

/// Implemented by request forms
pub trait Validate {
    fn rules(&self, v: &mut Validator);

    fn validate(&self, locale: Locale) -> Result<(), ApiError> {
        let mut v = Validator::new(locale);
        self.rules(&mut v);
        v.finish()
    }
}

pub struct Validator {
    locale: Locale,
    errors: FieldErrors,
}

impl Validator {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            errors: FieldErrors::new(),
        }
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.fail(field, Message::Required, &[field]);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_email(value) {
            self.fail(field, Message::Email, &[field]);
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.fail(field, Message::Min, &[field, &min.to_string()]);
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.fail(field, Message::Max, &[field, &max.to_string()]);
        }
        self
    }

    pub fn gte(&mut self, field: &str, value: i64, min: i64) -> &mut Self {
        if value < min {
            self.fail(field, Message::Gte, &[field, &min.to_string()]);
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationFailed(self.errors))
        }
    }

    fn fail(&mut self, field: &str, message: Message, args: &[&str]) {
        if !self.errors.contains_key(field) {
            let text = self.locale.translate(message, args);
            self.errors.insert(field.to_string(), text);
        }
    }
}

/// Structural email check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_email(value: &str) -> bool {
    if value.is_empty() || value.len() > 254 || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
