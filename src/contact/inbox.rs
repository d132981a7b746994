use crate::contact::types::{ContactForm, ContactSubmission, INTERESTS, ROLES};
use crate::contact::util::handler::ContactHandler;
use crate::shared::types::app::{ApiError, FieldError};
use crate::shared::util::clean_html::{clean_html, get_plain_text_rules};
use crate::shared::util::clock::{Clock, IdProvider};
use crate::shared::util::handler::StoreError;

use cached::proc_macro::cached;
use regex::Regex;
use sanitize_html::errors::SanitizeError;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("invalid form data")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not clean message: {0:?}")]
    Sanitize(SanitizeError)
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> ApiError {
        let detail = err.to_string();
        match err {
            ContactError::Validation(errors) => ApiError::Validation { message: "Invalid form data", errors },
            ContactError::Store(_) | ContactError::Sanitize(_) => ApiError::Internal {
                message: "Internal server error. Please try again later.",
                detail
            }
        }
    }
}

#[cached]
fn email_pattern() -> Regex {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
}

fn required(errors: &mut Vec<FieldError>, field: &'static str, label: &str, value: Option<String>, max: usize) -> String {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        errors.push(FieldError::new(field, format!("{} is required", label)));
    } else if value.chars().count() > max {
        errors.push(FieldError::new(field, format!("{} too long", label)));
    }
    value
}

fn optional(errors: &mut Vec<FieldError>, field: &'static str, label: &str, value: Option<String>, max: usize) -> Option<String> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
    if value.chars().count() > max {
        errors.push(FieldError::new(field, format!("{} too long", label)));
    }
    Some(value)
}

fn one_of(errors: &mut Vec<FieldError>, field: &'static str, value: Option<String>, allowed: &[&str]) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    if !allowed.contains(&value.as_str()) {
        errors.push(FieldError::new(field, format!("Must be one of {}", allowed.join(", "))));
    }
    Some(value)
}

/// Validates and records contact-form submissions
#[derive(Clone)]
pub struct ContactInbox {
    handler: Arc<dyn ContactHandler>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdProvider>
}

impl ContactInbox {
    pub fn new(handler: Arc<dyn ContactHandler>, clock: Arc<dyn Clock>, ids: Arc<dyn IdProvider>) -> ContactInbox {
        ContactInbox { handler, clock, ids }
    }

    pub async fn submit(&self, form: ContactForm) -> Result<ContactSubmission, ContactError> {
        let mut errors = Vec::new();

        let first_name = required(&mut errors, "firstName", "First name", form.first_name, 50);
        let last_name = required(&mut errors, "lastName", "Last name", form.last_name, 50);
        let email = required(&mut errors, "email", "Email", form.email, 255);
        if !email.is_empty() && !email_pattern().is_match(&email) {
            errors.push(FieldError::new("email", "Invalid email address"));
        }
        let organization = optional(&mut errors, "organization", "Organization name", form.organization, 100);
        let role = one_of(&mut errors, "role", form.role, &ROLES);
        let interest = one_of(&mut errors, "interest", form.interest, &INTERESTS);
        let message = optional(&mut errors, "message", "Message", form.message, 2000);
        if form.consent != Some(true) {
            errors.push(FieldError::new("consent", "You must agree to receive communications"));
        }

        if !errors.is_empty() {
            return Err(ContactError::Validation(errors));
        }

        let message = match message {
            Some(m) => Some(clean_html(&m, &get_plain_text_rules()).map_err(ContactError::Sanitize)?),
            None => None
        };

        let submission = ContactSubmission {
            id: self.ids.generate_id(),
            first_name,
            last_name,
            email,
            organization,
            role,
            interest,
            message,
            consent: true,
            created: self.clock.now()
        };
        self.handler.insert(&submission).await?;

        log::info!("contact submission {} from {} ({})", submission.id, submission.email,
            submission.organization.as_deref().unwrap_or("no organization"));
        Ok(submission)
    }
}
