//! Contact page route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use super::Page;
use crate::error::Result;
use crate::middleware::RequestLocale;
use crate::services::contact::{ContactForm, ContactReceipt};
use crate::state::AppState;

/// Company contact details shown next to the form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompanyInfo {
    /// Translation key for the company name.
    pub name_key: &'static str,
    /// Translation key for the support email.
    pub email_key: &'static str,
    pub phone: &'static str,
    pub address: &'static str,
    pub hours: &'static str,
}

const COMPANY: CompanyInfo = CompanyInfo {
    name_key: "company.name",
    email_key: "company.email",
    phone: "+852 2123-4567",
    address: "香港中環皇后大道中99號中環中心15樓",
    hours: "週一至週五 09:00-18:00 (香港時間)",
};

/// Contact page payload.
#[derive(Debug, Serialize)]
pub struct ContactPage {
    pub company: CompanyInfo,
    pub action: &'static str,
}

/// Display the contact page.
#[instrument(skip_all)]
pub async fn page(RequestLocale(locale): RequestLocale) -> Json<Page<ContactPage>> {
    Json(Page::new(
        locale,
        "聯絡我們 - BIZOE",
        ContactPage {
            company: COMPANY,
            action: "/contact",
        },
    ))
}

/// Submit the contact form.
///
/// # Errors
///
/// Returns 422 with field errors for an invalid form and 503 if the message
/// could not be delivered.
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<ContactReceipt>)> {
    let message = form.validate()?;
    let receipt = state.contact().submit(message).await?;
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}
