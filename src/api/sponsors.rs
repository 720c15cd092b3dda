//! Sponsor form processing: the public submission pipeline and the admin
//! create/edit/archive actions.
//!
//! Every action is a straight-line validate → resolve tier → (upload) →
//! persist → (notify) sequence. Upload failures abort a public submission;
//! database and email failures are logged and degrade to best-effort.

use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::auth::AdminSession;
use crate::api::error::{ApiError, ValidationErrorBuilder};
use crate::api::validation;
use crate::db::{sponsors, Sponsor, SponsorInput};
use crate::notifications::NewSponsorNotification;
use crate::storage::UploadError;
use crate::tiers::{self, CUSTOM_TIER_ID};
use crate::AppState;

/// Resolve a tier id to its canonical (name, price); `custom` takes the
/// operator-supplied amount and requires a note. Checked before any storage
/// write.
fn resolve_tier(
    tier_id: &str,
    custom_amount: Option<&str>,
    custom_note: Option<&str>,
) -> Result<(String, i64), (&'static str, String)> {
    if tier_id == CUSTOM_TIER_ID {
        validation::validate_custom_note(custom_note).map_err(|e| ("customAmountNote", e))?;
        let amount = validation::validate_custom_amount(custom_amount.unwrap_or(""))
            .map_err(|e| ("customAmount", e))?;
        return Ok(("Custom amount".to_string(), amount));
    }
    match tiers::resolve(tier_id) {
        Some(tier) => Ok((tier.name.to_string(), tier.price)),
        None => Err(("tierId", "Please select a valid sponsorship tier.".to_string())),
    }
}

// ---------------------------------------------------------------------------
// Public submission
// ---------------------------------------------------------------------------

struct UploadedFile {
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

#[derive(Default)]
struct RawSubmission {
    name: String,
    contact_name: String,
    email: String,
    contact_number: String,
    tier_id: String,
    email_separately: bool,
    custom_amount: Option<String>,
    custom_amount_note: Option<String>,
    sponsorship_start_date: Option<String>,
    renewal_date: Option<String>,
    socials_image: Option<UploadedFile>,
    print_image: Option<UploadedFile>,
}

async fn read_submission(mut multipart: Multipart) -> Result<RawSubmission, ApiError> {
    let mut raw = RawSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Invalid form data."))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "socialsImage" | "printImage" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid form data."))?
                    .to_vec();
                let file = UploadedFile {
                    filename,
                    content_type,
                    data,
                };
                if name == "socialsImage" {
                    raw.socials_image = Some(file);
                } else {
                    raw.print_image = Some(file);
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid form data."))?;
                match name.as_str() {
                    "name" => raw.name = value,
                    "contactName" => raw.contact_name = value,
                    "email" => raw.email = value,
                    "contactNumber" => raw.contact_number = value,
                    "tierId" => raw.tier_id = value,
                    "emailSeparately" => {
                        raw.email_separately = value == "on" || value == "true"
                    }
                    "customAmount" => raw.custom_amount = Some(value),
                    "customAmountNote" => raw.custom_amount_note = Some(value),
                    "sponsorshipStartDate" => raw.sponsorship_start_date = Some(value),
                    "renewalDate" => raw.renewal_date = Some(value),
                    _ => {}
                }
            }
        }
    }

    Ok(raw)
}

fn check_asset_field(
    errors: &mut ValidationErrorBuilder,
    field: &'static str,
    label: &str,
    file: &Option<UploadedFile>,
) {
    let Some(file) = file else {
        errors.add(field, format!("{} is required.", label));
        return;
    };
    if file.data.is_empty() {
        errors.add(field, format!("{} is required.", label));
        return;
    }
    if file.data.len() > crate::storage::MAX_ASSET_SIZE {
        errors.add(field, "Max file size is 4 MB.");
    }
    if !validation::is_accepted_asset_type(&file.content_type) {
        errors.add(
            field,
            "Only .jpg, .jpeg, .png, .webp, .pdf, .psd, and .tiff files are accepted.",
        );
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub id: String,
}

/// POST /api/sponsorship — the public submission pipeline.
pub async fn submit_sponsorship(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let raw = read_submission(multipart).await?;

    // Step 1: field validation, collected per field
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validation::validate_name(&raw.name) {
        errors.add("name", e);
    }
    if let Err(e) = validation::validate_contact_name(&raw.contact_name) {
        errors.add("contactName", e);
    }
    if let Err(e) = validation::validate_email(&raw.email) {
        errors.add("email", e);
    }
    if let Err(e) = validation::validate_contact_number(&raw.contact_number) {
        errors.add("contactNumber", e);
    }
    if let Err(e) = validation::validate_date(&raw.sponsorship_start_date, "Start date") {
        errors.add("sponsorshipStartDate", e);
    }
    if let Err(e) = validation::validate_date(&raw.renewal_date, "Renewal date") {
        errors.add("renewalDate", e);
    }
    if !raw.email_separately {
        check_asset_field(&mut errors, "socialsImage", "Socials image", &raw.socials_image);
        check_asset_field(&mut errors, "printImage", "Print-ready image", &raw.print_image);
    }

    // Step 2: tier resolution, before anything is written anywhere
    let tier = resolve_tier(
        &raw.tier_id,
        raw.custom_amount.as_deref(),
        raw.custom_amount_note.as_deref(),
    );
    if let Err((field, message)) = &tier {
        errors.add(*field, message.clone());
    }
    errors.finish()?;
    let (tier_name, tier_price) =
        tier.map_err(|(field, message)| ApiError::validation_field(field, message))?;

    // Step 3: asset uploads. A failed upload aborts the submission; an
    // incomplete asset set is worse than no submission.
    let mut socials_name = None;
    let mut socials_url = None;
    let mut print_name = None;
    let mut print_url = None;
    if !raw.email_separately {
        if let Some(file) = &raw.socials_image {
            let url = state
                .assets
                .upload(&file.filename, file.data.clone(), "sponsors/socials")
                .await
                .map_err(|e| upload_error_response("socialsImage", e))?;
            socials_name = Some(file.filename.clone());
            socials_url = Some(url);
        }
        if let Some(file) = &raw.print_image {
            let url = state
                .assets
                .upload(&file.filename, file.data.clone(), "sponsors/print")
                .await
                .map_err(|e| upload_error_response("printImage", e))?;
            print_name = Some(file.filename.clone());
            print_url = Some(url);
        }
    }

    let input = SponsorInput {
        name: raw.name.trim().to_string(),
        contact_name: raw.contact_name.trim().to_string(),
        email: raw.email.trim().to_string(),
        contact_number: raw.contact_number.trim().to_string(),
        tier_id: raw.tier_id.clone(),
        tier_name: tier_name.clone(),
        tier_price,
        email_separately: raw.email_separately,
        socials_image_name: socials_name,
        socials_image_url: socials_url,
        print_image_name: print_name,
        print_image_url: print_url,
        sponsorship_start_date: raw.sponsorship_start_date,
        renewal_date: raw.renewal_date,
        custom_amount_note: raw.custom_amount_note,
    }
    .normalized();

    // Step 4: persist. A storage failure is fatal for this submission but
    // the notification is still attempted so the club hears about the
    // sponsor either way.
    let id = uuid::Uuid::new_v4().to_string();
    let saved = match sponsors::insert(&state.db, &id, &input).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to save sponsor submission: {}", e);
            false
        }
    };

    // Step 5: notify, best-effort
    let notification = NewSponsorNotification {
        name: input.name.clone(),
        contact_name: input.contact_name.clone(),
        email: input.email.clone(),
        contact_number: input.contact_number.clone(),
        tier_name,
        tier_price,
        email_separately: input.email_separately,
        socials_image_name: input.socials_image_name.clone(),
        print_image_name: input.print_image_name.clone(),
    };
    if let Err(e) = state.notifier.send_new_sponsor(&notification).await {
        tracing::warn!("New sponsor notification not sent: {}", e);
    }

    if !saved {
        return Err(ApiError::database("Your submission could not be saved."));
    }

    tracing::info!(sponsor_id = %id, tier = %input.tier_id, "Sponsorship submitted");
    Ok(Json(SubmissionResponse { success: true, id }))
}

fn upload_error_response(field: &'static str, err: UploadError) -> ApiError {
    match err {
        UploadError::NotConfigured => {
            tracing::error!("Asset upload rejected: storage not configured");
            ApiError::service_unavailable(err.to_string())
        }
        UploadError::FileEmpty | UploadError::FileTooLarge => {
            ApiError::validation_field(field, err.to_string())
        }
        UploadError::Backend(_) => {
            tracing::error!("Asset upload failed: {}", err);
            ApiError::internal("File upload failed. Please try again.")
        }
    }
}

// ---------------------------------------------------------------------------
// Admin dashboard data
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SponsorListResponse {
    pub active: Vec<Sponsor>,
    pub archived: Vec<Sponsor>,
}

/// GET /admin/sponsors — all sponsors, newest first, grouped by the derived
/// active/archived classification.
pub async fn list_sponsors(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
) -> Result<Json<SponsorListResponse>, ApiError> {
    let all = sponsors::list(&state.db).await?;
    let today = chrono::Utc::now().date_naive();

    let (archived, active): (Vec<Sponsor>, Vec<Sponsor>) =
        all.into_iter().partition(|s| s.is_archived(today));

    Ok(Json(SponsorListResponse { active, archived }))
}

/// GET /admin/sponsors/:id
pub async fn get_sponsor(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<Sponsor>, ApiError> {
    let sponsor = sponsors::get(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sponsor not found"))?;
    Ok(Json(sponsor))
}

// ---------------------------------------------------------------------------
// Admin create / update / archive
// ---------------------------------------------------------------------------

/// Admin form payload. Asset fields are recorded names/URLs; admin entry
/// never uploads files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSponsorForm {
    pub name: String,
    pub contact_name: String,
    pub email: String,
    pub contact_number: String,
    pub tier_id: String,
    #[serde(default)]
    pub custom_amount: Option<String>,
    #[serde(default)]
    pub custom_amount_note: Option<String>,
    /// Checkbox: present ("on") when ticked
    #[serde(default)]
    pub email_separately: Option<String>,
    #[serde(default)]
    pub socials_image_name: Option<String>,
    #[serde(default)]
    pub socials_image_url: Option<String>,
    #[serde(default)]
    pub print_image_name: Option<String>,
    #[serde(default)]
    pub print_image_url: Option<String>,
    #[serde(default)]
    pub sponsorship_start_date: Option<String>,
    #[serde(default)]
    pub renewal_date: Option<String>,
}

impl AdminSponsorForm {
    fn email_separately(&self) -> bool {
        self.email_separately.is_some()
    }

    /// Sequential validation; the admin form reports one error at a time
    /// through the redirect query string.
    fn validate(&self) -> Result<(String, i64), String> {
        validation::validate_name(&self.name)?;
        validation::validate_contact_name(&self.contact_name)?;
        validation::validate_email(&self.email)?;
        validation::validate_contact_number(&self.contact_number)?;
        validation::validate_date(&self.sponsorship_start_date, "Start date")?;
        validation::validate_date(&self.renewal_date, "Renewal date")?;
        resolve_tier(
            &self.tier_id,
            self.custom_amount.as_deref(),
            self.custom_amount_note.as_deref(),
        )
        .map_err(|(_, message)| message)
    }

    fn into_input(self, tier_name: String, tier_price: i64) -> SponsorInput {
        let email_separately = self.email_separately();
        SponsorInput {
            name: self.name.trim().to_string(),
            contact_name: self.contact_name.trim().to_string(),
            email: self.email.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
            tier_id: self.tier_id,
            tier_name,
            tier_price,
            email_separately,
            socials_image_name: self.socials_image_name,
            socials_image_url: self.socials_image_url,
            print_image_name: self.print_image_name,
            print_image_url: self.print_image_url,
            sponsorship_start_date: self.sponsorship_start_date,
            renewal_date: self.renewal_date,
            custom_amount_note: self.custom_amount_note,
        }
        .normalized()
    }
}

fn redirect_with_error(path: &str, error: &str) -> Redirect {
    Redirect::to(&format!("{}?error={}", path, urlencoding::encode(error)))
}

/// POST /admin/sponsors
pub async fn create_sponsor(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Form(form): Form<AdminSponsorForm>,
) -> impl IntoResponse {
    const FORM_PAGE: &str = "/admin/sponsors/new";

    let (tier_name, tier_price) = match form.validate() {
        Ok(resolved) => resolved,
        Err(message) => return redirect_with_error(FORM_PAGE, &message),
    };

    let id = uuid::Uuid::new_v4().to_string();
    let input = form.into_input(tier_name, tier_price);
    match sponsors::insert(&state.db, &id, &input).await {
        Ok(()) => {
            tracing::info!(sponsor_id = %id, "Sponsor created by admin");
            Redirect::to("/admin?added=1")
        }
        Err(e) => {
            tracing::error!("Failed to create sponsor: {}", e);
            redirect_with_error(FORM_PAGE, "Failed to save sponsor.")
        }
    }
}

/// POST /admin/sponsors/:id — full-field replace.
pub async fn update_sponsor(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
    Form(form): Form<AdminSponsorForm>,
) -> impl IntoResponse {
    let form_page = format!("/admin/sponsors/{}/edit", id);

    let existing = match sponsors::get(&state.db, &id).await {
        Ok(found) => found,
        Err(e) => {
            tracing::error!("Failed to load sponsor {}: {}", id, e);
            return redirect_with_error("/admin", "Failed to load sponsor.");
        }
    };
    if existing.is_none() {
        return redirect_with_error("/admin", "Sponsor not found.");
    }

    let (tier_name, tier_price) = match form.validate() {
        Ok(resolved) => resolved,
        Err(message) => return redirect_with_error(&form_page, &message),
    };

    let input = form.into_input(tier_name, tier_price);
    match sponsors::update(&state.db, &id, &input).await {
        Ok(()) => {
            tracing::info!(sponsor_id = %id, "Sponsor updated");
            Redirect::to("/admin?updated=1")
        }
        Err(e) => {
            tracing::error!("Failed to update sponsor {}: {}", id, e);
            redirect_with_error(&form_page, "Failed to save sponsor.")
        }
    }
}

/// POST /admin/sponsors/:id/delete — archive, never remove.
pub async fn archive_sponsor(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match sponsors::set_inactive(&state.db, &id).await {
        Ok(()) => {
            tracing::info!(sponsor_id = %id, "Sponsor archived");
            Redirect::to("/admin?archived=1")
        }
        Err(e) => {
            tracing::error!("Failed to archive sponsor {}: {}", id, e);
            redirect_with_error("/admin", "Failed to archive sponsor.")
        }
    }
}
