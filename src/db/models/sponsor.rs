//! Sponsor record model and write payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One submitted or admin-entered sponsorship record.
///
/// Rows are never physically deleted; archiving sets `inactive`. Dashboard
/// grouping additionally treats a past `renewal_date` as archived, recomputed
/// at read time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sponsor {
    pub id: String,
    pub name: String,
    pub contact_name: String,
    pub email: String,
    pub contact_number: String,
    pub tier_id: String,
    pub tier_name: String,
    pub tier_price: i64,
    pub email_separately: bool,
    pub socials_image_name: Option<String>,
    pub socials_image_url: Option<String>,
    pub print_image_name: Option<String>,
    pub print_image_url: Option<String>,
    /// ISO date (YYYY-MM-DD)
    pub sponsorship_start_date: Option<String>,
    /// ISO date (YYYY-MM-DD)
    pub renewal_date: Option<String>,
    pub custom_amount_note: Option<String>,
    pub inactive: bool,
    pub created_at: String,
}

impl Sponsor {
    /// Dashboard classification: archived when explicitly inactive or when
    /// the renewal date is strictly before `today`. An unparseable or absent
    /// renewal date never archives on its own.
    pub fn is_archived(&self, today: NaiveDate) -> bool {
        if self.inactive {
            return true;
        }
        self.renewal_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d < today)
            .unwrap_or(false)
    }
}

/// Validated, normalized field set for inserting or fully replacing a
/// sponsor row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SponsorInput {
    pub name: String,
    pub contact_name: String,
    pub email: String,
    pub contact_number: String,
    pub tier_id: String,
    pub tier_name: String,
    pub tier_price: i64,
    pub email_separately: bool,
    pub socials_image_name: Option<String>,
    pub socials_image_url: Option<String>,
    pub print_image_name: Option<String>,
    pub print_image_url: Option<String>,
    pub sponsorship_start_date: Option<String>,
    pub renewal_date: Option<String>,
    pub custom_amount_note: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl SponsorInput {
    /// Normalize optional fields before persisting: blank strings become
    /// NULL, and when assets are emailed separately the asset fields are
    /// cleared regardless of what the form carried.
    pub fn normalized(mut self) -> Self {
        self.socials_image_name = blank_to_none(self.socials_image_name);
        self.socials_image_url = blank_to_none(self.socials_image_url);
        self.print_image_name = blank_to_none(self.print_image_name);
        self.print_image_url = blank_to_none(self.print_image_url);
        self.sponsorship_start_date = blank_to_none(self.sponsorship_start_date);
        self.renewal_date = blank_to_none(self.renewal_date);
        self.custom_amount_note = blank_to_none(self.custom_amount_note);

        if self.email_separately {
            self.socials_image_name = None;
            self.socials_image_url = None;
            self.print_image_name = None;
            self.print_image_url = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sponsor {
        Sponsor {
            id: "s-1".to_string(),
            name: "Smith Co.".to_string(),
            contact_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            contact_number: "0412 345 678".to_string(),
            tier_id: "gold".to_string(),
            tier_name: "Gold".to_string(),
            tier_price: 1000,
            email_separately: false,
            socials_image_name: None,
            socials_image_url: None,
            print_image_name: None,
            print_image_url: None,
            sponsorship_start_date: None,
            renewal_date: None,
            custom_amount_note: None,
            inactive: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    #[test]
    fn test_inactive_always_archived() {
        let mut sponsor = sample();
        sponsor.inactive = true;
        // Archived even with a renewal date far in the future
        sponsor.renewal_date = Some("2030-01-01".to_string());
        assert!(sponsor.is_archived(today()));
    }

    #[test]
    fn test_past_renewal_date_archives() {
        let mut sponsor = sample();
        sponsor.renewal_date = Some("2026-06-14".to_string());
        assert!(sponsor.is_archived(today()));
    }

    #[test]
    fn test_future_renewal_date_is_active() {
        let mut sponsor = sample();
        sponsor.renewal_date = Some("2026-06-16".to_string());
        assert!(!sponsor.is_archived(today()));
    }

    #[test]
    fn test_renewal_today_is_active() {
        // Strictly-before comparison: renewing today is still active
        let mut sponsor = sample();
        sponsor.renewal_date = Some("2026-06-15".to_string());
        assert!(!sponsor.is_archived(today()));
    }

    #[test]
    fn test_missing_or_garbled_renewal_date_is_active() {
        let mut sponsor = sample();
        assert!(!sponsor.is_archived(today()));
        sponsor.renewal_date = Some("not-a-date".to_string());
        assert!(!sponsor.is_archived(today()));
    }

    #[test]
    fn test_normalized_blanks_become_none() {
        let input = SponsorInput {
            socials_image_name: Some("  ".to_string()),
            print_image_name: Some("logo-print.pdf".to_string()),
            sponsorship_start_date: Some(String::new()),
            renewal_date: Some("2026-12-01".to_string()),
            custom_amount_note: Some("  padded  ".to_string()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(input.socials_image_name, None);
        assert_eq!(input.print_image_name.as_deref(), Some("logo-print.pdf"));
        assert_eq!(input.sponsorship_start_date, None);
        assert_eq!(input.renewal_date.as_deref(), Some("2026-12-01"));
        assert_eq!(input.custom_amount_note.as_deref(), Some("padded"));
    }

    #[test]
    fn test_email_separately_clears_asset_fields() {
        let input = SponsorInput {
            email_separately: true,
            socials_image_name: Some("logo.png".to_string()),
            socials_image_url: Some("https://assets.example.com/logo.png".to_string()),
            print_image_name: Some("logo.pdf".to_string()),
            print_image_url: Some("https://assets.example.com/logo.pdf".to_string()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(input.socials_image_name, None);
        assert_eq!(input.socials_image_url, None);
        assert_eq!(input.print_image_name, None);
        assert_eq!(input.print_image_url, None);
    }
}
