//! Sponsor repository.
//!
//! Single-row reads and writes keyed by id. `update` is a full-field
//! replace, never a partial patch. Errors are plain `sqlx::Error`; callers
//! decide whether a failure aborts the request or degrades to best-effort.

use crate::db::{DbPool, Sponsor, SponsorInput};

pub async fn insert(pool: &DbPool, id: &str, input: &SponsorInput) -> sqlx::Result<()> {
    let created_at = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO sponsors (
            id, name, contact_name, email, contact_number,
            tier_id, tier_name, tier_price, email_separately,
            socials_image_name, socials_image_url, print_image_name, print_image_url,
            sponsorship_start_date, renewal_date, custom_amount_note,
            inactive, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.contact_name)
    .bind(&input.email)
    .bind(&input.contact_number)
    .bind(&input.tier_id)
    .bind(&input.tier_name)
    .bind(input.tier_price)
    .bind(input.email_separately)
    .bind(&input.socials_image_name)
    .bind(&input.socials_image_url)
    .bind(&input.print_image_name)
    .bind(&input.print_image_url)
    .bind(&input.sponsorship_start_date)
    .bind(&input.renewal_date)
    .bind(&input.custom_amount_note)
    .bind(&created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// All sponsors, newest first.
pub async fn list(pool: &DbPool) -> sqlx::Result<Vec<Sponsor>> {
    sqlx::query_as("SELECT * FROM sponsors ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn get(pool: &DbPool, id: &str) -> sqlx::Result<Option<Sponsor>> {
    sqlx::query_as("SELECT * FROM sponsors WHERE id = ? LIMIT 1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Full-field replace of all mutable columns. `inactive` and `created_at`
/// are untouched; archiving goes through [`set_inactive`].
pub async fn update(pool: &DbPool, id: &str, input: &SponsorInput) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE sponsors SET
            name = ?, contact_name = ?, email = ?, contact_number = ?,
            tier_id = ?, tier_name = ?, tier_price = ?, email_separately = ?,
            socials_image_name = ?, socials_image_url = ?,
            print_image_name = ?, print_image_url = ?,
            sponsorship_start_date = ?, renewal_date = ?, custom_amount_note = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.name)
    .bind(&input.contact_name)
    .bind(&input.email)
    .bind(&input.contact_number)
    .bind(&input.tier_id)
    .bind(&input.tier_name)
    .bind(input.tier_price)
    .bind(input.email_separately)
    .bind(&input.socials_image_name)
    .bind(&input.socials_image_url)
    .bind(&input.print_image_name)
    .bind(&input.print_image_url)
    .bind(&input.sponsorship_start_date)
    .bind(&input.renewal_date)
    .bind(&input.custom_amount_note)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Soft-delete: the row stays, the dashboard moves it to the archived group.
pub async fn set_inactive(pool: &DbPool, id: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE sponsors SET inactive = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn gold_input() -> SponsorInput {
        SponsorInput {
            name: "Smith Co.".to_string(),
            contact_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            contact_number: "0412 345 678".to_string(),
            tier_id: "gold".to_string(),
            tier_name: "Gold".to_string(),
            tier_price: 1000,
            email_separately: false,
            socials_image_name: Some("logo-socials.png".to_string()),
            socials_image_url: Some("https://assets.example.com/logo-socials.png".to_string()),
            print_image_name: Some("logo-print.pdf".to_string()),
            print_image_url: Some("https://assets.example.com/logo-print.pdf".to_string()),
            sponsorship_start_date: Some("2026-01-01".to_string()),
            renewal_date: Some("2027-01-01".to_string()),
            custom_amount_note: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let pool = test_pool().await;
        insert(&pool, "s-1", &gold_input()).await.unwrap();

        let sponsor = get(&pool, "s-1").await.unwrap().unwrap();
        assert_eq!(sponsor.name, "Smith Co.");
        assert_eq!(sponsor.tier_name, "Gold");
        assert_eq!(sponsor.tier_price, 1000);
        assert!(!sponsor.inactive);
        assert_eq!(
            sponsor.socials_image_url.as_deref(),
            Some("https://assets.example.com/logo-socials.png")
        );

        assert!(get(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_is_full_replace() {
        let pool = test_pool().await;
        insert(&pool, "s-1", &gold_input()).await.unwrap();

        let mut replacement = gold_input();
        replacement.tier_id = "custom".to_string();
        replacement.tier_name = "Custom amount".to_string();
        replacement.tier_price = 750;
        replacement.custom_amount_note = Some("negotiated at the AGM".to_string());
        replacement.socials_image_name = None;
        replacement.socials_image_url = None;
        update(&pool, "s-1", &replacement).await.unwrap();

        let sponsor = get(&pool, "s-1").await.unwrap().unwrap();
        assert_eq!(sponsor.tier_id, "custom");
        assert_eq!(sponsor.tier_price, 750);
        assert_eq!(
            sponsor.custom_amount_note.as_deref(),
            Some("negotiated at the AGM")
        );
        // Cleared fields are gone, not merged from the previous row
        assert!(sponsor.socials_image_name.is_none());
        assert!(sponsor.socials_image_url.is_none());
        // Unlisted columns survive
        assert!(!sponsor.inactive);
    }

    #[tokio::test]
    async fn test_update_then_resubmit_unchanged_is_stable() {
        let pool = test_pool().await;
        let input = gold_input();
        insert(&pool, "s-1", &input).await.unwrap();
        let before = get(&pool, "s-1").await.unwrap().unwrap();

        update(&pool, "s-1", &input).await.unwrap();
        let after = get(&pool, "s-1").await.unwrap().unwrap();

        assert_eq!(before.name, after.name);
        assert_eq!(before.tier_price, after.tier_price);
        assert_eq!(before.renewal_date, after.renewal_date);
        assert_eq!(before.created_at, after.created_at);
    }

    #[tokio::test]
    async fn test_set_inactive_keeps_row() {
        let pool = test_pool().await;
        insert(&pool, "s-1", &gold_input()).await.unwrap();
        set_inactive(&pool, "s-1").await.unwrap();

        let sponsor = get(&pool, "s-1").await.unwrap().unwrap();
        assert!(sponsor.inactive);
        assert_eq!(list(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_optionals_stored_as_null() {
        let pool = test_pool().await;
        let input = SponsorInput {
            socials_image_name: Some("   ".to_string()),
            renewal_date: Some(String::new()),
            ..gold_input()
        }
        .normalized();
        insert(&pool, "s-1", &input).await.unwrap();

        let sponsor = get(&pool, "s-1").await.unwrap().unwrap();
        assert!(sponsor.socials_image_name.is_none());
        assert!(sponsor.renewal_date.is_none());
    }
}
