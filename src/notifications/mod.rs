//! New-sponsor notification emails.
//!
//! Sends a fixed-shape summary of each public submission to the configured
//! administrator address, using the SMTP settings from the main config file.

use anyhow::Result;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;

/// Summary of a submission for the notification email.
#[derive(Debug, Clone)]
pub struct NewSponsorNotification {
    pub name: String,
    pub contact_name: String,
    pub email: String,
    pub contact_number: String,
    pub tier_name: String,
    pub tier_price: i64,
    pub email_separately: bool,
    pub socials_image_name: Option<String>,
    pub print_image_name: Option<String>,
}

pub struct Notifier {
    config: EmailConfig,
    recipient: Option<String>,
}

impl Notifier {
    pub fn new(config: EmailConfig, recipient: Option<String>) -> Self {
        Self { config, recipient }
    }

    /// Check if email sending is configured and enabled
    pub fn is_enabled(&self) -> bool {
        self.config.is_configured() && self.recipient.is_some()
    }

    /// Send the new-sponsor summary to the administrator.
    ///
    /// A missing email configuration is an operational error, never a
    /// submission failure; callers log the result and carry on.
    pub async fn send_new_sponsor(&self, params: &NewSponsorNotification) -> Result<()> {
        if !self.is_enabled() {
            tracing::warn!("Email not configured; skipping new sponsor notification");
            anyhow::bail!("Email not configured");
        }

        let subject = "New sponsor added – SponsorLink";
        let html_body = render_new_sponsor_html(params);
        let text_body = render_new_sponsor_text(params);

        // is_enabled() guarantees the recipient is present
        let recipient = self
            .recipient
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Notification recipient not configured"))?;

        self.send_email(recipient, subject, &html_body, &text_body)
            .await
    }

    /// Send an email with HTML and plain text versions
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<()> {
        let smtp_host = self
            .config
            .smtp_host
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("SMTP host not configured"))?;
        let from_address = self
            .config
            .from_address
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("From address not configured"))?;

        let from: Mailbox = format!("{} <{}>", self.config.from_name, from_address).parse()?;
        let to: Mailbox = to_email.parse()?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        let mailer = if self.config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer
        };

        mailer.build().send(email).await?;

        tracing::info!(to = %to_email, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn asset_status_text(params: &NewSponsorNotification) -> String {
    if params.email_separately {
        "Assets will be emailed separately.".to_string()
    } else {
        format!(
            "Socials image: {}\nPrint image: {}",
            params.socials_image_name.as_deref().unwrap_or("—"),
            params.print_image_name.as_deref().unwrap_or("—"),
        )
    }
}

fn render_new_sponsor_html(params: &NewSponsorNotification) -> String {
    format!(
        r#"<h2>New sponsor added – SponsorLink</h2>
<p>A new sponsorship has been submitted.</p>
<ul>
  <li><strong>Name / Company:</strong> {name}</li>
  <li><strong>Contact name:</strong> {contact_name}</li>
  <li><strong>Email:</strong> {email}</li>
  <li><strong>Contact number:</strong> {contact_number}</li>
  <li><strong>Tier:</strong> {tier_name} (${tier_price})</li>
  <li><strong>Assets:</strong> {assets}</li>
</ul>
<p>Payment is handled out of band. A tax invoice will be sent to the sponsor.</p>"#,
        name = html_escape(&params.name),
        contact_name = html_escape(&params.contact_name),
        email = html_escape(&params.email),
        contact_number = html_escape(&params.contact_number),
        tier_name = html_escape(&params.tier_name),
        tier_price = params.tier_price,
        assets = html_escape(&asset_status_text(params)),
    )
}

fn render_new_sponsor_text(params: &NewSponsorNotification) -> String {
    format!(
        r#"New sponsor added – SponsorLink

A new sponsorship has been submitted.

Name / Company: {name}
Contact name: {contact_name}
Email: {email}
Contact number: {contact_number}
Tier: {tier_name} (${tier_price})
{assets}

Payment is handled out of band. A tax invoice will be sent to the sponsor."#,
        name = params.name,
        contact_name = params.contact_name,
        email = params.email,
        contact_number = params.contact_number,
        tier_name = params.tier_name,
        tier_price = params.tier_price,
        assets = asset_status_text(params),
    )
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
