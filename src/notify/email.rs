use async_trait::async_trait;
use lettre::message::{header, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::Notifier;
use crate::config::SmtpConfig;
use crate::models::DiscountEvent;
use crate::utils::error::{AppError, Result};

/// Sends one digest email per run with every discount the run found,
/// as a plain-text part plus an HTML alternative.
pub struct EmailNotifier {
    config: SmtpConfig,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        EmailNotifier { config }
    }

    fn format_subject(events: &[DiscountEvent]) -> String {
        match events {
            [event] => format!(
                "🔔 Price drop: {} - {} {}",
                event.book.title, event.observed_price, event.currency
            ),
            _ => format!("🔔 {} price drops found", events.len()),
        }
    }

    fn format_text_body(events: &[DiscountEvent]) -> String {
        let mut body = String::from("New best prices:\n\n");
        for event in events {
            body.push_str("- ");
            body.push_str(&event.summary());
            body.push('\n');
        }
        body
    }

    fn format_html_body(events: &[DiscountEvent]) -> String {
        let mut html = String::from(
            r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body { font-family: Arial, sans-serif; margin: 20px; }
        table { border-collapse: collapse; }
        th, td { padding: 6px 12px; border-bottom: 1px solid #ddd; text-align: left; }
        .drop { color: #4CAF50; font-weight: bold; }
    </style>
</head>
<body>
    <h2>New best prices</h2>
    <table>
        <tr><th>Book</th><th>Store</th><th>Price</th><th>Was</th><th>Drop</th></tr>
"#,
        );

        for event in events {
            html.push_str(&format!(
                "        <tr><td>{}</td><td>{}</td><td>{} {}</td><td>{} {}</td><td class=\"drop\">-{}%</td></tr>\n",
                event.book.title,
                event.store.name,
                event.observed_price,
                event.currency,
                event.previous_best,
                event.currency,
                event.drop_percent(),
            ));
        }

        html.push_str("    </table>\n</body>\n</html>\n");
        html
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = if self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
                .map_err(|e| AppError::Notification(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
        };

        builder = builder.port(self.config.port);

        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(&self, events: &[DiscountEvent]) -> Result<()> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_address)
            .parse()
            .map_err(|e| AppError::Notification(format!("invalid from address: {}", e)))?;
        let to = self
            .config
            .to_address
            .parse()
            .map_err(|e| AppError::Notification(format!("invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(Self::format_subject(events))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(Self::format_text_body(events)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(Self::format_html_body(events)),
                    ),
            )
            .map_err(|e| AppError::Notification(e.to_string()))?;

        let mailer = self.transport()?;
        mailer
            .send(email)
            .await
            .map_err(|e| AppError::Notification(e.to_string()))?;

        Ok(())
    }
}
