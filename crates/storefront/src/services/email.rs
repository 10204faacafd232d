//! Email service for transactional mail and newsletter campaigns.
//!
//! Uses SMTP via lettre for delivery with Askama templates, one HTML and one
//! plain text rendering per message.

use askama::Template;
use chrono::{Datelike, Utc};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use fraz_modern_core::{OrderStatus, round_money};

use crate::config::EmailConfig;
use crate::models::{Order, OrderItem};

/// HTML template for welcome email.
#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeEmailHtml<'a> {
    name: &'a str,
    shop_url: &'a str,
}

/// Plain text template for welcome email.
#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeEmailText<'a> {
    name: &'a str,
    shop_url: &'a str,
}

/// One row of the order table.
struct EmailLine {
    name: String,
    quantity: i32,
    unit_price: String,
    line_total: String,
}

impl From<&OrderItem> for EmailLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: format_money(item.price),
            line_total: format_money(item.price * Decimal::from(item.quantity)),
        }
    }
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    name: &'a str,
    order_id: i32,
    lines: &'a [EmailLine],
    subtotal: &'a str,
    discount: &'a str,
    has_discount: bool,
    total: &'a str,
    orders_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    name: &'a str,
    order_id: i32,
    lines: &'a [EmailLine],
    subtotal: &'a str,
    discount: &'a str,
    has_discount: bool,
    total: &'a str,
    orders_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_status.html")]
struct OrderStatusHtml<'a> {
    name: &'a str,
    order_id: i32,
    status: &'a str,
    tracking_number: Option<&'a str>,
    orders_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_status.txt")]
struct OrderStatusText<'a> {
    name: &'a str,
    order_id: i32,
    status: &'a str,
    tracking_number: Option<&'a str>,
    orders_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/campaign.html")]
struct CampaignHtml<'a> {
    subject: &'a str,
    content: &'a str,
    year: i32,
}

#[derive(Template)]
#[template(path = "email/campaign.txt")]
struct CampaignText<'a> {
    content: &'a str,
    year: i32,
}

/// A newsletter campaign rendered once and sent to many recipients.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    storefront_url: Url,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// `storefront_url` is the public shop address used for links.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig, storefront_url: Url) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let builder = if config.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        };
        let mailer = builder
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            storefront_url,
        })
    }

    /// Send a welcome email after registration.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_welcome_email(&self, to: &str, name: Option<&str>) -> Result<(), EmailError> {
        let name = greeting_name(name);
        let shop_url = self.link("products");
        let html = WelcomeEmailHtml {
            name,
            shop_url: &shop_url,
        }
        .render()?;
        let text = WelcomeEmailText {
            name,
            shop_url: &shop_url,
        }
        .render()?;

        self.send_multipart_email(
            to,
            "Welcome to FrazModern! Your Premium Shopping Journey Begins",
            &text,
            &html,
        )
        .await
    }

    /// Send the confirmation for a freshly placed order.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        name: Option<&str>,
        order: &Order,
    ) -> Result<(), EmailError> {
        let name = greeting_name(name);
        let lines: Vec<EmailLine> = order.items.iter().map(EmailLine::from).collect();
        let subtotal = format_money(order.subtotal);
        let discount = format_money(order.discount);
        let has_discount = order.discount > Decimal::ZERO;
        let total = format_money(order.total);
        let orders_url = self.link("orders");
        let order_id = order.id.as_i32();

        let html = OrderConfirmationHtml {
            name,
            order_id,
            lines: &lines,
            subtotal: &subtotal,
            discount: &discount,
            has_discount,
            total: &total,
            orders_url: &orders_url,
        }
        .render()?;
        let text = OrderConfirmationText {
            name,
            order_id,
            lines: &lines,
            subtotal: &subtotal,
            discount: &discount,
            has_discount,
            total: &total,
            orders_url: &orders_url,
        }
        .render()?;

        self.send_multipart_email(
            to,
            &format!("Order Confirmation #{order_id} - Thank you for your purchase!"),
            &text,
            &html,
        )
        .await
    }

    /// Tell a customer their order moved to a new status.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_status(
        &self,
        to: &str,
        name: Option<&str>,
        order: &Order,
        status: OrderStatus,
    ) -> Result<(), EmailError> {
        let name = greeting_name(name);
        let orders_url = self.link("orders");
        let order_id = order.id.as_i32();
        let tracking_number = order.tracking_number.as_deref();

        let html = OrderStatusHtml {
            name,
            order_id,
            status: status.as_str(),
            tracking_number,
            orders_url: &orders_url,
        }
        .render()?;
        let text = OrderStatusText {
            name,
            order_id,
            status: status.as_str(),
            tracking_number,
            orders_url: &orders_url,
        }
        .render()?;

        self.send_multipart_email(
            to,
            &format!("Order Status Update - Order #{order_id}"),
            &text,
            &html,
        )
        .await
    }

    /// Render a campaign once for every recipient.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Template` if a template fails to render.
    pub fn render_campaign(subject: &str, content: &str) -> Result<Campaign, EmailError> {
        let year = Utc::now().year();
        Ok(Campaign {
            subject: subject.to_string(),
            html: CampaignHtml {
                subject,
                content,
                year,
            }
            .render()?,
            text: CampaignText { content, year }.render()?,
        })
    }

    /// Send a rendered campaign to one subscriber.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send.
    pub async fn send_campaign(&self, to: &str, campaign: &Campaign) -> Result<(), EmailError> {
        self.send_multipart_email(to, &campaign.subject, &campaign.text, &campaign.html)
            .await
    }

    fn link(&self, path: &str) -> String {
        self.storefront_url
            .join(path)
            .map_or_else(|_| self.storefront_url.to_string(), |u| u.to_string())
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
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

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn greeting_name(name: Option<&str>) -> &str {
    name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("there")
}

/// Dollar amount with two decimals, e.g. `$12.50`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("12.5".parse().unwrap()), "$12.50");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
        assert_eq!(format_money("1299.999".parse().unwrap()), "$1300.00");
    }

    #[test]
    fn test_greeting_name_falls_back() {
        assert_eq!(greeting_name(Some("Ada")), "Ada");
        assert_eq!(greeting_name(Some("   ")), "there");
        assert_eq!(greeting_name(None), "there");
    }

    #[test]
    fn test_campaign_html_turns_newlines_into_breaks() {
        let campaign =
            EmailService::render_campaign("Spring sale", "Hello\nEverything is <b>20%</b> off")
                .unwrap();
        assert!(campaign.html.contains("Hello<br"));
        assert!(!campaign.html.contains("<b>20%</b>"));
        assert!(campaign.text.contains("Hello\nEverything is <b>20%</b> off"));
        assert!(campaign.html.contains(&Utc::now().year().to_string()));
    }

    #[test]
    fn test_welcome_text_renders_link() {
        let text = WelcomeEmailText {
            name: "Ada",
            shop_url: "https://shop.example.com/products",
        }
        .render()
        .unwrap();
        assert!(text.contains("Hi Ada!"));
        assert!(text.contains("https://shop.example.com/products"));
    }
}
