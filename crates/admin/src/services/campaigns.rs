//! Newsletter campaign delivery.
//!
//! One message per subscriber, at most [`MAX_CONCURRENT_SENDS`] in flight.
//! A failed send is logged and counted; it never aborts the campaign.

use std::fmt::Display;
use std::future::Future;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use fraz_modern_storefront::services::{Campaign, EmailService};

/// Upper bound on concurrent SMTP sends.
pub const MAX_CONCURRENT_SENDS: usize = 5;

/// Outcome of a campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CampaignReport {
    pub sent: usize,
    pub failed: usize,
}

/// Send a rendered campaign to every recipient.
pub async fn send_campaign(
    email: &EmailService,
    campaign: &Campaign,
    recipients: Vec<String>,
) -> CampaignReport {
    deliver(recipients, |to| async move {
        email.send_campaign(&to, campaign).await
    })
    .await
}

/// Run `send` for every recipient with bounded concurrency and tally results.
pub async fn deliver<F, Fut, E>(recipients: Vec<String>, send: F) -> CampaignReport
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    stream::iter(recipients)
        .map(|to| {
            let attempt = send(to.clone());
            async move { (to, attempt.await) }
        })
        .buffer_unordered(MAX_CONCURRENT_SENDS)
        .fold(CampaignReport::default(), |mut report, (to, result)| async move {
            match result {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    tracing::warn!(to = %to, error = %e, "Failed to send campaign email");
                    report.failed += 1;
                }
            }
            report
        })
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_failures_are_counted_not_fatal() {
        let recipients = vec![
            "a@example.com".to_string(),
            "bounce@example.com".to_string(),
            "c@example.com".to_string(),
        ];
        let report = deliver(recipients, |to| async move {
            if to.starts_with("bounce") {
                Err("mailbox unavailable")
            } else {
                Ok(())
            }
        })
        .await;
        assert_eq!(report, CampaignReport { sent: 2, failed: 1 });
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let recipients: Vec<String> = (0..20).map(|i| format!("user{i}@example.com")).collect();

        let report = deliver(recipients, |_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        })
        .await;

        assert_eq!(report.sent, 20);
        assert!(peak.load(Ordering::SeqCst) <= MAX_CONCURRENT_SENDS);
    }

    #[tokio::test]
    async fn test_no_recipients() {
        let report = deliver(Vec::new(), |_| async { Ok::<(), String>(()) }).await;
        assert_eq!(report, CampaignReport::default());
    }
}
