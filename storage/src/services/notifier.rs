use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{Result, StorageError};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: std::time::Duration = std::time::Duration::from_secs(2);

/// Outbound-mail seam. Production uses SMTP; tests record.
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// SMTP notifier. When no relay is configured the notifier is disabled
/// and sends become logged no-ops, so the API stays runnable without a
/// mail server.
#[derive(Clone)]
pub struct MailNotifier {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl MailNotifier {
    pub fn smtp(
        server: &str,
        port: u16,
        username: String,
        password: String,
        from: String,
    ) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(server)
            .map_err(|e| StorageError::Notification(format!("SMTP relay error: {e}")))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport: Some(transport),
            from,
        })
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: String::new(),
        }
    }
}

impl Notifier for MailNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let Some(transport) = &self.transport else {
            tracing::debug!(to, subject, "Mail disabled, skipping notification");
            return Ok(());
        };

        let message = Message::builder()
            .from(self
                .from
                .parse()
                .map_err(|e| StorageError::Notification(format!("Bad from address: {e}")))?)
            .to(to
                .parse()
                .map_err(|e| StorageError::Notification(format!("Bad to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| StorageError::Notification(format!("Message build error: {e}")))?;

        transport
            .send(message)
            .await
            .map_err(|e| StorageError::Notification(format!("SMTP send error: {e}")))?;
        Ok(())
    }
}

/// One notification policy for every call site: retry a few times with a
/// fixed delay, then log and swallow. State changes have already
/// committed by the time this runs, so a mail failure never unwinds them.
pub async fn notify_best_effort<N: Notifier>(notifier: &N, to: &str, subject: &str, body: &str) {
    for attempt in 1..=MAX_ATTEMPTS {
        match notifier.send(to, subject, body).await {
            Ok(()) => return,
            Err(e) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(to, attempt, error = %e, "Notification attempt failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => {
                tracing::error!(to, error = %e, "Notification failed after {MAX_ATTEMPTS} attempts");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail_first: AtomicU32,
    }

    impl Notifier for RecordingNotifier {
        async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(StorageError::Notification("boom".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_on_first_attempt() {
        let notifier = RecordingNotifier::default();
        notify_best_effort(&notifier, "a@b.c", "hello", "body").await;
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_then_succeeds() {
        let notifier = RecordingNotifier {
            fail_first: AtomicU32::new(2),
            ..Default::default()
        };
        notify_best_effort(&notifier, "a@b.c", "hello", "body").await;
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_three_attempts_without_panicking() {
        let notifier = RecordingNotifier {
            fail_first: AtomicU32::new(5),
            ..Default::default()
        };
        notify_best_effort(&notifier, "a@b.c", "hello", "body").await;
        assert!(notifier.sent.lock().unwrap().is_empty());
        // Two of the five scheduled failures remain unconsumed.
        assert_eq!(notifier.fail_first.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn disabled_mailer_swallows_sends() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let mailer = MailNotifier::disabled();
            assert!(mailer.send("a@b.c", "s", "b").await.is_ok());
        });
    }
}
