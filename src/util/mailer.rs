use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    types::{Body, Content, Destination, EmailContent, Message},
};
use tracing::debug;

const CHARSET: &str = "UTF-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

pub struct SesNotifier {
    client: Client,
}

impl SesNotifier {
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: Client::new(&config),
        }
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send(&self, email: &Email) -> Result<()> {
        let destination = Destination::builder()
            .set_to_addresses(Some(email.to.clone()))
            .build();

        let subject = Content::builder()
            .data(&email.subject)
            .charset(CHARSET)
            .build()?;
        let html = Content::builder()
            .data(&email.html_body)
            .charset(CHARSET)
            .build()?;

        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().html(html).build())
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&email.from)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;

        debug!("SES accepted message {:?}", output.message_id());
        Ok(())
    }
}

pub fn download_email(from: &str, to: &[String], url: &str) -> Email {
    Email {
        from: from.to_string(),
        to: to.to_vec(),
        subject: "[translated] Recent Announcements".to_string(),
        html_body: format!(
            "You can download the translated Recent Announcements:</br>\n\
             <a class=\"ulink\" href=\"{url}\" target=\"_blank\">here</a>"
        ),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) sent: Arc<Mutex<Vec<Email>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, email: &Email) -> Result<()> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    #[test]
    fn download_email_links_to_url() {
        let email = download_email(
            "bot@example.com",
            &["a@example.com".to_string(), "b@example.com".to_string()],
            "https://bucket.s3.amazonaws.com/key?X-Amz-Signature=abc",
        );

        assert_eq!(email.to.len(), 2);
        assert_eq!(email.subject, "[translated] Recent Announcements");
        assert!(email.html_body.contains(
            r#"<a class="ulink" href="https://bucket.s3.amazonaws.com/key?X-Amz-Signature=abc" target="_blank">here</a>"#
        ));
    }
}
