use super::NotifyChannel;
use crate::error::{Error, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

/// Sender account and recipient of notification mails
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: String,
    pub sender_name: String,
    pub password: String,
    pub recipient: String,
    /// Overrides the server inferred from the sender's domain
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
}

/// SMTP relay reached over implicit TLS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpServer {
    pub host: String,
    pub port: u16,
}

impl SmtpServer {
    const SMTPS_PORT: u16 = 465;

    /// Well-known relay for the sender's mail provider, 163.com when unknown
    #[must_use]
    pub fn for_address(address: &str) -> Self {
        let address = address.to_lowercase();
        let host = match address.rsplit_once('@').map(|(_, domain)| domain) {
            Some("126.com") => "smtp.126.com",
            Some("qq.com") => "smtp.qq.com",
            Some("gmail.com") => "smtp.gmail.com",
            _ => "smtp.163.com",
        };

        Self {
            host: host.to_string(),
            port: Self::SMTPS_PORT,
        }
    }

    fn resolve(config: &MailConfig) -> Self {
        let inferred = Self::for_address(&config.sender);

        Self {
            host: config.smtp_host.clone().unwrap_or(inferred.host),
            port: config.smtp_port.unwrap_or(inferred.port),
        }
    }
}

/// Plain-text mail over SMTP
pub struct MailChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl MailChannel {
    /// Build the channel and its pooled SMTP transport.
    ///
    /// # Panics
    ///
    /// The transport's connection pool is spawned on the current Tokio
    /// runtime, so this must be called from within one.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from = Mailbox::new(
            Some(config.sender_name.clone()),
            parse_address("sender", &config.sender)?,
        );
        let to = Mailbox::new(None, parse_address("recipient", &config.recipient)?);

        let server = SmtpServer::resolve(config);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&server.host)
            .map_err(|e| Error::Config(format!("SMTP relay {}: {e}", server.host)))?
            .port(server.port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from, to })
    }

    fn message(&self, title: &str, content: &str) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(title)
            .header(ContentType::TEXT_PLAIN)
            .body(content.to_string())
            .map_err(|e| Error::Notify(format!("failed to build mail: {e}")))
    }
}

#[async_trait]
impl NotifyChannel for MailChannel {
    fn name(&self) -> &'static str {
        "mail"
    }

    async fn send(&self, title: &str, content: &str) -> Result<()> {
        let message = self.message(title, content)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::Notify(format!("failed to send mail: {e}")))?;

        Ok(())
    }
}

fn parse_address(role: &str, address: &str) -> Result<Address> {
    address
        .parse()
        .map_err(|e| Error::Config(format!("invalid {role} address '{address}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            sender: "robot@qq.com".to_string(),
            sender_name: "Robot".to_string(),
            password: "token".to_string(),
            recipient: "me@example.com".to_string(),
            smtp_host: None,
            smtp_port: None,
        }
    }

    #[test]
    fn test_server_follows_sender_domain() {
        assert_eq!(SmtpServer::for_address("a@126.com").host, "smtp.126.com");
        assert_eq!(SmtpServer::for_address("a@QQ.com").host, "smtp.qq.com");
        assert_eq!(SmtpServer::for_address("a@gmail.com").host, "smtp.gmail.com");
        assert_eq!(SmtpServer::for_address("a@163.com").host, "smtp.163.com");

        let fallback = SmtpServer::for_address("a@example.org");
        assert_eq!(fallback.host, "smtp.163.com");
        assert_eq!(fallback.port, 465);
    }

    #[test]
    fn test_explicit_server_wins() {
        let mut config = config();
        config.smtp_host = Some("mail.example.org".to_string());
        config.smtp_port = Some(2465);

        let server = SmtpServer::resolve(&config);
        assert_eq!(server.host, "mail.example.org");
        assert_eq!(server.port, 2465);
    }

    #[tokio::test]
    async fn test_invalid_address_is_config_error() {
        let mut config = config();
        config.recipient = "not-an-address".to_string();

        assert!(matches!(MailChannel::new(&config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_message_carries_title_and_sender_name() {
        let channel = MailChannel::new(&config()).unwrap();
        let message = channel
            .message("Bing Wallpaper Download SUCCESS", "{\"hsh\":\"abc\"}")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Bing Wallpaper Download SUCCESS"));
        assert!(raw.contains("Robot <robot@qq.com>"));
        assert!(raw.contains("me@example.com"));
    }
}
