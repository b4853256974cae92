//! Plain SMTP email, typically relayed through the internal mail server named
//! in the `servers` configuration (`mail.address`).

use crate::domain::ports::ConfigSource;
use crate::utils::error::{JrcError, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::PathBuf;

const DEFAULT_SMTP_PORT: u16 = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyKind {
    #[default]
    Plain,
    Html,
}

#[derive(Debug, Clone)]
pub struct Email {
    pub text: String,
    pub sender: String,
    pub receivers: Vec<String>,
    pub subject: String,
    pub attachment: Option<PathBuf>,
    pub body_kind: BodyKind,
    /// `host[:port]`; looked up in configuration when absent.
    pub server: Option<String>,
}

impl Email {
    pub fn new(
        text: impl Into<String>,
        sender: impl Into<String>,
        receivers: Vec<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            sender: sender.into(),
            receivers,
            subject: subject.into(),
            attachment: None,
            body_kind: BodyKind::Plain,
            server: None,
        }
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }

    pub fn html(mut self) -> Self {
        self.body_kind = BodyKind::Html;
        self
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }
}

/// Server from the email itself, else `mail.address` of the `servers` config.
pub async fn resolve_mail_server(email: &Email, source: &dyn ConfigSource) -> Result<String> {
    if let Some(server) = &email.server {
        return Ok(server.clone());
    }
    let servers = source.get_config("servers").await?;
    Ok(servers.str_at("mail.address")?.to_string())
}

pub fn split_server(server: &str) -> Result<(String, u16)> {
    match server.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| JrcError::InvalidConfigValueError {
                    field: "mail.address".to_string(),
                    value: server.to_string(),
                    reason: "port is not a number".to_string(),
                })?;
            Ok((host.to_string(), port))
        }
        None => Ok((server.to_string(), DEFAULT_SMTP_PORT)),
    }
}

pub async fn build_message(email: &Email) -> Result<Message> {
    if email.receivers.is_empty() {
        return Err(JrcError::EmailError {
            message: "no receivers given".to_string(),
        });
    }

    let mut builder = Message::builder()
        .from(email.sender.parse::<Mailbox>()?)
        .subject(email.subject.as_str());
    for receiver in &email.receivers {
        builder = builder.to(receiver.parse::<Mailbox>()?);
    }

    let content_type = match email.body_kind {
        BodyKind::Plain => ContentType::TEXT_PLAIN,
        BodyKind::Html => ContentType::TEXT_HTML,
    };
    let mut body = MultiPart::mixed().singlepart(
        SinglePart::builder()
            .header(content_type)
            .body(email.text.clone()),
    );

    if let Some(path) = &email.attachment {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let octet_stream =
            ContentType::parse("application/octet-stream").map_err(|e| JrcError::EmailError {
                message: e.to_string(),
            })?;
        body = body.singlepart(Attachment::new(filename).body(bytes, octet_stream));
    }

    Ok(builder.multipart(body)?)
}

pub async fn send_email(email: &Email, source: &dyn ConfigSource) -> Result<()> {
    let server = resolve_mail_server(email, source).await?;
    let (host, port) = split_server(&server)?;
    let message = build_message(email).await?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        .port(port)
        .build();
    transport.send(message).await?;

    tracing::info!(
        "Sent \"{}\" to {} recipient(s) via {}",
        email.subject,
        email.receivers.len(),
        server
    );
    Ok(())
}
