//! Message parsing and body extraction

use crate::error::{ExtractError, Result};
use crate::types::{Message, MessageBody, MessagePart};
use mailparse::{MailHeaderMap, ParsedMail};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Parse raw RFC 822 bytes into a [`Message`]
pub fn parse_message(raw: &[u8]) -> Result<Message> {
    let parsed = mailparse::parse_mail(raw).map_err(|e| ExtractError::Decode(e.to_string()))?;

    let subject = parsed
        .headers
        .get_first_value("Subject")
        .unwrap_or_default();

    let body = if is_multipart(&parsed) {
        let mut parts = Vec::new();
        collect_leaf_parts(&parsed, &mut parts)?;
        MessageBody::Multi(parts)
    } else {
        MessageBody::Single(classify_part(&parsed)?)
    };

    let message = Message::new(subject, body);
    match &message.body {
        MessageBody::Multi(parts) => debug!(
            "Parsed multipart message: {} ({} parts, {} text)",
            message.subject,
            parts.len(),
            parts.iter().filter(|part| part.is_plain_text()).count()
        ),
        MessageBody::Single(part) => debug!(
            "Parsed message: {} ({})",
            message.subject,
            part.content_type()
        ),
    }

    Ok(message)
}

/// Primary plain-text content of a message
///
/// Multi-part messages yield their first `text/plain` part. Single-part
/// messages yield their payload whatever the declared content type.
pub fn extract_body(message: &Message) -> Result<String> {
    match &message.body {
        MessageBody::Multi(parts) => parts
            .iter()
            .find_map(|part| match part {
                MessagePart::PlainText(text) => Some(text.clone()),
                MessagePart::Other { .. } => None,
            })
            .ok_or(ExtractError::NoTextContent),
        MessageBody::Single(MessagePart::PlainText(text)) => Ok(text.clone()),
        MessageBody::Single(MessagePart::Other {
            content_type,
            bytes,
        }) => Ok(decode_lossy(bytes, content_type)),
    }
}

fn is_multipart(parsed: &ParsedMail) -> bool {
    !parsed.subparts.is_empty() || parsed.ctype.mimetype.starts_with("multipart/")
}

fn collect_leaf_parts(parsed: &ParsedMail, parts: &mut Vec<MessagePart>) -> Result<()> {
    for part in &parsed.subparts {
        if is_multipart(part) {
            collect_leaf_parts(part, parts)?;
        } else {
            parts.push(classify_part(part)?);
        }
    }
    Ok(())
}

fn classify_part(part: &ParsedMail) -> Result<MessagePart> {
    let content_type = part.ctype.mimetype.clone();

    if content_type == "text/plain" {
        let text = part
            .get_body()
            .map_err(|e| ExtractError::Decode(e.to_string()))?;
        Ok(MessagePart::PlainText(text))
    } else {
        let bytes = part
            .get_body_raw()
            .map_err(|e| ExtractError::Decode(e.to_string()))?;
        Ok(MessagePart::Other {
            content_type,
            bytes,
        })
    }
}

fn decode_lossy(bytes: &[u8], content_type: &str) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            warn!("Replaced invalid UTF-8 in {content_type} body");
            text
        }
    }
}
