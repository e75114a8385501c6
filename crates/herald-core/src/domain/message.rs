//! Recipients and outbound messages.

use serde::{Deserialize, Serialize};

use crate::error::HeraldError;

const MIN_PHONE_DIGITS: usize = 8;
const MAX_PHONE_DIGITS: usize = 15;

/// An employee reachable on the messaging channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub region: String,
}

impl Recipient {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            region: region.into(),
        }
    }

    /// Phone number as digits only, ready for the transport.
    pub fn normalized_phone(&self) -> Result<String, HeraldError> {
        normalize_phone(&self.phone)
    }
}

/// One message ready to hand to a `MessageSender`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to: String,
    pub body: String,
}

impl OutboundMessage {
    /// Build a message addressed to `recipient`.
    pub fn to(recipient: &Recipient, body: impl Into<String>) -> Result<Self, HeraldError> {
        Ok(Self {
            to: recipient.normalized_phone()?,
            body: body.into(),
        })
    }
}

/// Strip `+`, spaces, dashes and parentheses; reject anything else.
pub fn normalize_phone(raw: &str) -> Result<String, HeraldError> {
    let mut digits = String::with_capacity(raw.len());
    for (i, c) in raw.trim().chars().enumerate() {
        match c {
            '0'..='9' => digits.push(c),
            '+' if i == 0 => {}
            ' ' | '-' | '(' | ')' => {}
            _ => return Err(HeraldError::invalid(format!("invalid phone number: {raw:?}"))),
        }
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(HeraldError::invalid(format!(
            "phone number must have {MIN_PHONE_DIGITS}-{MAX_PHONE_DIGITS} digits: {raw:?}"
        )));
    }
    Ok(digits)
}
