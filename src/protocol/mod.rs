//! JSON frames exchanged with the bridge.
//!
//! The wire format is shape-based: an inbound frame is classified by which
//! envelope field it carries, never by a type tag.
//!
//! ```text
//! inbound  {"networkTableUpdate": {"key", "value", "valueType", "type"?, "id"?, "flags"?}}
//! inbound  {"autoConfigs": <opaque>}
//! outbound {"key", "valueType", "value"}
//! ```


use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::constants::AUTO_CONFIGS_ENVELOPE_FIELD;
use crate::constants::TELEMETRY_ENVELOPE_FIELD;
use crate::NtValue;
use crate::ProtocolError;
use crate::TaggedValue;

/// Telemetry update as forwarded by the bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NtUpdate {
    pub key: String,
    pub value: Value,
    pub value_type: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<i64>,
}

impl NtUpdate {
    pub fn new(
        key: impl Into<String>,
        value_type: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            key: key.into(),
            value,
            value_type: value_type.into(),
            entry_type: None,
            id: None,
            flags: None,
        }
    }

    pub fn tagged_value(&self) -> TaggedValue {
        TaggedValue::from_wire(&self.value_type, self.value.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    Telemetry(NtUpdate),
    /// Bulk auto routine configuration, cached verbatim
    AutoConfigs(Value),
}

/// Parses and classifies one inbound text frame.
pub fn parse_frame(text: &str) -> Result<InboundFrame, ProtocolError> {
    let mut envelope: Map<String, Value> = serde_json::from_str(text)?;

    if let Some(update) = envelope.remove(TELEMETRY_ENVELOPE_FIELD) {
        let update: NtUpdate = serde_json::from_value(update).map_err(ProtocolError::MalformedUpdate)?;
        return Ok(InboundFrame::Telemetry(update));
    }

    match envelope.remove(AUTO_CONFIGS_ENVELOPE_FIELD) {
        Some(configs) if !configs.is_null() => Ok(InboundFrame::AutoConfigs(configs)),
        _ => Err(ProtocolError::UnknownEnvelope),
    }
}

/// Write request sent to the bridge. Fire-and-forget: no reply is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFrame {
    pub key: String,
    pub value_type: String,
    pub value: NtValue,
}

impl OutboundFrame {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
