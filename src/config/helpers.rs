use serde::{Deserialize, Deserializer, Serializer, de};

use crate::models::SourceType;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRepr {
    Int(u64),
    Text(String),
}

/// Custom deserializer for a `u64` stored either as an integer or as a decimal
/// string.
pub fn deserialize_u64_from_str_or_int<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberRepr::deserialize(deserializer)? {
        NumberRepr::Int(value) => Ok(value),
        NumberRepr::Text(text) => text.trim().parse::<u64>().map_err(|e| {
            de::Error::custom(format!("invalid number '{text}': {e}"))
        }),
    }
}

/// Custom deserializer for an optional monitor source type. Any source other
/// than `project` maps to [`SourceType::Other`], so new upstream sources load.
pub fn deserialize_source_type<'de, D>(deserializer: D) -> Result<Option<SourceType>, D::Error>
where
    D: Deserializer<'de>,
{
    let source = Option::<String>::deserialize(deserializer)?;
    Ok(source.as_deref().map(SourceType::from_stored))
}

/// Custom serializer for a `u64` written as a decimal string.
pub fn serialize_u64_as_str<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}
