use std::num::IntErrorKind;

use serde::{Deserialize, Deserializer};

pub fn first_page() -> i64 {
    1
}

// `?page=abc` and `?page=` fall back to the first page instead of rejecting the request.
// Integers outside i64 saturate so they still land past the last page.
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<String>::deserialize(deserializer)? else {
        return Ok(first_page());
    };
    let page = match value.trim().parse::<i64>() {
        Ok(page) => page,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => first_page(),
        },
    };
    Ok(page)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
    Float(f64),
}

// category ids come from the frontend either as numbers or as strings, the store keeps text
pub fn deserialize_option_string_from_number<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::String(s) => s,
        StringOrNumber::Integer(i) => i.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    }))
}
