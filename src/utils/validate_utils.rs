use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Number;

/// Treats an explicit JSON `null` like an absent field.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a non-negative integer, also when written with a zero fraction such as `100.0`.
pub fn deserialize_whole_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    if let Some(value) = number.as_u64() {
        return Ok(value);
    }
    match number.as_f64() {
        Some(value) if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 => {
            Ok(value as u64)
        }
        _ => Err(D::Error::custom(format!(
            "expected a non-negative whole number, got {number}"
        ))),
    }
}
