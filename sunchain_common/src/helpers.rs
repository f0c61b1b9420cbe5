use std::{env, fmt::Display, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Outcome of reading a typed environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue<T> {
    /// The variable was set and parsed.
    Set(T),
    /// The variable was not set.
    Missing,
    /// The variable was set, but could not be parsed. Carries the raw value and the parse error.
    Invalid(String, String),
}

/// Reads `name` from the environment and parses it as `T`. Leading and trailing whitespace is ignored.
pub fn parse_env<T>(name: &str) -> EnvValue<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => match s.trim().parse::<T>() {
            Ok(v) => EnvValue::Set(v),
            Err(e) => EnvValue::Invalid(s, e.to_string()),
        },
        Err(_) => EnvValue::Missing,
    }
}
