use serde::{Deserialize, Deserializer};

// clients send ids both as JSON numbers and as the string keys of the category map
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Text(String),
}

/// `""` and `null` read as absent, numeric strings are parsed.
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("Wrong value {s}, can not parse to i64"))),
    }
}

/// Never fails: anything that isn't a positive integer is the first page.
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let page = match Option::<NumberOrString>::deserialize(deserializer).unwrap_or(None) {
        Some(NumberOrString::Number(n)) => n,
        Some(NumberOrString::Text(s)) => s.trim().parse::<i64>().unwrap_or(1),
        None => 1,
    };
    Ok(usize::try_from(page).ok().filter(|p| *p >= 1).unwrap_or(1))
}
