use serde::{self, Deserialize, Deserializer, Serializer};

/// Authoring forms store points either as a JSON number or as a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoints {
    Number(f64),
    Text(String),
}

pub fn serialize<S>(points: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(*points)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawPoints::deserialize(deserializer)? {
        RawPoints::Number(n) if n.is_finite() => Ok(n),
        RawPoints::Number(n) => Err(serde::de::Error::custom(format!(
            "invalid points value '{n}': must be finite"
        ))),
        RawPoints::Text(s) => parse_points_str(&s).map_err(serde::de::Error::custom),
    }
}

fn parse_points_str(s: &str) -> Result<f64, String> {
    let points = s
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid points value '{}': {}", s, e))?;
    if points.is_finite() {
        Ok(points)
    } else {
        Err(format!("invalid points value '{}': must be finite", s))
    }
}
