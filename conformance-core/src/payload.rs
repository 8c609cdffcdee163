//! Read-only extraction of the few response fields the scenarios check.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwCoord {
    pub lon: f64,
    pub lat: f64,
}

/// Subset of the JSON current-weather document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwCurrent {
    pub name: String,
    pub coord: Option<OwCoord>,
}

/// City data found in the XML current-weather document. Attribute values
/// are kept as the service wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlCity {
    pub name: Option<String>,
    pub lon: Option<String>,
    pub lat: Option<String>,
}

pub fn parse_json(body: &[u8]) -> Result<OwCurrent> {
    serde_json::from_slice(body).context("Failed to parse current weather JSON")
}

/// Locate the `city` element directly under the document root and the
/// first `coord` element beneath it.
pub fn parse_xml(body: &[u8]) -> Result<XmlCity> {
    let text = std::str::from_utf8(body).context("XML response is not valid UTF-8")?;
    let doc = roxmltree::Document::parse(text).context("Failed to parse current weather XML")?;

    let city = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("city"))
        .ok_or_else(|| anyhow!("XML response has no top-level `city` element"))?;

    let coord = city.descendants().find(|n| n.has_tag_name("coord"));

    Ok(XmlCity {
        name: city.attribute("name").map(str::to_string),
        lon: coord.and_then(|c| c.attribute("lon")).map(str::to_string),
        lat: coord.and_then(|c| c.attribute("lat")).map(str::to_string),
    })
}

/// Whether the HTML widget shows `city` as element text, i.e. `>{city}<`.
pub fn html_mentions_city(body: &[u8], city: &str) -> Result<bool> {
    let text = std::str::from_utf8(body).context("HTML response is not valid UTF-8")?;
    Ok(text.contains(&format!(">{city}<")))
}

/// Round to two decimal places based on the exact binary value, so
/// `-121.895` (stored as `-121.89499..`) becomes `-121.89`.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}
