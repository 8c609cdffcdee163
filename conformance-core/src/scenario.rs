use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::{
    ServiceClient,
    config::{API_KEY_INVALID, ServiceEndpoint},
    model::{CoordValue, Mode, Query, QueryOutcome},
    payload,
};

/// Group of scenarios sharing a lookup style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    CityName,
    LonLat,
    Zip,
}

impl Suite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suite::CityName => "city_name",
            Suite::LonLat => "lon_lat",
            Suite::Zip => "zip",
        }
    }

    pub const fn all() -> &'static [Suite] {
        &[Suite::CityName, Suite::LonLat, Suite::Zip]
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Suite {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase().replace('-', "_");

        match lower.as_str() {
            "city_name" | "city" => Ok(Suite::CityName),
            "lon_lat" | "coord" => Ok(Suite::LonLat),
            "zip" => Ok(Suite::Zip),
            _ => Err(anyhow!(
                "Unknown suite '{value}'. Supported suites: city_name, lon_lat, zip."
            )),
        }
    }
}

/// Which API key a scenario sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyChoice {
    /// The key supplied to [`Scenario::run`].
    Configured,
    /// [`API_KEY_INVALID`].
    Invalid,
}

/// How echoed JSON coordinates are compared with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Exact,
    TwoDecimals,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Only the status code is checked.
    Status(u16),
    /// Status 200 and the given city name. With `coord` set, the echoed
    /// coordinates must also match the request's.
    Found {
        city: String,
        coord: Option<Precision>,
    },
}

impl Expectation {
    pub fn found(city: &str) -> Self {
        Expectation::Found {
            city: city.to_string(),
            coord: None,
        }
    }

    pub fn found_at(city: &str, precision: Precision) -> Self {
        Expectation::Found {
            city: city.to_string(),
            coord: Some(precision),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Expectation::Status(code) => *code,
            Expectation::Found { .. } => 200,
        }
    }
}

/// A check that ran and did not hold. Anything else that goes wrong while
/// running a scenario is an error, not a failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssertionFailure {
    #[error(
        "Unexpected response code returned by service for request:\n{url}\nExpected status is {expected}, returned status is {actual}"
    )]
    Status {
        url: String,
        expected: u16,
        actual: u16,
    },

    #[error("Unexpected `{field}` in {mode} response for request:\n{url}\nExpected {expected}, got {actual}")]
    Field {
        url: String,
        mode: Mode,
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Corresponding city name `{city}` is not found in html response for request:\n{url}")]
    HtmlMissingCity { url: String, city: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub suite: Suite,
    pub name: String,
    pub query: Query,
    pub mode: Mode,
    pub key: KeyChoice,
    pub expectation: Expectation,
}

impl Scenario {
    pub fn new(
        suite: Suite,
        test: &str,
        query: Query,
        mode: Mode,
        key: KeyChoice,
        expectation: Expectation,
    ) -> Self {
        let name = format!("{suite}::{test}[{}]", query.label());
        Self {
            suite,
            name,
            query,
            mode,
            key,
            expectation,
        }
    }

    /// Request URL for this scenario with `api_key` standing in for
    /// [`KeyChoice::Configured`].
    pub fn url(&self, endpoint: &ServiceEndpoint, api_key: &str) -> String {
        let key = match self.key {
            KeyChoice::Configured => api_key,
            KeyChoice::Invalid => API_KEY_INVALID,
        };

        let mut url = format!(
            "{}{}&appid={key}",
            endpoint.base_uri(),
            self.query.to_query_string()
        );
        if let Some(mode) = self.mode.query_value() {
            url.push_str("&mode=");
            url.push_str(mode);
        }
        url
    }

    /// Issue the request and check the response.
    ///
    /// A failed check comes back as an [`AssertionFailure`] inside the
    /// error; transport faults and undecodable bodies come back as other
    /// errors.
    pub async fn run(
        &self,
        client: &dyn ServiceClient,
        endpoint: &ServiceEndpoint,
        api_key: &str,
    ) -> Result<()> {
        let url = self.url(endpoint, api_key);
        let outcome = client.query_service(&url).await?;
        debug!(scenario = %self.name, status = outcome.status(), "response received");

        let expected = self.expectation.status();
        if outcome.status() != expected {
            return Err(AssertionFailure::Status {
                url,
                expected,
                actual: outcome.status(),
            }
            .into());
        }

        let Expectation::Found { city, coord } = &self.expectation else {
            return Ok(());
        };

        let body = match &outcome {
            QueryOutcome::Success { body, .. } => body.as_slice(),
            QueryOutcome::HttpError { status } => {
                return Err(anyhow!("No body returned for `{url}` (status {status})"));
            }
        };

        match self.mode {
            Mode::Json => self.check_json(&url, body, city, *coord),
            Mode::Xml => self.check_xml(&url, body, city, coord.is_some()),
            Mode::Html => {
                let found = payload::html_mentions_city(body, city)
                    .with_context(|| format!("Failed to decode response from `{url}`"))?;
                if found {
                    Ok(())
                } else {
                    Err(AssertionFailure::HtmlMissingCity {
                        url,
                        city: city.clone(),
                    }
                    .into())
                }
            }
        }
    }

    fn requested_coord(&self) -> Result<(&CoordValue, &CoordValue)> {
        match &self.query {
            Query::Coordinates { lon, lat } => Ok((lon, lat)),
            other => Err(anyhow!(
                "Scenario `{}` checks coordinates but queries {other:?}",
                self.name
            )),
        }
    }

    fn check_json(
        &self,
        url: &str,
        body: &[u8],
        city: &str,
        coord: Option<Precision>,
    ) -> Result<()> {
        let parsed = payload::parse_json(body)
            .with_context(|| format!("Failed to decode response from `{url}`"))?;

        if let Some(precision) = coord {
            let (lon, lat) = self.requested_coord()?;
            let echoed = parsed.coord.as_ref();

            let checks = [
                ("coord.lon", lon, echoed.map(|c| c.lon)),
                ("coord.lat", lat, echoed.map(|c| c.lat)),
            ];
            for (field, requested, actual) in checks {
                let (expected, actual) = match precision {
                    Precision::Exact => (requested.as_f64(), actual),
                    Precision::TwoDecimals => (
                        requested.as_f64().map(payload::round2),
                        actual.map(payload::round2),
                    ),
                };
                if expected.is_none() || expected != actual {
                    return Err(field_mismatch(url, Mode::Json, field, expected, actual).into());
                }
            }
        }

        if parsed.name != city {
            return Err(AssertionFailure::Field {
                url: url.to_string(),
                mode: Mode::Json,
                field: "name",
                expected: city.to_string(),
                actual: parsed.name,
            }
            .into());
        }

        Ok(())
    }

    fn check_xml(&self, url: &str, body: &[u8], city: &str, check_coord: bool) -> Result<()> {
        let parsed = payload::parse_xml(body)
            .with_context(|| format!("Failed to decode response from `{url}`"))?;

        if parsed.name.as_deref() != Some(city) {
            return Err(field_mismatch(url, Mode::Xml, "city@name", Some(city), parsed.name).into());
        }

        if check_coord {
            let (lon, lat) = self.requested_coord()?;
            let checks = [
                ("coord@lon", lon.to_string(), parsed.lon),
                ("coord@lat", lat.to_string(), parsed.lat),
            ];
            for (field, expected, actual) in checks {
                if actual.as_deref() != Some(expected.as_str()) {
                    return Err(field_mismatch(url, Mode::Xml, field, Some(expected), actual).into());
                }
            }
        }

        Ok(())
    }
}

fn field_mismatch<E, A>(
    url: &str,
    mode: Mode,
    field: &'static str,
    expected: Option<E>,
    actual: Option<A>,
) -> AssertionFailure
where
    E: fmt::Display,
    A: fmt::Display,
{
    fn show<T: fmt::Display>(value: Option<T>) -> String {
        value.map_or_else(|| "<missing>".to_string(), |v| v.to_string())
    }

    AssertionFailure::Field {
        url: url.to_string(),
        mode,
        field,
        expected: show(expected),
        actual: show(actual),
    }
}
