use std::fmt;

/// Response format selector. JSON is the service default and sends no `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Json,
    Xml,
    Html,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Json => "json",
            Mode::Xml => "xml",
            Mode::Html => "html",
        }
    }

    /// Value of the `mode` query parameter, if one is sent at all.
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            Mode::Json => None,
            Mode::Xml => Some("xml"),
            Mode::Html => Some("html"),
        }
    }

    pub const fn all() -> &'static [Mode] {
        &[Mode::Json, Mode::Xml, Mode::Html]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A longitude or latitude as it is written into the request.
///
/// The service accepts numbers and numeric strings alike, and malformed
/// values (non-numeric or empty text) are part of the negative cases, so
/// the original spelling is kept instead of normalizing to `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl CoordValue {
    /// Numeric value, when the rendered text parses as one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CoordValue::Int(v) => Some(*v as f64),
            CoordValue::Float(v) => Some(*v),
            CoordValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Like `Display`, but text is quoted so `"1.5"` and `1.5` stay apart.
    pub fn label(&self) -> String {
        match self {
            CoordValue::Text(s) => format!("'{s}'"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CoordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordValue::Int(v) => write!(f, "{v}"),
            // `Display` for f64 is the shortest representation that round-trips.
            CoordValue::Float(v) => write!(f, "{v}"),
            CoordValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CoordValue {
    fn from(value: i64) -> Self {
        CoordValue::Int(value)
    }
}

impl From<f64> for CoordValue {
    fn from(value: f64) -> Self {
        CoordValue::Float(value)
    }
}

impl From<&str> for CoordValue {
    fn from(value: &str) -> Self {
        CoordValue::Text(value.to_string())
    }
}

/// Lookup parameters of a single request.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// City name, already URL-encoded; inserted into the URL verbatim.
    City(String),
    Coordinates { lon: CoordValue, lat: CoordValue },
    /// Zip code with an optional country code. Without one the service
    /// falls back to its own default country. The code is sent as written,
    /// so leading zeros and letters survive.
    Zip {
        code: String,
        country: Option<String>,
    },
}

impl Query {
    pub fn city(name: impl Into<String>) -> Self {
        Query::City(name.into())
    }

    pub fn coordinates(lon: impl Into<CoordValue>, lat: impl Into<CoordValue>) -> Self {
        Query::Coordinates {
            lon: lon.into(),
            lat: lat.into(),
        }
    }

    pub fn zip(code: impl Into<String>, country: Option<&str>) -> Self {
        Query::Zip {
            code: code.into(),
            country: country.map(str::to_string),
        }
    }

    /// The lookup part of the query string, without `appid` or `mode`.
    pub fn to_query_string(&self) -> String {
        match self {
            Query::City(name) => format!("q={name}"),
            Query::Coordinates { lon, lat } => format!("lat={lat}&lon={lon}"),
            Query::Zip { code, country } => match country {
                Some(cc) => format!("zip={code},{cc}"),
                None => format!("zip={code}"),
            },
        }
    }

    /// Short label used in scenario names.
    pub fn label(&self) -> String {
        match self {
            Query::City(name) => name.clone(),
            Query::Coordinates { lon, lat } => format!("{},{}", lon.label(), lat.label()),
            Query::Zip { code, country } => match country {
                Some(cc) => format!("{code},{cc}"),
                None => code.clone(),
            },
        }
    }
}

/// Result of one GET against the service.
///
/// A non-2xx status is an expected outcome for negative cases, so it is a
/// value here rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Success { status: u16, body: Vec<u8> },
    HttpError { status: u16 },
}

impl QueryOutcome {
    pub fn status(&self) -> u16 {
        match self {
            QueryOutcome::Success { status, .. } | QueryOutcome::HttpError { status } => *status,
        }
    }

    /// Response body; absent exactly when the status was an HTTP error.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            QueryOutcome::Success { body, .. } => Some(body),
            QueryOutcome::HttpError { .. } => None,
        }
    }
}
