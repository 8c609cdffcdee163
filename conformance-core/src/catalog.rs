//! The scenario tables of the suite.

use crate::{
    config::{SAN_JOSE_NAME, TROYES_NAME},
    model::{CoordValue, Mode, Query},
    scenario::{Expectation, KeyChoice, Precision, Scenario, Suite},
};

/// Spellings of San Jose the service must normalize: lower, upper, mixed
/// case and encoded leading/trailing spaces.
pub const SAN_JOSE_SPELLINGS: &[&str] = &[
    "San%20Jose",
    "san%20jose",
    "SAN%20JOSE",
    "sAn%20jOsE",
    "%20San%20Jose",
    "San%20Jose%20",
];

/// Points within ~0.0001 degrees of San Jose, last one given as text.
pub fn san_jose_points() -> Vec<(CoordValue, CoordValue)> {
    vec![
        ((-121.895).into(), 37.3394.into()),
        ((-121.894).into(), 37.3394.into()),
        ((-121.895).into(), 37.3393.into()),
        ((-121.8951).into(), 37.33941.into()),
        ((-121.8949).into(), 37.33939.into()),
        ("-121.895".into(), "37.3394".into()),
    ]
}

/// Every scenario, in suite order.
pub fn all() -> Vec<Scenario> {
    Suite::all().iter().flat_map(|s| suite(*s)).collect()
}

pub fn suite(suite: Suite) -> Vec<Scenario> {
    match suite {
        Suite::CityName => city_name(),
        Suite::LonLat => lon_lat(),
        Suite::Zip => zip(),
    }
}

fn city_name() -> Vec<Scenario> {
    let s = Suite::CityName;
    let mut out = Vec::new();

    for mode in Mode::all() {
        let test = format!("city_name_{mode}");
        for name in SAN_JOSE_SPELLINGS {
            out.push(Scenario::new(
                s,
                &test,
                Query::city(*name),
                *mode,
                KeyChoice::Configured,
                Expectation::found(SAN_JOSE_NAME),
            ));
        }
    }

    // City named like its country.
    out.push(Scenario::new(
        s,
        "city_name_special_json",
        Query::city("Mexico"),
        Mode::Json,
        KeyChoice::Configured,
        Expectation::found("Mexico"),
    ));

    for (name, code) in [("San*Jose", 404), ("", 400), ("%20", 404)] {
        out.push(Scenario::new(
            s,
            "city_name_negative",
            Query::city(name),
            Mode::Json,
            KeyChoice::Configured,
            Expectation::Status(code),
        ));
    }

    out.push(Scenario::new(
        s,
        "api_key_negative",
        Query::city("San%20Jose"),
        Mode::Json,
        KeyChoice::Invalid,
        Expectation::Status(401),
    ));

    out
}

fn lon_lat() -> Vec<Scenario> {
    let s = Suite::LonLat;
    let mut out = Vec::new();

    let malformed: [(CoordValue, CoordValue); 5] = [
        (1000_i64.into(), 1000_i64.into()),
        ("lon".into(), "lat".into()),
        ("".into(), 37.3394.into()),
        ((-121.895).into(), "".into()),
        ("".into(), "".into()),
    ];
    for (lon, lat) in malformed {
        out.push(Scenario::new(
            s,
            "lon_lat_negative",
            Query::coordinates(lon, lat),
            Mode::Json,
            KeyChoice::Configured,
            Expectation::Status(400),
        ));
    }

    let variants = [
        ("lon_lat_json", Mode::Json, Some(Precision::Exact)),
        ("lon_lat_json_reduce_precision", Mode::Json, Some(Precision::TwoDecimals)),
        ("lon_lat_xml", Mode::Xml, Some(Precision::Exact)),
        ("lon_lat_html", Mode::Html, None),
    ];
    for (test, mode, precision) in variants {
        for (lon, lat) in san_jose_points() {
            let expectation = match precision {
                Some(p) => Expectation::found_at(SAN_JOSE_NAME, p),
                None => Expectation::found(SAN_JOSE_NAME),
            };
            out.push(Scenario::new(
                s,
                test,
                Query::coordinates(lon, lat),
                mode,
                KeyChoice::Configured,
                expectation,
            ));
        }
    }

    out.push(Scenario::new(
        s,
        "api_key_negative",
        Query::coordinates(-121.895, 37.3394),
        Mode::Json,
        KeyChoice::Invalid,
        Expectation::Status(401),
    ));

    out
}

fn zip() -> Vec<Scenario> {
    let s = Suite::Zip;
    let mut out = vec![Scenario::new(
        s,
        "api_key_negative",
        Query::zip("95128", None),
        Mode::Json,
        KeyChoice::Invalid,
        Expectation::Status(401),
    )];

    // 0 is not a zip anywhere; 10000 exists, but not in the US.
    for (code, country, status) in [("0", None, 400), ("10000", Some("US"), 404)] {
        out.push(Scenario::new(
            s,
            "zip_not_found_negative",
            Query::zip(code, country),
            Mode::Json,
            KeyChoice::Configured,
            Expectation::Status(status),
        ));
    }

    let lookups = [
        ("95128", None, SAN_JOSE_NAME),
        ("95128", Some("US"), SAN_JOSE_NAME),
        ("10000", Some("FR"), TROYES_NAME),
    ];
    for mode in Mode::all() {
        let test = format!("zip_{mode}");
        for (code, country, city) in lookups {
            out.push(Scenario::new(
                s,
                &test,
                Query::zip(code, country),
                *mode,
                KeyChoice::Configured,
                Expectation::found(city),
            ));
        }
    }

    out
}
