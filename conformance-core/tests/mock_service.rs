use conformance_core::{
    AssertionFailure, Expectation, HttpServiceClient, KeyChoice, Mode, Precision, Query,
    QueryOutcome, Runner, Scenario, ServiceClient, ServiceEndpoint, Suite, catalog,
    config::API_KEY_INVALID,
};
use mockito::{Matcher, Server, ServerGuard};

const PATH: &str = "/data/2.5/weather";

const SAN_JOSE_JSON: &str =
    r#"{"coord":{"lon":-121.895,"lat":37.3394},"name":"San Jose","cod":200}"#;
const SAN_JOSE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><current><city id="5392171" name="San Jose"><coord lon="-121.895" lat="37.3394"></coord><country>US</country></city></current>"#;
const SAN_JOSE_HTML: &str = r#"<html><body><div class="city">San Jose</div></body></html>"#;
const TROYES_JSON: &str = r#"{"coord":{"lon":4.0833,"lat":48.3},"name":"Troyes","cod":200}"#;
const TROYES_XML: &str = r#"<current><city id="2971549" name="Troyes"><coord lon="4.0833" lat="48.3"/></city></current>"#;
const TROYES_HTML: &str = r#"<div>Troyes</div>"#;

fn endpoint(server: &ServerGuard) -> ServiceEndpoint {
    ServiceEndpoint::new(format!("{}{PATH}?", server.url()))
}

fn scenario(suite: Suite, query: Query, mode: Mode, expectation: Expectation) -> Scenario {
    Scenario::new(suite, "mock", query, mode, KeyChoice::Configured, expectation)
}

#[tokio::test]
async fn client_returns_body_and_status_on_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PATH)
        .match_query(Matcher::UrlEncoded("q".into(), "San Jose".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SAN_JOSE_JSON)
        .create_async()
        .await;

    let url = format!("{}{PATH}?q=San%20Jose&appid=KEY", server.url());
    let outcome = HttpServiceClient::new()
        .query_service(&url)
        .await
        .expect("request succeeds");

    mock.assert_async().await;
    assert_eq!(
        outcome,
        QueryOutcome::Success {
            status: 200,
            body: SAN_JOSE_JSON.as_bytes().to_vec(),
        }
    );
}

#[tokio::test]
async fn client_turns_http_errors_into_values() {
    let mut server = Server::new_async().await;
    let mut mocks = Vec::new();
    for (city, status) in [("San*Jose", 404), ("", 400)] {
        let mock = server
            .mock("GET", PATH)
            .match_query(Matcher::UrlEncoded("q".into(), city.into()))
            .with_status(status)
            .with_body(r#"{"cod":"404","message":"city not found"}"#)
            .create_async()
            .await;
        mocks.push(mock);
    }

    let client = HttpServiceClient::new();
    let outcome = client
        .query_service(&format!("{}{PATH}?q=San*Jose&appid=KEY", server.url()))
        .await
        .expect("HTTP errors are not transport errors");
    assert_eq!(outcome, QueryOutcome::HttpError { status: 404 });
    assert!(outcome.body().is_none());

    let outcome = client
        .query_service(&format!("{}{PATH}?q=&appid=KEY", server.url()))
        .await
        .expect("HTTP errors are not transport errors");
    assert_eq!(outcome.status(), 400);
}

#[tokio::test]
async fn client_propagates_connection_failures() {
    // Nothing listens on port 1.
    let err = HttpServiceClient::new()
        .query_service("http://127.0.0.1:1/data/2.5/weather?q=x&appid=KEY")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to send request"));
}

#[tokio::test]
async fn city_name_with_leading_space_json() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), " San Jose".into()),
            Matcher::UrlEncoded("appid".into(), "KEY".into()),
        ]))
        .with_status(200)
        .with_body(SAN_JOSE_JSON)
        .create_async()
        .await;

    let s = scenario(
        Suite::CityName,
        Query::city("%20San%20Jose"),
        Mode::Json,
        Expectation::found("San Jose"),
    );
    s.run(&HttpServiceClient::new(), &endpoint(&server), "KEY")
        .await
        .expect("scenario passes");
    mock.assert_async().await;
}

#[tokio::test]
async fn coordinates_xml_with_mode_selector() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lat".into(), "37.3394".into()),
            Matcher::UrlEncoded("lon".into(), "-121.895".into()),
            Matcher::UrlEncoded("mode".into(), "xml".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(SAN_JOSE_XML)
        .expect(2)
        .create_async()
        .await;

    let client = HttpServiceClient::new();
    for query in [
        Query::coordinates(-121.895, 37.3394),
        Query::coordinates("-121.895", "37.3394"),
    ] {
        let s = scenario(
            Suite::LonLat,
            query,
            Mode::Xml,
            Expectation::found_at("San Jose", Precision::Exact),
        );
        s.run(&client, &endpoint(&server), "KEY")
            .await
            .expect("scenario passes");
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn unexpected_status_is_a_failure_with_url() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let s = scenario(
        Suite::Zip,
        Query::zip("95128", Some("US")),
        Mode::Html,
        Expectation::found("San Jose"),
    );
    let err = s
        .run(&HttpServiceClient::new(), &endpoint(&server), "")
        .await
        .unwrap_err();

    let failure = err
        .downcast_ref::<AssertionFailure>()
        .expect("status mismatch is an assertion failure");
    match failure {
        AssertionFailure::Status {
            url,
            expected,
            actual,
        } => {
            assert!(url.ends_with("zip=95128,US&appid=&mode=html"));
            assert_eq!((*expected, *actual), (200, 401));
        }
        other => panic!("unexpected failure: {other}"),
    }
}

#[tokio::test]
async fn zip_suite_passes_against_conforming_service() {
    let mut server = Server::new_async().await;

    let routes: Vec<(String, usize, &str)> = vec![
        (format!("^zip=95128&appid={API_KEY_INVALID}$"), 401, ""),
        ("^zip=0&appid=GOOD$".into(), 400, ""),
        ("^zip=10000,US&appid=GOOD$".into(), 404, ""),
        ("^zip=95128(,US)?&appid=GOOD$".into(), 200, SAN_JOSE_JSON),
        ("^zip=95128(,US)?&appid=GOOD&mode=xml$".into(), 200, SAN_JOSE_XML),
        ("^zip=95128(,US)?&appid=GOOD&mode=html$".into(), 200, SAN_JOSE_HTML),
        ("^zip=10000,FR&appid=GOOD$".into(), 200, TROYES_JSON),
        ("^zip=10000,FR&appid=GOOD&mode=xml$".into(), 200, TROYES_XML),
        ("^zip=10000,FR&appid=GOOD&mode=html$".into(), 200, TROYES_HTML),
    ];
    let mut mocks = Vec::new();
    for (query, status, body) in routes {
        let mock = server
            .mock("GET", PATH)
            .match_query(Matcher::Regex(query))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;
        mocks.push(mock);
    }

    let client = HttpServiceClient::new();
    let runner = Runner::new(&client, endpoint(&server), "GOOD".into());
    let report = runner.run(&catalog::suite(Suite::Zip)).await;

    let problems: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.verdict != conformance_core::Verdict::Passed)
        .collect();
    assert!(problems.is_empty(), "{problems:#?}");
    assert_eq!(report.passed(), 12);
}
