use bikeshare_dashboard::config::Config;
use bikeshare_dashboard::error::AppError;
use bikeshare_dashboard::fetcher::{DataSource, Fetcher};
use bikeshare_dashboard::filter::DateRange;
use bikeshare_dashboard::parser::Parser;
use bikeshare_dashboard::session::{DashboardSession, SessionState};
use chrono::NaiveDate;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RIDES_CSV: &str = "\
instant,dteday,season,hr,temp,casual,registered,cnt
1,2011-01-01,1,0,0.24,3,13,16
2,2011-01-01,1,1,0.22,8,32,40
3,2011-01-02,1,0,0.46,5,27,32
4,2011-03-21,2,0,0.32,1,1,2
";

const TEMPERATURE_CSV: &str = "\
dteday,season,temp,casual,registered,cnt
2011-01-01,1,14.1,331,654,985
2011-01-02,1,24.9,131,670,801
2011-03-21,2,31.0,10,20,30
";

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn fetcher() -> Fetcher {
    Fetcher::new(Duration::from_secs(5)).expect("Failed to create fetcher")
}

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write temp file");
    file
}

/// Remote dataset is downloaded and parsed
#[tokio::test]
async fn test_fetch_remote_dataset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/hour.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RIDES_CSV))
        .mount(&mock_server)
        .await;

    let source = DataSource::parse(&format!("{}/data/hour.csv", mock_server.uri())).unwrap();
    let content = fetcher().fetch(&source).await.expect("Fetch failed");

    let (table, summary) = Parser::parse_table(&content).expect("Parse failed");
    assert_eq!(table.len(), 4);
    assert_eq!(summary.date_span, Some((date("2011-01-01"), date("2011-03-21"))));
}

/// A non-success status is a load error, not an empty dataset
#[tokio::test]
async fn test_fetch_remote_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.csv"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = DataSource::parse(&format!("{}/missing.csv", mock_server.uri())).unwrap();
    let err = fetcher().fetch(&source).await.unwrap_err();

    assert!(err.is_load_error());
    match err {
        AppError::Load(msg) => assert!(msg.contains("404"), "{}", msg),
        e => panic!("Expected Load error, got: {:?}", e),
    }
}

/// Missing local file is a load error
#[tokio::test]
async fn test_fetch_missing_local_file() {
    let source = DataSource::parse("/nonexistent/bikeshare/hour.csv").unwrap();
    let err = fetcher().fetch(&source).await.unwrap_err();
    assert!(matches!(err, AppError::Load(_)));
}

/// Session loads both datasets from config and keeps them apart
#[tokio::test]
async fn test_session_load_from_config() {
    let rides = csv_file(RIDES_CSV);
    let temperature = csv_file(TEMPERATURE_CSV);

    let yaml = format!(
        "datasets:\n  rides: '{}'\n  temperature: '{}'\n",
        rides.path().display(),
        temperature.path().display()
    );
    let config = Config::from_yaml_str(&yaml).expect("Config failed");

    let mut session = DashboardSession::load(&config).await.expect("Load failed");
    assert_eq!(session.state(), SessionState::Idle);

    // Metrics come from the unfiltered ride table only
    let metrics = session.metrics();
    assert_eq!(metrics.total_casual, 17);
    assert_eq!(metrics.total_registered, 73);
    assert_eq!(metrics.total_count, 90);

    let range = DateRange::new(date("2011-01-01"), date("2011-01-31")).unwrap();
    let snapshot = session.confirm(range).expect("Recompute failed");

    assert_eq!(snapshot.views.daily_totals.len(), 2);
    assert_eq!(snapshot.views.daily_totals[0].total_count, 56);

    // Buckets use the temperature table: 14.1 cool, 24.9 warm
    let totals = snapshot.views.temperature_buckets.map(|b| b.total_count);
    assert_eq!(totals, [0, 985, 801, 0]);
}

/// Initial filter from config starts the session filtered
#[tokio::test]
async fn test_session_initial_filter() {
    let rides = csv_file(RIDES_CSV);
    let yaml = format!(
        "datasets:\n  rides: '{}'\nfilter:\n  start: 2011-03-01\n  end: 2011-03-31\n",
        rides.path().display()
    );
    let config = Config::from_yaml_str(&yaml).expect("Config failed");

    let session = DashboardSession::load(&config).await.expect("Load failed");
    let snapshot = session.snapshot().expect("Recompute failed");

    assert!(matches!(snapshot.state, SessionState::Filtered(_)));
    assert_eq!(snapshot.views.daily_totals.len(), 1);
    assert_eq!(snapshot.views.seasonal_users[0].season, "Summer");
}

/// Malformed dataset aborts the load
#[tokio::test]
async fn test_session_load_rejects_bad_date() {
    let rides = csv_file("dteday,season,temp,casual,registered,cnt\n01/01/2011,1,5,1,1,2\n");
    let yaml = format!("datasets:\n  rides: '{}'\n", rides.path().display());
    let config = Config::from_yaml_str(&yaml).expect("Config failed");

    let result = DashboardSession::load(&config).await;
    assert!(matches!(result, Err(AppError::Parse(_))));
}
