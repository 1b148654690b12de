use rateio::core::UnitType;
use rateio::core::rateio::{CalculatorState, UnresolvedReason};
use std::fs;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const FRACTIONS_JSON: &str = r#"[
        {"id": 1, "location": "08", "type": "APTO", "fraction": 0.015},
        {"id": 2, "location": "01", "type": "LOJA", "fraction": "0.0333"}
    ]"#;

    pub async fn create_fractions_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/fractions"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &Path, base_url: &str) -> PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
api:
  base_url: {}
  timeout_ms: 2000
calculator:
  recalculation: reactive
  default_type: APTO
data_path: {}
"#,
            base_url,
            dir.join("data").display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

#[test_log::test(tokio::test)]
async fn test_calc_flow_with_mock() {
    let mock_server =
        test_utils::create_fractions_mock_server(200, test_utils::FRACTIONS_JSON).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let state = rateio::run_calc(
        None,
        "8".to_string(),
        "1.000,00".to_string(),
        Some(config_path.to_str().unwrap()),
    )
    .await
    .expect("Calc failed");

    match state {
        CalculatorState::Resolved(result) => {
            assert_eq!(result.unit_type, UnitType::Apartment);
            assert_eq!(result.location, "08");
            assert_eq!(result.formatted(), "15,00");
        }
        other => panic!("Expected a resolved calculation, got {other:?}"),
    }

    // The command form prints the same outcome
    let result = rateio::run_command(
        rateio::AppCommand::Calc {
            unit_type: None,
            location: "8".to_string(),
            total_amount: "1.000,00".to_string(),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Calc command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_calc_survives_unavailable_api() {
    let mock_server = test_utils::create_fractions_mock_server(503, "").await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    // A missing table is reported as "no match", never as a failure
    let state = rateio::run_calc(
        Some(UnitType::Store),
        "01".to_string(),
        "500".to_string(),
        Some(config_path.to_str().unwrap()),
    )
    .await
    .expect("Calc failed");

    assert_eq!(
        state,
        CalculatorState::Unresolved {
            unit_type: UnitType::Store,
            location: "01".to_string(),
            reason: UnresolvedReason::UnknownUnit,
        }
    );
}

#[test_log::test(tokio::test)]
async fn test_table_lookup_through_api_client() {
    use rateio::core::config::ApiConfig;
    use rateio::core::fraction::load_table;
    use rateio::core::rateio::{CalculationInput, calculate};
    use rateio::core::session::Session;
    use rateio::providers::ApiClient;
    use rateio::store::memory::MemoryCollection;
    use std::sync::Arc;

    let mock_server =
        test_utils::create_fractions_mock_server(200, test_utils::FRACTIONS_JSON).await;
    let config = ApiConfig {
        base_url: mock_server.uri(),
        timeout_ms: 2000,
    };
    let session = Session::new(Arc::new(MemoryCollection::new()));
    let client = ApiClient::new(&config, session).expect("Failed to build client");

    let table = load_table(&client).await;
    info!(count = table.len(), "Loaded table from mock server");

    let state = calculate(
        &table,
        &CalculationInput::new(UnitType::Apartment, "8", "1.000,00"),
    );
    assert_eq!(state.result().unwrap().formatted(), "15,00");

    let state = calculate(
        &table,
        &CalculationInput::new(UnitType::Apartment, "09", "1.000,00"),
    );
    assert!(state.result().is_none());
}

#[test_log::test(tokio::test)]
async fn test_login_then_create_fraction_persists_session() {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    let mock_server = wiremock::MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": {"id": 1, "name": "Síndico", "email": "sindico@example.com"},
            "token": "tok-abc"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/fraction/create"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    rateio::run_command(
        rateio::AppCommand::Login {
            email: "sindico@example.com".to_string(),
            password: "secret".to_string(),
        },
        Some(config_path),
    )
    .await
    .expect("Login failed");

    // A second invocation reads the token back from the data directory
    let result = rateio::run_command(
        rateio::AppCommand::Fractions(rateio::FractionCommand::Create {
            location: "12".to_string(),
            unit_type: "LOJA".to_string(),
            fraction: "0,02".to_string(),
        }),
        Some(config_path),
    )
    .await;
    assert!(result.is_ok(), "Create failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_invalid_fraction_form_is_rejected_before_request() {
    let mock_server = wiremock::MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let result = rateio::run_command(
        rateio::AppCommand::Fractions(rateio::FractionCommand::Create {
            location: "".to_string(),
            unit_type: "CASA".to_string(),
            fraction: "2".to_string(),
        }),
        Some(config_path.to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("Invalid form should fail");
    assert!(err.to_string().contains("Invalid fraction"));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[test]
fn test_missing_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("nope.yaml");
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let result = runtime.block_on(rateio::run_command(
        rateio::AppCommand::Whoami,
        Some(missing.to_str().unwrap()),
    ));
    assert!(result.is_err());
    assert!(!fs::exists(&missing).unwrap());
}
