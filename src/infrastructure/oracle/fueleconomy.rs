use super::ClassificationOracle;
use crate::domain::error::{AppError, Result};
use crate::domain::vehicle::{VehicleCategory, VehicleQuery};
use crate::infrastructure::config::OracleConfig;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;

const MENU_OPTIONS_PATH: &str = "ws/rest/vehicle/menu/options";

/// `menuItem` is a list, except when the service has exactly one entry and
/// sends the bare object instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Debug, Deserialize)]
struct MenuItem {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct MenuOptionsResponse {
    #[serde(rename = "menuItem")]
    menu_item: Option<OneOrMany<MenuItem>>,
}

/// Client for the fueleconomy.gov vehicle menu endpoint.
pub struct FuelEconomyClient {
    client: reqwest::Client,
    endpoint: String,
}

impl FuelEconomyClient {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.as_str();
        let endpoint = if base_url.ends_with('/') {
            format!("{}{}", base_url, MENU_OPTIONS_PATH)
        } else {
            format!("{}/{}", base_url, MENU_OPTIONS_PATH)
        };

        Ok(Self { client, endpoint })
    }

    /// Fetch the option descriptions listed for a year/make/model.
    pub async fn menu_options(&self, query: &VehicleQuery) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .query(&[
                ("year", query.year.to_string()),
                ("make", query.make.clone()),
                ("model", query.model.clone()),
            ])
            .send()
            .await
            .map_err(|e| AppError::OracleError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::OracleError(format!(
                "API error ({}) for {}",
                response.status(),
                query
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::OracleError(format!("Failed to read response: {}", e)))?;

        if body.trim().is_empty() {
            return Err(AppError::OracleError(format!("Empty response for {}", query)));
        }

        let parsed: Option<MenuOptionsResponse> = serde_json::from_str(&body)
            .map_err(|e| AppError::OracleError(format!("Failed to parse JSON: {}", e)))?;

        let items = match parsed.and_then(|r| r.menu_item) {
            Some(OneOrMany::One(item)) => vec![item],
            Some(OneOrMany::Many(items)) => items,
            None => {
                return Err(AppError::OracleError(format!(
                    "Invalid response format: missing menuItem for {}",
                    query
                )))
            }
        };

        Ok(items.into_iter().map(|item| item.text).collect())
    }
}

#[async_trait]
impl ClassificationOracle for FuelEconomyClient {
    async fn classify(&self, query: &VehicleQuery) -> Result<VehicleCategory> {
        let options = self.menu_options(query).await?;
        VehicleCategory::from_options(&options)
            .ok_or_else(|| AppError::OracleError(format!("No options listed for {}", query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(base_url: &str) -> FuelEconomyClient {
        let config = OracleConfig {
            base_url: Url::parse(base_url).unwrap(),
            timeout_secs: 5,
            ..Default::default()
        };
        FuelEconomyClient::new(&config).unwrap()
    }

    fn rav4() -> VehicleQuery {
        VehicleQuery {
            year: 2020,
            make: "Toyota".to_string(),
            model: "RAV4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_classifies_suv_from_option_list() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ws/rest/vehicle/menu/options"))
            .and(query_param("year", "2020"))
            .and(query_param("make", "Toyota"))
            .and(query_param("model", "RAV4"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "menuItem": [
                    {"text": "Auto (S8), 4 cyl, 2.5 L", "value": "41185"},
                    {"text": "2020 Toyota RAV4 SUV", "value": "41186"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        assert_eq!(client.classify(&rav4()).await.unwrap(), VehicleCategory::Suv);
    }

    #[tokio::test]
    async fn test_single_object_menu_item() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ws/rest/vehicle/menu/options"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "menuItem": {"text": "Auto 4-spd, 6 cyl, 4.0 L, Pickup", "value": "1"}
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        assert_eq!(
            client.classify(&rav4()).await.unwrap(),
            VehicleCategory::PickUp
        );
    }

    #[tokio::test]
    async fn test_options_without_keywords_default_to_sedan() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ws/rest/vehicle/menu/options"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "menuItem": [{"text": "Auto (S6), 4 cyl, 1.8 L", "value": "9"}]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        assert_eq!(
            client.classify(&rav4()).await.unwrap(),
            VehicleCategory::Sedan
        );
    }

    #[tokio::test]
    async fn test_empty_option_list_is_unclassified() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ws/rest/vehicle/menu/options"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "menuItem": [] })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let result = client.classify(&rav4()).await;
        assert!(matches!(result, Err(AppError::OracleError(_))));
    }

    #[tokio::test]
    async fn test_failures_are_oracle_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ws/rest/vehicle/menu/options"))
            .and(query_param("year", "1990"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ws/rest/vehicle/menu/options"))
            .and(query_param("year", "1991"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ws/rest/vehicle/menu/options"))
            .and(query_param("year", "1992"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ws/rest/vehicle/menu/options"))
            .and(query_param("year", "1993"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        for year in 1990..=1993 {
            let query = VehicleQuery { year, ..rav4() };
            let result = client.classify(&query).await;
            assert!(
                matches!(result, Err(AppError::OracleError(_))),
                "year {} should fail, got {:?}",
                year,
                result
            );
        }
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Nothing listens on port 9 locally
        let client = create_test_client("http://127.0.0.1:9");
        let result = client.classify(&rav4()).await;
        assert!(matches!(result, Err(AppError::OracleError(_))));
    }
}
