//! RxNorm registry lookup: drug name to RxCUI, then RxCUI to properties.
//!
//! Every failure (transport, status, body shape) is reported as "not found";
//! callers cannot tell an outage from a genuine miss.

use anyhow::anyhow;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{info, warn};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxNormProperties {
    pub name: String,
    pub rxcui: String,
    pub tty: String,
}

impl RxNormProperties {
    pub fn to_markdown(&self) -> String {
        format!(
            "\n**RxNorm Info**\n- **Name**: {}\n- **RxCUI**: {}\n- **TTY**: {}\n",
            self.name, self.rxcui, self.tty
        )
    }
}

#[derive(Clone)]
pub struct RxNormClient {
    client: Client,
    base_url: String,
}

impl RxNormClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn info(&self, name: &str) -> String {
        match self.lookup(name).await {
            Some(properties) => properties.to_markdown(),
            None => format!("No RxNorm data found for {}.", name),
        }
    }

    pub async fn lookup(&self, name: &str) -> Option<RxNormProperties> {
        match self.try_lookup(name).await {
            Ok(found) => found,
            Err(e) => {
                warn!("RxNorm lookup for '{}' failed: {:#}", name, e);
                None
            }
        }
    }

    async fn try_lookup(&self, name: &str) -> anyhow::Result<Option<RxNormProperties>> {
        let search_url = format!(
            "{}/rxcui.json?name={}",
            self.base_url,
            urlencoding::encode(name)
        );
        let Some(id_group) = self.get_json(&search_url).await? else {
            return Ok(None);
        };

        let Some(rxcui) = first_rxnorm_id(&id_group) else {
            info!("RxNorm has no id for '{}'", name);
            return Ok(None);
        };

        let properties_url = format!(
            "{}/rxcui/{}/properties.json",
            self.base_url,
            urlencoding::encode(&rxcui)
        );
        let Some(body) = self.get_json(&properties_url).await? else {
            return Ok(None);
        };

        let properties = body
            .get("properties")
            .filter(|p| p.is_object())
            .ok_or_else(|| anyhow!("properties missing for rxcui {}", rxcui))?;

        Ok(Some(RxNormProperties {
            name: text_or_na(properties, "name"),
            rxcui: text_or_na(properties, "rxcui"),
            tty: text_or_na(properties, "tty"),
        }))
    }

    /// `Ok(None)` for any status other than 200.
    async fn get_json(&self, url: &str) -> anyhow::Result<Option<Value>> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            info!("RxNorm returned {} for {}", response.status(), url);
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }
}

fn first_rxnorm_id(body: &Value) -> Option<String> {
    match &body["idGroup"]["rxnormId"][0] {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn text_or_na(properties: &Value, key: &str) -> String {
    match &properties[key] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, ServerGuard};

    async fn mock_search(
        server: &mut ServerGuard,
        name: &str,
        status: usize,
        body: &str,
    ) -> mockito::Mock {
        server
            .mock("GET", "/rxcui.json")
            .match_query(Matcher::UrlEncoded("name".into(), name.into()))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    fn client(server: &ServerGuard) -> RxNormClient {
        RxNormClient::new(Client::new(), server.url())
    }

    #[tokio::test]
    async fn test_two_step_lookup() {
        let mut server = mockito::Server::new_async().await;
        let search = mock_search(
            &mut server,
            "Ibuprofen",
            200,
            r#"{"idGroup":{"name":"Ibuprofen","rxnormId":["5640"]}}"#,
        )
        .await;
        let props = server
            .mock("GET", "/rxcui/5640/properties.json")
            .with_status(200)
            .with_body(r#"{"properties":{"rxcui":"5640","name":"ibuprofen","tty":"IN"}}"#)
            .create_async()
            .await;

        let info = client(&server).info("Ibuprofen").await;

        search.assert_async().await;
        props.assert_async().await;
        assert!(info.contains("**RxNorm Info**"));
        assert!(info.contains("- **Name**: ibuprofen"));
        assert!(info.contains("- **RxCUI**: 5640"));
        assert!(info.contains("- **TTY**: IN"));
    }

    #[tokio::test]
    async fn test_missing_property_fields_are_not_available() {
        let mut server = mockito::Server::new_async().await;
        let _search = mock_search(
            &mut server,
            "Aspirin",
            200,
            r#"{"idGroup":{"rxnormId":["1191"]}}"#,
        )
        .await;
        let _props = server
            .mock("GET", "/rxcui/1191/properties.json")
            .with_status(200)
            .with_body(r#"{"properties":{"rxcui":"1191"}}"#)
            .create_async()
            .await;

        let found = client(&server).lookup("Aspirin").await.unwrap();
        assert_eq!(
            found,
            RxNormProperties {
                name: "N/A".to_string(),
                rxcui: "1191".to_string(),
                tty: "N/A".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_no_id_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _search = mock_search(&mut server, "Zzzz", 200, r#"{"idGroup":{"name":"Zzzz"}}"#).await;
        let props = server
            .mock("GET", Matcher::Regex(r"^/rxcui/.*/properties\.json$".to_string()))
            .expect(0)
            .create_async()
            .await;

        assert_eq!(client(&server).info("Zzzz").await, "No RxNorm data found for Zzzz.");
        props.assert_async().await;
    }

    #[tokio::test]
    async fn test_failures_look_like_a_miss() {
        let mut server = mockito::Server::new_async().await;
        let _search = mock_search(&mut server, "Down", 503, "Service Unavailable").await;
        assert_eq!(client(&server).info("Down").await, "No RxNorm data found for Down.");

        let _bad = mock_search(&mut server, "Garbled", 200, "<html>not json</html>").await;
        assert_eq!(
            client(&server).info("Garbled").await,
            "No RxNorm data found for Garbled."
        );

        let _search = mock_search(&mut server, "Half", 200, r#"{"idGroup":{"rxnormId":["42"]}}"#).await;
        let _props = server
            .mock("GET", "/rxcui/42/properties.json")
            .with_status(404)
            .create_async()
            .await;
        assert_eq!(client(&server).info("Half").await, "No RxNorm data found for Half.");
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_not_found() {
        let client = RxNormClient::new(Client::new(), "http://127.0.0.1:1");
        assert_eq!(client.info("Paracetamol").await, "No RxNorm data found for Paracetamol.");
    }

    #[tokio::test]
    async fn test_name_is_url_encoded() {
        let mut server = mockito::Server::new_async().await;
        let search = mock_search(&mut server, "co-amoxiclav & co", 200, r#"{"idGroup":{}}"#).await;

        client(&server).info("co-amoxiclav & co").await;
        search.assert_async().await;
    }
}
