use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::core::config::SyncConfig;
use crate::core::error::{AppError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Summed statistics queries exposed by the BNPB Sumatra MapServer layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BnpbQuery {
    Infrastructure,
    Housing,
}

impl BnpbQuery {
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            BnpbQuery::Infrastructure => &[
                "pendidikan_rusak",
                "fasyankes_rusak",
                "rumah_ibadat_rusak",
                "jembatan_rusak",
            ],
            BnpbQuery::Housing => &[
                "rumah_rusak_berat",
                "rumah_rusak_sedang",
                "rumah_rusak_ringan",
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BnpbQuery::Infrastructure => "infrastructure",
            BnpbQuery::Housing => "housing",
        }
    }

    /// ArcGIS `outStatistics` parameter, one `sum` per field
    fn out_statistics(&self) -> String {
        let stats: Vec<_> = self
            .fields()
            .iter()
            .map(|field| {
                json!({
                    "onStatisticField": field,
                    "outStatisticFieldName": field,
                    "statisticType": "sum",
                })
            })
            .collect();
        serde_json::Value::Array(stats).to_string()
    }
}

/// Damaged public facilities, summed over all of Sumatra
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfrastructureDamage {
    #[serde(default)]
    pub pendidikan_rusak: Option<f64>,
    #[serde(default)]
    pub fasyankes_rusak: Option<f64>,
    #[serde(default)]
    pub rumah_ibadat_rusak: Option<f64>,
    #[serde(default)]
    pub jembatan_rusak: Option<f64>,
}

/// Damaged houses by severity, summed over all of Sumatra
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HousingDamage {
    #[serde(default)]
    pub rumah_rusak_berat: Option<f64>,
    #[serde(default)]
    pub rumah_rusak_sedang: Option<f64>,
    #[serde(default)]
    pub rumah_rusak_ringan: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<QueryFeature>,
}

#[derive(Debug, Deserialize)]
struct QueryFeature {
    attributes: serde_json::Value,
}

/// ArcGIS sums come back as floats or null; treat both as counts.
pub fn count(value: Option<f64>) -> i64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round() as i64)
        .unwrap_or(0)
}

/// Client for the BNPB ArcGIS REST endpoint
pub struct BnpbClient {
    client: reqwest::Client,
    base_url: String,
}

impl BnpbClient {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build BNPB client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn query_url(&self, query: BnpbQuery) -> String {
        format!(
            "{}/query?f=json&cacheHint=true&orderByFields=&outFields=*&outStatistics={}\
             &returnGeometry=false&spatialRel=esriSpatialRelIntersects&where=1%3D1",
            self.base_url,
            urlencoding::encode(&query.out_statistics())
        )
    }

    pub async fn fetch_infrastructure(&self) -> Option<InfrastructureDamage> {
        self.fetch_attributes(BnpbQuery::Infrastructure).await
    }

    pub async fn fetch_housing(&self) -> Option<HousingDamage> {
        self.fetch_attributes(BnpbQuery::Housing).await
    }

    /// First feature's attributes, or `None` when the request fails or the
    /// layer returns nothing. Failures are logged, not raised.
    async fn fetch_attributes<T: DeserializeOwned>(&self, query: BnpbQuery) -> Option<T> {
        tracing::info!("Fetching {} data from BNPB", query.label());

        let body = match self.get(&self.query_url(query)).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error fetching {} data from BNPB: {}", query.label(), e);
                return None;
            }
        };

        let attributes = first_attributes(body);
        if attributes.is_none() {
            tracing::warn!("No {} data found in BNPB response", query.label());
        }
        attributes
    }

    async fn get(&self, url: &str) -> std::result::Result<QueryResponse, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<QueryResponse>()
            .await
    }
}

fn first_attributes<T: DeserializeOwned>(response: QueryResponse) -> Option<T> {
    let feature = response.features.into_iter().next()?;
    match serde_json::from_value(feature.attributes) {
        Ok(attributes) => Some(attributes),
        Err(e) => {
            tracing::warn!("Unexpected BNPB attribute shape: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BnpbClient {
        let config = SyncConfig {
            enabled: true,
            hour_wib: 6,
            run_on_startup: false,
            request_timeout: Duration::from_secs(30),
            base_url: "https://gis.example.test/MapServer/17/".to_string(),
        };
        BnpbClient::new(&config).unwrap()
    }

    #[test]
    fn test_query_url_encodes_out_statistics() {
        let url = client().query_url(BnpbQuery::Housing);
        assert!(url.starts_with("https://gis.example.test/MapServer/17/query?f=json"));
        assert!(url.contains("outStatistics=%5B%7B%22onStatisticField%22%3A%22rumah_rusak_berat%22"));
        assert!(url.ends_with("where=1%3D1"));
    }

    #[test]
    fn test_first_attributes_reads_first_feature() {
        let response: QueryResponse = serde_json::from_value(json!({
            "features": [
                { "attributes": { "rumah_rusak_berat": 120.0, "rumah_rusak_sedang": null } },
                { "attributes": { "rumah_rusak_berat": 1.0 } }
            ]
        }))
        .unwrap();

        let housing: HousingDamage = first_attributes(response).unwrap();
        assert_eq!(housing.rumah_rusak_berat, Some(120.0));
        assert_eq!(housing.rumah_rusak_sedang, None);
        assert_eq!(housing.rumah_rusak_ringan, None);
    }

    #[test]
    fn test_first_attributes_empty_features() {
        let response: QueryResponse = serde_json::from_value(json!({ "features": [] })).unwrap();
        assert!(first_attributes::<InfrastructureDamage>(response).is_none());

        let response: QueryResponse =
            serde_json::from_value(json!({ "error": { "code": 400 } })).unwrap();
        assert!(first_attributes::<InfrastructureDamage>(response).is_none());
    }

    #[test]
    fn test_count_rounds_and_floors_at_zero() {
        assert_eq!(count(Some(12.6)), 13);
        assert_eq!(count(None), 0);
        assert_eq!(count(Some(-3.0)), 0);
        assert_eq!(count(Some(f64::NAN)), 0);
    }
}
