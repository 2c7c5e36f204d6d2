//! EIA v2 API integration for crude-oil datasets.
//!
//! Three endpoints feed the dashboard:
//!
//! - `international` — monthly production / consumption / stocks per country
//! - `petroleum/pri/spt` — daily Brent and WTI spot prices
//! - `crude-oil-imports` — monthly US import quantities by origin country
//!
//! Responses come back as JSON row objects; this module projects them onto
//! fixed column lists and hands them to the CSV writer as strings. All value
//! cleaning happens at ingest, not here.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::Dataset;
use crate::error::AppError;

const INTERNATIONAL_URL: &str = "https://api.eia.gov/v2/international/data/";
const SPOT_URL: &str = "https://api.eia.gov/v2/petroleum/pri/spt/data/";
const IMPORTS_URL: &str = "https://api.eia.gov/v2/crude-oil-imports/data/";

/// Max rows per call, per the API contract.
const PAGE_LENGTH: usize = 5000;

const SUPPLY_DEMAND_START: &str = "2020-01";
const SPOT_START: &str = "2015-01-01";

/// Daily spot series: Europe Brent and WTI Cushing.
const SPOT_SERIES: [&str; 2] = ["RBRTE", "RWTC"];

/// Countries and OPEC aggregates tracked by the supply/demand views.
pub const COUNTRY_IDS: [&str; 39] = [
    "AGO", "ARE", "BRA", "CAN", "CHN", "DEU", "FRA", "GBR", "IDN", "IND", "IRN", "IRQ", "ITA",
    "JPN", "KAZ", "KOR", "KWT", "MEX", "NGA", "NOR", "RUS", "SAU", "USA", "VEN", "GAB", "COG",
    "LBY", "DZA", "OMN", "AZE", "MYS", "BHR", "SSD", "SDN", "BRN", "OPNO", "OPEC", "OPSA", "OPAF",
];

/// Columns persisted for the international datasets.
pub const INTERNATIONAL_COLUMNS: [&str; 7] = [
    "period",
    "countryRegionId",
    "countryRegionName",
    "activityId",
    "activityName",
    "productName",
    "value",
];

/// Columns persisted for the spot-price dataset.
pub const SPOT_COLUMNS: [&str; 7] = [
    "period",
    "product",
    "product-name",
    "process-name",
    "series-description",
    "value",
    "units",
];

/// Columns persisted for the import-flow dataset.
pub const IMPORT_COLUMNS: [&str; 4] = ["period", "originId", "originName", "quantity"];

type JsonRow = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    response: ApiBody,
}

#[derive(Debug, Deserialize)]
struct ApiBody {
    #[serde(default)]
    data: Vec<JsonRow>,
}

pub struct EiaClient {
    client: Client,
    api_key: String,
}

impl EiaClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("EIA_API_KEY")
            .map_err(|_| AppError::new(2, "Missing EIA_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Fetch one supply/demand dataset for every tracked country.
    ///
    /// One paged request loop per country; the product mix stays unfiltered
    /// here and is narrowed to crude at ingest.
    pub fn fetch_supply_demand(&self, dataset: Dataset) -> Result<Vec<Vec<String>>, AppError> {
        let Some(activity_id) = dataset.activity_id() else {
            return Err(AppError::new(
                2,
                format!("{} is not an international dataset.", dataset.display_name()),
            ));
        };

        let mut rows = Vec::new();
        for country_id in COUNTRY_IDS {
            let params = [
                ("frequency", "monthly".to_string()),
                ("data[0]", "value".to_string()),
                ("sort[0][column]", "period".to_string()),
                ("sort[0][direction]", "desc".to_string()),
                ("facets[countryRegionId][0]", country_id.to_string()),
                ("facets[activityId][0]", activity_id.to_string()),
                ("start", SUPPLY_DEMAND_START.to_string()),
            ];
            rows.extend(self.fetch_paged(INTERNATIONAL_URL, &params)?);
        }
        Ok(project_rows(&rows, &INTERNATIONAL_COLUMNS))
    }

    /// Fetch daily Brent and WTI spot prices.
    pub fn fetch_spot_prices(&self) -> Result<Vec<Vec<String>>, AppError> {
        let params = [
            ("frequency", "daily".to_string()),
            ("data[0]", "value".to_string()),
            ("sort[0][column]", "period".to_string()),
            ("sort[0][direction]", "desc".to_string()),
            ("facets[series][0]", SPOT_SERIES[0].to_string()),
            ("facets[series][1]", SPOT_SERIES[1].to_string()),
            ("start", SPOT_START.to_string()),
        ];
        let rows = self.fetch_paged(SPOT_URL, &params)?;
        Ok(project_rows(&rows, &SPOT_COLUMNS))
    }

    /// Fetch monthly US crude imports by country of origin.
    ///
    /// Origin is restricted to countries and destination to the US total, so
    /// that per-origin sums are the national totals the flow views expect.
    pub fn fetch_imports(&self) -> Result<Vec<Vec<String>>, AppError> {
        let params = [
            ("frequency", "monthly".to_string()),
            ("data[0]", "quantity".to_string()),
            ("sort[0][column]", "period".to_string()),
            ("sort[0][direction]", "desc".to_string()),
            ("facets[originType][0]", "CTY".to_string()),
            ("facets[destinationType][0]", "US".to_string()),
            ("start", SUPPLY_DEMAND_START.to_string()),
        ];
        let rows = self.fetch_paged(IMPORTS_URL, &params)?;
        Ok(project_rows(&rows, &IMPORT_COLUMNS))
    }

    fn fetch_paged(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<JsonRow>, AppError> {
        let mut rows = Vec::new();
        let mut offset = 0usize;

        loop {
            let resp = self
                .client
                .get(url)
                .query(params)
                .query(&[
                    ("api_key", self.api_key.as_str()),
                    ("offset", &offset.to_string()),
                    ("length", &PAGE_LENGTH.to_string()),
                ])
                .send()
                .map_err(|e| AppError::new(4, format!("EIA request failed: {e}")))?;

            if !resp.status().is_success() {
                return Err(AppError::new(
                    4,
                    format!("EIA request failed with status {}.", resp.status()),
                ));
            }

            let body: ApiEnvelope = resp
                .json()
                .map_err(|e| AppError::new(4, format!("Failed to parse EIA response: {e}")))?;

            let page = body.response.data;
            let page_len = page.len();
            rows.extend(page);

            if page_len < PAGE_LENGTH {
                return Ok(rows);
            }
            offset += PAGE_LENGTH;
        }
    }
}

/// Project JSON rows onto a fixed column list, stringifying every field.
fn project_rows(rows: &[JsonRow], columns: &[&str]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| columns.iter().map(|col| field_string(row.get(*col))).collect())
        .collect()
}

fn field_string(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decodes_rows_and_tolerates_missing_data() {
        let json = r#"{
            "response": {
                "total": 2,
                "data": [
                    {"period": "2024-03", "countryRegionName": "Canada", "value": 4609.1},
                    {"period": "2024-02", "countryRegionName": "Canada", "value": "4712.0"}
                ]
            }
        }"#;
        let envelope: ApiEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.response.data.len(), 2);

        let empty: ApiEnvelope =
            serde_json::from_str(r#"{"response": {"total": 0}}"#).unwrap();
        assert!(empty.response.data.is_empty());
    }

    #[test]
    fn projection_stringifies_numbers_strings_and_nulls() {
        let json = r#"{
            "response": {
                "data": [
                    {"period": "2024-03", "value": 84.12, "units": "$/bbl", "productName": null}
                ]
            }
        }"#;
        let envelope: ApiEnvelope = serde_json::from_str(json).unwrap();
        let rows = project_rows(
            &envelope.response.data,
            &["period", "value", "units", "productName", "missing"],
        );
        assert_eq!(rows, vec![vec![
            "2024-03".to_string(),
            "84.12".to_string(),
            "$/bbl".to_string(),
            String::new(),
            String::new(),
        ]]);
    }
}
