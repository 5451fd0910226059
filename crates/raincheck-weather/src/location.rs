//! Place name to provider location id: static table first, remote lookup second.

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{FetchError, ResolveError};
use crate::fetcher::Fetcher;
use crate::types::{CityLookupResponse, LocationId};

const LOOKUP_PATH: &str = "/geo/v2/city/lookup";

/// Well-known cities, matched exactly. Chinese and English names map to the same id.
static KNOWN_LOCATIONS: &[(&str, &str)] = &[
    ("北京", "101010100"),
    ("上海", "101020100"),
    ("广州", "101280101"),
    ("深圳", "101280601"),
    ("杭州", "101210101"),
    ("南京", "101190101"),
    ("武汉", "101200101"),
    ("成都", "101270101"),
    ("重庆", "101040100"),
    ("西安", "101110101"),
    ("天津", "101030100"),
    ("苏州", "101190401"),
    ("长沙", "101250101"),
    ("郑州", "101180101"),
    ("济南", "101120101"),
    ("长春", "101060101"),
    ("哈尔滨", "101050101"),
    ("沈阳", "101070101"),
    ("大连", "101070201"),
    ("青岛", "101120201"),
    ("昆明", "101290101"),
    ("南宁", "101300101"),
    ("贵阳", "101260101"),
    ("太原", "101100101"),
    ("合肥", "101220101"),
    ("南昌", "101240101"),
    ("福州", "101230101"),
    ("厦门", "101230201"),
    ("石家庄", "101090101"),
    ("呼和浩特", "101080101"),
    ("银川", "101170101"),
    ("西宁", "101150101"),
    ("拉萨", "101140101"),
    ("乌鲁木齐", "101130101"),
    ("兰州", "101160101"),
    ("海口", "101310101"),
    ("三亚", "101310201"),
    ("台北", "101340101"),
    ("香港", "101320101"),
    ("澳门", "101330101"),
    ("Beijing", "101010100"),
    ("Shanghai", "101020100"),
    ("Guangzhou", "101280101"),
    ("Shenzhen", "101280601"),
    ("Hangzhou", "101210101"),
    ("Nanjing", "101190101"),
    ("Wuhan", "101200101"),
    ("Chengdu", "101270101"),
    ("Chongqing", "101040100"),
    ("Xi'an", "101110101"),
    ("Tianjin", "101030100"),
    ("Hong Kong", "101320101"),
    ("Macau", "101330101"),
    ("Taipei", "101340101"),
];

/// Look `name` up in the static table. Exact match only.
pub fn lookup_known(name: &str) -> Option<LocationId> {
    KNOWN_LOCATIONS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, id)| LocationId((*id).to_string()))
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    fetcher: Fetcher,
    base_url: String,
    api_key: String,
    lang: String,
}

impl LocationResolver {
    pub fn new(fetcher: Fetcher, base_url: &str, api_key: &str, lang: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            lang: lang.to_string(),
        }
    }

    /// Resolve `name` to a provider id. Remote results are not memoized.
    pub async fn resolve(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<LocationId, ResolveError> {
        if let Some(id) = lookup_known(name) {
            tracing::info!("Found {} in the static table: {}", name, id);
            return Ok(id);
        }

        tracing::info!("{} is not in the static table, asking the provider", name);

        let url = self.lookup_url(name).map_err(|source| ResolveError::Lookup {
            name: name.to_string(),
            source,
        })?;

        let response: CityLookupResponse = match self.fetcher.fetch(&url, cancel).await {
            Ok(response) => response,
            Err(FetchError::ProviderCode { code, message, .. }) => {
                return Err(ResolveError::Provider {
                    name: name.to_string(),
                    code,
                    info: message.unwrap_or_default(),
                });
            }
            Err(source) => {
                return Err(ResolveError::Lookup {
                    name: name.to_string(),
                    source,
                });
            }
        };

        let candidate = response
            .location
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NotFound {
                name: name.to_string(),
            })?;

        tracing::info!(
            "Resolved {} to {} ({}, {})",
            name,
            candidate.id,
            candidate.adm1,
            candidate.country
        );
        Ok(LocationId(candidate.id))
    }

    fn lookup_url(&self, name: &str) -> Result<Url, FetchError> {
        let mut params = vec![("location", name), ("key", self.api_key.as_str())];
        if !self.lang.is_empty() {
            params.push(("lang", self.lang.as_str()));
        }

        Url::parse_with_params(&format!("{}{}", self.base_url, LOOKUP_PATH), &params).map_err(|e| {
            FetchError::Request {
                endpoint: LOOKUP_PATH.to_string(),
                source: raincheck_core::NetworkError::InvalidRequest(e.to_string()),
            }
        })
    }
}
