use crate::facet::FacetRequest;
use crate::params::FilterKey;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Filter parameters of a variant query, in request order.
///
/// Values are kept as the raw strings the filter grammars parse. Empty
/// values are dropped on insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    entries: Vec<(String, String)>,
}

impl FilterRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        if value.trim().is_empty() {
            self.entries.retain(|(k, _)| *k != key);
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.get_raw(key.as_str())
    }

    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: FilterKey) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut request = FilterRequest::new();
        for (k, v) in iter {
            request.insert(k, v);
        }
        request
    }
}

/// Flattens a JSON scalar or array of scalars into a filter value.
fn json_to_filter_value(key: &str, value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                if let Some(part) = json_to_filter_value(key, item)? {
                    if !part.is_empty() {
                        parts.push(part);
                    }
                }
            }
            Ok(Some(parts.join(",")))
        }
        Value::Object(_) => Err(format!("filter '{}' must be a string, number or list", key)),
    }
}

impl<'de> Deserialize<'de> for FilterRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FilterRequestVisitor;

        impl<'de> Visitor<'de> for FilterRequestVisitor {
            type Value = FilterRequest;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of filter names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FilterRequest, A::Error> {
                let mut request = FilterRequest::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    if let Some(value) = json_to_filter_value(&key, value).map_err(de::Error::custom)? {
                        request.insert(key, value);
                    }
                }
                Ok(request)
            }
        }

        deserializer.deserialize_map(FilterRequestVisitor)
    }
}

impl Serialize for FilterRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ascending", alias = "asc", alias = "ASC", alias = "ASCENDING")]
    Ascending,
    #[serde(rename = "descending", alias = "desc", alias = "DESC", alias = "DESCENDING")]
    Descending,
}

impl SortOrder {
    pub fn as_solr(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Projection, paging, sorting and faceting options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOptions {
    /// Logical fields to return. Mutually exclusive with `exclude`.
    #[serde(deserialize_with = "field_list", skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(deserialize_with = "field_list", skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub facet: Option<String>,
    pub skip_count: bool,
    pub lazy: bool,
    pub include_genotype: bool,
}

impl QueryOptions {
    pub fn facet(&self) -> Option<&str> {
        self.facet.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }
}

/// Accepts `["a", "b"]` or `"a,b"`.
fn field_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FieldList {
        List(Vec<String>),
        Csv(String),
    }

    let list = match Option::<FieldList>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(FieldList::List(list)) => list,
        Some(FieldList::Csv(csv)) => csv.split(',').map(str::to_string).collect(),
    };
    let list: Vec<String> = list
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    Ok(Some(list))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

/// A compiled search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: String,
    pub filter_queries: Vec<String>,
    pub fields: Vec<String>,
    pub rows: usize,
    pub start: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<FacetRequest>,
}

impl SearchQuery {
    /// Solr request parameters: `q`, one `fq` per filter, `fl`, `rows`,
    /// `start`, `sort` and `json.facet`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("q".to_string(), self.q.clone())];
        params.extend(
            self.filter_queries
                .iter()
                .map(|fq| ("fq".to_string(), fq.clone())),
        );
        if !self.fields.is_empty() {
            params.push(("fl".to_string(), self.fields.join(",")));
        }
        params.push(("rows".to_string(), self.rows.to_string()));
        params.push(("start".to_string(), self.start.to_string()));
        if let Some(sort) = &self.sort {
            params.push((
                "sort".to_string(),
                format!("{} {}", sort.field, sort.order.as_solr()),
            ));
        }
        if let Some(facet) = &self.facet {
            params.push(("json.facet".to_string(), facet.json.to_string()));
        }
        params
    }
}

/// Request body of `POST /variants/query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantQueryBody {
    #[serde(default)]
    pub query: FilterRequest,
    #[serde(default)]
    pub options: QueryOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantQueryResponse {
    pub search_query: SearchQuery,
    /// Solr request parameters as `[name, value]` pairs.
    pub params: Vec<(String, String)>,
}

/// GA4GH service-info document.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub r#type: ServiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organization: Organization,
    pub version: String,
    pub variantq: QueryCapabilities,
}

#[derive(Debug, Serialize)]
pub struct ServiceType {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct Organization {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCapabilities {
    pub filters: Vec<&'static str>,
    pub facets: Vec<&'static str>,
    pub default_limit: usize,
    pub max_limit: usize,
}
