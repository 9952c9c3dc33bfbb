//! Builder for the hosted table API (PostgREST-style endpoints).
//!
//! A [`Query`] describes one table operation and turns into an
//! [`ehttp::Request`]; [`rows`]/[`row`] decode the `{data, error}` side of
//! the exchange into `Result` values so callers always branch on the error
//! before touching data.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::MarketConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Select,
    Insert,
    Update,
    Delete,
}

impl Verb {
    fn method(self) -> &'static str {
        match self {
            Self::Select => "GET",
            Self::Insert => "POST",
            Self::Update => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One operation against a single table.
#[derive(Debug, Clone)]
pub struct Query {
    table: String,
    verb: Verb,
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
    single: bool,
    body: Option<Value>,
}

impl Query {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_owned(),
            verb: Verb::Select,
            columns: None,
            filters: Vec::new(),
            order: None,
            limit: None,
            single: false,
            body: None,
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.verb = Verb::Select;
        self.columns = Some(columns.to_owned());
        self
    }

    pub fn insert(mut self, record: Value) -> Self {
        self.verb = Verb::Insert;
        self.body = Some(record);
        self
    }

    pub fn update(mut self, changes: Value) -> Self {
        self.verb = Verb::Update;
        self.body = Some(changes);
        self
    }

    pub fn delete(mut self) -> Self {
        self.verb = Verb::Delete;
        self
    }

    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filters.push((column.to_owned(), value.to_string()));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_owned(), direction));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Expect exactly one row; a miss decodes to [`QueryError::NotFound`].
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Builds the request; `access_token` falls back to the anon key.
    pub fn build(&self, config: &MarketConfig, access_token: Option<&str>) -> ehttp::Request {
        let mut url = format!("{}/{}", config.rest_url(), self.table);
        let mut params: Vec<String> = Vec::new();
        if let Some(columns) = &self.columns {
            params.push(format!("select={columns}"));
        }
        for (column, value) in &self.filters {
            params.push(format!("{column}=eq.{}", urlencoding::encode(value)));
        }
        if let Some((column, direction)) = &self.order {
            params.push(format!("order={column}.{}", direction.as_str()));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={limit}"));
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        let body = self
            .body
            .as_ref()
            .map(|value| value.to_string().into_bytes())
            .unwrap_or_default();
        let mut request = ehttp::Request::post(url, body);
        request.method = self.verb.method().to_owned();

        let token = access_token.unwrap_or(&config.anon_key);
        request.headers.insert("apikey", &config.anon_key);
        request.headers.insert("Authorization", format!("Bearer {token}"));
        if self.body.is_some() {
            set_header(&mut request.headers, "Content-Type", "application/json");
        }
        if matches!(self.verb, Verb::Insert | Verb::Update) {
            // Have mutations echo the stored row back, like `.select()` does.
            request.headers.insert("Prefer", "return=representation");
        }
        if self.single {
            set_header(
                &mut request.headers,
                "Accept",
                "application/vnd.pgrst.object+json",
            );
        }
        request
    }
}

/// Replaces a header outright. `ehttp::Request::post` pre-populates `Accept`
/// and `Content-Type`, and `Headers::insert` appends instead of replacing, so
/// a plain insert would send the request with two conflicting values.
pub(crate) fn set_header(headers: &mut ehttp::Headers, key: &str, value: &str) {
    headers
        .headers
        .retain(|(name, _)| !name.eq_ignore_ascii_case(key));
    headers.insert(key, value);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("network error: {0}")]
    Network(String),
    #[error("row not found")]
    NotFound,
    #[error("service returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(String),
}

fn error_for(response: &ehttp::Response) -> QueryError {
    if response.status == 404 || response.status == 406 {
        return QueryError::NotFound;
    }
    let message = serde_json::from_slice::<Value>(&response.bytes)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("msg"))
                .or_else(|| value.get("error_description"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(&response.bytes).into_owned());
    QueryError::Status {
        status: response.status,
        message,
    }
}

/// Decodes a many-rows response.
pub fn rows<T: DeserializeOwned>(
    result: ehttp::Result<ehttp::Response>,
) -> Result<Vec<T>, QueryError> {
    let response = result.map_err(QueryError::Network)?;
    if !response.ok {
        return Err(error_for(&response));
    }
    serde_json::from_slice(&response.bytes).map_err(|err| QueryError::Decode(err.to_string()))
}

/// Decodes a `.single()` response.
pub fn row<T: DeserializeOwned>(result: ehttp::Result<ehttp::Response>) -> Result<T, QueryError> {
    let response = result.map_err(QueryError::Network)?;
    if !response.ok {
        return Err(error_for(&response));
    }
    serde_json::from_slice(&response.bytes).map_err(|err| QueryError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::json_response;
    use crate::models::Role;

    fn config() -> MarketConfig {
        MarketConfig::new("https://api.agrilink.example".to_owned(), "anon".to_owned())
    }

    #[test]
    fn select_builds_filtered_ordered_url() {
        let request = Query::from("products")
            .select("*")
            .eq("is_approved", "true")
            .order("created_at", Direction::Descending)
            .limit(10)
            .build(&config(), None);
        assert_eq!(request.method, "GET");
        assert_eq!(
            request.url,
            "https://api.agrilink.example/rest/v1/products?select=*&is_approved=eq.true&order=created_at.desc&limit=10"
        );
        assert_eq!(request.headers.get("apikey"), Some("anon"));
        assert_eq!(request.headers.get("authorization"), Some("Bearer anon"));
    }

    #[test]
    fn bearer_prefers_access_token() {
        let request = Query::from("users").select("*").build(&config(), Some("jwt"));
        assert_eq!(request.headers.get("authorization"), Some("Bearer jwt"));
        assert_eq!(request.headers.get("apikey"), Some("anon"));
    }

    #[test]
    fn single_requests_one_object() {
        let request = Query::from("users")
            .select("*")
            .eq("id", "u-1")
            .single()
            .build(&config(), None);
        assert_eq!(
            request.headers.get("accept"),
            Some("application/vnd.pgrst.object+json")
        );
    }

    fn header_values<'a>(request: &'a ehttp::Request, key: &str) -> Vec<&'a str> {
        request
            .headers
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    #[test]
    fn single_replaces_the_preset_accept_header() {
        let request = Query::from("users")
            .select("*")
            .eq("id", "u-1")
            .single()
            .build(&config(), None);
        assert_eq!(
            header_values(&request, "accept"),
            ["application/vnd.pgrst.object+json"]
        );
    }

    #[test]
    fn mutation_replaces_the_preset_content_type() {
        let request = Query::from("users")
            .update(serde_json::json!({"country": "Kenya"}))
            .eq("id", "u-1")
            .build(&config(), None);
        assert_eq!(header_values(&request, "content-type"), ["application/json"]);
    }

    #[test]
    fn update_is_a_patch_with_representation() {
        let request = Query::from("products")
            .update(serde_json::json!({"is_approved": true}))
            .eq("id", "p-1")
            .build(&config(), None);
        assert_eq!(request.method, "PATCH");
        assert_eq!(request.headers.get("prefer"), Some("return=representation"));
        assert_eq!(
            String::from_utf8(request.body).unwrap(),
            "{\"is_approved\":true}"
        );
    }

    #[test]
    fn delete_has_no_body() {
        let request = Query::from("users").delete().eq("id", "u-1").build(&config(), None);
        assert_eq!(request.method, "DELETE");
        assert!(request.body.is_empty());
        assert_eq!(
            request.url,
            "https://api.agrilink.example/rest/v1/users?id=eq.u-1"
        );
    }

    #[test]
    fn filter_values_are_percent_encoded() {
        let request = Query::from("products")
            .select("*")
            .eq("country", "Saudi Arabia")
            .build(&config(), None);
        assert!(request.url.ends_with("country=eq.Saudi%20Arabia"));
    }

    #[test]
    fn rows_decodes_success() {
        let result = rows::<serde_json::Value>(json_response(200, r#"[{"a":1},{"a":2}]"#));
        assert_eq!(result.unwrap().len(), 2);
    }

    #[test]
    fn row_miss_maps_to_not_found() {
        let result = row::<Role>(json_response(406, r#"{"message":"no rows"}"#));
        assert_eq!(result.unwrap_err(), QueryError::NotFound);
    }

    #[test]
    fn status_error_extracts_message() {
        let result = rows::<serde_json::Value>(json_response(500, r#"{"message":"boom"}"#));
        assert_eq!(
            result.unwrap_err(),
            QueryError::Status {
                status: 500,
                message: "boom".to_owned()
            }
        );
    }

    #[test]
    fn network_error_is_preserved() {
        let result = rows::<serde_json::Value>(Err("offline".to_owned()));
        assert_eq!(result.unwrap_err(), QueryError::Network("offline".to_owned()));
    }
}
