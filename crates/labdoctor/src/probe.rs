//! Smoke test for the MCP gateway that fronts the database.
//!
//! Two calls are made. The second one only runs when the first succeeded.
//! Neither feeds into the diagnostic report.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/mcp";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const BIOMARKER_QUERY: &str = "SELECT COUNT(*) as biomarker_count FROM biomarker_definitions";

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Cannot reach MCP server at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Response(String),

    #[error("HTTP request failed: {0}")]
    Http(String),
}

#[derive(Serialize)]
struct McpRequest<'a> {
    request_id: &'a str,
    name: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct McpResponse {
    #[serde(default)]
    result: Value,
}

/// One entry of the `get_db_schemas` result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaSummary {
    pub schema_name: Option<String>,
    pub tables_count: Option<Value>,
    pub size_pretty: Option<String>,
}

/// What the biomarker query returned.
#[derive(Debug, Clone, PartialEq)]
pub enum BiomarkerCount {
    Count(i64),
    NotNumeric(Value),
    NoRows,
}

/// Blocking client for the MCP gateway.
pub struct McpProbe {
    endpoint: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl McpProbe {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn call(&self, request_id: &str, name: &str, params: Value) -> Result<Value, ProbeError> {
        log::debug!("MCP call {} ({}) to {}", name, request_id, self.endpoint);
        let body = McpRequest {
            request_id,
            name,
            params,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout(self.timeout.as_secs())
                } else if e.is_connect() {
                    ProbeError::Connection(self.endpoint.clone())
                } else {
                    ProbeError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProbeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: McpResponse = response
            .json()
            .map_err(|e| ProbeError::Response(e.to_string()))?;
        Ok(parsed.result)
    }

    /// Calls `get_db_schemas`.
    pub fn list_schemas(&self) -> Result<Vec<SchemaSummary>, ProbeError> {
        let result = self.call("test-connection", "get_db_schemas", json!({}))?;
        interpret_schemas(result)
    }

    /// Runs the biomarker count query through `execute_sql_query`.
    pub fn biomarker_count(&self) -> Result<BiomarkerCount, ProbeError> {
        let result = self.call(
            "test-biomarkers",
            "execute_sql_query",
            json!({ "query": BIOMARKER_QUERY }),
        )?;
        Ok(extract_biomarker_count(&result))
    }
}

/// A missing or null result counts as an empty schema list.
pub fn interpret_schemas(result: Value) -> Result<Vec<SchemaSummary>, ProbeError> {
    match result {
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value(other).map_err(|e| ProbeError::Response(e.to_string())),
    }
}

pub fn extract_biomarker_count(result: &Value) -> BiomarkerCount {
    let Some(first) = result.as_array().and_then(|rows| rows.first()) else {
        return BiomarkerCount::NoRows;
    };
    match first.get("biomarker_count") {
        Some(value) => match value.as_i64() {
            Some(n) => BiomarkerCount::Count(n),
            // Postgres bigint counts sometimes arrive as strings.
            None => match value.as_str().and_then(|s| s.parse::<i64>().ok()) {
                Some(n) => BiomarkerCount::Count(n),
                None => BiomarkerCount::NotNumeric(value.clone()),
            },
        },
        None => BiomarkerCount::NotNumeric(Value::Null),
    }
}

/// Results of both calls.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub endpoint: String,
    pub schemas: Result<Vec<SchemaSummary>, ProbeError>,
    /// `None` when the connection call failed.
    pub biomarkers: Option<Result<BiomarkerCount, ProbeError>>,
}

impl ProbeOutcome {
    pub fn passed(&self) -> bool {
        self.schemas.is_ok()
            && matches!(
                self.biomarkers,
                Some(Ok(BiomarkerCount::Count(_) | BiomarkerCount::NoRows))
            )
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== MCP Server Verification ===");
        let _ = writeln!(out);

        match &self.schemas {
            Ok(schemas) => {
                let _ = writeln!(out, "OK   Connected to MCP server at {}", self.endpoint);
                let _ = writeln!(out);
                let _ = writeln!(out, "Database schemas:");
                for schema in schemas {
                    let _ = writeln!(
                        out,
                        "  - {}: {} tables, {}",
                        schema.schema_name.as_deref().unwrap_or("?"),
                        schema
                            .tables_count
                            .as_ref()
                            .map(display_value)
                            .unwrap_or_else(|| "?".to_string()),
                        schema.size_pretty.as_deref().unwrap_or("?"),
                    );
                }
            }
            Err(e) => {
                let _ = writeln!(out, "FAIL Could not connect to MCP server: {}", e);
            }
        }

        if let Some(biomarkers) = &self.biomarkers {
            let _ = writeln!(out);
            match biomarkers {
                Ok(BiomarkerCount::Count(n)) => {
                    let _ = writeln!(out, "OK   Found {} biomarker definitions", n);
                }
                Ok(BiomarkerCount::NoRows) => {
                    let _ = writeln!(out, "WARN Query executed but returned no results");
                }
                Ok(BiomarkerCount::NotNumeric(value)) => {
                    let _ = writeln!(
                        out,
                        "FAIL biomarker_count is not numeric: {}",
                        display_value(value)
                    );
                }
                Err(e) => {
                    let _ = writeln!(out, "FAIL Biomarker query failed: {}", e);
                }
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Verification complete.");
        out
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Runs the connection call, then the biomarker query if it succeeded.
pub fn run(probe: &McpProbe) -> ProbeOutcome {
    let schemas = probe.list_schemas();
    let biomarkers = match &schemas {
        Ok(_) => Some(probe.biomarker_count()),
        Err(e) => {
            log::warn!("Skipping biomarker query: {}", e);
            None
        }
    };
    ProbeOutcome {
        endpoint: probe.endpoint().to_string(),
        schemas,
        biomarkers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serves one canned response per connection and reports each request
    /// body back through the channel.
    fn stub_server(responses: Vec<(u16, String)>) -> (String, mpsc::Receiver<Value>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in responses {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap();
                        }
                    }
                }
                let mut request = vec![0u8; content_length];
                reader.read_exact(&mut request).unwrap();
                let _ = tx.send(serde_json::from_slice(&request).unwrap());

                let mut stream = stream;
                write!(
                    stream,
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
                .unwrap();
            }
        });

        (format!("http://{}/mcp", addr), rx)
    }

    #[test]
    fn test_extract_count() {
        let result = json!([{ "biomarker_count": 42 }]);
        assert_eq!(extract_biomarker_count(&result), BiomarkerCount::Count(42));

        let result = json!([{ "biomarker_count": "17" }]);
        assert_eq!(extract_biomarker_count(&result), BiomarkerCount::Count(17));
    }

    #[test]
    fn test_extract_count_edge_cases() {
        assert_eq!(extract_biomarker_count(&json!([])), BiomarkerCount::NoRows);
        assert_eq!(extract_biomarker_count(&Value::Null), BiomarkerCount::NoRows);
        assert_eq!(
            extract_biomarker_count(&json!([{ "biomarker_count": "many" }])),
            BiomarkerCount::NotNumeric(json!("many"))
        );
    }

    #[test]
    fn test_interpret_schemas() {
        let schemas = interpret_schemas(json!([
            { "schema_name": "public", "tables_count": 12, "size_pretty": "8 MB" }
        ]))
        .unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].schema_name.as_deref(), Some("public"));

        assert!(interpret_schemas(Value::Null).unwrap().is_empty());
        assert!(interpret_schemas(json!("nope")).is_err());
    }

    #[test]
    fn test_both_calls_succeed() {
        let (endpoint, requests) = stub_server(vec![
            (
                200,
                r#"{"result":[{"schema_name":"public","tables_count":12,"size_pretty":"8 MB"}]}"#
                    .to_string(),
            ),
            (200, r#"{"result":[{"biomarker_count":57}]}"#.to_string()),
        ]);

        let probe = McpProbe::new(&endpoint, DEFAULT_TIMEOUT).unwrap();
        let outcome = run(&probe);
        assert!(outcome.passed());

        let first = requests.recv().unwrap();
        assert_eq!(first["name"], "get_db_schemas");
        assert_eq!(first["request_id"], "test-connection");
        let second = requests.recv().unwrap();
        assert_eq!(second["name"], "execute_sql_query");
        assert_eq!(second["params"]["query"], BIOMARKER_QUERY);

        let text = outcome.render();
        assert!(text.contains("  - public: 12 tables, 8 MB"));
        assert!(text.contains("Found 57 biomarker definitions"));
    }

    #[test]
    fn test_failed_connection_skips_query() {
        let (endpoint, requests) =
            stub_server(vec![(500, r#"{"error":"down"}"#.to_string())]);

        let probe = McpProbe::new(&endpoint, DEFAULT_TIMEOUT).unwrap();
        let outcome = run(&probe);
        assert!(!outcome.passed());
        assert!(outcome.biomarkers.is_none());
        assert!(matches!(
            outcome.schemas,
            Err(ProbeError::Status { status: 500, .. })
        ));

        assert_eq!(requests.recv().unwrap()["name"], "get_db_schemas");
        assert!(requests.try_recv().is_err());
        assert!(outcome.render().contains("HTTP 500"));
    }

    #[test]
    fn test_unreachable_server() {
        // Bind then drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let probe =
            McpProbe::new(&format!("http://127.0.0.1:{}/mcp", port), DEFAULT_TIMEOUT).unwrap();
        let outcome = run(&probe);
        assert!(outcome.schemas.is_err());
        assert!(outcome.biomarkers.is_none());
    }
}
