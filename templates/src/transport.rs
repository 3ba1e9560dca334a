//! Request plumbing shared by every client method.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;

/// Credential accepted by `MockTransport`.
pub const VALID_API_KEY: &str = "foo";

/// Credential rejected by `MockTransport`.
pub const INVALID_API_KEY: &str = "invalidApiKey";

/// One outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Base URL joined with `path`.
    pub url: String,
    /// Route with parameters substituted, including the query string.
    pub path: String,
    pub api_key: String,
    /// JSON body, if the operation sends one.
    pub body: Option<String>,
}

/// Raw response handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// Performs HTTP requests for a `Client`.
pub trait HttpTransport {
    fn send(&self, request: &Request) -> Result<Response, Error>;
}

/// API client bound to a credential and a transport.
pub struct Client {
    api_key: String,
    base_url: String,
    transport: Box<dyn HttpTransport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(api_key: impl Into<String>, transport: impl HttpTransport + 'static) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: crate::BASE_URL.to_string(),
            transport: Box::new(transport),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send one request and decode the JSON response.
    ///
    /// Any non-2xx status is an `Error::Status`. An empty or `null` body
    /// decodes to `T::default()`.
    pub fn request_handler<B, T>(&self, method: &str, path: &str, body: Option<&B>) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Default,
    {
        let body = body.map(serde_json::to_string).transpose()?;
        let request = Request {
            method: method.to_string(),
            url: format!("{}{}", self.base_url, path),
            path: path.to_string(),
            api_key: self.api_key.clone(),
            body,
        };

        let response = self.transport.send(&request)?;
        if !(200..300).contains(&response.status) {
            return Err(Error::Status {
                status: response.status,
                body: response.body,
            });
        }
        decode(&response.body)
    }
}

fn decode<T: DeserializeOwned + Default>(body: &str) -> Result<T, Error> {
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(body)?)
}

/// Append `key=value` pairs to `path` as a percent-encoded query string.
pub fn append_query(path: &mut String, query: &[(&str, String)]) {
    for (index, (key, value)) in query.iter().enumerate() {
        path.push(if index == 0 { '?' } else { '&' });
        path.push_str(&percent_encode(key));
        path.push('=');
        path.push_str(&percent_encode(value));
    }
}

fn percent_encode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// A canned response for one route template and method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixture {
    pub route: &'static str,
    pub method: &'static str,
    pub status: u16,
    pub body: &'static str,
}

/// Transport that answers from a fixture table without any network access.
///
/// Requests carrying anything but `VALID_API_KEY` get a 401; unknown
/// routes get a 404.
#[derive(Debug, Clone, Copy)]
pub struct MockTransport {
    fixtures: &'static [Fixture],
}

impl MockTransport {
    pub fn new(fixtures: &'static [Fixture]) -> Self {
        Self { fixtures }
    }

    /// The decoded fixture payload for `route` and `method`.
    ///
    /// # Panics
    ///
    /// When the fixture body does not decode into `T`.
    pub fn expected<T: DeserializeOwned + Default>(&self, route: &str, method: &str) -> T {
        let body = self
            .fixtures
            .iter()
            .find(|fixture| fixture.route == route && fixture.method == method)
            .map_or("null", |fixture| fixture.body);
        match decode(body) {
            Ok(value) => value,
            Err(err) => panic!("fixture for {method} {route} does not decode: {err}"),
        }
    }

    fn lookup(&self, method: &str, path: &str) -> Option<&'static Fixture> {
        let path = path.split('?').next().unwrap_or_default();
        self.fixtures
            .iter()
            .filter(|fixture| fixture.method == method)
            .filter_map(|fixture| route_score(fixture.route, path).map(|score| (score, fixture)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, fixture)| fixture)
    }
}

/// Number of literal segments shared by `route` and `path`, or `None` when
/// the template does not match.
fn route_score(route: &str, path: &str) -> Option<usize> {
    let template: Vec<&str> = route.split('/').collect();
    let actual: Vec<&str> = path.split('/').collect();
    if template.len() != actual.len() {
        return None;
    }
    let mut literals = 0;
    for (expected, segment) in template.iter().zip(&actual) {
        if expected.contains('{') {
            continue;
        }
        if expected != segment {
            return None;
        }
        literals += 1;
    }
    Some(literals)
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &Request) -> Result<Response, Error> {
        if request.api_key != VALID_API_KEY {
            return Ok(Response {
                status: 401,
                body: r#"{"message":"invalid api key"}"#.to_string(),
            });
        }
        Ok(match self.lookup(&request.method, &request.path) {
            Some(fixture) => Response {
                status: fixture.status,
                body: fixture.body.to_string(),
            },
            None => Response {
                status: 404,
                body: format!(r#"{{"message":"no fixture for {} {}"}}"#, request.method, request.path),
            },
        })
    }
}
