pub mod embedding;
pub mod store;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client, Url,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

pub fn auth_headers(
	api_key: Option<&str>,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(key) = api_key {
		headers.insert(AUTHORIZATION, format!("Bearer {key}").parse()?);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub(crate) fn client(timeout_ms: u64) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(timeout_ms)).build()?)
}

/// Appends percent-encoded `segments` to `api_base`.
pub(crate) fn endpoint(api_base: &str, segments: &[&str]) -> Result<Url> {
	let mut url = Url::parse(api_base).map_err(|err| Error::InvalidConfig {
		message: format!("Invalid api_base {api_base:?}: {err}."),
	})?;

	url.path_segments_mut()
		.map_err(|_| Error::InvalidConfig {
			message: format!("api_base {api_base:?} cannot carry a path."),
		})?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}
