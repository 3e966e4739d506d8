use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::Result;
use picker_config::Store;

/// Runs one query against the configured table and returns the raw response body.
pub async fn query<B>(cfg: &Store, body: &B) -> Result<Value>
where
	B: Serialize + ?Sized,
{
	let client = crate::client(cfg.timeout_ms)?;
	let url = crate::endpoint(&cfg.api_base, &["tables", &cfg.table, "query"])?;
	let res = client
		.post(url)
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.json(body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(json)
}

/// Fetches one document by key. A missing key is `Ok(None)`.
pub async fn lookup(cfg: &Store, key: &str) -> Result<Option<Value>> {
	let client = crate::client(cfg.timeout_ms)?;
	let url = crate::endpoint(&cfg.api_base, &["tables", &cfg.table, "lookup", key])?;
	let res = client
		.get(url)
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.send()
		.await?;

	if res.status() == StatusCode::NOT_FOUND {
		return Ok(None);
	}

	let json: Value = res.error_for_status()?.json().await?;

	Ok(Some(json))
}
