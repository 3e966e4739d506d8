use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng};
use serde_json::Value;

use picker_service::SampleRequest;
use picker_testkit::{StubReply, StubServer, hit, hits_response};

const CORPUS: u64 = 500;

fn window(request: &Value) -> StubReply {
	let limit = request["limit"].as_u64().unwrap_or(0);
	let offset = request["offset"].as_u64().unwrap_or(0);
	let hits = (offset..(offset + limit).min(CORPUS))
		.map(|i| {
			let tags = if i % 7 == 0 { vec!["gore"] } else { vec!["cute"] };

			hit(&format!("g{i}"), 0.0, serde_json::json!({ "tags": tags }))
		})
		.collect();

	StubReply::Json(hits_response(hits, CORPUS))
}

#[tokio::test]
async fn sample_fetches_random_windows() {
	let stub = StubServer::start(window).await.expect("Failed to start stub server.");
	let service = super::service_for(&stub);
	let mut rng = StdRng::seed_from_u64(2024);
	let sample = service
		.sample_with_rng(SampleRequest { limit: Some(12), ..Default::default() }, &mut rng)
		.await
		.expect("Sample failed.");
	let ids: HashSet<_> = sample.items.iter().map(|record| record.id.clone()).collect();

	assert_eq!(sample.items.len(), 12);
	assert_eq!(ids.len(), 12);
	assert!(
		sample.items.iter().all(|record| record.attributes["tags"] == serde_json::json!(["cute"]))
	);

	let queries = stub.queries();

	assert_eq!(queries[0], serde_json::json!({ "limit": 0 }));
	assert_eq!(queries.len(), 6);
	assert!(
		queries[1..]
			.iter()
			.all(|query| query["limit"] == 24 && query["offset"].as_u64() < Some(476))
	);
}
