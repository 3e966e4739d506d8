use picker_config::RetrievalMode;
use picker_service::{Error, SearchRequest, SimilarRequest};
use picker_testkit::{StubReply, StubServer, hit, hits_response};

#[tokio::test]
async fn text_search_round_trips_through_http() {
	let stub = StubServer::fixed(hits_response(
		vec![
			hit("1", 0.8, serde_json::json!({ "url": "http://x/1.gif", "tags": ["party"] })),
			hit("2", 0.7, serde_json::json!({ "url": "http://x/2.gif", "tags": ["NSFW"] })),
			hit(
				"3",
				0.6,
				serde_json::json!({ "gif_url": "http://x/3.gif", "combined_text": "Fireworks." }),
			),
		],
		3,
	))
	.await
	.expect("Failed to start stub server.");
	let service = super::service_for(&stub);
	let response = service
		.search(SearchRequest {
			query: r#"fireworks "new year" -tag:sad"#.to_string(),
			excluded_attributions: vec!["tumblr".to_string()],
			..Default::default()
		})
		.await
		.expect("Search failed.");
	let ids: Vec<_> = response.items.iter().map(|item| item.id.as_str()).collect();

	assert_eq!(ids, vec!["1", "3"]);
	assert_eq!(response.items[1].rank, Some(2));
	assert_eq!(response.items[1].url, "http://x/3.gif");
	assert_eq!(response.items[1].description, "Fireworks.");
	assert_eq!(response.total, 3);

	let queries = stub.queries();

	assert_eq!(queries.len(), 1);
	assert_eq!(
		queries[0],
		serde_json::json!({
			"full_text_search": {
				"conjuncts": [
					{ "match_phrase": "new year", "field": "combined_text" },
					{ "match": "fireworks", "field": "combined_text" }
				]
			},
			"semantic_search": "fireworks",
			"indexes": ["embeddings"],
			"exclusion_query": {
				"disjuncts": [
					{ "term": "sad", "field": "tags" },
					{ "term": "tumblr", "field": "attribution" }
				]
			},
			"merge_strategy": "rrf",
			"limit": 24
		})
	);
}

#[tokio::test]
async fn vector_search_embeds_then_queries() {
	let stub = StubServer::fixed(hits_response(vec![hit("9", 0.4, serde_json::json!({}))], 1))
		.await
		.expect("Failed to start stub server.");

	stub.set_embedding(vec![0.5, -0.5, 1.0]);

	let service = super::service_for(&stub);
	let response = service
		.search(SearchRequest {
			query: "sleepy cat".to_string(),
			mode: Some(RetrievalMode::Vector),
			limit: Some(5),
			..Default::default()
		})
		.await
		.expect("Search failed.");

	assert_eq!(response.items.len(), 1);
	assert_eq!(stub.embed_requests()[0]["input"][0]["text"], "sleepy cat");
	assert_eq!(
		stub.queries()[0],
		serde_json::json!({
			"vector_search": { "index": "embeddings", "vector": [0.5, -0.5, 1.0] },
			"limit": 5
		})
	);
}

#[tokio::test]
async fn embedding_outage_fails_vector_search() {
	let stub = StubServer::fixed(hits_response(Vec::new(), 0))
		.await
		.expect("Failed to start stub server.");
	let service = super::service_for(&stub);
	let err = service
		.similar(SimilarRequest { image_url: "http://x/a.gif".to_string(), ..Default::default() })
		.await
		.expect_err("Expected embedding failure.");

	assert!(matches!(err, Error::Transport { .. }));
	assert!(stub.queries().is_empty());
}

#[tokio::test]
async fn store_outage_fails_search() {
	let stub = StubServer::start(|_| StubReply::Status(503))
		.await
		.expect("Failed to start stub server.");
	let service = super::service_for(&stub);
	let err = service
		.search(SearchRequest { query: "cat".to_string(), ..Default::default() })
		.await
		.expect_err("Expected transport failure.");

	assert!(matches!(err, Error::Transport { .. }));
}

#[tokio::test]
async fn lookup_reads_documents_by_key() {
	let stub = StubServer::fixed(hits_response(Vec::new(), 0))
		.await
		.expect("Failed to start stub server.");

	stub.insert_document(
		"abc",
		serde_json::json!({
			"url": "http://x/abc.gif",
			"description": "Wave.",
			"attribution": "giphy"
		}),
	);

	let service = super::service_for(&stub);
	let record = service.get("abc").await.expect("Expected a document.");

	assert_eq!(record.url, "http://x/abc.gif");
	assert_eq!(record.description, "Wave.");
	assert_eq!(record.attributes.get("attribution"), Some(&serde_json::json!("giphy")));
	assert!(service.get("nope").await.is_none());
}
