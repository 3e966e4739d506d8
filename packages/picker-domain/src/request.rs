use std::collections::BTreeMap;

use serde::Serialize;

use crate::query::ParsedQuery;
use picker_config::{ExclusionStyle, Search};

pub const ATTRIBUTION_AGGREGATION: &str = "attributions";

/// One node of the store's query tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryNode {
	Match {
		#[serde(rename = "match")]
		text: String,
		field: String,
	},
	MatchPhrase {
		match_phrase: String,
		field: String,
	},
	Term {
		term: String,
		field: String,
	},
	Conjuncts {
		conjuncts: Vec<QueryNode>,
	},
	Disjuncts {
		disjuncts: Vec<QueryNode>,
	},
	QueryString {
		query: String,
	},
}
impl QueryNode {
	pub fn matches(field: &str, text: &str) -> Self {
		Self::Match { text: text.to_string(), field: field.to_string() }
	}

	pub fn phrase(field: &str, phrase: &str) -> Self {
		Self::MatchPhrase { match_phrase: phrase.to_string(), field: field.to_string() }
	}

	pub fn term(field: &str, term: &str) -> Self {
		Self::Term { term: term.to_string(), field: field.to_string() }
	}

	/// Conjunction of `leaves`; a single leaf is returned bare.
	pub fn all(mut leaves: Vec<QueryNode>) -> Option<Self> {
		match leaves.len() {
			0 => None,
			1 => leaves.pop(),
			_ => Some(Self::Conjuncts { conjuncts: leaves }),
		}
	}

	/// Disjunction of `leaves`; a single leaf is returned bare.
	pub fn any(mut leaves: Vec<QueryNode>) -> Option<Self> {
		match leaves.len() {
			0 => None,
			1 => leaves.pop(),
			_ => Some(Self::Disjuncts { disjuncts: leaves }),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeStrategy {
	#[serde(rename = "rrf")]
	ReciprocalRankFusion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorSearch {
	pub index: String,
	pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregationRequest {
	Terms { field: String, size: u32 },
}

/// Body of a store query. Absent clauses are left off the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub full_text_search: Option<QueryNode>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub semantic_search: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub indexes: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub vector_search: Option<VectorSearch>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub filter_query: Option<QueryNode>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub exclusion_query: Option<QueryNode>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub merge_strategy: Option<MergeStrategy>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub aggregations: BTreeMap<String, AggregationRequest>,
	pub limit: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub offset: Option<u32>,
}
impl SearchRequest {
	/// No text, semantic, or vector clause: the store returns documents in its own order.
	pub fn is_browse(&self) -> bool {
		self.full_text_search.is_none()
			&& self.semantic_search.is_none()
			&& self.vector_search.is_none()
	}
}

/// Compiles parsed queries into store requests for one table layout.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
	combined_text_field: String,
	tag_field: String,
	attribution_field: String,
	embedding_index: String,
	exclusion_style: ExclusionStyle,
	vector_mode_filters: bool,
}
impl RequestBuilder {
	pub fn new(cfg: &Search) -> Self {
		Self {
			combined_text_field: cfg.combined_text_field.clone(),
			tag_field: cfg.tag_field.clone(),
			attribution_field: cfg.attribution_field.clone(),
			embedding_index: cfg.embedding_index.clone(),
			exclusion_style: cfg.exclusion_style,
			vector_mode_filters: cfg.vector_mode_filters,
		}
	}

	/// Text-mode request. `limit` must be non-zero; callers validate it.
	pub fn text(
		&self,
		query: &ParsedQuery,
		limit: u32,
		excluded_attributions: &[String],
	) -> SearchRequest {
		let mut leaves: Vec<QueryNode> = query
			.phrases
			.iter()
			.map(|phrase| QueryNode::phrase(&self.combined_text_field, phrase))
			.collect();

		if !query.loose_text.is_empty() {
			leaves.push(QueryNode::matches(&self.combined_text_field, &query.loose_text));
		}

		let mut full_text_search = QueryNode::all(leaves);
		let semantic_search =
			(!query.loose_text.is_empty()).then(|| query.loose_text.clone());
		let tag_clause = self.tag_filter(&query.tags);
		let mut filter_query = None;

		if full_text_search.is_some() || semantic_search.is_some() {
			filter_query = tag_clause;
		} else {
			full_text_search = tag_clause;
		}

		let merge_strategy = (full_text_search.is_some() && semantic_search.is_some())
			.then_some(MergeStrategy::ReciprocalRankFusion);
		let indexes = if semantic_search.is_some() {
			vec![self.embedding_index.clone()]
		} else {
			Vec::new()
		};

		SearchRequest {
			full_text_search,
			semantic_search,
			indexes,
			filter_query,
			exclusion_query: self.exclusion(&query.negative_tags, excluded_attributions),
			merge_strategy,
			limit,
			..Default::default()
		}
	}

	/// Vector-mode request around a precomputed embedding.
	///
	/// Tags and negative tags are dropped unless `search.vector_mode_filters` is enabled.
	/// Attribution exclusions follow the same switch.
	pub fn vector(
		&self,
		query: &ParsedQuery,
		vector: Vec<f32>,
		limit: u32,
		excluded_attributions: &[String],
	) -> SearchRequest {
		let mut request = SearchRequest {
			vector_search: Some(VectorSearch { index: self.embedding_index.clone(), vector }),
			limit,
			..Default::default()
		};

		if self.vector_mode_filters {
			request.filter_query = self.tag_filter(&query.tags);
			request.exclusion_query =
				self.exclusion(&query.negative_tags, excluded_attributions);
		}

		request
	}

	/// Text handed to the embedding service in vector mode.
	pub fn vector_text(query: &ParsedQuery) -> String {
		if !query.loose_text.is_empty() {
			return query.loose_text.clone();
		}

		let mut parts: Vec<&str> = query.phrases.iter().map(String::as_str).collect();

		parts.push(query.raw.trim());

		parts.retain(|part| !part.is_empty());

		parts.join(" ")
	}

	pub fn tag_filter(&self, tags: &[String]) -> Option<QueryNode> {
		QueryNode::all(tags.iter().map(|tag| self.tag_leaf(tag)).collect())
	}

	/// Disjunction of everything to keep out of the results, or `None` when nothing is excluded.
	pub fn exclusion(
		&self,
		negative_tags: &[String],
		excluded_attributions: &[String],
	) -> Option<QueryNode> {
		match self.exclusion_style {
			ExclusionStyle::Tree => {
				let mut leaves: Vec<QueryNode> =
					negative_tags.iter().map(|tag| self.tag_leaf(tag)).collect();

				leaves.extend(
					excluded_attributions
						.iter()
						.map(|attribution| QueryNode::term(&self.attribution_field, attribution)),
				);

				QueryNode::any(leaves)
			},
			ExclusionStyle::QueryString => {
				let clauses: Vec<String> = negative_tags
					.iter()
					.map(|tag| field_clause(&self.tag_field, tag))
					.chain(
						excluded_attributions
							.iter()
							.map(|attribution| field_clause(&self.attribution_field, attribution)),
					)
					.collect();

				if clauses.is_empty() {
					return None;
				}

				Some(QueryNode::QueryString { query: clauses.join(" OR ") })
			},
		}
	}

	/// Zero-result request that only reports the filtered corpus size.
	pub fn count(&self, excluded_attributions: &[String]) -> SearchRequest {
		SearchRequest {
			exclusion_query: self.exclusion(&[], excluded_attributions),
			limit: 0,
			..Default::default()
		}
	}

	/// One browse window of the filtered corpus.
	pub fn batch(&self, excluded_attributions: &[String], size: u32, offset: u32) -> SearchRequest {
		SearchRequest {
			exclusion_query: self.exclusion(&[], excluded_attributions),
			limit: size,
			offset: Some(offset),
			..Default::default()
		}
	}

	pub fn attribution_buckets(&self, size: u32) -> SearchRequest {
		let mut aggregations = BTreeMap::new();

		aggregations.insert(
			ATTRIBUTION_AGGREGATION.to_string(),
			AggregationRequest::Terms { field: self.attribution_field.clone(), size },
		);

		SearchRequest { aggregations, limit: 0, ..Default::default() }
	}

	// Multi-word tags are split by the store's analyzer, so they need adjacency matching.
	fn tag_leaf(&self, tag: &str) -> QueryNode {
		if tag.chars().any(char::is_whitespace) {
			QueryNode::phrase(&self.tag_field, tag)
		} else {
			QueryNode::term(&self.tag_field, tag)
		}
	}
}

fn field_clause(field: &str, value: &str) -> String {
	format!("{field}:\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
