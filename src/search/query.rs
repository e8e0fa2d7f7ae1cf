//! Request bodies and result mapping for the search index REST API

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::models::RequestOverrides;
use crate::models::SupportingContentRecord;
use crate::models::SupportingImageRecord;

/// Separator between semantic captions of a single hit
const CAPTION_SEPARATOR: &str = " . ";

/// Body of a `docs/search` POST
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub top: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_configuration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vector_queries: Vec<VectorQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorQuery {
    pub kind: &'static str,
    pub vector: Vec<f32>,
    pub k: usize,
    pub fields: String,
}

impl VectorQuery {
    pub fn new(vector: Vec<f32>, k: usize, fields: &str) -> Self {
        Self {
            kind: "vector",
            vector,
            k,
            fields: fields.to_string(),
        }
    }
}

/// OData filter excluding one category, or `None` when nothing is excluded
#[must_use]
pub fn build_exclude_filter(overrides: &RequestOverrides) -> Option<String> {
    overrides
        .exclude_category()
        .map(|category| format!("category ne '{}'", category.replace('\'', "''")))
}

impl SearchRequestBody {
    /// Document search honouring every retrieval override
    #[must_use]
    pub fn for_documents(
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
        semantic_configuration: &str,
        vector_field: &str,
    ) -> Self {
        let top = overrides.top();
        let search = query.map(str::to_string);

        // Semantic ranking re-ranks text hits, so it needs a text query
        let semantic = overrides.semantic_ranker() && search.is_some();

        Self {
            search,
            top,
            filter: build_exclude_filter(overrides),
            query_type: semantic.then(|| "semantic".to_string()),
            semantic_configuration: semantic.then(|| semantic_configuration.to_string()),
            captions: (semantic && overrides.semantic_captions())
                .then(|| "extractive".to_string()),
            vector_queries: embedding
                .map(|v| vec![VectorQuery::new(v.to_vec(), top, vector_field)])
                .unwrap_or_default(),
        }
    }

    /// Image search over the vision embedding and the query text
    #[must_use]
    pub fn for_images(
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
        vector_field: &str,
    ) -> Self {
        let top = overrides.top();
        Self {
            search: query.map(str::to_string),
            top,
            filter: build_exclude_filter(overrides),
            query_type: None,
            semantic_configuration: None,
            captions: None,
            vector_queries: embedding
                .map(|v| vec![VectorQuery::new(v.to_vec(), top, vector_field)])
                .unwrap_or_default(),
        }
    }
}

/// Response of a `docs/search` POST
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub value: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "@search.captions", default)]
    pub captions: Option<Vec<Caption>>,
    #[serde(flatten)]
    pub document: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Caption {
    #[serde(default)]
    pub text: Option<String>,
}

impl SearchHit {
    fn field(&self, name: &str) -> Option<&str> {
        self.document.get(name).and_then(Value::as_str)
    }

    fn caption_text(&self) -> Option<String> {
        let captions = self.captions.as_ref()?;
        let texts: Vec<&str> = captions.iter().filter_map(|c| c.text.as_deref()).collect();
        Some(texts.join(CAPTION_SEPARATOR))
    }
}

/// Map hits to supporting content, skipping hits without a source page or content
///
/// With `use_captions`, a hit the ranker returned no captions for keeps its `content`.
#[must_use]
pub fn documents_from_hits(hits: &[SearchHit], use_captions: bool) -> Vec<SupportingContentRecord> {
    hits.iter()
        .filter_map(|hit| {
            let title = hit.field("sourcepage")?;
            let content = match use_captions.then(|| hit.caption_text()).flatten() {
                Some(captions) => captions,
                None => hit.field("content")?.to_string(),
            };
            Some(SupportingContentRecord::new(
                title,
                content.replace(['\r', '\n'], " "),
            ))
        })
        .collect()
}

/// Map hits from the image index, skipping hits without a name or URL
#[must_use]
pub fn images_from_hits(hits: &[SearchHit]) -> Vec<SupportingImageRecord> {
    hits.iter()
        .filter_map(|hit| {
            Some(SupportingImageRecord {
                title: hit.field("name")?.to_string(),
                url: hit.field("url")?.to_string(),
            })
        })
        .collect()
}
