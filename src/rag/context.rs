//! Context assembly from retrieved documents

use crate::models::SupportingContentRecord;

/// Context handed to the model when retrieval found nothing
pub const NO_SOURCE_PLACEHOLDER: &str = "no source available.";

/// Separator between documents in the assembled context
const DOCUMENT_SEPARATOR: &str = "\r";

/// Assembler for the source block of the answer prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    /// `"{title}:{content}"` per document, joined by carriage returns
    #[must_use]
    pub fn assemble(&self, documents: &[SupportingContentRecord]) -> String {
        if documents.is_empty() {
            return NO_SOURCE_PLACEHOLDER.to_string();
        }

        documents
            .iter()
            .map(|doc| format!("{}:{}", doc.title, doc.content))
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR)
    }

    /// Create a short human-readable summary of the retrieved documents
    #[must_use]
    pub fn create_summary(&self, documents: &[SupportingContentRecord]) -> String {
        if documents.is_empty() {
            return "No documents found.".to_string();
        }

        let mut summary = format!("Found {} supporting document(s):\n", documents.len());
        for (idx, doc) in documents.iter().enumerate() {
            summary.push_str(&format!("  {}. {}\n", idx + 1, doc.title));
        }
        summary
    }
}
