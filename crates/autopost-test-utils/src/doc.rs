//! [`DocBuilder`] for test documents.

use autopost_host::{DocId, Document, DocumentStatus, THUMBNAIL_META_KEY, TermId};
use serde_json::Value;

/// Fluent builder around [`Document`].
///
/// Documents default to a published `post`.
///
/// # Example
///
/// ```rust
/// use autopost_test_utils::DocBuilder;
/// use serde_json::json;
///
/// let doc = DocBuilder::post(10)
///     .title("Hello")
///     .meta("subtitle", json!("world"))
///     .terms("category", &[3, 4])
///     .build();
/// assert_eq!(doc.terms["category"].len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DocBuilder {
    doc: Document,
}

impl DocBuilder {
    /// Document of an arbitrary type
    pub fn new(id: u64, doc_type: &str) -> Self {
        let mut doc = Document::new(DocId(id), doc_type);
        doc.status = DocumentStatus::Publish;
        Self { doc }
    }

    pub fn post(id: u64) -> Self {
        Self::new(id, "post")
    }

    pub fn page(id: u64) -> Self {
        Self::new(id, "page")
    }

    /// File attachment, optionally parented
    pub fn attachment(id: u64, parent: Option<u64>) -> Self {
        let mut builder = Self::new(id, "attachment");
        builder.doc.status = DocumentStatus::Inherit;
        builder.doc.parent = parent.map(DocId);
        builder
    }

    pub fn title(mut self, title: &str) -> Self {
        self.doc.title = title.to_string();
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.doc.content = content.to_string();
        self
    }

    pub fn excerpt(mut self, excerpt: &str) -> Self {
        self.doc.excerpt = excerpt.to_string();
        self
    }

    pub fn slug(mut self, name: &str) -> Self {
        self.doc.name = name.to_string();
        self
    }

    pub fn author(mut self, author: u64) -> Self {
        self.doc.author = author;
        self
    }

    pub fn status(mut self, status: DocumentStatus) -> Self {
        self.doc.status = status;
        self
    }

    pub fn revision(mut self) -> Self {
        self.doc.is_revision = true;
        self
    }

    pub fn meta(mut self, key: &str, value: Value) -> Self {
        self.doc.meta.insert(key.to_string(), value);
        self
    }

    pub fn thumbnail(self, attachment: u64) -> Self {
        self.meta(THUMBNAIL_META_KEY, Value::from(attachment))
    }

    pub fn terms(mut self, taxonomy: &str, terms: &[u64]) -> Self {
        self.doc.terms.insert(
            taxonomy.to_string(),
            terms.iter().copied().map(DocId).collect::<Vec<TermId>>(),
        );
        self
    }

    pub fn field(mut self, name: &str, value: Value) -> Self {
        self.doc.fields.insert(name.to_string(), value);
        self
    }

    pub fn build(self) -> Document {
        self.doc
    }
}
