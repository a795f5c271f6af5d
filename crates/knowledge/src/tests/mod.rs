//! End-to-end tests with stub model and search backends.


use crate::types::WebHit;
use crate::web::WebSearch;
use localrag_core::{AppError, AppResult};
use localrag_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;
use std::sync::Mutex;

/// Write a PDF with one line of Courier text per page.
pub(crate) fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    doc.save(path).unwrap();
}

/// Model stub that records every request and echoes a fixed reply.
#[derive(Default)]
pub(crate) struct RecordingLlm {
    pub requests: Mutex<Vec<LlmRequest>>,
    pub fail: bool,
}

impl RecordingLlm {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last_prompt(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.prompt.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmClient for RecordingLlm {
    fn provider_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(AppError::Llm("model offline".to_string()));
        }
        Ok(LlmResponse {
            content: "Cats are mammals.".to_string(),
            model: request.model.clone(),
            usage: LlmUsage::new(10, 4),
        })
    }
}

/// Search stub returning fixed hits, or failing.
pub(crate) struct StubSearch {
    hits: Vec<WebHit>,
    fail: bool,
}

impl StubSearch {
    pub fn with_hits(hits: Vec<WebHit>) -> Self {
        Self { hits, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            hits: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl WebSearch for StubSearch {
    fn provider_name(&self) -> &str {
        "stub"
    }

    async fn search(&self, _query: &str, _max_results: usize) -> AppResult<Vec<WebHit>> {
        if self.fail {
            return Err(AppError::Search("network unreachable".to_string()));
        }
        Ok(self.hits.clone())
    }
}
