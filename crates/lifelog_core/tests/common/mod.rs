#![allow(dead_code)]

use lifelog_core::api::{ApiError, ApiResult, GetLifelogsParams, LifelogSource};
use lifelog_core::model::lifelog::{LifelogsData, LifelogsMeta, PageMeta};
use lifelog_core::{ContentNode, Lifelog, LifelogsResponse};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

pub fn mock_lifelog(id: &str, title: &str) -> Lifelog {
    let mut heading = ContentNode::new("heading1", "Test Content");
    heading.start_time = Some("2025-01-01T10:00:00Z".to_string());
    heading.end_time = Some("2025-01-01T10:00:05Z".to_string());
    heading.start_offset_ms = Some(0);
    heading.end_offset_ms = Some(5_000);

    let mut paragraph = ContentNode::new("paragraph", "This is a test lifelog.");
    paragraph.start_offset_ms = Some(5_000);
    paragraph.end_offset_ms = Some(10_000);

    Lifelog {
        id: id.to_string(),
        title: title.to_string(),
        markdown: Some("# Test Content\n\nThis is a test lifelog.".to_string()),
        contents: vec![heading, paragraph],
        start_time: "2025-01-01T10:00:00Z".to_string(),
        end_time: "2025-01-01T10:05:00Z".to_string(),
        is_starred: true,
        updated_at: "2025-01-01T10:05:00Z".to_string(),
    }
}

pub fn mock_lifelogs(prefix: &str, count: usize) -> Vec<Lifelog> {
    (1..=count)
        .map(|index| mock_lifelog(&format!("{prefix}-{index}"), &format!("Lifelog {index}")))
        .collect()
}

pub fn mock_response(lifelogs: Vec<Lifelog>, next_cursor: Option<&str>) -> LifelogsResponse {
    let count = lifelogs.len() as u64;
    LifelogsResponse {
        data: LifelogsData { lifelogs },
        meta: LifelogsMeta {
            lifelogs: PageMeta {
                next_cursor: next_cursor.map(str::to_string),
                count,
            },
        },
    }
}

/// Valid lifelog JSON as the API sends it.
pub fn lifelog_json(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Morning walk",
        "markdown": "# Morning walk",
        "contents": [
            {
                "type": "heading1",
                "content": "Morning walk",
                "startTime": "2025-01-01T10:00:00Z",
                "endTime": "2025-01-01T10:00:10Z",
                "startOffsetMs": 0,
                "endOffsetMs": 10000,
                "children": [
                    {
                        "type": "blockquote",
                        "content": "Nice weather today.",
                        "startOffsetMs": 5000,
                        "endOffsetMs": 10000,
                        "speakerName": "Sam",
                        "speakerIdentifier": "user"
                    }
                ]
            }
        ],
        "startTime": "2025-01-01T10:00:00Z",
        "endTime": "2025-01-01T10:05:00Z",
        "isStarred": false,
        "updatedAt": "2025-01-01T10:05:00Z"
    })
}

pub fn response_json(lifelogs: Vec<Value>, next_cursor: Option<&str>) -> Value {
    let count = lifelogs.len();
    let mut meta = json!({ "count": count });
    if let Some(cursor) = next_cursor {
        meta["nextCursor"] = json!(cursor);
    }
    json!({
        "data": { "lifelogs": lifelogs },
        "meta": { "lifelogs": meta }
    })
}

/// Source that replays queued responses and records every request.
#[derive(Default)]
pub struct ScriptedSource {
    responses: RefCell<VecDeque<ApiResult<LifelogsResponse>>>,
    calls: RefCell<Vec<GetLifelogsParams>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: LifelogsResponse) {
        self.responses.borrow_mut().push_back(Ok(response));
    }

    pub fn push_error(&self, error: ApiError) {
        self.responses.borrow_mut().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<GetLifelogsParams> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl LifelogSource for ScriptedSource {
    fn get_lifelogs(&self, params: &GetLifelogsParams) -> ApiResult<LifelogsResponse> {
        self.calls.borrow_mut().push(params.clone());
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(ApiError::Status {
                status: 599,
                status_text: "no scripted response".to_string(),
                body: String::new(),
            })
        })
    }
}

/// Source serving a fixed dataset, honoring `limit` and numeric cursors.
pub struct DatasetSource {
    lifelogs: Vec<Lifelog>,
    calls: RefCell<Vec<GetLifelogsParams>>,
}

impl DatasetSource {
    pub fn new(lifelogs: Vec<Lifelog>) -> Self {
        Self {
            lifelogs,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<GetLifelogsParams> {
        self.calls.borrow().clone()
    }
}

impl LifelogSource for DatasetSource {
    fn get_lifelogs(&self, params: &GetLifelogsParams) -> ApiResult<LifelogsResponse> {
        self.calls.borrow_mut().push(params.clone());
        let offset = params
            .cursor
            .as_deref()
            .and_then(|cursor| cursor.parse::<usize>().ok())
            .unwrap_or(0);
        let limit = params.limit.unwrap_or(self.lifelogs.len());
        let end = (offset + limit).min(self.lifelogs.len());
        let page = self.lifelogs[offset..end].to_vec();
        let next_cursor = (end < self.lifelogs.len()).then(|| end.to_string());
        Ok(mock_response(page, next_cursor.as_deref()))
    }
}
