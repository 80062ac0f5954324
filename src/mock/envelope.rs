//! Response envelope shared by every mock endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ code, data, message }`; `code == 200` means success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: String,
}

impl ApiEnvelope {
    pub fn ok(data: Value) -> Self {
        Self {
            code: 200,
            data,
            message: "success".to_string(),
        }
    }

    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            data: Value::Null,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 200
    }
}

/// Paginated payload nested under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Slice `items` into the requested 1-based page.
    pub fn paginate(items: Vec<T>, page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = items.len();
        let list = items
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Self {
            list,
            total,
            page,
            page_size,
        }
    }
}
