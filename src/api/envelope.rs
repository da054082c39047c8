use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::controller::query::PageQuery;
use crate::error::{ClientError, ClientResult};

/// The `{success, data, message}` envelope the backend wraps mutations in.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub message: Option<String>,
}

impl ApiResponse {
    /// Lenient read of any response body; missing fields default.
    pub fn from_body(body: &Value) -> Self {
        Self {
            success: body
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            data: body.get("data").filter(|d| !d.is_null()).cloned(),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Passes a 2xx body through unless it explicitly says `success: false`.
pub fn accepted(body: Value, fallback: &str) -> ClientResult<Value> {
    match body.get("success") {
        Some(Value::Bool(false)) => Err(ClientError::rejected(&body, fallback)),
        _ => Ok(body),
    }
}

/// One decoded page of a collection plus whatever context the server sent alongside
/// (company, department or employee headers).
#[derive(Debug, Clone)]
pub struct PageData<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub context: Map<String, Value>,
}

impl<T> PageData<T> {
    pub fn empty(query: &PageQuery) -> Self {
        Self {
            items: Vec::new(),
            page: query.page,
            limit: query.limit,
            total: 0,
            total_pages: 0,
            context: Map::new(),
        }
    }
}

pub fn pages_for(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit)) as u32
}

/// Reads a number that may arrive as a JSON number or a numeric string.
pub fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn take_array(object: &mut Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    match object.remove(key) {
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            object.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

/// Normalises the list envelopes the backend uses into a [`PageData`].
///
/// Accepted shapes:
/// - `{<items_key>: [...], pagination: {total, pages}}`
/// - `{data: [...], meta: {total, page, limit, totalPages}}`
/// - `{<items_key> | data: [...]}` without metadata, paginated here so that
///   `items.len() <= limit` always holds.
pub fn parse_page<T: DeserializeOwned>(
    body: Value,
    items_key: &str,
    query: &PageQuery,
) -> ClientResult<PageData<T>> {
    let mut object = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let raw_items = take_array(&mut object, items_key)
        .or_else(|| take_array(&mut object, "data"))
        .unwrap_or_default();
    let meta = object
        .remove("pagination")
        .or_else(|| object.remove("meta"));
    object.remove("success");
    object.remove("message");

    let limit = query.limit.max(1);
    let server_total = meta
        .as_ref()
        .and_then(|m| m.get("total"))
        .and_then(lenient_u64);

    let (raw_items, total, total_pages) = match server_total {
        Some(total) => {
            let pages = meta
                .as_ref()
                .and_then(|m| m.get("pages").or_else(|| m.get("totalPages")))
                .and_then(lenient_u64)
                .map(|p| p as u32)
                .unwrap_or_else(|| pages_for(total, limit));

            let mut items = raw_items;
            if items.len() > limit as usize {
                log::warn!(
                    "Server returned {} items for limit {}, truncating",
                    items.len(),
                    limit
                );
                items.truncate(limit as usize);
            }
            (items, total, pages)
        }
        None => {
            let total = raw_items.len() as u64;
            let items = raw_items
                .into_iter()
                .skip(query.offset())
                .take(limit as usize)
                .collect();
            (items, total, pages_for(total, limit))
        }
    };

    let items = raw_items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;

    Ok(PageData {
        items,
        page: query.page,
        limit,
        total,
        total_pages,
        context: object,
    })
}
