use serde::{Deserialize, Serialize};

use crate::StatusCode;

/// Body of a remote reply: either the typed payload or the raw error text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseBody<P> {
    Payload(P),
    Error(String),
}

/// One reply from the remote service.
///
/// The status code decides how the body is interpreted; a payload is only
/// trusted when the status is [`StatusCode::OK`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteResponse<P> {
    pub status: StatusCode,
    pub body: ResponseBody<P>,
}

impl<P> RemoteResponse<P> {
    /// Successful reply carrying `payload`.
    pub fn ok(payload: P) -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::Payload(payload),
        }
    }

    /// Failed reply with an error body.
    pub fn error(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::new(status),
            body: ResponseBody::Error(body.into()),
        }
    }

    /// Split the reply into a payload (only for status `200`) or the error text.
    ///
    /// A `200` without a payload and a non-`200` carrying a payload are both errors.
    pub fn into_result(self) -> Result<P, (StatusCode, String)> {
        match (self.status.is_success(), self.body) {
            (true, ResponseBody::Payload(p)) => Ok(p),
            (true, ResponseBody::Error(body)) => Err((self.status, body)),
            (false, ResponseBody::Error(body)) => Err((self.status, body)),
            (false, ResponseBody::Payload(_)) => Err((self.status, String::new())),
        }
    }
}

/// Payload of a successful search reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPayload<I> {
    /// Total number of matches reported by the service, if any.
    #[serde(default)]
    pub count: u32,
    /// Items of the requested page, in service order.
    #[serde(default = "Vec::new")]
    pub items: Vec<I>,
}

impl<I> SearchPayload<I> {
    pub fn new(items: Vec<I>) -> Self {
        Self {
            count: items.len() as u32,
            items,
        }
    }
}

/// Payload of a successful fetch-by-id reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload<I> {
    pub item: I,
}

impl<I> ItemPayload<I> {
    pub fn new(item: I) -> Self {
        Self { item }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_reply_yields_payload() {
        let resp = RemoteResponse::ok(SearchPayload::new(vec!["a", "b"]));
        let payload = resp.into_result().unwrap();
        assert_eq!(payload.items, vec!["a", "b"]);
        assert_eq!(payload.count, 2);
    }

    #[test]
    fn error_reply_yields_status_and_body() {
        let resp: RemoteResponse<ItemPayload<String>> = RemoteResponse::error(404, "not found");
        let (status, body) = resp.into_result().unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "not found");
    }

    #[test]
    fn payload_with_non_ok_status_is_an_error() {
        let resp = RemoteResponse {
            status: StatusCode::new(201),
            body: ResponseBody::Payload(ItemPayload::new(1u32)),
        };
        assert!(resp.into_result().is_err());
    }

    #[test]
    fn search_payload_deserializes_without_items() {
        let p: SearchPayload<String> = serde_json::from_str(r#"{"count":0}"#).unwrap();
        assert!(p.items.is_empty());
    }
}
