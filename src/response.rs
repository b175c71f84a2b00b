use std::any::Any;
use std::fmt;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use simplehttp_interface::{find_header, HttpVersion, Method, TransferInfo};

use crate::dispatch::{Content, Settled};
use crate::options::UserData;
use crate::{Error, Result, StatusCode};

enum State {
    Pending(BoxFuture<'static, Result<Settled>>),
    Settled(Settled, Option<Bytes>),
    Failed(Error),
    Canceled,
}

/// The deferred outcome of [`crate::RequestBuilder::request`].
///
/// The transfer starts the first time any async accessor is awaited and settles exactly once.
/// The result, including a failure, is kept and reported again by later accessors. Dropping
/// an unsettled response aborts the transfer.
pub struct Response {
    state: State,
    user_data: Option<UserData>,
}

impl Response {
    pub(crate) fn pending(future: BoxFuture<'static, Result<Settled>>, user_data: Option<UserData>) -> Self {
        Self {
            state: State::Pending(future),
            user_data,
        }
    }

    /// Waits for the transfer to settle.
    pub async fn wait(&mut self) -> Result<()> {
        self.settle().await.map(|_| ())
    }

    async fn settle(&mut self) -> Result<&mut Settled> {
        if let State::Pending(future) = &mut self.state {
            self.state = match future.await {
                Ok(settled) => State::Settled(settled, None),
                Err(e) => State::Failed(e),
            };
        }
        match &mut self.state {
            State::Settled(settled, _) => Ok(settled),
            State::Failed(e) => Err(e.clone()),
            State::Canceled => Err(Error::Canceled),
            State::Pending(_) => unreachable!("pending state is driven to completion above"),
        }
    }

    /// The status code.
    pub async fn status_code(&mut self) -> Result<StatusCode> {
        Ok(StatusCode::new(self.settle().await?.status))
    }

    /// The reason phrase sent by the server, or the canonical one for the status code.
    pub async fn reason_phrase(&mut self) -> Result<String> {
        let settled = self.settle().await?;
        Ok(settled
            .reason
            .clone()
            .or_else(|| StatusCode::new(settled.status).canonical_reason().map(String::from))
            .unwrap_or_default())
    }

    /// The protocol version of the response.
    pub async fn protocol_version(&mut self) -> Result<HttpVersion> {
        Ok(self.settle().await?.version)
    }

    /// All response headers in the order received.
    pub async fn headers(&mut self) -> Result<&[(String, String)]> {
        Ok(&self.settle().await?.headers)
    }

    /// The last value of a header, ignoring ASCII case.
    pub async fn header(&mut self, name: &str) -> Result<Option<&str>> {
        Ok(find_header(&self.settle().await?.headers, name))
    }

    /// The body. A file sink is read back from disk. A writer sink yields an empty body.
    pub async fn bytes(&mut self) -> Result<Bytes> {
        self.settle().await?;
        let State::Settled(settled, cached) = &mut self.state else {
            return Err(Error::Canceled);
        };
        if let Some(bytes) = cached {
            return Ok(bytes.clone());
        }
        let bytes = match &settled.content {
            Content::Memory(bytes) => bytes.clone(),
            Content::File(path) => tokio::fs::read(path).await?.into(),
            Content::Detached => Bytes::new(),
        };
        *cached = Some(bytes.clone());
        Ok(bytes)
    }

    /// The body as text. Invalid UTF-8 sequences are replaced.
    pub async fn content(&mut self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Decodes the body as a JSON object or array.
    pub async fn to_array(&mut self) -> Result<Value> {
        let bytes = self.bytes().await?;
        if bytes.is_empty() {
            return Err(Error::JsonDecode {
                reason: "Response body is empty.".to_string(),
            });
        }
        let value: Value = serde_json::from_slice(&bytes)?;
        match value {
            Value::Object(_) | Value::Array(_) => Ok(value),
            other => Err(Error::JsonDecode {
                reason: format!(
                    "JSON content was expected to decode to an array, \"{}\" returned",
                    json_type(&other)
                ),
            }),
        }
    }

    /// Decodes the body as JSON into `T`.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fails with [`Error::UnsuccessfulStatus`] unless the status is 2xx.
    pub async fn with_successful_status(mut self) -> Result<Self> {
        let status = self.status_code().await?;
        if status.is_successful() {
            Ok(self)
        } else {
            Err(Error::UnsuccessfulStatus(status))
        }
    }

    /// Transfer metadata.
    pub async fn info(&mut self) -> Result<&TransferInfo> {
        Ok(&self.settle().await?.info)
    }

    /// The method that produced the final response.
    pub async fn http_method(&mut self) -> Result<Method> {
        Ok(self.info().await?.http_method)
    }

    /// When the transfer started.
    pub async fn start_time(&mut self) -> Result<SystemTime> {
        Ok(self.info().await?.start_time)
    }

    /// How long the transfer took, body included.
    pub async fn total_time(&mut self) -> Result<Duration> {
        Ok(self.info().await?.total_time)
    }

    /// How many redirects were followed.
    pub async fn redirect_count(&mut self) -> Result<u32> {
        Ok(self.info().await?.redirect_count)
    }

    /// The redirect target that was not followed, if any.
    pub async fn redirect_url(&mut self) -> Result<Option<String>> {
        Ok(self.info().await?.redirect_url.clone())
    }

    /// The final URL.
    pub async fn url(&mut self) -> Result<String> {
        Ok(self.info().await?.url.clone())
    }

    /// The value passed to [`crate::RequestBuilder::user_data`].
    pub fn user_data(&self) -> Option<&UserData> {
        self.user_data.as_ref()
    }

    /// The user data, if it is a `T`.
    pub fn user_data_as<T: Any>(&self) -> Option<&T> {
        self.user_data.as_deref().and_then(|data| data.downcast_ref())
    }

    /// Aborts the transfer. Later accessors fail with [`Error::Canceled`].
    pub fn cancel(&mut self) {
        self.state = State::Canceled;
    }

    /// Whether [`Response::cancel`] was called.
    pub fn is_canceled(&self) -> bool {
        matches!(self.state, State::Canceled)
    }

    /// The message of the failure this response settled with, if any.
    pub fn error(&self) -> Option<String> {
        match &self.state {
            State::Failed(e) => Some(e.to_string()),
            State::Canceled => Some(Error::Canceled.to_string()),
            _ => None,
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Pending(_) => "pending",
            State::Settled(..) => "settled",
            State::Failed(_) => "failed",
            State::Canceled => "canceled",
        };
        f.debug_struct("Response")
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future;
    use serde_json::json;

    use super::*;

    fn settled(status: u16, content: Content) -> Response {
        let settled = Settled {
            status,
            reason: None,
            headers: vec![("Content-Type".into(), "application/json".into())],
            version: HttpVersion::Http11,
            info: TransferInfo::new(Method::Get, "https://example.com"),
            content,
        };
        Response::pending(Box::pin(future::ready(Ok(settled))), None)
    }

    #[tokio::test]
    async fn accessors_share_one_settlement() {
        let mut res = settled(200, Content::Memory(Bytes::from(r#"{"a":1}"#)));
        assert_eq!(res.status_code().await.unwrap(), 200);
        assert_eq!(res.reason_phrase().await.unwrap(), "OK");
        assert_eq!(
            res.header("content-type").await.unwrap(),
            Some("application/json")
        );
        assert_eq!(res.to_array().await.unwrap(), json!({"a": 1}));
        assert_eq!(res.content().await.unwrap(), r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn empty_body_is_not_an_array() {
        let mut res = settled(200, Content::Memory(Bytes::new()));
        assert!(matches!(
            res.to_array().await,
            Err(Error::JsonDecode { .. })
        ));
    }

    #[tokio::test]
    async fn scalar_json_is_not_an_array() {
        let mut res = settled(200, Content::Memory(Bytes::from("\"text\"")));
        let err = res.to_array().await.unwrap_err();
        assert!(err.to_string().contains("\"string\" returned"));
    }

    #[tokio::test]
    async fn unsuccessful_status() {
        let res = settled(404, Content::Detached);
        assert!(matches!(
            res.with_successful_status().await,
            Err(Error::UnsuccessfulStatus(status)) if status == 404
        ));
    }

    #[tokio::test]
    async fn failure_is_reported_by_every_accessor() {
        let mut res = Response::pending(
            Box::pin(future::ready(Err(Error::invalid_argument("boom")))),
            None,
        );
        assert!(res.status_code().await.is_err());
        assert!(matches!(res.content().await, Err(Error::InvalidArgument(_))));
        assert_eq!(res.error().as_deref(), Some("Invalid argument: boom"));
    }

    #[tokio::test]
    async fn cancel_drops_pending_transfer() {
        let mut res = Response::pending(Box::pin(future::pending()), Some(Arc::new(5u8)));
        res.cancel();
        assert!(res.is_canceled());
        assert!(matches!(res.status_code().await, Err(Error::Canceled)));
        assert_eq!(res.user_data_as::<u8>(), Some(&5));
    }

    #[tokio::test]
    async fn file_content_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "from disk").unwrap();
        let mut res = settled(200, Content::File(path));
        assert_eq!(res.content().await.unwrap(), "from disk");
    }
}
