//! AI brainstorm chat for drafting posts

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::http::Http;

/// Who said a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// One turn of the brainstorm conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who said it
    pub role: ChatRole,

    /// The message text
    pub content: String,
}

impl ChatMessage {
    /// A message from the user
    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
        }
    }

    /// A message from the assistant
    pub fn assistant(content: &str) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.to_string(),
        }
    }
}

/// Complete reply from the non-streaming chat endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// The assistant's reply
    pub message: ChatMessage,

    /// A ready-to-save post draft, when the conversation produced one
    pub post_draft: Option<String>,
}

/// One incremental piece of a streamed reply
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    /// Text to append to the reply so far
    pub delta: String,
}

/// Client for the assistant endpoints
pub struct AssistantClient {
    http: Arc<Http>,
}

impl AssistantClient {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Send the conversation and wait for the full reply
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatReply, Error> {
        let body = serde_json::json!({ "messages": messages });
        self.http
            .post("/assistant/chat")
            .json(&body)?
            .execute()
            .await
    }

    /// Send the conversation and stream the reply incrementally
    pub async fn chat_stream(&self, messages: &[ChatMessage]) -> Result<ChatStream, Error> {
        let body = serde_json::json!({ "messages": messages });
        let response = self
            .http
            .post("/assistant/chat/stream")
            .json(&body)?
            .execute_response()
            .await?;
        Ok(ChatStream::from_response(response))
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<bytes::Bytes>> + Send>>;

/// Incremental reader over a streamed chat reply.
///
/// The server sends server-sent-event-style frames: `data: <json>` lines
/// separated by blank lines, terminated by `data: [DONE]`. Frames may be
/// split across network chunks, so bytes are buffered until a complete
/// frame is available.
pub struct ChatStream {
    stream: ByteStream,
    buffer: String,
    done: bool,
}

impl ChatStream {
    fn from_response(response: Response) -> Self {
        Self::from_stream(response.bytes_stream())
    }

    fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = reqwest::Result<bytes::Bytes>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
            buffer: String::new(),
            done: false,
        }
    }

    /// The next chunk of the reply, or `None` once the stream is finished
    pub async fn next_chunk(&mut self) -> Result<Option<ChatChunk>, Error> {
        if self.done {
            return Ok(None);
        }

        loop {
            // Consume complete frames already buffered before reading more.
            while let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                for line in frame.lines() {
                    let Some(data) = line.strip_prefix("data:") else {
                        // Comment and keepalive lines carry no payload.
                        continue;
                    };
                    let data = data.trim_start();
                    if data == "[DONE]" {
                        self.done = true;
                        return Ok(None);
                    }
                    let chunk: ChatChunk = serde_json::from_str(data)?;
                    return Ok(Some(chunk));
                }
            }

            match self.stream.next().await {
                Some(bytes) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes?));
                }
                None => {
                    self.done = true;
                    return Ok(None);
                }
            }
        }
    }

    /// Drain the stream and return the assembled reply text
    pub async fn collect_text(&mut self) -> Result<String, Error> {
        let mut text = String::new();
        while let Some(chunk) = self.next_chunk().await? {
            text.push_str(&chunk.delta);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chat_stream(frames: Vec<&str>) -> ChatStream {
        let items: Vec<reqwest::Result<bytes::Bytes>> = frames
            .into_iter()
            .map(|s| Ok(bytes::Bytes::from(s.as_bytes().to_vec())))
            .collect();
        ChatStream::from_stream(stream::iter(items))
    }

    #[tokio::test]
    async fn reassembles_frames_split_across_chunks() {
        let mut stream = chat_stream(vec![
            "data: {\"del",
            "ta\": \"Hel\"}\n\ndata: {\"delta\": \"lo\"}\n\n",
            "data: [DONE]\n\n",
        ]);

        assert_eq!(stream.next_chunk().await.unwrap().unwrap().delta, "Hel");
        assert_eq!(stream.next_chunk().await.unwrap().unwrap().delta, "lo");
        assert!(stream.next_chunk().await.unwrap().is_none());
        // The stream stays finished.
        assert!(stream.next_chunk().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn keepalive_lines_are_skipped() {
        let mut stream = chat_stream(vec![
            ": ping\n\ndata: {\"delta\": \"a\"}\n\ndata: [DONE]\n\n",
        ]);

        assert_eq!(stream.next_chunk().await.unwrap().unwrap().delta, "a");
        assert!(stream.next_chunk().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ending_without_done_marker_finishes_cleanly() {
        let mut stream = chat_stream(vec!["data: {\"delta\": \"only\"}\n\n"]);

        assert_eq!(stream.next_chunk().await.unwrap().unwrap().delta, "only");
        assert!(stream.next_chunk().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collect_text_assembles_the_full_reply() {
        let mut stream = chat_stream(vec![
            "data: {\"delta\": \"Post \"}\n\ndata: {\"delta\": \"idea\"}\n\ndata: [DONE]\n\n",
        ]);

        assert_eq!(stream.collect_text().await.unwrap(), "Post idea");
    }
}
