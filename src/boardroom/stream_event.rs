//! Events pushed to the consumer of a discussion run, and their SSE framing.
//!
//! Each event is framed as `event: <type>\ndata: <payload>\n\n`. Newlines inside the
//! payload are written as the two characters `\n` so one blank line always ends one event.

use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Progress narration.
    Status(String),
    /// A complete coordinator message.
    Message { sender: String, content: String },
    /// A speaker is about to stream its answer.
    StreamStart { sender: String },
    /// One fragment of the current speaker's answer.
    StreamChunk { token: String },
    StreamEnd,
    /// The synthesized report. Always the last event of a run.
    Finished(String),
}

impl StreamEvent {
    /// SSE `event:` name.
    pub fn event_type(&self) -> &'static str {
        match self {
            StreamEvent::Status(_) => "status",
            StreamEvent::Message { .. } => "message",
            StreamEvent::StreamStart { .. } => "stream_start",
            StreamEvent::StreamChunk { .. } => "stream_chunk",
            StreamEvent::StreamEnd => "stream_end",
            StreamEvent::Finished(_) => "finished",
        }
    }

    /// Unescaped `data:` payload.
    pub fn data(&self) -> String {
        match self {
            StreamEvent::Status(text) | StreamEvent::Finished(text) => text.clone(),
            StreamEvent::Message { sender, content } => {
                json!({ "sender": sender, "content": content, "type": "pm" }).to_string()
            }
            StreamEvent::StreamStart { sender } => {
                json!({ "sender": sender, "type": "agent" }).to_string()
            }
            StreamEvent::StreamChunk { token } => json!({ "token": token }).to_string(),
            StreamEvent::StreamEnd => String::new(),
        }
    }

    pub fn to_sse(&self) -> String {
        format!(
            "event: {}\ndata: {}\n\n",
            self.event_type(),
            self.data().replace('\n', "\\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_newlines_are_escaped() {
        let event = StreamEvent::Finished("# Plan\n- step".to_string());
        assert_eq!(event.to_sse(), "event: finished\ndata: # Plan\\n- step\n\n");
    }

    #[test]
    fn message_payload_is_json() {
        let event = StreamEvent::Message {
            sender: "PM".to_string(),
            content: "hi".to_string(),
        };
        let frame = event.to_sse();
        let data = frame
            .strip_prefix("event: message\ndata: ")
            .and_then(|rest| rest.strip_suffix("\n\n"))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(data).unwrap();
        assert_eq!(value["sender"], "PM");
        assert_eq!(value["content"], "hi");
        assert_eq!(value["type"], "pm");
    }

    #[test]
    fn chunk_with_newline_stays_one_frame() {
        let event = StreamEvent::StreamChunk {
            token: "a\nb".to_string(),
        };
        let frame = event.to_sse();
        assert_eq!(frame.matches("\n\n").count(), 1);
        assert!(frame.ends_with("\n\n"));
    }

    #[test]
    fn stream_end_has_empty_data() {
        assert_eq!(StreamEvent::StreamEnd.to_sse(), "event: stream_end\ndata: \n\n");
    }

    #[test]
    fn stream_start_payload() {
        let event = StreamEvent::StreamStart {
            sender: "CFO".to_string(),
        };
        assert_eq!(event.data(), r#"{"sender":"CFO","type":"agent"}"#);
    }
}
