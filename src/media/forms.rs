//! Request forms for the three upload commands

use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use url::form_urlencoded;

/// Upload command sent in the `command` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Init,
    Append,
    Finalize,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Init => "INIT",
            Command::Append => "APPEND",
            Command::Finalize => "FINALIZE",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A form body posted to `upload.json`
pub trait Form {
    fn command(&self) -> Command;

    /// Encode as `application/x-www-form-urlencoded`
    fn encode(&self) -> String;
}

/// INIT: declare media type and total size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitForm {
    pub media_type: String,
    pub total_bytes: u64,
}

impl InitForm {
    pub fn new(media_type: impl Into<String>, total_bytes: u64) -> Self {
        Self {
            media_type: media_type.into(),
            total_bytes,
        }
    }
}

impl Form for InitForm {
    fn command(&self) -> Command {
        Command::Init
    }

    fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("command", self.command().as_str())
            .append_pair("media_type", &self.media_type)
            .append_pair("total_bytes", &self.total_bytes.to_string())
            .finish()
    }
}

/// Segment bytes carried by an APPEND, exactly one of the two fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendPayload<'a> {
    /// Base64 text sent as `media_data`
    MediaData(String),
    /// Raw bytes sent as `media`
    Media(&'a [u8]),
}

impl<'a> AppendPayload<'a> {
    pub fn new(data: &'a [u8], use_base64: bool) -> Self {
        if use_base64 {
            AppendPayload::MediaData(STANDARD.encode(data))
        } else {
            AppendPayload::Media(data)
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            AppendPayload::MediaData(_) => "media_data",
            AppendPayload::Media(_) => "media",
        }
    }
}

/// APPEND: send one segment of the upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendForm<'a> {
    pub media_id: String,
    pub segment_index: String,
    pub payload: AppendPayload<'a>,
}

impl<'a> AppendForm<'a> {
    pub fn new(data: &'a [u8], media_id: impl Into<String>, index: u32, use_base64: bool) -> Self {
        Self {
            media_id: media_id.into(),
            segment_index: index.to_string(),
            payload: AppendPayload::new(data, use_base64),
        }
    }
}

impl Form for AppendForm<'_> {
    fn command(&self) -> Command {
        Command::Append
    }

    fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer
            .append_pair("command", self.command().as_str())
            .append_pair("media_id", &self.media_id)
            .append_pair("segment_index", &self.segment_index);

        let field = self.payload.field_name();
        match &self.payload {
            AppendPayload::MediaData(encoded) => {
                serializer.append_pair(field, encoded);
                serializer.finish()
            }
            AppendPayload::Media(bytes) => {
                // append_pair only takes &str, raw bytes go through the byte serializer
                let mut body = serializer.finish();
                body.push('&');
                body.push_str(field);
                body.push('=');
                body.extend(form_urlencoded::byte_serialize(bytes));
                body
            }
        }
    }
}

/// FINALIZE: close the upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeForm {
    pub media_id: String,
}

impl FinalizeForm {
    pub fn new(media_id: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
        }
    }
}

impl Form for FinalizeForm {
    fn command(&self) -> Command {
        Command::Finalize
    }

    fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("command", self.command().as_str())
            .append_pair("media_id", &self.media_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(body.as_bytes()).into_owned().collect()
    }

    #[test]
    fn test_init_form_encoding() {
        let body = InitForm::new("image/jpeg", 11065).encode();
        assert_eq!(body, "command=INIT&media_type=image%2Fjpeg&total_bytes=11065");
    }

    #[test]
    fn test_append_form_base64() {
        let form = AppendForm::new(b"hello world", "710511363345354753", 3, true);
        assert_eq!(form.payload.field_name(), "media_data");

        let pairs = decode(&form.encode());
        assert_eq!(
            pairs,
            vec![
                ("command".to_string(), "APPEND".to_string()),
                ("media_id".to_string(), "710511363345354753".to_string()),
                ("segment_index".to_string(), "3".to_string()),
                ("media_data".to_string(), "aGVsbG8gd29ybGQ=".to_string()),
            ]
        );
    }

    #[test]
    fn test_append_form_raw_bytes() {
        let data = [0xffu8, 0xd8, 0x00, b' ', b'&'];
        let form = AppendForm::new(&data, "42", 0, false);
        assert_eq!(form.payload, AppendPayload::Media(&data));

        let body = form.encode();
        assert_eq!(
            body,
            "command=APPEND&media_id=42&segment_index=0&media=%FF%D8%00+%26"
        );
        assert!(!body.contains("media_data"));
    }

    #[test]
    fn test_segment_index_is_decimal() {
        for index in [0u32, 7, 10, 999, u32::MAX] {
            let form = AppendForm::new(b"x", "1", index, true);
            assert_eq!(form.segment_index, index.to_string());
            assert!(form.encode().contains(&format!("segment_index={}&", index)));
        }
    }

    #[test]
    fn test_finalize_form_encoding() {
        assert_eq!(FinalizeForm::new("42").encode(), "command=FINALIZE&media_id=42");
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::Init.to_string(), "INIT");
        assert_eq!(Command::Append.as_str(), "APPEND");
        assert_eq!(FinalizeForm::new("1").command(), Command::Finalize);
    }
}
