//! Text-to-speech for reading a summary aloud.

use anyhow::{Context as _, Result, anyhow};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use tracing::info;

/// The translate endpoint rejects longer `q` values.
pub const MAX_CHUNK_CHARS: usize = 100;

#[derive(Debug, Clone, Default)]
pub enum AudioFormat {
    #[default]
    Mp3,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TtsRequest {
    pub text: String,
    pub lang: String,
    pub format: AudioFormat,
}

impl TtsRequest {
    pub fn new(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: lang.into(),
            format: AudioFormat::Mp3,
        }
    }
}

/// Returns raw audio bytes.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes>;
}

/// The Google Translate speech endpoint, one request per text chunk.
pub struct GoogleTranslateTts {
    client: Client,
    base_url: String,
}

impl GoogleTranslateTts {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TtsProvider for GoogleTranslateTts {
    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes> {
        let chunks = split_text(&req.text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(anyhow!("No text to speak"));
        }

        info!(
            "[TTS] Synthesizing {} chars in {} chunks (lang={})",
            req.text.chars().count(),
            chunks.len(),
            req.lang
        );

        let url = format!("{}/translate_tts", self.base_url);
        let total = chunks.len().to_string();
        let mut audio = BytesMut::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self
                .client
                .get(&url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", req.lang.as_str()),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.to_string().as_str()),
                    ("textlen", chunk.chars().count().to_string().as_str()),
                ])
                .send()
                .await
                .with_context(|| format!("TTS request for chunk {} failed", idx))?
                .error_for_status()?
                .bytes()
                .await?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio.freeze())
    }
}

/// Split on whitespace into chunks of at most `max_chars` characters.
/// A single word longer than the limit is cut into pieces.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            chunks.extend(chars.chunks(max_chars).map(|piece| piece.iter().collect()));
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_split_respects_limit_and_order() {
        let text = "one two three four five six seven";
        let chunks = split_text(text, 10);
        assert_eq!(chunks, vec!["one two", "three four", "five six", "seven"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_split_cuts_long_words() {
        let chunks = split_text("a abcdefghijkl b", 5);
        assert_eq!(chunks, vec!["a", "abcde", "fghij", "kl", "b"]);
    }

    #[test]
    fn test_split_empty_text() {
        assert!(split_text("  \n ", 100).is_empty());
    }

    #[tokio::test]
    async fn test_synthesize_concatenates_chunks() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/translate_tts")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("idx".into(), "0".into()),
                Matcher::UrlEncoded("total".into(), "2".into()),
                Matcher::UrlEncoded("tl".into(), "en".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body([0xAAu8, 0xAA])
            .create_async()
            .await;
        let second = server
            .mock("GET", "/translate_tts")
            .match_query(Matcher::UrlEncoded("idx".into(), "1".into()))
            .with_status(200)
            .with_body([0xBBu8])
            .create_async()
            .await;

        let tts = GoogleTranslateTts::new(Client::new(), server.url());
        let text = format!("{} {}", "a".repeat(90), "b".repeat(30));
        let audio = tts.synthesize(TtsRequest::new(text, "en")).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(audio.as_ref(), &[0xAA, 0xAA, 0xBB]);
    }

    #[tokio::test]
    async fn test_synthesize_fails_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/translate_tts")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let tts = GoogleTranslateTts::new(Client::new(), server.url());
        let err = tts
            .synthesize(TtsRequest::new("hello", "en"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_synthesize_rejects_empty_text() {
        let tts = GoogleTranslateTts::new(Client::new(), "http://127.0.0.1:1");
        assert!(tts.synthesize(TtsRequest::new("   ", "en")).await.is_err());
    }
}
