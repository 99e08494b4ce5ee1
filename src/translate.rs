//! Translation lookups for the phrase on screen.
//!
//! A lookup never runs on the UI thread: [`TranslationDesk::request`] hands
//! the text to a worker thread and the single [`TranslationReply`] comes back
//! over a channel, tagged with the generation it was requested for.

use reqwest::blocking::Client;
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected translation response: {0}")]
    UnexpectedResponse(String),

    #[error("translation is turned off")]
    Disabled,
}

pub trait Translator: Send + Sync + 'static {
    fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, TranslationError>;
}

/// Client for the public Google Translate endpoint used by browser widgets
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(timeout: Duration) -> Result<Self, TranslationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: GOOGLE_ENDPOINT.to_string(),
        })
    }
}

impl Translator for GoogleTranslator {
    fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("dt", "t"),
                ("sl", source),
                ("tl", target),
                ("q", text),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        parse_google_reply(&body)
    }
}

/// Join the translated segments of a `translate_a/single` reply.
///
/// The reply is a nested array whose first element lists
/// `[translated, original, ...]` segments.
pub fn parse_google_reply(body: &str) -> Result<String, TranslationError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TranslationError::UnexpectedResponse(e.to_string()))?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::UnexpectedResponse("missing segment list".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(TranslationError::UnexpectedResponse(
            "empty translation".into(),
        ));
    }
    Ok(translated.trim().to_string())
}

/// Result of one lookup, handed back to the UI thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationReply {
    pub generation: u64,
    pub text: Result<String, String>,
}

/// Runs lookups in the background and collects their replies
pub struct TranslationDesk {
    translator: Arc<dyn Translator>,
    source_lang: String,
    target_lang: String,
    tx: Sender<TranslationReply>,
    rx: Receiver<TranslationReply>,
}

impl TranslationDesk {
    pub fn new(
        translator: Arc<dyn Translator>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            translator,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            tx,
            rx,
        }
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// Fire and forget; the reply shows up in [`TranslationDesk::try_recv`]
    pub fn request(&self, text: &str, generation: u64) {
        let translator = Arc::clone(&self.translator);
        let tx = self.tx.clone();
        let text = text.to_owned();
        let source = self.source_lang.clone();
        let target = self.target_lang.clone();

        log::info!("translating {text:?} ({source} -> {target}), generation {generation}");
        thread::spawn(move || {
            let text = match translator.translate(&text, &source, &target) {
                Ok(translated) => Ok(translated),
                Err(e) => {
                    log::warn!("translation of {text:?} failed: {e}");
                    Err(e.to_string())
                }
            };
            // receiver gone means the app quit
            let _ = tx.send(TranslationReply { generation, text });
        });
    }

    pub fn try_recv(&self) -> Option<TranslationReply> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<TranslationReply, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Echo;

    impl Translator for Echo {
        fn translate(
            &self,
            text: &str,
            source: &str,
            target: &str,
        ) -> Result<String, TranslationError> {
            Ok(format!("{source}->{target}: {text}"))
        }
    }

    struct Offline;

    impl Translator for Offline {
        fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, TranslationError> {
            Err(TranslationError::UnexpectedResponse("offline".into()))
        }
    }

    #[test]
    fn parses_multi_segment_reply() {
        let body = r#"[[["Я нічого ","nu știu ",null,null,10],["не знаю","nimic",null,null,10]],null,"ro"]"#;
        assert_eq!(parse_google_reply(body).unwrap(), "Я нічого не знаю");
    }

    #[test]
    fn rejects_garbage_reply() {
        assert_matches!(
            parse_google_reply("<html>"),
            Err(TranslationError::UnexpectedResponse(_))
        );
        assert_matches!(
            parse_google_reply("[null]"),
            Err(TranslationError::UnexpectedResponse(_))
        );
        assert_matches!(
            parse_google_reply("[[]]"),
            Err(TranslationError::UnexpectedResponse(_))
        );
    }

    #[test]
    fn desk_delivers_reply_with_generation() {
        let desk = TranslationDesk::new(Arc::new(Echo), "ro", "uk");
        desk.request("o zi buna", 4);

        let reply = desk.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(reply.generation, 4);
        assert_eq!(reply.text, Ok("ro->uk: o zi buna".to_string()));
    }

    #[test]
    fn desk_turns_failures_into_text() {
        let desk = TranslationDesk::new(Arc::new(Offline), "ro", "uk");
        desk.request("ce mai faci", 1);

        let reply = desk.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(
            reply.text,
            Err("unexpected translation response: offline".to_string())
        );
    }

    #[test]
    fn try_recv_is_empty_without_requests() {
        let desk = TranslationDesk::new(Arc::new(Echo), "ro", "uk");
        assert!(desk.try_recv().is_none());
        assert_eq!(desk.target_lang(), "uk");
    }
}
