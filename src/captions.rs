use tracing::{info, warn};

use crate::backends::TextCompletion;

/// Opening/closing phrases from the AI step. Either side may be absent;
/// callers keep their own text in that case.
#[derive(Debug, Clone, Default)]
pub struct CaptionPair {
    pub opening: Option<String>,
    pub closing: Option<String>,
}

fn caption_prompt(prompt: &str) -> String {
    format!(
        "Given the Maha Shivaratri prompt: '{prompt}', generate two short, cinematic phrases. \
         1. An opening title (max 6 words). \
         2. A closing message (max 5 words). \
         Format as: Opening: [text] | Closing: [text]"
    )
}

/// Splits a completion reply on the `|` delimiter and strips the label
/// prefixes. A reply without `|` is unparsable, never a partial success;
/// anything past the second segment is ignored.
pub fn parse_caption_reply(reply: &str) -> Option<(String, String)> {
    if !reply.contains('|') {
        return None;
    }
    let mut parts = reply.split('|');
    let opening = parts.next()?.replace("Opening:", "");
    let closing = parts.next()?.replace("Closing:", "");
    Some((opening.trim().to_owned(), closing.trim().to_owned()))
}

/// Asks each configured backend in turn for an opening/closing caption pair.
/// Backend and parse failures are logged and absorbed; total failure returns
/// an empty pair so the caller keeps its defaults.
pub fn generate_captions(backends: &[Box<dyn TextCompletion>], prompt: &str) -> CaptionPair {
    let request = caption_prompt(prompt);

    for backend in backends {
        match backend.complete(None, &request) {
            Ok(reply) => match parse_caption_reply(&reply) {
                Some((opening, closing)) => {
                    info!("{} produced caption pair", backend.name());
                    return CaptionPair {
                        opening: Some(opening),
                        closing: Some(closing),
                    };
                }
                None => {
                    warn!(
                        "{} reply is missing the '|' delimiter, trying next backend",
                        backend.name()
                    );
                }
            },
            Err(error) => {
                warn!("{} caption request failed: {error:#}", backend.name());
            }
        }
    }

    CaptionPair::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};

    struct CannedBackend {
        name: &'static str,
        reply: Result<&'static str, &'static str>,
    }

    impl TextCompletion for CannedBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        fn complete(&self, _system: Option<&str>, _user: &str) -> Result<String> {
            match self.reply {
                Ok(text) => Ok(text.to_owned()),
                Err(message) => bail!("{message}"),
            }
        }
    }

    fn boxed(backend: CannedBackend) -> Box<dyn TextCompletion> {
        Box::new(backend)
    }

    #[test]
    fn parses_labelled_delimited_reply() {
        let (opening, closing) =
            parse_caption_reply("Opening: Rise, O Shiva | Closing: Peace Eternal")
                .expect("reply should parse");
        assert_eq!(opening, "Rise, O Shiva");
        assert_eq!(closing, "Peace Eternal");
    }

    #[test]
    fn reply_without_delimiter_is_unparsable() {
        assert!(parse_caption_reply("Rise, O Shiva. Peace Eternal.").is_none());
        assert!(parse_caption_reply("").is_none());
    }

    #[test]
    fn extra_delimiters_only_use_first_two_segments() {
        let (opening, closing) =
            parse_caption_reply("Opening: A | Closing: B | stray trailing | text")
                .expect("reply should parse");
        assert_eq!(opening, "A");
        assert_eq!(closing, "B");
    }

    #[test]
    fn falls_back_to_second_backend_on_error() {
        let backends = vec![
            boxed(CannedBackend {
                name: "primary",
                reply: Err("connection refused"),
            }),
            boxed(CannedBackend {
                name: "secondary",
                reply: Ok("Opening: Dawn | Closing: Dusk"),
            }),
        ];
        let pair = generate_captions(&backends, "a festival");
        assert_eq!(pair.opening.as_deref(), Some("Dawn"));
        assert_eq!(pair.closing.as_deref(), Some("Dusk"));
    }

    #[test]
    fn falls_back_when_primary_reply_is_unparsable() {
        let backends = vec![
            boxed(CannedBackend {
                name: "primary",
                reply: Ok("no delimiter here"),
            }),
            boxed(CannedBackend {
                name: "secondary",
                reply: Ok("Opening: Dawn | Closing: Dusk"),
            }),
        ];
        let pair = generate_captions(&backends, "a festival");
        assert_eq!(pair.opening.as_deref(), Some("Dawn"));
    }

    #[test]
    fn total_failure_returns_empty_pair() {
        let backends = vec![boxed(CannedBackend {
            name: "primary",
            reply: Err("boom"),
        })];
        let pair = generate_captions(&backends, "a festival");
        assert!(pair.opening.is_none());
        assert!(pair.closing.is_none());

        let pair = generate_captions(&[], "a festival");
        assert!(pair.opening.is_none());
        assert!(pair.closing.is_none());
    }
}
