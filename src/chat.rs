use anyhow::{bail, Result};
use tracing::warn;

use crate::backends::TextCompletion;

/// Fixed persona sent as the system instruction with every chat message.
pub const PERSONA: &str = "You are the 'Shivaratri Video Assistant'. Help the user create a \
                           cinematic video. Keep responses spiritual, helpful, and concise \
                           (max 3 sentences).";

/// Forwards one user message to the first backend that answers and returns
/// the reply verbatim. An empty message and a missing credential are hard
/// errors, unlike the caption provider.
pub fn reply(backends: &[Box<dyn TextCompletion>], message: &str) -> Result<String> {
    let message = message.trim();
    if message.is_empty() {
        bail!("no message provided");
    }
    if backends.is_empty() {
        bail!("no AI backend configured: set OPENROUTER_API_KEY or GEMINI_API_KEY");
    }

    for backend in backends {
        match backend.complete(Some(PERSONA), message) {
            Ok(text) => return Ok(text),
            Err(error) => warn!("{} chat request failed: {error:#}", backend.name()),
        }
    }

    bail!("all configured AI backends failed to reply");
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct CannedBackend {
        reply: Result<&'static str, &'static str>,
        expects_persona: bool,
    }

    impl TextCompletion for CannedBackend {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn complete(&self, system: Option<&str>, _user: &str) -> Result<String> {
            if self.expects_persona {
                assert_eq!(system, Some(PERSONA));
            }
            match self.reply {
                Ok(text) => Ok(text.to_owned()),
                Err(message) => bail!("{message}"),
            }
        }
    }

    #[test]
    fn empty_message_is_an_input_error() {
        let backends: Vec<Box<dyn TextCompletion>> = vec![Box::new(CannedBackend {
            reply: Ok("ignored"),
            expects_persona: false,
        })];
        let error = reply(&backends, "   ").expect_err("blank message should fail");
        assert!(error.to_string().contains("no message provided"));
    }

    #[test]
    fn missing_credentials_are_a_configuration_error() {
        let error = reply(&[], "namaste").expect_err("no backends should fail");
        assert!(error.to_string().contains("no AI backend configured"));
    }

    #[test]
    fn first_successful_backend_wins() {
        let backends: Vec<Box<dyn TextCompletion>> = vec![
            Box::new(CannedBackend {
                reply: Err("timeout"),
                expects_persona: true,
            }),
            Box::new(CannedBackend {
                reply: Ok("Om Namah Shivaya."),
                expects_persona: true,
            }),
        ];
        let text = reply(&backends, "hello").expect("second backend should answer");
        assert_eq!(text, "Om Namah Shivaya.");
    }

    #[test]
    fn exhausted_backends_propagate_an_error() {
        let backends: Vec<Box<dyn TextCompletion>> = vec![Box::new(CannedBackend {
            reply: Err("boom"),
            expects_persona: true,
        })];
        let error = reply(&backends, "hello").expect_err("should fail");
        assert!(error.to_string().contains("all configured AI backends"));
    }
}
