//! BoxReplyGenerator -- object-safe dynamic dispatch wrapper for ReplyGenerator.
//!
//! 1. `ReplyGeneratorDyn` is the object-safe twin with boxed futures
//! 2. It is blanket-implemented for every `T: ReplyGenerator`
//! 3. `BoxReplyGenerator` wraps `Box<dyn ReplyGeneratorDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use wabridge_types::assistant::AssistantError;
use wabridge_types::session::UserId;

use super::ReplyGenerator;

/// Object-safe version of [`ReplyGenerator`] with boxed futures.
pub trait ReplyGeneratorDyn: Send + Sync {
    fn is_enabled(&self) -> bool;

    fn generate_response_boxed<'a>(
        &'a self,
        text: &'a str,
        user_id: &'a UserId,
        display_name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AssistantError>> + Send + 'a>>;
}

impl<T: ReplyGenerator> ReplyGeneratorDyn for T {
    fn is_enabled(&self) -> bool {
        ReplyGenerator::is_enabled(self)
    }

    fn generate_response_boxed<'a>(
        &'a self,
        text: &'a str,
        user_id: &'a UserId,
        display_name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AssistantError>> + Send + 'a>> {
        Box::pin(self.generate_response(text, user_id, display_name))
    }
}

/// Type-erased reply generator, chosen once at startup.
///
/// Lets the application hold either an `AssistantResponder` over concrete
/// infrastructure types or a `FallbackResponder` in the same field.
pub struct BoxReplyGenerator {
    inner: Box<dyn ReplyGeneratorDyn + Send + Sync>,
}

impl BoxReplyGenerator {
    pub fn new<T: ReplyGenerator + 'static>(generator: T) -> Self {
        Self {
            inner: Box::new(generator),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    pub async fn generate_response(
        &self,
        text: &str,
        user_id: &UserId,
        display_name: &str,
    ) -> Result<String, AssistantError> {
        self.inner
            .generate_response_boxed(text, user_id, display_name)
            .await
    }
}
