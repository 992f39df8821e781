//! Response interception for JSON payloads
//!
//! The host forwards three signals: page load, request about to be sent,
//! and response received. JSON responses are rendered through templates and
//! the library's own swap is suppressed; everything else passes through.

use serde_json::Value;

use super::renderer::{JsonRenderer, Rendered};
use super::store::TemplateStore;
use super::JrxError;
use crate::template::Fragment;

/// Media type that marks a response for template rendering
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A response as seen by the interceptor
#[derive(Debug, Clone, Copy)]
pub struct ResponseEvent<'a> {
    /// Id of the element the response targets
    pub target_id: &'a str,
    /// `Content-Type` response header
    pub content_type: Option<&'a str>,
    /// Raw response body
    pub body: &'a str,
}

/// Whether the request library should perform its default swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapDecision {
    /// `false` once the response has been rendered here
    pub should_swap: bool,
}

impl SwapDecision {
    /// Let the library swap as usual
    pub const SWAP: Self = Self { should_swap: true };

    /// The response was handled; skip the default swap
    pub const SUPPRESS: Self = Self { should_swap: false };
}

/// Renders JSON responses into their targets' templates
#[derive(Debug, Clone, Default)]
pub struct JsonInterceptor {
    renderer: JsonRenderer,
    store: TemplateStore,
}

impl JsonInterceptor {
    /// Create an interceptor backed by `store`
    #[must_use]
    pub fn new(store: TemplateStore) -> Self {
        Self {
            renderer: JsonRenderer::new(),
            store,
        }
    }

    /// Replace the renderer
    #[must_use]
    pub fn with_renderer(mut self, renderer: JsonRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// The template store
    #[must_use]
    pub const fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Whether a `Content-Type` header announces JSON
    #[must_use]
    pub fn is_json(content_type: Option<&str>) -> bool {
        content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_CONTENT_TYPE))
    }

    /// Snapshot the page's named templates
    pub fn page_loaded(&self, page: &Fragment) -> usize {
        let stored = self.store.scan(page);
        tracing::info!(templates = stored, "JSON rendering enabled");
        stored
    }

    /// Snapshot the template a request's target will need
    pub fn before_request(&self, page: &Fragment, target_id: &str) -> bool {
        self.store.capture_before_request(page, target_id)
    }

    /// Handle a response, rendering it when it carries JSON
    ///
    /// Failures are logged and leave the default swap in place.
    pub fn after_on_load(&self, page: &mut Fragment, event: &ResponseEvent<'_>) -> SwapDecision {
        match self.try_after_on_load(page, event) {
            Ok(Some(rendered)) => {
                tracing::debug!(target = event.target_id, case = ?rendered.case, "Rendered JSON response");
                SwapDecision::SUPPRESS
            }
            Ok(None) => SwapDecision::SWAP,
            Err(JrxError::Parse(err)) => {
                tracing::error!(target = event.target_id, error = %err, "JSON parse error");
                SwapDecision::SWAP
            }
            Err(err) => {
                tracing::warn!(
                    target = event.target_id,
                    error = %err,
                    "No template or render target found, letting htmx handle the response"
                );
                SwapDecision::SWAP
            }
        }
    }

    /// Handle a response, reporting why it was not rendered
    ///
    /// Returns `Ok(None)` for non-JSON responses.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON, the target does not
    /// exist, or no template applies.
    pub fn try_after_on_load(
        &self,
        page: &mut Fragment,
        event: &ResponseEvent<'_>,
    ) -> Result<Option<Rendered>, JrxError> {
        if !Self::is_json(event.content_type) {
            return Ok(None);
        }
        let json: Value = serde_json::from_str(event.body)?;
        self.renderer
            .render_response(page, event.target_id, &json, &self.store)
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event<'a>(content_type: Option<&'a str>, body: &'a str) -> ResponseEvent<'a> {
        ResponseEvent {
            target_id: "users",
            content_type,
            body,
        }
    }

    #[test]
    fn test_is_json() {
        assert!(JsonInterceptor::is_json(Some("application/json")));
        assert!(JsonInterceptor::is_json(Some("Application/JSON; charset=utf-8")));
        assert!(!JsonInterceptor::is_json(Some("text/html")));
        assert!(!JsonInterceptor::is_json(None));
    }

    #[test]
    fn test_json_response_is_rendered_and_swap_suppressed() {
        let interceptor = JsonInterceptor::default();
        let mut page = Fragment::parse(r#"<ul id="users"><template><li>{{name}}</li></template></ul>"#);

        let decision = interceptor.after_on_load(&mut page, &event(Some("application/json"), r#"[{"name":"Ada"}]"#));
        assert_eq!(decision, SwapDecision::SUPPRESS);
        assert!(page.to_html().starts_with(r#"<ul id="users"><li>Ada</li>"#));
    }

    #[test]
    fn test_html_response_passes_through() {
        let interceptor = JsonInterceptor::default();
        let mut page = Fragment::parse(r#"<ul id="users"><template><li>{{name}}</li></template></ul>"#);
        let before = page.clone();

        let decision = interceptor.after_on_load(&mut page, &event(Some("text/html"), "<li>x</li>"));
        assert_eq!(decision, SwapDecision::SWAP);
        assert_eq!(page, before);
    }

    #[test]
    fn test_parse_failure_keeps_default_swap() {
        let interceptor = JsonInterceptor::default();
        let mut page = Fragment::parse(r#"<ul id="users"><template><li>{{name}}</li></template></ul>"#);

        assert!(matches!(
            interceptor.try_after_on_load(&mut page, &event(Some("application/json"), "{oops")),
            Err(JrxError::Parse(_))
        ));
        assert_eq!(
            interceptor.after_on_load(&mut page, &event(Some("application/json"), "{oops")),
            SwapDecision::SWAP
        );
    }

    #[test]
    fn test_missing_template_keeps_default_swap() {
        let interceptor = JsonInterceptor::default();
        let mut page = Fragment::parse(r#"<ul id="users"></ul>"#);
        assert_eq!(
            interceptor.after_on_load(&mut page, &event(Some("application/json"), "[]")),
            SwapDecision::SWAP
        );
    }

    #[test]
    fn test_store_survives_replacement() {
        let interceptor = JsonInterceptor::default();
        let page = Fragment::parse(r#"<ul id="users"><template><li>{{name}}</li></template></ul>"#);
        assert!(interceptor.before_request(&page, "users"));

        let mut replaced = Fragment::parse(r#"<ul id="users"><li>stale</li></ul>"#);
        let rendered = interceptor
            .try_after_on_load(&mut replaced, &event(Some("application/json"), r#"{"name":"Grace"}"#))
            .unwrap()
            .unwrap();
        assert_eq!(rendered.markup, "<li>Grace</li>");
    }
}
