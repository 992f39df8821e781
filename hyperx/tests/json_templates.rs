//! Integration tests for JSON template rendering
//!
//! Drives the interceptor the way a page would: page load, request,
//! response.

use hyperx::jrx::{JsonInterceptor, JsonRenderer, RenderCase, ResponseEvent, SwapDecision, TemplateStore};
use hyperx::template::Fragment;
use serde_json::json;

const PAGE: &str = r#"
<main>
  <ul id="users" hx-get="/api/users">
    <template>
      <li>{{ name }} ({{ address.city }})</li>
      <li hx-if="empty">No users</li>
      <li hx-if="error">Failed</li>
    </template>
  </ul>
</main>
"#;

fn respond<'a>(body: &'a str) -> ResponseEvent<'a> {
    ResponseEvent {
        target_id: "users",
        content_type: Some("application/json; charset=utf-8"),
        body,
    }
}

/// An array renders the main branch once per item
#[test]
fn test_array_rendered_per_item() {
    let interceptor = JsonInterceptor::new(TemplateStore::new());
    let mut page = Fragment::parse(PAGE);

    let rendered = interceptor
        .try_after_on_load(
            &mut page,
            &respond(r#"[{"name":"Ada","address":{"city":"London"}},{"name":"Alan"}]"#),
        )
        .unwrap()
        .unwrap();

    assert_eq!(rendered.case, RenderCase::Normal);
    assert_eq!(rendered.markup, "<li>Ada (London)</li><li>Alan ()</li>");

    let list = page.find_by_id("users").unwrap();
    assert_eq!(list.child_elements().filter(|el| el.tag == "li").count(), 2);
    assert_eq!(
        list.child_elements().last().unwrap().attr("style"),
        Some("display:none")
    );
}

/// An error object renders only the error branch
#[test]
fn test_error_payload_renders_failed_only() {
    let interceptor = JsonInterceptor::new(TemplateStore::new());
    let mut page = Fragment::parse(PAGE);

    let decision = interceptor.after_on_load(&mut page, &respond(r#"{"error":"not found"}"#));
    assert_eq!(decision, SwapDecision::SUPPRESS);

    let list = page.find_by_id("users").unwrap();
    let visible: Vec<_> = list.child_elements().filter(|el| !el.is_template()).collect();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].text_content(), "Failed");
}

/// An empty array renders the empty branch, and repeat renders still work
#[test]
fn test_empty_then_normal() {
    let interceptor = JsonInterceptor::new(TemplateStore::new());
    let mut page = Fragment::parse(PAGE);

    let first = interceptor.try_after_on_load(&mut page, &respond("[]")).unwrap().unwrap();
    assert_eq!(first.case, RenderCase::Empty);
    assert_eq!(first.markup, r#"<li hx-if="empty">No users</li>"#);

    let second = interceptor
        .try_after_on_load(&mut page, &respond(r#"{"name":"Grace"}"#))
        .unwrap()
        .unwrap();
    assert_eq!(second.markup, "<li>Grace ()</li>");
}

/// A template snapshot taken before the request survives a foreign swap
#[test]
fn test_store_restores_template_after_swap() {
    let interceptor = JsonInterceptor::new(TemplateStore::new());
    let page = Fragment::parse(PAGE);
    interceptor.page_loaded(&page);
    assert!(interceptor.before_request(&page, "users"));

    let mut swapped = Fragment::parse(r#"<main><ul id="users"><li>stale</li></ul></main>"#);
    let rendered = interceptor
        .try_after_on_load(&mut swapped, &respond(r#"[{"name":"Edsger"}]"#))
        .unwrap()
        .unwrap();
    assert_eq!(rendered.markup, "<li>Edsger ()</li>");
}

/// Non-JSON responses are left to the default swap
#[test]
fn test_html_passes_through() {
    let interceptor = JsonInterceptor::new(TemplateStore::new());
    let mut page = Fragment::parse(PAGE);
    let event = ResponseEvent {
        target_id: "users",
        content_type: Some("text/html"),
        body: "<li>server rendered</li>",
    };
    assert_eq!(interceptor.after_on_load(&mut page, &event), SwapDecision::SWAP);
}

/// Container mode on a detached element
#[test]
fn test_render_into_container() {
    let mut target = Fragment::parse(r#"<table><tbody id="rows"><template><tr><td>{{id}}</td></tr></template></tbody></table>"#)
        .find_by_id("rows")
        .unwrap()
        .clone();

    let rendered = JsonRenderer::new()
        .render(&mut target, &json!([{"id": 1}, {"id": 2}]))
        .unwrap();
    assert_eq!(rendered.markup, "<tr><td>1</td></tr><tr><td>2</td></tr>");
}
