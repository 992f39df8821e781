//! Rendering JSON payloads through `<template>` elements

use serde_json::Value;
use std::sync::Arc;

use super::classify::{classify, Branches, RenderCase};
use super::store::TemplateStore;
use super::JrxError;
use crate::template::{Element, Fragment, Interpolator, Node, PlaceholderInterpolator};

/// Class given to the container inserted in front of a template target
pub const CONTAINER_CLASS: &str = "jrx-container";

/// Where the template used for a render came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    /// The target itself is the template
    Target,
    /// A template inside the target
    Inline,
    /// `template[name=<target id>]`
    Named,
    /// `template[data-for=<target id>]`
    Referenced,
    /// A snapshot from the [`TemplateStore`]
    Stored,
}

/// Result of one render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Branch selected by the payload
    pub case: RenderCase,
    /// Markup inserted into the target, without the hidden template
    pub markup: String,
    /// Where the template came from
    pub source: TemplateSource,
}

/// Renders JSON into template-driven markup
#[derive(Clone)]
pub struct JsonRenderer {
    interpolator: Arc<dyn Interpolator>,
}

impl std::fmt::Debug for JsonRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRenderer").finish_non_exhaustive()
    }
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRenderer {
    /// Create a renderer with placeholder interpolation
    #[must_use]
    pub fn new() -> Self {
        Self {
            interpolator: Arc::new(PlaceholderInterpolator),
        }
    }

    /// Create a renderer with a custom interpolator
    #[must_use]
    pub const fn with_interpolator(interpolator: Arc<dyn Interpolator>) -> Self {
        Self { interpolator }
    }

    /// Render a template's branches against `json` into markup
    ///
    /// Arrays render the main branch once per item, each item being the
    /// data scope. Single values and the fallback branches render once
    /// against the whole payload.
    ///
    /// ```rust
    /// use hyperx::jrx::{JsonRenderer, RenderCase};
    /// use hyperx::template::Fragment;
    /// use serde_json::json;
    ///
    /// let page = Fragment::parse("<template><li>{{x}}</li><p hx-if=\"empty\">none</p></template>");
    /// let template = page.elements().next().unwrap();
    /// let renderer = JsonRenderer::new();
    ///
    /// let (case, markup) = renderer.render_template(template, &json!([{"x": 1}, {"x": 2}]));
    /// assert_eq!(case, RenderCase::Normal);
    /// assert_eq!(markup, "<li>1</li><li>2</li>");
    ///
    /// let (case, markup) = renderer.render_template(template, &json!([]));
    /// assert_eq!(case, RenderCase::Empty);
    /// assert_eq!(markup, "<p hx-if=\"empty\">none</p>");
    /// ```
    #[must_use]
    pub fn render_template(&self, template: &Element, json: &Value) -> (RenderCase, String) {
        let branches = Branches::partition(template);
        let case = classify(json);
        let nodes = branches.select(case);

        let markup = match (case, json) {
            (RenderCase::Normal, Value::Array(items)) => items
                .iter()
                .map(|item| self.render_nodes(nodes, item))
                .collect(),
            _ => self.render_nodes(nodes, json),
        };

        tracing::trace!(?case, nodes = nodes.len(), "Rendered template");
        (case, markup)
    }

    fn render_nodes(&self, nodes: &[Element], scope: &Value) -> String {
        nodes
            .iter()
            .map(|node| self.interpolator.interpolate(&node.outer_html(), scope))
            .collect()
    }

    /// Render into a container holding its own `<template>`
    ///
    /// The container's content is replaced by the rendered markup and the
    /// template is kept at the end, hidden, so later renders find it again.
    ///
    /// # Errors
    ///
    /// Returns [`JrxError::NoTemplate`] if the container holds no template.
    pub fn render(&self, target: &mut Element, json: &Value) -> Result<Rendered, JrxError> {
        let template = target
            .find_descendant(&Element::is_template)
            .cloned()
            .ok_or_else(|| JrxError::NoTemplate(describe(target)))?;

        let (case, markup) = self.render_template(&template, json);
        fill(target, &markup, Some(template));

        Ok(Rendered {
            case,
            markup,
            source: TemplateSource::Inline,
        })
    }

    /// Render a response for the element with id `target_id`
    ///
    /// The template is looked up in the target first, then by
    /// `template[name]`, then by `template[data-for]`, then in the store.
    /// When the target is itself a template, a `div.jrx-container` with the
    /// same id is inserted before it and receives the content, and the
    /// template is hidden.
    ///
    /// # Errors
    ///
    /// Returns [`JrxError::TargetNotFound`] if no element has the id and
    /// [`JrxError::NoTemplate`] if no template applies.
    pub fn render_response(
        &self,
        page: &mut Fragment,
        target_id: &str,
        json: &Value,
        store: &TemplateStore,
    ) -> Result<Rendered, JrxError> {
        let path = page
            .locate(&|el| el.id() == Some(target_id))
            .ok_or_else(|| JrxError::TargetNotFound(target_id.to_string()))?;
        let target = page
            .element_at_mut(&path)
            .ok_or_else(|| JrxError::TargetNotFound(target_id.to_string()))?;

        if target.is_template() {
            tracing::debug!(target = target_id, "Target is a template element");
            let (case, markup) = self.render_template(target, json);
            target.hide();

            let mut container = Element::new("div")
                .with_attr("id", target_id)
                .with_attr("class", CONTAINER_CLASS);
            fill(&mut container, &markup, None);

            let (siblings, idx) = page
                .siblings_at_mut(&path)
                .ok_or_else(|| JrxError::TargetNotFound(target_id.to_string()))?;
            siblings.insert(idx, Node::Element(container));

            return Ok(Rendered {
                case,
                markup,
                source: TemplateSource::Target,
            });
        }

        let (template, source) = find_template(page, target_id, store)
            .ok_or_else(|| JrxError::NoTemplate(format!("#{target_id}")))?;
        tracing::debug!(target = target_id, ?source, "Rendering JSON response");

        let (case, markup) = self.render_template(&template, json);
        let target = page
            .element_at_mut(&path)
            .ok_or_else(|| JrxError::TargetNotFound(target_id.to_string()))?;
        let keep = (source == TemplateSource::Inline).then_some(template);
        fill(target, &markup, keep);

        Ok(Rendered { case, markup, source })
    }
}

fn find_template(page: &Fragment, target_id: &str, store: &TemplateStore) -> Option<(Element, TemplateSource)> {
    if let Some(inline) = page
        .find_by_id(target_id)
        .and_then(|target| target.find_descendant(&Element::is_template))
    {
        return Some((inline.clone(), TemplateSource::Inline));
    }
    if let Some(named) = page.find(&|el| el.is_template() && el.attr("name") == Some(target_id)) {
        return Some((named.clone(), TemplateSource::Named));
    }
    if let Some(referenced) = page.find(&|el| el.is_template() && el.attr("data-for") == Some(target_id)) {
        return Some((referenced.clone(), TemplateSource::Referenced));
    }
    store.get(target_id).map(|stored| (stored, TemplateSource::Stored))
}

fn fill(target: &mut Element, markup: &str, hidden_template: Option<Element>) {
    target.set_inner_html(markup);
    if let Some(mut template) = hidden_template {
        template.hide();
        target.children.push(Node::Element(template));
    }
}

fn describe(element: &Element) -> String {
    element
        .id()
        .map_or_else(|| format!("<{}>", element.tag), |id| format!("#{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container(markup: &str) -> Element {
        Fragment::parse(markup).elements().next().unwrap().clone()
    }

    #[test]
    fn test_render_array_once_per_item() {
        let mut target = container(r#"<ul id="list"><template><li>{{ name }}</li></template></ul>"#);
        let rendered = JsonRenderer::new()
            .render(&mut target, &json!([{"name": "Ada"}, {"name": "Grace"}]))
            .unwrap();

        assert_eq!(rendered.case, RenderCase::Normal);
        assert_eq!(rendered.markup, "<li>Ada</li><li>Grace</li>");
        assert_eq!(
            target.inner_html(),
            r#"<li>Ada</li><li>Grace</li><template style="display:none"><li>{{ name }}</li></template>"#
        );
    }

    #[test]
    fn test_render_object_once() {
        let mut target = container(r#"<div><template><h1>{{user.name}}</h1><p>{{user.role}}</p></template></div>"#);
        let rendered = JsonRenderer::new()
            .render(&mut target, &json!({"user": {"name": "Ada"}}))
            .unwrap();
        assert_eq!(rendered.markup, "<h1>Ada</h1><p></p>");
    }

    #[test]
    fn test_render_error_branch_only() {
        let mut target = container(
            r#"<div><template><li>{{name}}</li><div hx-if="error">Failed</div><p hx-if="empty">None</p></template></div>"#,
        );
        let rendered = JsonRenderer::new()
            .render(&mut target, &json!({"error": "not found"}))
            .unwrap();
        assert_eq!(rendered.case, RenderCase::Error);
        assert_eq!(rendered.markup, r#"<div hx-if="error">Failed</div>"#);
    }

    #[test]
    fn test_fallback_sees_whole_payload() {
        let mut target = container(r#"<div><template><p hx-if="error">Oops: {{error}}</p></template></div>"#);
        let rendered = JsonRenderer::new()
            .render(&mut target, &json!({"error": "timeout"}))
            .unwrap();
        assert_eq!(rendered.markup, r#"<p hx-if="error">Oops: timeout</p>"#);
    }

    #[test]
    fn test_empty_without_fallback_renders_nothing() {
        let mut target = container(r"<div><template><li>{{name}}</li></template></div>");
        let rendered = JsonRenderer::new().render(&mut target, &json!([])).unwrap();
        assert_eq!(rendered.case, RenderCase::Empty);
        assert!(rendered.markup.is_empty());
        assert_eq!(target.child_elements().count(), 1);
    }

    #[test]
    fn test_repeat_render_reuses_hidden_template() {
        let mut target = container(r"<div><template><i>{{v}}</i></template></div>");
        let renderer = JsonRenderer::new();
        renderer.render(&mut target, &json!({"v": 1})).unwrap();
        renderer.render(&mut target, &json!({"v": 2})).unwrap();
        assert_eq!(
            target.inner_html(),
            r#"<i>2</i><template style="display:none"><i>{{v}}</i></template>"#
        );
    }

    #[test]
    fn test_render_without_template_fails() {
        let mut target = container(r#"<div id="x"><p>static</p></div>"#);
        assert!(matches!(
            JsonRenderer::new().render(&mut target, &json!({})),
            Err(JrxError::NoTemplate(what)) if what == "#x"
        ));
        assert_eq!(target.inner_html(), "<p>static</p>");
    }

    #[test]
    fn test_response_into_template_target_inserts_container() {
        let mut page = Fragment::parse(r#"<section><template id="users"><b>{{n}}</b></template></section>"#);
        let rendered = JsonRenderer::new()
            .render_response(&mut page, "users", &json!([{"n": 1}]), &TemplateStore::new())
            .unwrap();

        assert_eq!(rendered.source, TemplateSource::Target);
        assert_eq!(
            page.to_html(),
            r#"<section><div id="users" class="jrx-container"><b>1</b></div><template id="users" style="display:none"><b>{{n}}</b></template></section>"#
        );
    }

    #[test]
    fn test_response_lookup_order() {
        let store = TemplateStore::new();
        store.insert("feed", Element::new("template").with_attr("id", "feed"));
        let renderer = JsonRenderer::new();

        let mut page = Fragment::parse(
            r#"<div id="feed"></div><template data-for="feed"><q>{{t}}</q></template><template name="feed"><p>{{t}}</p></template>"#,
        );
        let rendered = renderer.render_response(&mut page, "feed", &json!({"t": "x"}), &store).unwrap();
        assert_eq!(rendered.source, TemplateSource::Named);
        assert_eq!(rendered.markup, "<p>x</p>");

        let mut page = Fragment::parse(r#"<div id="feed"></div><template data-for="feed"><q>{{t}}</q></template>"#);
        let rendered = renderer.render_response(&mut page, "feed", &json!({"t": "y"}), &store).unwrap();
        assert_eq!(rendered.source, TemplateSource::Referenced);

        let mut page = Fragment::parse(r#"<div id="feed"><span>old</span></div>"#);
        let rendered = renderer.render_response(&mut page, "feed", &json!({"t": "z"}), &store).unwrap();
        assert_eq!(rendered.source, TemplateSource::Stored);
        assert_eq!(page.to_html(), r#"<div id="feed"></div>"#);
    }

    #[test]
    fn test_response_restores_destroyed_inline_template_from_store() {
        let store = TemplateStore::new();
        let mut page = Fragment::parse(r#"<ul id="todo"><template><li>{{title}}</li></template></ul>"#);
        assert!(store.capture_before_request(&page, "todo"));

        // a swap elsewhere replaced the target's content
        page = Fragment::parse(r#"<ul id="todo"></ul>"#);
        let rendered = JsonRenderer::new()
            .render_response(&mut page, "todo", &json!([{"title": "a"}]), &store)
            .unwrap();
        assert_eq!(rendered.source, TemplateSource::Stored);
        assert_eq!(page.to_html(), r#"<ul id="todo"><li>a</li></ul>"#);
    }

    #[test]
    fn test_response_errors() {
        let renderer = JsonRenderer::new();
        let store = TemplateStore::new();
        let mut page = Fragment::parse(r#"<div id="a"></div>"#);

        assert!(matches!(
            renderer.render_response(&mut page, "missing", &json!({}), &store),
            Err(JrxError::TargetNotFound(_))
        ));
        assert!(matches!(
            renderer.render_response(&mut page, "a", &json!({}), &store),
            Err(JrxError::NoTemplate(_))
        ));
    }
}
