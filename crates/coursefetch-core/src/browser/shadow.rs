//! Composed-tree queries that cross shadow-root boundaries.
//!
//! The portal builds its UI from nested web components, so plain
//! `querySelector` sees almost nothing. Queries here run a recursive walker
//! inside the page that descends into every open shadow root and returns
//! plain attribute snapshots as JSON. No element handle outlives the call;
//! actions (clicks) re-resolve their target by selector and index inside the
//! same script, which keeps them immune to re-renders between query and use.

use super::{BrowserHost, HostError};
use serde::Deserialize;

/// Attribute snapshot of one matched node, in composed-tree document order.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NodeSnapshot {
    /// Position within the match set; valid only until the next re-render.
    pub index: usize,
    /// Trimmed `textContent`.
    pub text: String,
    pub title: Option<String>,
    pub href: Option<String>,
}

/// Embed `s` as a JavaScript string literal.
fn js_string(s: &str) -> String {
    // JSON string syntax is valid JS string syntax.
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Walker shared by every query: collects all nodes matching `selector`
/// across shadow boundaries, optionally dropping undisplayed ones.
fn walker_js(selector: &str, visible_only: bool) -> String {
    let sel = js_string(selector);
    let visible = if visible_only {
        "matches = matches.filter((el) => el.offsetParent !== null);"
    } else {
        ""
    };
    format!(
        r#"
        const sel = {sel};
        let matches = [];
        const walk = (root) => {{
            matches.push(...root.querySelectorAll(sel));
            for (const el of root.querySelectorAll('*')) {{
                if (el.shadowRoot) walk(el.shadowRoot);
            }}
        }};
        walk(document);
        {visible}
        "#
    )
}

fn collector_js(selector: &str, visible_only: bool) -> String {
    let walker = walker_js(selector, visible_only);
    format!(
        r#"(() => {{
        {walker}
        return JSON.stringify(matches.map((el, index) => ({{
            index,
            text: (el.textContent || '').trim(),
            title: el.getAttribute('title'),
            href: el.getAttribute('href'),
        }})));
        }})()"#
    )
}

fn clicker_js(selector: &str, visible_only: bool, index: usize) -> String {
    let walker = walker_js(selector, visible_only);
    format!(
        r#"(() => {{
        {walker}
        const el = matches[{index}];
        if (!el) return false;
        el.scrollIntoView({{ block: 'center' }});
        el.click();
        return true;
        }})()"#
    )
}

fn attr_collector_js(selector: &str, attr: &str) -> String {
    let walker = walker_js(selector, false);
    let attr = js_string(attr);
    format!(
        r#"(() => {{
        {walker}
        return JSON.stringify(matches.map((el) => el.getAttribute({attr})));
        }})()"#
    )
}

fn link_per_container_js(
    container_selector: &str,
    anchor_selector: &str,
    visible_only: bool,
) -> String {
    let walker = walker_js(container_selector, visible_only);
    let anchor = js_string(anchor_selector);
    format!(
        r#"(() => {{
        {walker}
        const anchorSel = {anchor};
        const firstIn = (root) => {{
            const hit = root.querySelector(anchorSel);
            if (hit) return hit;
            for (const el of root.querySelectorAll('*')) {{
                if (el.shadowRoot) {{
                    const nested = firstIn(el.shadowRoot);
                    if (nested) return nested;
                }}
            }}
            return null;
        }};
        return JSON.stringify(matches.map((card) => {{
            const root = card.shadowRoot || card;
            const hit = firstIn(root);
            return hit ? hit.getAttribute('href') : null;
        }}));
        }})()"#
    )
}

fn parse_json_payload<T: for<'de> Deserialize<'de>>(
    value: serde_json::Value,
) -> Result<T, HostError> {
    let payload = value
        .as_str()
        .ok_or_else(|| HostError::Evaluation("walker returned no payload".to_string()))?;
    serde_json::from_str(payload).map_err(|e| HostError::Evaluation(e.to_string()))
}

/// Snapshot every node matching `selector` across shadow boundaries.
pub fn find_all(
    host: &BrowserHost,
    selector: &str,
    visible_only: bool,
) -> Result<Vec<NodeSnapshot>, HostError> {
    parse_json_payload(host.evaluate(&collector_js(selector, visible_only))?)
}

/// First match, if any.
pub fn find_first(
    host: &BrowserHost,
    selector: &str,
    visible_only: bool,
) -> Result<Option<NodeSnapshot>, HostError> {
    Ok(find_all(host, selector, visible_only)?.into_iter().next())
}

/// Re-resolve the `index`-th match of `selector` and click it, scrolling it
/// into view first. Returns false when the match set has shrunk below
/// `index`, which callers treat as a re-render and retry.
pub fn click_nth(
    host: &BrowserHost,
    selector: &str,
    visible_only: bool,
    index: usize,
) -> Result<bool, HostError> {
    let value = host.evaluate(&clicker_js(selector, visible_only, index))?;
    Ok(value.as_bool().unwrap_or(false))
}

/// Collect one attribute from every node matching `selector`, preserving
/// match order; nodes without the attribute yield `None`.
pub fn attr_of_all(
    host: &BrowserHost,
    selector: &str,
    attr: &str,
) -> Result<Vec<Option<String>>, HostError> {
    parse_json_payload(host.evaluate(&attr_collector_js(selector, attr))?)
}

/// The attribute of the first match, if the match exists and carries it.
pub fn attr_of_first(
    host: &BrowserHost,
    selector: &str,
    attr: &str,
) -> Result<Option<String>, HostError> {
    Ok(attr_of_all(host, selector, attr)?.into_iter().next().flatten())
}

/// For each container matching `container_selector`, find the first anchor
/// matching `anchor_selector` anywhere inside it (descending into its shadow
/// subtree) and return that anchor's href. Containers without a matching
/// anchor yield `None` so positions stay aligned with the container set;
/// `visible_only` drops undisplayed containers (e.g. those in an unselected
/// tab panel) before the anchor search.
pub fn link_per_container(
    host: &BrowserHost,
    container_selector: &str,
    anchor_selector: &str,
    visible_only: bool,
) -> Result<Vec<Option<String>>, HostError> {
    parse_json_payload(host.evaluate(&link_per_container_js(
        container_selector,
        anchor_selector,
        visible_only,
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_is_embedded_as_a_string_literal() {
        let js = collector_js("a[href*='/d2l/home/']", true);
        assert!(js.contains(r#""a[href*='/d2l/home/']""#));
        assert!(js.contains("offsetParent"));
    }

    #[test]
    fn quotes_in_selectors_are_escaped() {
        assert_eq!(js_string(r#"a[title="x"]"#), r#""a[title=\"x\"]""#);
    }

    #[test]
    fn invisible_filter_is_opt_in() {
        assert!(!collector_js("span", false).contains("offsetParent"));
    }

    #[test]
    fn clicker_targets_requested_index() {
        let js = clicker_js(".item", true, 7);
        assert!(js.contains("matches[7]"));
        assert!(js.contains("scrollIntoView"));
    }

    #[test]
    fn snapshots_parse_from_walker_payload() {
        let payload = serde_json::Value::String(
            r#"[{"index":0,"text":"Module 1","title":null,"href":"/a"},
                {"index":1,"text":"","title":"Pinned","href":null}]"#
                .to_string(),
        );
        let nodes: Vec<NodeSnapshot> = parse_json_payload(payload).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text, "Module 1");
        assert_eq!(nodes[1].title.as_deref(), Some("Pinned"));
    }

    #[test]
    fn container_link_extraction_can_filter_hidden_containers() {
        let visible = link_per_container_js("d2l-enrollment-card", "a[href*='/d2l/home/']", true);
        assert!(visible.contains("offsetParent"));
        let unfiltered =
            link_per_container_js("d2l-enrollment-card", "a[href*='/d2l/home/']", false);
        assert!(!unfiltered.contains("offsetParent"));
    }

    #[test]
    fn attr_collector_reads_the_named_attribute() {
        let js = attr_collector_js("d2l-fileviewer-pdf-pdfjs", "location");
        assert!(js.contains(r#"getAttribute("location")"#));
    }

    #[test]
    fn missing_payload_is_an_evaluation_error() {
        let err = parse_json_payload::<Vec<NodeSnapshot>>(serde_json::Value::Null).unwrap_err();
        assert!(matches!(err, HostError::Evaluation(_)));
    }
}
