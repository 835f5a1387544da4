//! Direct document URL recovery from viewer pages.
//!
//! PDFs open inside an in-portal viewer component that knows the real file
//! location. Two strategies, tried in order: the viewer element's `location`
//! attribute, then the `src` query parameter of an embedding iframe.

use super::ResolveError;
use crate::browser::{shadow, BrowserHost};
use url::Url;

/// Viewer web component carrying the file location.
const VIEWER_SELECTOR: &str = "d2l-fileviewer-pdf-pdfjs";
const VIEWER_LOCATION_ATTR: &str = "location";

/// Fallback: embed iframes wrap the real target in a `src` query parameter.
const EMBED_IFRAME_SELECTOR: &str = "iframe[src]";
const EMBED_SRC_PARAM: &str = "src";

/// Resolve the direct document URL on the currently loaded viewer page.
pub fn resolve_on_page(host: &BrowserHost) -> Result<String, ResolveError> {
    let page_url = host.current_url();

    let location = shadow::attr_of_first(host, VIEWER_SELECTOR, VIEWER_LOCATION_ATTR)
        .map_err(|e| ResolveError::BadUrl(e.to_string()))?;
    if let Some(location) = location {
        return absolutize(&location, &page_url);
    }

    let iframe_srcs = shadow::attr_of_all(host, EMBED_IFRAME_SELECTOR, "src")
        .map_err(|e| ResolveError::BadUrl(e.to_string()))?;
    for src in iframe_srcs.into_iter().flatten() {
        if let Some(target) = embedded_target(&src, &page_url)? {
            return Ok(target);
        }
    }
    Err(ResolveError::NoDocumentSource)
}

/// Resolve `candidate` against the page URL when it is relative.
pub fn absolutize(candidate: &str, page_url: &str) -> Result<String, ResolveError> {
    if Url::parse(candidate).is_ok() {
        return Ok(candidate.to_string());
    }
    let base = Url::parse(page_url).map_err(|_| ResolveError::BadUrl(page_url.to_string()))?;
    base.join(candidate)
        .map(|u| u.to_string())
        .map_err(|_| ResolveError::BadUrl(candidate.to_string()))
}

/// Extract and absolutize the `src` query parameter of an embed iframe URL.
/// Returns `Ok(None)` when the iframe carries no such parameter.
pub fn embedded_target(
    iframe_src: &str,
    page_url: &str,
) -> Result<Option<String>, ResolveError> {
    let absolute = absolutize(iframe_src, page_url)?;
    let parsed = Url::parse(&absolute).map_err(|_| ResolveError::BadUrl(absolute.clone()))?;
    // query_pairs percent-decodes the value.
    let target = parsed
        .query_pairs()
        .find(|(key, _)| key == EMBED_SRC_PARAM)
        .map(|(_, value)| value.into_owned());
    match target {
        Some(target) => absolutize(&target, page_url).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://purdue.brightspace.com/d2l/le/content/123/viewContent/456/View";

    #[test]
    fn absolute_locations_pass_through() {
        let got = absolutize("https://files.example/notes.pdf", PAGE).unwrap();
        assert_eq!(got, "https://files.example/notes.pdf");
    }

    #[test]
    fn relative_locations_join_the_page_origin() {
        let got = absolutize("/content/enforced/123/notes.pdf", PAGE).unwrap();
        assert_eq!(
            got,
            "https://purdue.brightspace.com/content/enforced/123/notes.pdf"
        );
    }

    #[test]
    fn embed_src_parameter_is_percent_decoded() {
        let iframe = "https://purdue.brightspace.com/d2l/lp/embed?src=%2Fcontent%2Fenforced%2F123%2Fslides%20week1.pdf";
        let got = embedded_target(iframe, PAGE).unwrap().unwrap();
        assert_eq!(
            got,
            "https://purdue.brightspace.com/content/enforced/123/slides%20week1.pdf"
        );
    }

    #[test]
    fn iframe_without_src_param_yields_none() {
        let iframe = "https://purdue.brightspace.com/d2l/lp/embed?ou=123";
        assert_eq!(embedded_target(iframe, PAGE).unwrap(), None);
    }

    #[test]
    fn garbage_page_url_is_a_bad_url_error() {
        assert!(matches!(
            absolutize("/x.pdf", "not a url"),
            Err(ResolveError::BadUrl(_))
        ));
    }
}
