//! Media URL recovery from observed segment traffic.
//!
//! The embedded player never exposes a direct media URL; it streams HLS
//! segments. The first audio/video segment request it issues, rewritten from
//! the segmented endpoint to the progressive-download one, is the whole file.

use super::ResolveError;
use crate::browser::netlog::ObservedRequest;

/// Suffix identifying the first variant-1/audio-1 transport-stream segment.
pub const SEGMENT_MARKER: &str = "-v1-a1.ts";

/// First completed segment request in arrival order, if any.
pub fn find_segment_url(requests: &[ObservedRequest]) -> Result<&str, ResolveError> {
    requests
        .iter()
        .find(|r| r.has_response && r.url.contains(SEGMENT_MARKER))
        .map(|r| r.url.as_str())
        .ok_or(ResolveError::NoSegment)
}

/// Rewrite a segment URL to the progressive-download endpoint serving the
/// complete media file. Only the first "hls" path component is the endpoint
/// discriminator; later occurrences are part of the asset name.
pub fn to_direct_url(segment_url: &str) -> String {
    segment_url.replacen("hls", "pd", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responded(url: &str) -> ObservedRequest {
        ObservedRequest {
            url: url.to_string(),
            has_response: true,
        }
    }

    #[test]
    fn first_matching_segment_wins() {
        let requests = [
            responded("https://cdn.example/hls/lecture01/playlist.m3u8"),
            responded("https://cdn.example/hls/lecture01/seg-00001-v1-a1.ts"),
            responded("https://cdn.example/hls/lecture01/seg-00002-v1-a1.ts"),
        ];
        let url = find_segment_url(&requests).unwrap();
        assert_eq!(url, "https://cdn.example/hls/lecture01/seg-00001-v1-a1.ts");
    }

    #[test]
    fn unanswered_requests_are_skipped() {
        let requests = [
            ObservedRequest {
                url: "https://cdn.example/hls/a/seg-1-v1-a1.ts".to_string(),
                has_response: false,
            },
            responded("https://cdn.example/hls/a/seg-2-v1-a1.ts"),
        ];
        let url = find_segment_url(&requests).unwrap();
        assert_eq!(url, "https://cdn.example/hls/a/seg-2-v1-a1.ts");
    }

    #[test]
    fn no_segment_traffic_is_an_error() {
        let requests = [responded("https://cdn.example/hls/a/playlist.m3u8")];
        assert!(matches!(
            find_segment_url(&requests),
            Err(ResolveError::NoSegment)
        ));
    }

    #[test]
    fn direct_url_swaps_only_the_endpoint() {
        assert_eq!(
            to_direct_url("https://cdn.example/hls/hls-recording/seg-v1-a1.ts"),
            "https://cdn.example/pd/hls-recording/seg-v1-a1.ts"
        );
    }
}
