// Extract container summaries from a raw Engine API response.
//
// The body is chunked-transfer encoded; instead of decoding chunk framing we
// locate the JSON array structurally (first '[' to its depth-matching ']')
// and hand that slice to serde. Anything that does not parse yields an empty
// list, never a partial one.

use serde::Deserialize;

use crate::models::ContainerSummary;

/// Bound on the bracket-depth scan, matching the response byte budget.
const MAX_SCAN_BYTES: usize = 50_000;

/// First occurrence of `needle` in `haystack`.
pub(super) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Header block ends at the first blank line; everything after is body.
fn body_of(raw: &[u8]) -> Option<&[u8]> {
    find(raw, b"\r\n\r\n").map(|i| &raw[i + 4..])
}

/// Slice from the first '[' to the ']' that returns bracket depth to zero.
/// The scan is byte-bounded; an array that never closes inside the budget is
/// treated as absent. Brackets inside JSON strings are not special-cased;
/// the Engine's list payload does not produce them in practice, and a
/// miscut slice fails JSON parsing and degrades to empty anyway.
fn extract_json_array(body: &[u8]) -> Option<&[u8]> {
    let start = body.iter().position(|&b| b == b'[')?;
    let end = body.len().min(start + MAX_SCAN_BYTES);
    let mut depth = 0i32;
    for (i, &b) in body[start..end].iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// The few fields we take from each list entry.
#[derive(Deserialize)]
struct ListEntry {
    #[serde(default, rename = "Names")]
    names: Vec<String>,
    #[serde(default, rename = "Image")]
    image: String,
    #[serde(rename = "State")]
    state: Option<String>,
}

fn summarize(entry: ListEntry) -> Option<ContainerSummary> {
    let name = entry.names.first()?;
    let image = entry
        .image
        .rsplit('/')
        .next()
        .unwrap_or(entry.image.as_str());
    Some(ContainerSummary {
        name: name.trim_start_matches('/').to_string(),
        status: entry.state.unwrap_or_else(|| "unknown".into()),
        image: image.to_string(),
    })
}

/// Full pipeline: split off headers, locate the array, parse, map. Entries
/// without a name are skipped; any structural failure yields an empty list.
pub(super) fn parse_response(raw: &[u8]) -> Vec<ContainerSummary> {
    let Some(body) = body_of(raw) else {
        return Vec::new();
    };
    let Some(json) = extract_json_array(body) else {
        return Vec::new();
    };
    match serde_json::from_slice::<Vec<ListEntry>>(json) {
        Ok(entries) => entries.into_iter().filter_map(summarize).collect(),
        Err(e) => {
            tracing::debug!(error = %e, "container list payload did not parse");
            Vec::new()
        }
    }
}
