use serde_json::Value;

/// Scans a byte buffer for balanced `{...}` spans and parses each as JSON.
///
/// The container layout is undocumented and JSON spans are interleaved with
/// binary noise, so no framing is trusted. A single forward pass tracks
/// brace depth; every span that closes back to depth zero is lossy-decoded
/// as UTF-8 and handed to serde_json. Spans that fail to parse are dropped
/// and the scan resumes immediately after their closing brace. A span that
/// never closes runs to the end of the buffer and is likewise ignored.
///
/// Returned values follow byte-offset order.
pub fn find_json_objects(data: &[u8]) -> Vec<Value> {
    let mut found = Vec::new();
    let mut i = 0;

    while i < data.len() {
        if data[i] != b'{' {
            i += 1;
            continue;
        }

        let start = i;
        let mut depth = 1usize;
        i += 1;
        while i < data.len() && depth > 0 {
            match data[i] {
                b'{' => depth += 1,
                b'}' => depth -= 1,
                _ => {}
            }
            i += 1;
        }

        if depth == 0 {
            let text = String::from_utf8_lossy(&data[start..i]);
            if let Ok(value) = serde_json::from_str::<Value>(&text) {
                found.push(value);
            }
        }
    }

    found
}
