pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Lowercased, whitespace-collapsed token. Interests and tags both go through
/// here so an interest always equals the tag it was copied from. Returns `None`
/// when only whitespace was given.
pub fn normalize_token(raw: &str) -> Option<String> {
    let token = normalize_text(&raw.to_lowercase());
    (!token.is_empty()).then_some(token)
}

pub fn normalize_interest(raw: &str) -> Option<String> {
    normalize_token(raw)
}

/// Normalizes every interest and drops repeats, keeping the first occurrence
/// so request order survives.
pub fn normalize_interests<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut interests: Vec<String> = Vec::with_capacity(raw.len());
    for item in raw {
        if let Some(token) = normalize_interest(item.as_ref()) {
            if !interests.contains(&token) {
                interests.push(token);
            }
        }
    }
    interests
}

pub fn normalize_tag(raw: &str) -> Option<String> {
    normalize_token(raw)
}
