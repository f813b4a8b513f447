//! Email, domain, and keyword helpers shared across the pipeline.

/// Extract the lower-cased domain portion of an email address.
///
/// Example: "Sarah.Chen@Acme.com" → Some("acme.com")
pub fn domain_from_email(email: &str) -> Option<String> {
    let domain = email.split('@').nth(1)?.trim().to_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

/// Derive a display name from a company domain (best-effort).
///
/// Example: "acme.com" → "Acme"
pub fn company_name_from_domain(domain: &str) -> String {
    let org_part = domain.split('.').next().unwrap_or(domain);
    let mut chars = org_part.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Lower-case, trim, and dedup a keyword list, preserving first-seen order.
/// Empty tokens are dropped.
pub fn normalize_keywords(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in raw {
        let token = token.trim().to_lowercase();
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Keyword normalization for hunts: same as `normalize_keywords`, but tokens
/// of length <= 2 are dropped (too short to be meaningful search terms).
pub fn hunt_keywords(raw: &[String]) -> Vec<String> {
    normalize_keywords(raw)
        .into_iter()
        .filter(|token| token.chars().count() > 2)
        .collect()
}

/// Case-insensitive substring check.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
