//! String normalization and fuzzy comparison
//!
//! Pure helpers used by the self-referral and domain rules. None of them
//! allocate more than a couple of small buffers and none of them fail:
//! malformed input simply compares as dissimilar.

use serde::Serialize;

/// Mail providers that ignore dots in the local part
const DOT_INSENSITIVE_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];

/// Similarity above which two different domains are considered a typo of each other
pub const DOMAIN_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Local part and domain of an email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailParts {
    pub username: String,
    pub domain: String,
}

/// Split an email on `@`.
///
/// Returns `None` unless the address contains exactly one `@`.
pub fn extract_email_parts(email: &str) -> Option<EmailParts> {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(username), Some(domain), None) => Some(EmailParts {
            username: username.to_string(),
            domain: domain.to_string(),
        }),
        _ => None,
    }
}

/// Canonical form of an email address.
///
/// Lowercases and trims, drops a `+tag` suffix from the local part and, for
/// Gmail addresses, removes dots from the local part. Idempotent.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim().to_lowercase();

    let Some(EmailParts { username, domain }) = extract_email_parts(&email) else {
        return email;
    };

    let mut local = match username.find('+') {
        Some(idx) => username[..idx].to_string(),
        None => username,
    };

    if DOT_INSENSITIVE_DOMAINS.contains(&domain.as_str()) {
        local.retain(|c| c != '.');
    }

    format!("{}@{}", local, domain)
}

fn is_hyphen(c: char) -> bool {
    matches!(
        c,
        '-' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}'
    )
}

/// Order-insensitive canonical form of a personal name.
///
/// `"John Smith"`, `"Smith, John"` and `"smith  john"` all normalize to
/// `"john smith"`. Multi-character tokens come first, sorted, followed by the
/// sorted single-character initials.
pub fn normalize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ',' | ';' => ' ',
            c if is_hyphen(c) => ' ',
            c => c,
        })
        .collect();

    let (mut initials, mut full): (Vec<&str>, Vec<&str>) = cleaned
        .split_whitespace()
        .partition(|token| token.chars().count() == 1);

    full.sort_unstable();
    initials.sort_unstable();
    full.extend(initials);
    full.join(" ")
}

/// Classic edit distance with unit cost for insert, delete and substitute.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity ratio in `[0, 1]` derived from the edit distance.
///
/// Equal strings score `1`, an empty side scores `0`.
pub fn calculate_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if a.is_empty() || b.is_empty() || max_len == 0 {
        return 0.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / max_len as f64
}

/// Why two domains were (or were not) considered similar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainSimilarityReason {
    ExactMatch,
    Typosquatting,
    Different,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DomainSimilarity {
    pub is_similar: bool,
    pub reason: DomainSimilarityReason,
    pub score: f64,
}

/// Compare two email domains, flagging exact matches and likely typos
pub fn check_domain_similarity(d1: &str, d2: &str) -> DomainSimilarity {
    let d1 = d1.trim().to_lowercase();
    let d2 = d2.trim().to_lowercase();

    if d1 == d2 {
        return DomainSimilarity {
            is_similar: true,
            reason: DomainSimilarityReason::ExactMatch,
            score: 1.0,
        };
    }

    let score = calculate_similarity(&d1, &d2);
    if score > DOMAIN_SIMILARITY_THRESHOLD {
        DomainSimilarity {
            is_similar: true,
            reason: DomainSimilarityReason::Typosquatting,
            score,
        }
    } else {
        DomainSimilarity {
            is_similar: false,
            reason: DomainSimilarityReason::Different,
            score,
        }
    }
}
