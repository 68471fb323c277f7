//! Deterministic, URL-safe identifiers derived from heading text.
//!
//! The same slug doubles as the heading's `id` and as the fragment of its
//! in-page anchor. Collisions are not de-duplicated: two headings that
//! normalise to the same text share an identifier.

/// Normalise `text` into a slug made of `a-z`, `0-9` and `-`.
///
/// The input is trimmed and lower-cased, `&` becomes the word `and`, runs of
/// whitespace become a single hyphen, every other character outside the slug
/// alphabet is dropped and repeated hyphens collapse into one. Never fails;
/// empty or punctuation-only input yields an empty string.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                push_hyphen(&mut slug);
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        match ch {
            '&' => {
                push_hyphen(&mut slug);
                slug.push_str("and");
                push_hyphen(&mut slug);
            }
            '-' => push_hyphen(&mut slug),
            'a'..='z' | '0'..='9' => slug.push(ch),
            _ => {}
        }
    }

    slug
}

fn push_hyphen(slug: &mut String) {
    if !slug.ends_with('-') {
        slug.push('-');
    }
}
