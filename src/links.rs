// Outbound detail-page link generation.

/// Converts a listing title into a URL-friendly slug: lowercase, accents
/// stripped, non-alphanumerics removed, whitespace collapsed to single
/// hyphens, leading/trailing hyphens trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_was_hyphen = true; // Trims leading hyphens.

    for c in text.chars() {
        let c = fold_accent(c);
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
        // Everything else (punctuation, emoji) is dropped.
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

// Latin diacritics seen in listing titles (Portuguese inventory data).
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        _ => c,
    }
}

/// Deterministic external detail-page URL for a vehicle: the slugified title
/// plus the last 8 characters of the document id as a disambiguator, under
/// the gallery path of the configured base domain.
pub fn gallery_url(base_url: &str, title: &str, id: &str) -> String {
    let slug = slugify(title);
    let tail_start = id.len().saturating_sub(8);
    let unique = &id[tail_start..];
    format!("{}/galeria/{}-{}", base_url.trim_end_matches('/'), slug, unique)
}
