//! Text folding shared by label parsing, header lookup and keyword matching.

/// Upper-case and strip Spanish diacritics so `"Llegó"` matches `"LLEGO"`.
pub fn fold_upper(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_uppercase)
        .map(|ch| match ch {
            'Á' | 'À' | 'Â' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// True for blank cells and the placeholders spreadsheet exports leave behind.
pub fn is_blank_marker(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || ["nan", "none", "null", "nat"]
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}
