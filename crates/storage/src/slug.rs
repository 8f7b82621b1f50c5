/// Slug generation for participant and team names.
///
/// Names arrive with Latvian diacritics and inconsistent casing, so slugs
/// first fold diacritics to ASCII, then keep only lowercase alphanumerics
/// separated by single hyphens. Matching against stored slugs (search,
/// team grouping) must use the same folding.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        let folded = fold_char(c);
        if folded.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(folded.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    out
}

/// Slug used to group free-text team names. Empty and placeholder names
/// produce an empty slug so they never form a group.
pub fn team_name_slug(team_name: &str) -> String {
    let trimmed = team_name.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return String::new();
    }
    slugify(trimmed)
}

/// Folds the Latvian diacritics to their ASCII base letter, keeping case.
/// Every other character passes through unchanged.
pub fn fold_char(c: char) -> char {
    match c {
        'ā' => 'a',
        'č' => 'c',
        'ē' => 'e',
        'ģ' => 'g',
        'ī' => 'i',
        'ķ' => 'k',
        'ļ' => 'l',
        'ņ' => 'n',
        'š' => 's',
        'ū' => 'u',
        'ž' => 'z',
        'Ā' => 'A',
        'Č' => 'C',
        'Ē' => 'E',
        'Ģ' => 'G',
        'Ī' => 'I',
        'Ķ' => 'K',
        'Ļ' => 'L',
        'Ņ' => 'N',
        'Š' => 'S',
        'Ū' => 'U',
        'Ž' => 'Z',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_name() {
        assert_eq!(slugify("Jana Ozola"), "jana-ozola");
    }

    #[test]
    fn test_latvian_diacritics_fold_to_ascii() {
        assert_eq!(slugify("Kārlis Bērziņš"), "karlis-berzins");
        assert_eq!(slugify("Žanis Čakste"), "zanis-cakste");
    }

    #[test]
    fn test_punctuation_collapses_to_single_hyphen() {
        assert_eq!(slugify("SK  \"Velo\" / Riga"), "sk-velo-riga");
    }

    #[test]
    fn test_leading_and_trailing_separators_dropped() {
        assert_eq!(slugify("  -- Team --  "), "team");
    }

    #[test]
    fn test_team_name_slug_placeholder_is_empty() {
        assert_eq!(team_name_slug("-"), "");
        assert_eq!(team_name_slug("   "), "");
        assert_eq!(team_name_slug(""), "");
    }

    #[test]
    fn test_team_name_slug_case_insensitive_grouping() {
        assert_eq!(team_name_slug("VELO CLUB"), team_name_slug("Velo Club"));
    }

    #[test]
    fn test_fold_char_keeps_case() {
        assert_eq!(fold_char('Ū'), 'U');
        assert_eq!(fold_char('ž'), 'z');
        assert_eq!(fold_char('x'), 'x');
    }
}
