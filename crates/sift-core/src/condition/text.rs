use crate::{
    model::FieldType,
    path::{get_in, parse_path},
    value::Value,
};

///
/// SearchTerm
///
/// One parsed full-text term. Quoted substrings stay together; a bare
/// alphabetic-or-hyphen term longer than 3 characters matches fuzzily.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct SearchTerm {
    pub text: String,
    pub fuzzy: bool,
}

/// Split a query into terms, preserving quoted substrings.
pub(crate) fn parse_terms(query: &str, fuzz_eligible: bool) -> Vec<SearchTerm> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in query.chars() {
        match c {
            '"' => {
                if in_quotes {
                    push_term(&mut terms, &mut current, false);
                } else if !current.is_empty() {
                    push_term(&mut terms, &mut current, fuzz_eligible);
                }
                in_quotes = !in_quotes;
            }
            c if c.is_whitespace() && !in_quotes => {
                push_term(&mut terms, &mut current, fuzz_eligible);
            }
            c => current.push(c),
        }
    }
    push_term(&mut terms, &mut current, fuzz_eligible);

    terms
}

fn push_term(terms: &mut Vec<SearchTerm>, current: &mut String, fuzz_eligible: bool) {
    if current.is_empty() {
        return;
    }

    let text = std::mem::take(current);
    let fuzzy = fuzz_eligible
        && text.chars().count() > 3
        && text.chars().all(|c| c.is_alphabetic() || c == '-');
    terms.push(SearchTerm { text, fuzzy });
}

/// Classic two-row Levenshtein distance.
pub(crate) fn levenshtein(left: &str, right: &str) -> usize {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();

    if left.is_empty() {
        return right.len();
    }
    if right.is_empty() {
        return left.len();
    }

    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0usize; right.len() + 1];

    for (i, lc) in left.iter().enumerate() {
        current[0] = i + 1;
        for (j, rc) in right.iter().enumerate() {
            let substitution = previous[j] + usize::from(lc != rc);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}

/// In-process full-text fallback.
///
/// A record matches when every term (or any term, when `require_all` is
/// false) appears as a token of the derived text; fuzzy terms tolerate
/// edits up to `max_distance`. Term order is not significant.
pub(crate) fn full_text_matches(
    query: &str,
    require_all: bool,
    max_distance: u8,
    text: &str,
) -> bool {
    let terms = parse_terms(query, true);
    if terms.is_empty() {
        return true;
    }

    let haystack = text.to_lowercase();
    let tokens: Vec<&str> = haystack.split_whitespace().collect();

    let matches = |term: &SearchTerm| -> bool {
        let needle = term.text.to_lowercase();
        if needle.contains(char::is_whitespace) {
            // Quoted phrase: plain substring containment.
            return haystack.contains(&needle);
        }
        tokens.iter().any(|token| {
            if *token == needle {
                return true;
            }
            term.fuzzy && levenshtein(token, &needle) <= max_distance as usize
        })
    };

    if require_all {
        terms.iter().all(matches)
    } else {
        terms.iter().any(matches)
    }
}

/// Derive the searchable text of a value.
///
/// Structs carrying a `text_index` annotation join the named fields'
/// primitive values with spaces; everything else uses the flat display
/// form.
pub(crate) fn derived_text(on: &Value, ty: &FieldType) -> String {
    if let FieldType::Record(model) = ty.unwrap_option() {
        if let Some(paths) = model.text_index() {
            let mut parts = Vec::with_capacity(paths.len());
            for path in paths {
                let Ok((steps, _)) = parse_path(ty.unwrap_option(), path) else {
                    continue;
                };
                if let Ok(Some(part)) = get_in(&steps, on) {
                    parts.push(part.to_string());
                }
            }
            return parts.join(" ");
        }
    }

    on.to_string()
}
