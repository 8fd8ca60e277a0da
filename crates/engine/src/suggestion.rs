//! "Did you mean" hints for error messages.

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let mut column: Vec<usize> = (0..=a.chars().count()).collect();
    for (j, cb) in b.chars().enumerate() {
        let mut previous_diagonal = column[0];
        column[0] = j + 1;
        for (i, ca) in a.chars().enumerate() {
            let diagonal = column[i + 1];
            column[i + 1] = if ca == cb {
                previous_diagonal
            } else {
                1 + previous_diagonal.min(column[i]).min(column[i + 1])
            };
            previous_diagonal = diagonal;
        }
    }
    column.pop().unwrap_or_default()
}

/// Build a `{prefix} "a", "b" or "c"?` hint from the options close enough
/// to the input, or `None` when nothing is plausible.
pub fn make_suggestion<'a, I: IntoIterator<Item = &'a str>>(
    prefix: &str,
    options: I,
    input: &str,
) -> Option<String> {
    let threshold = (input.len() / 2).max(1);
    let mut candidates: Vec<(usize, &str)> = options
        .into_iter()
        .filter_map(|option| {
            let distance = levenshtein_distance(input, option);
            (distance <= threshold).then_some((distance, option))
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by_key(|(distance, option)| (*distance, *option));
    candidates.truncate(5);

    let mut suggestion = format!("{prefix} ");
    for (idx, (_, option)) in candidates.iter().enumerate() {
        if idx != 0 {
            suggestion.push_str(if idx == candidates.len() - 1 { " or " } else { ", " });
        }
        suggestion.push('"');
        suggestion.push_str(option);
        suggestion.push('"');
    }
    suggestion.push('?');
    Some(suggestion)
}
