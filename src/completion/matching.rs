/// Closest option spelling to a partially typed or mistyped `token`.
///
/// The shortest candidate extending `token` wins; without one, the nearest
/// candidate within two edits.
pub(crate) fn best_suggestion<'a>(token: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let prefixed = candidates
        .iter()
        .copied()
        .filter(|candidate| candidate.starts_with(token))
        .min_by_key(|candidate| candidate.len());
    if prefixed.is_some() {
        return prefixed;
    }
    candidates
        .iter()
        .copied()
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| (edit_distance(token, candidate, 2), candidate))
        .filter(|(dist, _)| *dist <= 2)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, candidate)| candidate)
}

/// Levenshtein distance over chars, giving up once every row exceeds `max`.
pub(crate) fn edit_distance(a: &str, b: &str, max: usize) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            cur[j + 1] = (cur[j] + 1).min(prev[j + 1] + 1).min(prev[j] + cost);
        }
        let row_min = cur.iter().copied().min().unwrap_or(0);
        if row_min > max {
            return row_min;
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}
