/// The edit distance between two strings, counted in characters.
pub(crate) fn levenshtein(source: &str, target: &str) -> usize {
    let target: Vec<char> = target.chars().collect();
    let mut previous: Vec<usize> = (0..=target.len()).collect();
    let mut current = vec![0; target.len() + 1];

    for (i, s) in source.chars().enumerate() {
        current[0] = i + 1;

        for (j, t) in target.iter().enumerate() {
            let substitution = previous[j] + usize::from(s != *t);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }

        std::mem::swap(&mut previous, &mut current);
    }

    previous[target.len()]
}

/// The candidate closest to `name`, with its distance; the first one wins ties.
pub(crate) fn closest<'c>(name: &str, candidates: &[&'c str]) -> Option<(&'c str, usize)> {
    let mut best: Option<(&'c str, usize)> = None;

    for candidate in candidates {
        let distance = levenshtein(name, candidate);

        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((*candidate, distance));
        }
    }

    best
}
