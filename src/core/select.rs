use super::diagnostics::Diagnostics;

/// Resolve the first item for which `resolve` yields a value.
///
/// Items are visited in declaration order. Once an item resolves, every
/// remaining item is handed to `ignored` instead, so the caller can record a
/// diagnostic for the duplicates that were not applied. Items before the
/// resolved one are only seen by `resolve`, which may itself record findings.
///
/// Returns the index of the winning item together with its resolved value.
pub fn resolve_first<'a, T, R>(
    items: &'a [T],
    diags: &mut Diagnostics,
    mut resolve: impl FnMut(usize, &'a T, &mut Diagnostics) -> Option<R>,
    mut ignored: impl FnMut(usize, &'a T, &mut Diagnostics),
) -> Option<(usize, R)> {
    let mut iter = items.iter().enumerate();
    let winner = iter
        .by_ref()
        .find_map(|(i, item)| resolve(i, item, diags).map(|r| (i, r)));
    if winner.is_some() {
        for (i, item) in iter {
            ignored(i, item, diags);
        }
    }
    winner
}

/// First non-blank string, trimmed. Non-blank strings after it are handed to
/// `ignored`; blank ones are skipped silently.
pub fn first_non_blank<'a, S: AsRef<str>>(
    items: &'a [S],
    diags: &mut Diagnostics,
    mut ignored: impl FnMut(usize, &'a str, &mut Diagnostics),
) -> Option<&'a str> {
    resolve_first(
        items,
        diags,
        |_, s, _| {
            let s = s.as_ref().trim();
            (!s.is_empty()).then_some(s)
        },
        |i, s, d| {
            let s = s.as_ref().trim();
            if !s.is_empty() {
                ignored(i, s, d);
            }
        },
    )
    .map(|(_, s)| s)
}
