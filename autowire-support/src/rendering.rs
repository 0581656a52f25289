//! Text rendering utilities for human-friendly error messages.
//!
//! Type identifiers are plain names, so everything here works on `&str`.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use autowire_support::rendering::render_chain;
///
/// let chain = vec!["Car", "Engine", "Car"];
/// assert_eq!(render_chain(&chain), "Car → Engine → Car");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Returns the last `::`-separated segment of an identifier.
///
/// ```
/// use autowire_support::rendering::short_name;
///
/// assert_eq!(short_name("app::services::Mailer"), "Mailer");
/// assert_eq!(short_name("Mailer"), "Mailer");
/// ```
pub fn short_name(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Suggests known identifiers that look like `requested`.
///
/// Scores substring matches highest, then matches on the short name, then
/// a shared prefix of at least three characters. Identical names are never
/// suggested.
pub fn suggest_similar(
    requested: &str,
    available: &[&str],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_short = short_name(requested).to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter(|&&name| name != requested)
        .filter_map(|&name| {
            let name_lower = name.to_lowercase();
            let name_short = short_name(name).to_lowercase();

            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            if name_short.contains(&requested_short) || requested_short.contains(&name_short) {
                return Some((name, 80));
            }

            let common = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();

            (common >= 3).then_some((name, common * 10))
        })
        .collect();

    // stable sort keeps the caller's order among equal scores
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}
