/// Single-line excerpt of engine output for console display.
///
/// Runs of whitespace (including newlines) collapse to one space and the
/// result is cut to `max_chars` characters, ending in `…` when shortened.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let kept: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}
