/// The first sentence of `text` as a claim to verify.
///
/// Everything before the first `.` (trimmed), terminated by a period.
/// `None` when that sentence is empty.
#[must_use]
pub fn extract_claim(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let first = trimmed.split('.').next().unwrap_or("").trim();
    if first.is_empty() {
        None
    } else {
        Some(format!("{first}."))
    }
}
