//! Input normalization applied before inference

/// Maximum number of characters passed to a classifier
pub const MAX_TEXT_LENGTH: usize = 512;

/// Trim surrounding whitespace and keep at most [`MAX_TEXT_LENGTH`] characters.
///
/// Whitespace-only input becomes the empty string.
pub fn sanitize(text: &str) -> String {
    let trimmed = text.trim();

    match trimmed.char_indices().nth(MAX_TEXT_LENGTH) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}
