//! Input sanitization and validation at the pipeline boundary.
//!
//! Every request passes through [`sanitize`] and [`validate`] before the
//! state machine starts: HTML tags and control characters are stripped,
//! empty and over-length input is rejected. [`mask_key`] renders an API
//! credential for display without revealing it.

use thiserror::Error;

/// Default character ceiling for one request.
pub const MAX_CHARS: usize = 400;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Input rejected before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Empty or whitespace-only input.
    #[error("El texto no puede estar vacío.")]
    Empty,

    /// Input longer than the configured character ceiling.
    #[error("El texto excede el límite de seguridad de {max} caracteres.")]
    TooLong { max: usize },
}

// ---------------------------------------------------------------------------
// sanitize
// ---------------------------------------------------------------------------

/// Sanitize user input before it reaches the rewrite/synthesis collaborators.
///
/// * Removes HTML tags (`<` up to and including the next `>`; an unclosed
///   tag is dropped through end-of-input).
/// * Removes control characters, keeping newlines (the segmenter treats
///   them as sentence terminators).
/// * Trims surrounding whitespace.
pub fn sanitize(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut in_tag = false;

    for ch in input.chars() {
        if in_tag {
            if ch == '>' {
                in_tag = false;
            }
            continue;
        }
        match ch {
            '<' => in_tag = true,
            '\n' => clean.push('\n'),
            c if c.is_control() => {}
            c => clean.push(c),
        }
    }

    clean.trim().to_string()
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Validate input length and content against the configured ceiling.
///
/// Length is measured in characters, matching the synthesis API's limit.
pub fn validate(input: &str, max_chars: usize) -> Result<(), ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    if input.chars().count() > max_chars {
        return Err(ValidationError::TooLong { max: max_chars });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// mask_key
// ---------------------------------------------------------------------------

/// Mask an API key for display: first 4 and last 4 characters visible.
///
/// Keys of 8 characters or fewer are fully masked.
pub fn mask_key(key: Option<&str>) -> String {
    match key {
        None | Some("") => "No Configurada".to_string(),
        Some(key) => {
            let chars: Vec<char> = key.chars().collect();
            if chars.len() <= 8 {
                return "••••••••".to_string();
            }
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}••••••••••••••••{tail}")
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- sanitize -----------------------------------------------------

    #[test]
    fn strips_html_tags() {
        assert_eq!(sanitize("<b>Bienvenidos</b> al evento"), "Bienvenidos al evento");
    }

    #[test]
    fn drops_unclosed_tag_to_end() {
        assert_eq!(sanitize("Hola <script injected"), "Hola");
    }

    #[test]
    fn removes_control_characters_but_keeps_newlines() {
        assert_eq!(sanitize("a\x00b\x07c\nd"), "abc\nd");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize("  hola  "), "hola");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(sanitize(""), "");
    }

    // ---- validate ------------------------------------------------------

    #[test]
    fn rejects_empty_input() {
        assert_eq!(validate("", MAX_CHARS), Err(ValidationError::Empty));
        assert_eq!(validate("   \n ", MAX_CHARS), Err(ValidationError::Empty));
    }

    #[test]
    fn rejects_over_length_input() {
        let long = "a".repeat(MAX_CHARS + 1);
        assert_eq!(
            validate(&long, MAX_CHARS),
            Err(ValidationError::TooLong { max: MAX_CHARS })
        );
    }

    #[test]
    fn accepts_input_at_exactly_the_ceiling() {
        let exact = "a".repeat(MAX_CHARS);
        assert!(validate(&exact, MAX_CHARS).is_ok());
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 400 two-byte characters is exactly at the ceiling.
        let exact = "á".repeat(MAX_CHARS);
        assert!(validate(&exact, MAX_CHARS).is_ok());
    }

    // ---- mask_key -------------------------------------------------------

    #[test]
    fn masks_middle_of_long_key() {
        assert_eq!(
            mask_key(Some("AIzaSyExampleExampleKey9")),
            "AIza••••••••••••••••Key9"
        );
    }

    #[test]
    fn short_key_is_fully_masked() {
        assert_eq!(mask_key(Some("abc123")), "••••••••");
    }

    #[test]
    fn missing_key_reports_unconfigured() {
        assert_eq!(mask_key(None), "No Configurada");
        assert_eq!(mask_key(Some("")), "No Configurada");
    }
}
