use crate::domain::{ProductFields, UpvoteRequest};
use productmap_errors::AppError;
use std::sync::OnceLock;

const MAX_TITLE_CHARS: usize = 80;
const MAX_DESCRIPTION_CHARS: usize = 1000;

fn whitespace_run() -> &'static regex_lite::Regex {
    static RE: OnceLock<regex_lite::Regex> = OnceLock::new();
    RE.get_or_init(|| regex_lite::Regex::new(r"\s+").expect("static regex"))
}

pub struct InputSanitizer;

impl InputSanitizer {
    /// Cleans the metadata entered in the edit form.
    pub fn sanitize_fields(title: &str, description: &str) -> Result<ProductFields, AppError> {
        let title = Self::sanitize_title(title);
        if title.is_empty() {
            return Err(AppError::InvalidInput("Title must not be empty".to_string()));
        }

        let description: String = description
            .trim()
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .take(MAX_DESCRIPTION_CHARS)
            .collect();

        Ok(ProductFields::new(title, description.trim_end()))
    }

    pub fn validate_upvote(request: &UpvoteRequest) -> Result<(), AppError> {
        if request.product_id.as_str().trim().is_empty() {
            return Err(AppError::InvalidInput("Product id must not be empty".to_string()));
        }
        if request.city.trim().is_empty() {
            return Err(AppError::InvalidInput("City must not be empty".to_string()));
        }
        Ok(())
    }

    fn sanitize_title(title: &str) -> String {
        let printable: String = title.chars().filter(|c| !c.is_control()).collect();
        whitespace_run()
            .replace_all(printable.trim(), " ")
            .chars()
            .take(MAX_TITLE_CHARS)
            .collect::<String>()
            .trim_end()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductId;

    #[test]
    fn test_sanitize_fields() {
        let fields = InputSanitizer::sanitize_fields("  Taco \t  Cart ", " Great\ntacos\u{0007} ").unwrap();
        assert_eq!(fields.title, "Taco Cart");
        assert_eq!(fields.description, "Great\ntacos");
    }

    #[test]
    fn test_empty_title_rejected() {
        assert!(InputSanitizer::sanitize_fields("   ", "desc").is_err());
        assert!(InputSanitizer::sanitize_fields("\u{0000}", "desc").is_err());
    }

    #[test]
    fn test_lengths_are_bounded() {
        let long_title = "a".repeat(200);
        let long_desc = "b".repeat(5000);
        let fields = InputSanitizer::sanitize_fields(&long_title, &long_desc).unwrap();
        assert_eq!(fields.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(fields.description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_upvote_preconditions() {
        assert!(InputSanitizer::validate_upvote(&UpvoteRequest::new(
            ProductId::new("abc123"),
            "Palo Alto"
        ))
        .is_ok());
        assert!(
            InputSanitizer::validate_upvote(&UpvoteRequest::new(ProductId::new(""), "Palo Alto"))
                .is_err()
        );
        assert!(
            InputSanitizer::validate_upvote(&UpvoteRequest::new(ProductId::new("abc"), " "))
                .is_err()
        );
    }
}
