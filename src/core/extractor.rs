use crate::models::BreedRecord;
use regex::Regex;
use std::sync::OnceLock;

/// Outcome of scanning completion text for a JSON object
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The reply holds no brace-delimited span at all
    NoDetection,
    Found(BreedRecord),
}

fn json_span_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Greedy: first '{' through last '}', across newlines
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static pattern"))
}

/// Locate the span from the first `{` to the last `}` in `text`
///
/// This assumes the model replies with a single object. Stray braces in the prose
/// around it, or several objects, end up inside the span and will fail to parse.
pub fn find_json_span(text: &str) -> Option<&str> {
    json_span_pattern().find(text).map(|m| m.as_str())
}

/// Extract the dog description from completion text
///
/// Returns `Ok(NoDetection)` when no span is found and `Err` when a span is found
/// but is not a JSON object.
pub fn extract_record(text: &str) -> Result<Extraction, serde_json::Error> {
    match find_json_span(text) {
        Some(span) => {
            let record: BreedRecord = serde_json::from_str(span)?;
            Ok(Extraction::Found(record))
        }
        None => Ok(Extraction::NoDetection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_surrounded_by_prose() {
        let text = r#"Here is the info: {"breed":"Pug","breed_group":"Toy","height":"10-13in"} Enjoy!"#;
        let Extraction::Found(record) = extract_record(text).unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"breed": "Pug", "breed_group": "Toy", "height": "10-13in"})
        );
    }

    #[test]
    fn test_markdown_fenced_multiline_reply() {
        let text = "Sure!\n```json\n{\n  \"breed\": \"Beagle\",\n  \"temperament\": [\"Friendly\", \"Curious\"]\n}\n```";
        let Extraction::Found(record) = extract_record(text).unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(record.breed(), Some("Beagle"));
        assert_eq!(record.temperament(), vec!["Friendly", "Curious"]);
    }

    #[test]
    fn test_no_braces_is_no_detection() {
        let text = "I cannot identify a dog in this image.";
        assert_eq!(extract_record(text).unwrap(), Extraction::NoDetection);
        assert_eq!(extract_record("").unwrap(), Extraction::NoDetection);
        assert_eq!(extract_record("only an opening { brace").unwrap(), Extraction::NoDetection);
    }

    #[test]
    fn test_invalid_span_is_error() {
        assert!(extract_record("{breed: Pug}").is_err());
        assert!(extract_record("{} and also {}").is_err());
    }

    #[test]
    fn test_span_is_greedy() {
        let text = "a {\"x\": {\"y\": 1}} b } c";
        assert_eq!(find_json_span(text), Some("{\"x\": {\"y\": 1}} b }"));
    }

    #[test]
    fn test_trailing_brace_breaks_parse() {
        assert!(extract_record("{\"a\": 1} trailing }").is_err());
    }
}
