// Unit tests for Breedlens

use breedlens::core::{encode, extract_record, find_json_span, Extraction, ImageInput};
use breedlens::models::{BreedRecord, NoDetectionResponse, NO_DOG_DETECTED};
use serde_json::json;

fn found(text: &str) -> BreedRecord {
    match extract_record(text).expect("valid JSON span") {
        Extraction::Found(record) => record,
        Extraction::NoDetection => panic!("expected a record in {:?}", text),
    }
}

#[test]
fn test_extraction_keeps_object_unchanged() {
    let object = json!({
        "height": "10-13 inches",
        "weight": "14-18 pounds",
        "lifespan": "12-15 years",
        "breed": "Pug",
        "breed_group": "Toy",
        "shed_level": "High",
        "temperament": ["Charming", "Mischievous", "Loving"],
        "energy_level": "Moderate",
        "common_health_concerns": ["Brachycephalic Syndrome", "Eye problems"]
    });
    let text = format!(
        "Certainly! Here are the details:\n\n```json\n{}\n```\nLet me know if you need more.",
        serde_json::to_string_pretty(&object).unwrap()
    );

    let record = found(&text);
    assert_eq!(serde_json::to_value(&record).unwrap(), object);
    assert_eq!(record.stat_key(), Some(("Pug", "Toy")));
    assert_eq!(record.common_health_concerns().len(), 2);
}

#[test]
fn test_pug_example() {
    let record = found(r#"Here is the info: {"breed":"Pug","breed_group":"Toy","height":"10-13in"}"#);
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({"breed": "Pug", "breed_group": "Toy", "height": "10-13in"})
    );
}

#[test]
fn test_refusal_is_no_detection() {
    let texts = [
        "I cannot identify a dog in this image.",
        "I'm sorry, but I can't help with that.",
        "This appears to be a cat.\nNo dog is visible.",
    ];
    for text in texts {
        assert_eq!(extract_record(text).unwrap(), Extraction::NoDetection, "{}", text);
    }
}

#[test]
fn test_malformed_span_is_error() {
    assert!(extract_record("Result: {breed: 'Pug', breed_group: 'Toy'}").is_err());
    assert!(extract_record("{\"breed\": \"Pug\",}").is_err());
    // Two objects collapse into one greedy span
    assert!(extract_record("{\"breed\": \"Pug\"} or {\"breed\": \"Boxer\"}").is_err());
}

#[test]
fn test_span_crosses_newlines() {
    let text = "start {\n\"a\": 1\n} end";
    assert_eq!(find_json_span(text), Some("{\n\"a\": 1\n}"));
}

#[test]
fn test_partial_record_has_no_stat_key() {
    let record = found(r#"{"height": "unknown", "breed": ""}"#);
    assert_eq!(record.stat_key(), None);
    assert_eq!(record.breed(), None);
}

#[test]
fn test_encoder_variants() {
    assert_eq!(encode(ImageInput::Raw(vec![0xFF, 0xD8, 0xFF])).unwrap(), "/9j/");
    assert_eq!(encode(ImageInput::Base64("/9j/".into())).unwrap(), "/9j/");
    assert!(encode(ImageInput::Raw(Vec::new())).is_err());
}

#[test]
fn test_no_detection_body() {
    let body = serde_json::to_value(NoDetectionResponse::default()).unwrap();
    assert_eq!(body, json!({"error": NO_DOG_DETECTED}));
}
