#![no_main]

use libfuzzer_sys::fuzz_target;
use weft::dom::Document;

fuzz_target!(|data: &str| {
    if let Ok(doc) = Document::parse(data) {
        let markup = doc.to_string();
        let reparsed = Document::parse(&markup).unwrap();
        assert_eq!(reparsed.to_string(), markup);
    }
});
