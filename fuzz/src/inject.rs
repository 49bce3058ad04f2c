#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;
use weft::dom::Document;

#[derive(Debug, Serialize, Arbitrary)]
#[serde(untagged)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, Vec<Value>)| {
    let (markup, models) = data;
    let Ok(mut doc) = Document::parse(markup) else {
        return;
    };
    let engine = weft::Engine::new();
    let mut template = engine.template(doc.root());
    for model in &models {
        if template.inject(&mut doc, model).is_err() {
            return;
        }
    }
    let _ = template.reset(&mut doc);
});
