use weft::dom::Document;
use weft::{value, Engine, ErrorKind, Tree, Value};

fn render(markup: &str, model: &Value) -> weft::Result<(Document, Vec<weft::Error>)> {
    let mut doc = Document::parse(markup)?;
    let engine = Engine::new();
    let diagnostics = engine.template(doc.root()).inject_from(&mut doc, model)?;
    Ok((doc, diagnostics))
}

#[test]
fn attr_sets_each_clause() -> weft::Result<()> {
    let (doc, diagnostics) = render(
        r#"<a data-attr="href:url; title:name">x</a>"#,
        &value! { url: "/home", name: "Home" },
    )?;
    assert!(diagnostics.is_empty());
    assert_eq!(
        doc.to_string(),
        r#"<a data-attr="href:url; title:name" href="/home" title="Home">x</a>"#
    );
    Ok(())
}

#[test]
fn attr_clauses_fail_independently() -> weft::Result<()> {
    let (doc, diagnostics) = render(
        r#"<a data-attr="href:url; title:missing" title="stale"/>"#,
        &value! { url: "/home" },
    )?;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), ErrorKind::Content);
    assert_eq!(diagnostics[0].operator(), Some("attr"));
    let a = doc.find_by_tag("a")[0];
    assert_eq!(doc.attr(a, "href"), Some("/home"));
    assert_eq!(doc.attr(a, "title"), None);
    Ok(())
}

#[test]
fn attr_null_removes() -> weft::Result<()> {
    let mut doc = Document::parse(r#"<a data-attr="href:url"/>"#)?;
    let a = doc.find_by_tag("a")[0];
    let engine = Engine::new();
    let mut template = engine.template(doc.root());
    template.inject_from(&mut doc, &value! { url: "/a" })?;
    assert_eq!(doc.attr(a, "href"), Some("/a"));
    template.inject_from(&mut doc, &value! { url: None })?;
    assert_eq!(doc.attr(a, "href"), None);
    Ok(())
}

#[test]
fn attr_requires_string() {
    let err = render(r#"<a data-attr="href:url"/>"#, &value! { url: 5 }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(
        err.to_string(),
        "attribute `href` requires a string, found integer (operator `attr` on <a> with operand `href:url`)"
    );
}

#[test]
fn attr_missing_path() {
    let err = render(r#"<a data-attr="href"/>"#, &value! { url: "/a" }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(err.message(), "expected `name:path`");
}

#[test]
fn named_attributes() -> weft::Result<()> {
    let (doc, diagnostics) = render(
        r#"<a data-id="key" data-href="link.url" data-title="link.label"/>"#,
        &value! { key: 7, link: { url: "/docs", label: "Docs" } },
    )?;
    assert!(diagnostics.is_empty());
    let a = doc.find_by_tag("a")[0];
    assert_eq!(doc.attr(a, "id"), Some("7"));
    assert_eq!(doc.attr(a, "href"), Some("/docs"));
    assert_eq!(doc.attr(a, "title"), Some("Docs"));
    Ok(())
}

#[test]
fn named_attribute_undefined_is_reported() -> weft::Result<()> {
    let (doc, diagnostics) = render(
        r#"<a data-href="url" href="/stale">x</a>"#,
        &value! {},
    )?;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].operator(), Some("href"));
    assert_eq!(doc.to_string(), r#"<a data-href="url">x</a>"#);
    Ok(())
}

#[test]
fn src_on_supported_elements() -> weft::Result<()> {
    let (doc, _) = render(r#"<img data-src="image"/>"#, &value! { image: "a.png" })?;
    assert_eq!(doc.to_string(), r#"<img data-src="image" src="a.png"/>"#);

    let err = render(r#"<p data-src="image"/>"#, &value! { image: "a.png" }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(
        err.to_string(),
        "operator `src` is not supported on <p> (operator `src` on <p> with operand `image`)"
    );
    Ok(())
}

#[test]
fn value_on_controls_and_text_elements() -> weft::Result<()> {
    let (doc, diagnostics) = render(
        r#"<form><input data-value="name"/><textarea data-value="bio"/></form>"#,
        &value! { name: "Ann", bio: "Likes tea" },
    )?;
    assert!(diagnostics.is_empty());
    assert_eq!(
        doc.to_string(),
        concat!(
            r#"<form>"#,
            r#"<input data-value="name" value="Ann"/>"#,
            r#"<textarea data-value="bio">Likes tea</textarea>"#,
            r#"</form>"#,
        )
    );
    Ok(())
}

#[test]
fn value_uses_format() -> weft::Result<()> {
    struct Percent;

    impl weft::Format for Percent {
        fn format(&self, value: &Value) -> weft::Result<String> {
            match value {
                Value::Float(f) => Ok(format!("{:.0}%", f * 100.0)),
                _ => Err(weft::Error::new("expected a float")),
            }
        }

        fn parse(&self, text: &str) -> weft::Result<Value> {
            let n: f64 = text
                .trim_end_matches('%')
                .parse()
                .map_err(|_| weft::Error::new("expected a percentage"))?;
            Ok(Value::from(n / 100.0))
        }
    }

    let mut doc = Document::parse(r#"<input data-value="ratio" data-format="percent"/>"#)?;
    let mut engine = Engine::new();
    engine.add_format("percent", Percent);
    engine
        .template(doc.root())
        .inject_from(&mut doc, &value! { ratio: 0.25 })?;
    let input = doc.find_by_tag("input")[0];
    assert_eq!(doc.attr(input, "value"), Some("25%"));
    Ok(())
}

#[test]
fn value_format_error_keeps_other_attributes() -> weft::Result<()> {
    struct Broken;

    impl weft::Format for Broken {
        fn format(&self, _: &Value) -> weft::Result<String> {
            Err(weft::Error::new("broken format"))
        }

        fn parse(&self, _: &str) -> weft::Result<Value> {
            Err(weft::Error::new("broken format"))
        }
    }

    let mut doc = Document::parse(concat!(
        r#"<div>"#,
        r#"<span data-value="price" data-format="broken" data-title="hint"><b data-text="name"/></span>"#,
        r#"</div>"#,
    ))?;
    let mut engine = Engine::new();
    engine.add_format("broken", Broken);
    engine.set_error_sink(|_| {});
    let diagnostics = engine
        .template(doc.root())
        .inject_from(&mut doc, &value! { price: 3, hint: "tip", name: "Ann" })?;

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), ErrorKind::Other);
    assert_eq!(diagnostics[0].operator(), Some("value"));
    let span = doc.find_by_tag("span")[0];
    assert_eq!(doc.attr(span, "title"), Some("tip"));
    assert_eq!(doc.text(doc.find_by_tag("b")[0]), "Ann");
    Ok(())
}

#[test]
fn css_class_conditional() -> weft::Result<()> {
    let mut doc = Document::parse(
        r#"<li class="item" data-css-class="active:selected; done:finished"/>"#,
    )?;
    let li = doc.find_by_tag("li")[0];
    let engine = Engine::new();
    let mut template = engine.template(doc.root());

    template.inject_from(&mut doc, &value! { active: true, done: false })?;
    assert_eq!(doc.attr(li, "class"), Some("item selected"));

    template.inject_from(&mut doc, &value! { active: false, done: true })?;
    assert_eq!(doc.attr(li, "class"), Some("item finished"));

    template.reset(&mut doc)?;
    assert_eq!(doc.attr(li, "class"), Some("item"));
    Ok(())
}

#[test]
fn css_class_bare_names() -> weft::Result<()> {
    let (doc, diagnostics) = render(
        r#"<li class="old-item plain" data-css-class="priority; kind; !stale"/>"#,
        &value! { priority: "HIGH_PRIORITY", kind: "veryUrgent", stale: "oldItem" },
    )?;
    assert!(diagnostics.is_empty());
    let li = doc.find_by_tag("li")[0];
    assert_eq!(doc.attr(li, "class"), Some("plain high-priority very-urgent"));
    Ok(())
}

#[test]
fn css_class_negated_undefined() -> weft::Result<()> {
    let (doc, diagnostics) = render(
        r#"<li data-css-class="!missing:on; missing:off"/>"#,
        &value! { other: 1 },
    )?;
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|err| err.kind() == ErrorKind::Content));
    let li = doc.find_by_tag("li")[0];
    assert_eq!(doc.attr(li, "class"), Some("on"));
    Ok(())
}

#[test]
fn css_class_bare_name_requires_string() {
    let err = render(r#"<li data-css-class="kind"/>"#, &value! { kind: [1] }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(err.message(), "class name `kind` must be a string, found list");
}

#[test]
fn css_class_undefined_condition() -> weft::Result<()> {
    let (doc, diagnostics) = render(
        r#"<li class="on" data-css-class="flag:on; other:x"/>"#,
        &value! { other: true },
    )?;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].operator(), Some("css-class"));
    let li = doc.find_by_tag("li")[0];
    assert_eq!(doc.attr(li, "class"), Some("x"));
    Ok(())
}

#[test]
fn attributes_skipped_under_null_scope() -> weft::Result<()> {
    let (doc, diagnostics) = render(
        r#"<div data-object="o"><a data-attr="href:url" href="/keep"/></div>"#,
        &value! { o: None },
    )?;
    assert!(diagnostics.is_empty());
    let a = doc.find_by_tag("a")[0];
    assert_eq!(doc.attr(a, "href"), Some("/keep"));
    Ok(())
}
