use weft::dom::Document;
use weft::{value, Engine, Error, ErrorKind, Tree, Value};

fn inject(markup: &str, model: Value) -> weft::Result<(String, Vec<Error>)> {
    let mut doc = Document::parse(markup)?;
    let engine = Engine::new();
    let diagnostics = engine.template(doc.root()).inject_from(&mut doc, &model)?;
    Ok((doc.to_string(), diagnostics))
}

#[test]
fn inject_text() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<p><b data-text="name"/><i data-text="age"/><u data-text="ratio"/></p>"#,
        value! { name: "Ann", age: 42, ratio: 0.5 },
    )?;
    assert_eq!(
        result,
        r#"<p><b data-text="name">Ann</b><i data-text="age">42</i><u data-text="ratio">0.5</u></p>"#
    );
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn inject_text_replaces_static_text() -> weft::Result<()> {
    let (result, _) = inject(
        r#"<p data-text="name">placeholder</p>"#,
        value! { name: "Ann" },
    )?;
    assert_eq!(result, r#"<p data-text="name">Ann</p>"#);
    Ok(())
}

#[test]
fn inject_text_escaped() -> weft::Result<()> {
    let (result, _) = inject(r#"<p data-text="v"/>"#, value! { v: "<b>&</b>" })?;
    assert_eq!(result, r#"<p data-text="v">&lt;b&gt;&amp;&lt;/b&gt;</p>"#);
    Ok(())
}

#[test]
fn inject_text_on_element_with_children() {
    let err = inject(r#"<p data-text="name"><b/></p>"#, value! { name: "Ann" }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(
        err.to_string(),
        "text operator on <p> which has element children (operator `text` on <p> with operand `name`)"
    );
}

#[test]
fn inject_text_composite_value() {
    let err = inject(r#"<p data-text="items"/>"#, value! { items: [1, 2] }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(err.operator(), Some("text"));
}

#[test]
fn inject_hyphenated_path() -> weft::Result<()> {
    let (result, _) = inject(
        r#"<p><b data-text="first-name"/><i data-text="last-name"/></p>"#,
        value! { "first-name": "Ann", lastName: "Lee" },
    )?;
    assert_eq!(
        result,
        r#"<p><b data-text="first-name">Ann</b><i data-text="last-name">Lee</i></p>"#
    );
    Ok(())
}

#[test]
fn inject_object_scope() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<div data-object="user"><span data-text="name"/><em data-text=".title"/></div>"#,
        value! { title: "Dr", user: { name: "Ann" } },
    )?;
    assert_eq!(
        result,
        r#"<div data-object="user"><span data-text="name">Ann</span><em data-text=".title">Dr</em></div>"#
    );
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn inject_object_nested_paths() -> weft::Result<()> {
    let (result, _) = inject(
        r#"<div data-object="order.customer"><span data-text="address.city"/></div>"#,
        value! { order: { customer: { address: { city: "Oslo" } } } },
    )?;
    assert_eq!(
        result,
        r#"<div data-object="order.customer"><span data-text="address.city">Oslo</span></div>"#
    );
    Ok(())
}

#[test]
fn inject_object_null_clears_descendants() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<div data-object="user"><span data-text="name">old</span><ul data-list="tags"><li/></ul></div>"#,
        value! { user: None },
    )?;
    assert_eq!(
        result,
        r#"<div data-object="user"><span data-text="name"/><ul data-list="tags"/></div>"#
    );
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn inject_object_primitive_is_content_error() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<div data-object="user"><span data-text="name">old</span></div>"#,
        value! { user: "Ann" },
    )?;
    assert_eq!(result, r#"<div data-object="user"><span data-text="name"/></div>"#);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), ErrorKind::Content);
    assert_eq!(diagnostics[0].operator(), Some("object"));
    Ok(())
}

#[test]
fn inject_null_and_undefined() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<div><p data-text="a">x</p><p data-text="b">y</p></div>"#,
        value! { a: None },
    )?;
    assert_eq!(result, r#"<div><p data-text="a"/><p data-text="b"/></div>"#);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), ErrorKind::Content);
    assert_eq!(
        diagnostics[0].to_string(),
        "undefined property `b` (operator `text` on <p> with operand `b`)"
    );
    Ok(())
}

#[test]
fn inject_null_intermediate_is_not_an_error() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<p data-text="user.name">x</p>"#,
        value! { user: None },
    )?;
    assert_eq!(result, r#"<p data-text="user.name"/>"#);
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn inject_invalid_path() {
    let err = inject(r#"<p data-text="a..b"/>"#, value! { a: {} }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(err.message(), "empty property path segment");
}

#[test]
fn inject_two_content_directives() {
    let err = inject(r#"<p data-text="a" data-html="b"/>"#, value! { a: "x" }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(err.to_string(), "<p> declares both `data-text` and `data-html`");
}

#[test]
fn inject_two_conditionals() {
    let err = inject(r#"<p data-if="a" data-exclude="false"/>"#, value! { a: true }).unwrap_err();
    assert_eq!(err.to_string(), "<p> declares both `data-if` and `data-exclude`");
}

#[test]
fn inject_unknown_directives_are_ignored() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<p data-unknown="x" data-role="y" class="z"/>"#,
        value! { a: 1 },
    )?;
    assert_eq!(result, r#"<p data-unknown="x" data-role="y" class="z"/>"#);
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn inject_html() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<div data-html="body">old</div>"#,
        value! { body: "<b>bold</b> text" },
    )?;
    assert_eq!(result, r#"<div data-html="body"><b>bold</b> text</div>"#);
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn inject_html_null_clears() -> weft::Result<()> {
    let (result, _) = inject(r#"<div data-html="body"><b>old</b></div>"#, value! { body: None })?;
    assert_eq!(result, r#"<div data-html="body"/>"#);
    Ok(())
}

#[test]
fn inject_html_invalid_markup_is_reported() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<div><p data-html="body"/><i data-text="name"/></div>"#,
        value! { body: "<b>", name: "Ann" },
    )?;
    assert_eq!(
        result,
        r#"<div><p data-html="body"/><i data-text="name">Ann</i></div>"#
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), ErrorKind::Other);
    assert_eq!(diagnostics[0].operator(), Some("html"));
    Ok(())
}

#[test]
fn inject_options() -> weft::Result<()> {
    let (result, _) = inject(
        r#"<select data-options="sizes"><option value="x">x</option></select>"#,
        value! { sizes: ["S", "M", 42] },
    )?;
    assert_eq!(
        result,
        concat!(
            r#"<select data-options="sizes">"#,
            r#"<option value="S">S</option>"#,
            r#"<option value="M">M</option>"#,
            r#"<option value="42">42</option>"#,
            r#"</select>"#
        )
    );
    Ok(())
}

#[test]
fn inject_options_wrong_element() {
    let err = inject(r#"<ul data-options="sizes"/>"#, value! { sizes: [] }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(
        err.message(),
        "operator `options` is not supported on <ul>"
    );
}

#[test]
fn inject_options_not_a_list() {
    let err = inject(r#"<select data-options="sizes"/>"#, value! { sizes: "S" }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
}

#[test]
fn inject_null_model() {
    let mut doc = Document::parse("<p/>").unwrap();
    let engine = Engine::new();
    let err = engine
        .template(doc.root())
        .inject_from(&mut doc, &Value::None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
}

#[test]
fn inject_goto() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        concat!(
            r#"<div>"#,
            r#"<p data-goto="target"><span data-text="missing">static</span></p>"#,
            r#"<section id="target"><span data-text="name"/></section>"#,
            r#"</div>"#,
        ),
        value! { name: "Ann" },
    )?;
    assert_eq!(
        result,
        concat!(
            r#"<div>"#,
            r#"<p data-goto="target"><span data-text="missing">static</span></p>"#,
            r#"<section id="target"><span data-text="name">Ann</span></section>"#,
            r#"</div>"#,
        )
    );
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn inject_goto_missing_target() -> weft::Result<()> {
    let (result, diagnostics) = inject(
        r#"<p data-goto="nowhere" data-text="name"/>"#,
        value! { name: "Ann" },
    )?;
    assert_eq!(result, r#"<p data-goto="nowhere" data-text="name">Ann</p>"#);
    assert!(diagnostics.is_empty());
    Ok(())
}

#[test]
fn inject_goto_cycle() {
    let err = inject(r#"<p id="a" data-goto="a"/>"#, value! { a: 1 }).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(
        err.to_string(),
        r#"maximum walk depth of 256 exceeded at <p id="a">"#
    );
}

#[test]
fn inject_twice_is_idempotent() -> weft::Result<()> {
    let markup = concat!(
        r#"<div>"#,
        r#"<h1 data-text="title"/>"#,
        r#"<ul data-list="items"><li data-css-class="done:finished" data-text="name"/></ul>"#,
        r#"<p data-if="note" data-text="note"/>"#,
        r#"</div>"#,
    );
    let model = value! {
        title: "Todo",
        items: [{ name: "a", done: true }, { name: "b", done: false }],
        note: "",
    };
    let mut doc = Document::parse(markup)?;
    let engine = Engine::new();
    let mut template = engine.template(doc.root());
    template.inject_from(&mut doc, &model)?;
    let first = doc.to_string();
    template.inject_from(&mut doc, &model)?;
    assert_eq!(doc.to_string(), first);
    template.reset(&mut doc)?;
    template.inject_from(&mut doc, &model)?;
    assert_eq!(doc.to_string(), first);
    assert_eq!(
        first,
        concat!(
            r#"<div>"#,
            r#"<h1 data-text="title">Todo</h1>"#,
            r#"<ul data-list="items">"#,
            r#"<li data-css-class="done:finished" data-text="name" class="finished">a</li>"#,
            r#"<li data-css-class="done:finished" data-text="name">b</li>"#,
            r#"</ul>"#,
            r#"</div>"#,
        )
    );
    Ok(())
}

#[test]
fn inject_different_models() -> weft::Result<()> {
    let mut doc = Document::parse(r#"<p data-text="name" data-title="hint"/>"#)?;
    let engine = Engine::new();
    let mut template = engine.template(doc.root());
    template.inject_from(&mut doc, &value! { name: "Ann", hint: "first" })?;
    assert_eq!(
        doc.to_string(),
        r#"<p data-text="name" data-title="hint" title="first">Ann</p>"#
    );
    template.inject_from(&mut doc, &value! { name: "Bob", hint: None })?;
    assert_eq!(doc.to_string(), r#"<p data-text="name" data-title="hint">Bob</p>"#);
    Ok(())
}

#[test]
fn inject_element_only() -> weft::Result<()> {
    let mut doc = Document::parse(concat!(
        r#"<div>"#,
        r#"<p id="a" data-text="name"/>"#,
        r#"<section id="b"><p data-text="name"/></section>"#,
        r#"</div>"#,
    ))?;
    let engine = Engine::new();
    let mut template = engine.template(doc.root());
    let b = doc.element_by_id("b").unwrap();
    let diagnostics = template.inject_element(&mut doc, b, &value! { name: "Bob" })?;
    assert!(diagnostics.is_empty());
    assert_eq!(
        doc.to_string(),
        concat!(
            r#"<div>"#,
            r#"<p id="a" data-text="name"/>"#,
            r#"<section id="b"><p data-text="name">Bob</p></section>"#,
            r#"</div>"#,
        )
    );
    Ok(())
}

#[test]
fn inject_element_binds_content_to_value() -> weft::Result<()> {
    let mut doc = Document::parse(concat!(
        r#"<div>"#,
        r#"<ul data-list="items"><li/></ul>"#,
        r#"<section data-object="person"><p data-text="name"/></section>"#,
        r#"</div>"#,
    ))?;
    let engine = Engine::new();
    let mut template = engine.template(doc.root());

    let ul = doc.find_by_tag("ul")[0];
    let diagnostics = template.inject_element(&mut doc, ul, &value!(["a", "b"]))?;
    assert!(diagnostics.is_empty());
    assert_eq!(doc.text(ul), "ab");

    let section = doc.find_by_tag("section")[0];
    let diagnostics = template.inject_element(&mut doc, section, &value! { name: "Ann" })?;
    assert!(diagnostics.is_empty());
    assert_eq!(doc.text(section), "Ann");
    Ok(())
}

#[test]
fn inject_element_rejects_text_elements() {
    let mut doc = Document::parse(r#"<p data-text="name"/>"#).unwrap();
    let engine = Engine::new();
    let mut template = engine.template(doc.root());
    let p = doc.find_by_tag("p")[0];
    let err = template
        .inject_element(&mut doc, p, &value! { name: "Ann" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert_eq!(
        err.message(),
        "operator `text` on <p> cannot receive a subtree injection"
    );
}

#[test]
fn inject_element_null_resets() -> weft::Result<()> {
    let mut doc = Document::parse(r#"<section><p data-text="name"/></section>"#)?;
    let engine = Engine::new();
    let mut template = engine.template(doc.root());
    let section = doc.find_by_tag("section")[0];
    template.inject_element(&mut doc, section, &value! { name: "Ann" })?;
    assert_eq!(doc.text(section), "Ann");
    let diagnostics = template.inject_element(&mut doc, section, &Value::None)?;
    assert!(diagnostics.is_empty());
    assert_eq!(doc.to_string(), r#"<section><p data-text="name"/></section>"#);
    Ok(())
}

#[test]
fn inject_reset() -> weft::Result<()> {
    let markup = concat!(
        r#"<div>"#,
        r#"<a data-attr="href:url" data-css-class="active:on" data-text="label"/>"#,
        r#"<p data-exclude="true">hidden</p>"#,
        r#"<ul data-list="items"><li/></ul>"#,
        r#"</div>"#,
    );
    let mut doc = Document::parse(markup)?;
    let engine = Engine::new();
    let mut template = engine.template(doc.root());
    template.inject_from(
        &mut doc,
        &value! { url: "/x", active: true, label: "X", items: [1, 2] },
    )?;
    let p = doc.find_by_tag("p")[0];
    assert!(doc.is_hidden(p));

    template.reset(&mut doc)?;
    assert!(!doc.is_hidden(p));
    assert_eq!(
        doc.to_string(),
        concat!(
            r#"<div>"#,
            r#"<a data-attr="href:url" data-css-class="active:on" data-text="label"/>"#,
            r#"<p data-exclude="true">hidden</p>"#,
            r#"<ul data-list="items"/>"#,
            r#"</div>"#,
        )
    );
    Ok(())
}
