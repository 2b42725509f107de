//! End-to-end rendering through the public `Renderer` boundary, over real
//! template files in a temporary views directory.

use std::collections::BTreeMap;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use htmy::{Error, Renderer, Scope, Value};

/// Builds a views directory with a `components/` subdirectory and the given
/// `name -> source` templates (names without the `.htmy` suffix).
fn views(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("components")).expect("components dir");

    for (name, source) in files {
        let path = dir.path().join(format!("{name}.htmy"));
        std::fs::write(path, source).expect("write template");
    }

    dir
}

fn scope_with(values: &[(&str, Value)]) -> Arc<Scope> {
    Scope::with_values(
        values
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    )
}

fn record(fields: &[(&str, Value)]) -> Value {
    Value::Record(
        fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect::<BTreeMap<_, _>>(),
    )
}

#[tokio::test]
async fn renders_template_against_data_scope() {
    let dir = views(&[("test1", "<h1>Hello {user.name}! You are {age}</h1>")]);

    let scope = scope_with(&[
        ("user", record(&[("name", Value::String("Andrey".into()))])),
        ("age", Value::Number(21.0)),
    ]);

    let html = Renderer::new(dir.path())
        .render("test1", scope)
        .await
        .unwrap();

    assert_eq!(html, "<h1>Hello Andrey! You are 21</h1>");
}

#[tokio::test]
async fn rendering_is_deterministic_across_renders() {
    let dir = views(&[("page", "<ul><li>{n}</li><li>{n + 1}</li></ul>")]);
    let renderer = Renderer::new(dir.path());

    let scope = scope_with(&[("n", Value::Number(1.0))]);
    let first = renderer.render("page", Arc::clone(&scope)).await.unwrap();
    let second = renderer.render("page", scope).await.unwrap();

    assert_eq!(first, "<ul><li>1</li><li>2</li></ul>");
    assert_eq!(first, second);
}

#[tokio::test]
async fn void_element_round_trips() {
    let dir = views(&[("page", "<br/>")]);

    let html = Renderer::new(dir.path())
        .render("page", Scope::new())
        .await
        .unwrap();

    assert_eq!(html, "<br/>");
}

#[tokio::test]
async fn component_renders_with_bound_properties() {
    let dir = views(&[
        ("page", "<main><card title={heading} wide/></main>"),
        ("components/card", "<div class=\"card\">{title}</div>"),
    ]);

    let scope = scope_with(&[("heading", Value::String("News".into()))]);
    let html = Renderer::new(dir.path()).render("page", scope).await.unwrap();

    assert_eq!(html, "<main><div class=\"card\">News</div></main>");
}

#[tokio::test]
async fn component_scope_is_isolated_from_the_caller() {
    let dir = views(&[
        ("page", "<main><card title={heading}/></main>"),
        ("components/card", "<div>{title} by {author}</div>"),
    ]);

    // `author` is bound in the caller's scope but never passed down, so the
    // component must not see it
    let scope = scope_with(&[
        ("heading", Value::String("News".into())),
        ("author", Value::String("Andrey".into())),
    ]);

    let result = Renderer::new(dir.path()).render("page", scope).await;

    assert!(matches!(
        result,
        Err(Error::NotDefined { name }) if name == "author"
    ));
}

#[tokio::test]
async fn component_ignores_call_site_children() {
    let dir = views(&[
        ("page", "<card>ignored</card>"),
        ("components/card", "<div>card</div>"),
    ]);

    let html = Renderer::new(dir.path())
        .render("page", Scope::new())
        .await
        .unwrap();

    assert_eq!(html, "<div>card</div>");
}

#[tokio::test]
async fn unresolved_tag_renders_as_literal_html() {
    let dir = views(&[("page", "<card/>")]);

    let html = Renderer::new(dir.path())
        .render("page", Scope::new())
        .await
        .unwrap();

    assert_eq!(html, "<card/>");
}

#[rstest]
#[case::truthy(Value::Bool(true), "<p>shown</p>")]
#[case::falsy(Value::Bool(false), "")]
#[case::null(Value::Null, "")]
#[case::zero(Value::Number(0.0), "")]
#[case::nonzero(Value::Number(2.0), "<p>shown</p>")]
#[case::empty_string(Value::String(String::new()), "")]
#[tokio::test]
async fn conditional_follows_truthiness(#[case] visible: Value, #[case] expected: &str) {
    let dir = views(&[("page", "@if (visible)<p>shown</p>@end ")]);

    let scope = scope_with(&[("visible", visible)]);
    let html = Renderer::new(dir.path()).render("page", scope).await.unwrap();

    assert_eq!(html, expected);
}

#[tokio::test]
async fn braced_literal_condition_renders() {
    let dir = views(&[("page", "@if ({true})<p>always</p>@end ")]);

    let html = Renderer::new(dir.path())
        .render("page", Scope::new())
        .await
        .unwrap();

    assert_eq!(html, "<p>always</p>");
}

#[rstest]
#[case::string(Value::String("v".into()), "<a x=\"v\"/>")]
#[case::bool_true(Value::Bool(true), "<a x/>")]
#[case::bool_false(Value::Bool(false), "<a/>")]
#[case::number(Value::Number(3.0), "<a x=3/>")]
#[case::record(record(&[]), "<a x=\"Invalid Value Error\"/>")]
#[tokio::test]
async fn attribute_rendering_dispatches_on_runtime_type(
    #[case] value: Value,
    #[case] expected: &str,
) {
    let dir = views(&[("page", "<a x={x}/>")]);

    let scope = scope_with(&[("x", value)]);
    let html = Renderer::new(dir.path()).render("page", scope).await.unwrap();

    assert_eq!(html, expected);
}

#[tokio::test]
async fn mismatched_close_tag_fails_the_render() {
    let dir = views(&[("page", "<a>text</b>")]);

    let result = Renderer::new(dir.path()).render("page", Scope::new()).await;

    assert!(matches!(
        result,
        Err(Error::TagMismatch { open, close }) if open == "a" && close == "b"
    ));
}

#[tokio::test]
async fn sibling_components_keep_source_order() {
    let dir = views(&[
        ("page", "<one/><two/><one/>"),
        ("components/one", "<i>1</i>"),
        ("components/two", "<i>2</i>"),
    ]);

    let html = Renderer::new(dir.path())
        .render("page", Scope::new())
        .await
        .unwrap();

    assert_eq!(html, "<i>1</i><i>2</i><i>1</i>");
}

#[tokio::test]
async fn nested_components_resolve_through_the_same_root() {
    let dir = views(&[
        ("page", "<outer/>"),
        ("components/outer", "<section><inner/></section>"),
        ("components/inner", "<span>deep</span>"),
    ]);

    let html = Renderer::new(dir.path())
        .render("page", Scope::new())
        .await
        .unwrap();

    assert_eq!(html, "<section><span>deep</span></section>");
}
