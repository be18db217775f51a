use envsubst::{
    EvalErrorKind, Intercept, MapResolver, Node, Operator, RenderError, Template, parse, render,
    render_advanced, render_env,
};

fn vars(pairs: &[(&str, &str)]) -> MapResolver {
    pairs.iter().copied().collect()
}

// ── Parsing through the public API ──────────────────────────────────────

#[test]
fn test_plain_text_is_a_single_text_node() {
    let template = parse("no substitutions here: 100% {literal} \\n").unwrap();
    assert_eq!(
        template.root(),
        &Node::Text("no substitutions here: 100% {literal} \\n".to_string())
    );
}

#[test]
fn test_nested_default_shape() {
    let template = parse("${a:-${b}}").unwrap();
    let outer = template.root().as_variable().expect("expected a variable");
    assert_eq!(outer.param, "a");
    assert_eq!(outer.operator, Operator::UseDefault);
    assert_eq!(outer.operator.symbol(), ":-");
    assert_eq!(outer.args.len(), 1);

    let inner = outer.args[0].as_variable().expect("expected a nested variable");
    assert_eq!(inner.param, "b");
    assert_eq!(inner.operator, Operator::Identity);
    assert!(inner.args.is_empty());
}

#[test]
fn test_template_keeps_source() {
    let source = "user=${USER:-nobody}";
    let template: Template = source.parse().unwrap();
    assert_eq!(template.source(), source);
    assert_eq!(template.to_string(), source);
}

#[test]
fn test_parse_error_reports_position() {
    let source = "url: ${HOST:-localhost";
    let err = parse(source).unwrap_err();
    assert_eq!(err.span.start, source.len());
    let rendered = err.format_with_source(source, Some("config.tpl"));
    assert!(rendered.contains("config.tpl:1:"));
    assert!(rendered.contains("hint"));
}

// ── Evaluation ──────────────────────────────────────────────────────────

#[test]
fn test_length_of_value() {
    let mut v = vars(&[("x", "hello")]);
    assert_eq!(render("${#x}", &mut v).unwrap(), "5");
}

#[test]
fn test_default_when_unset_or_empty() {
    assert_eq!(render("${x:-5011}", &mut vars(&[])).unwrap(), "5011");
    assert_eq!(render("${x:-5011}", &mut vars(&[("x", "7")])).unwrap(), "7");
}

#[test]
fn test_prefix_suffix_and_replace() {
    let mut v = vars(&[("x", "foobar"), ("fruit", "banana")]);
    assert_eq!(render("${x#foo}", &mut v).unwrap(), "bar");
    assert_eq!(render("${x%bar}", &mut v).unwrap(), "foo");
    assert_eq!(render("${fruit//a/b}", &mut v).unwrap(), "bbnbnb");
    assert_eq!(render("${fruit/#ba/ca}", &mut v).unwrap(), "canana");
    assert_eq!(render("${fruit/%na/ni}", &mut v).unwrap(), "banani");
}

#[test]
fn test_urls_are_not_substituted() {
    let mut v = vars(&[("host", "example.com")]);
    assert_eq!(
        render("https://$host/path?q=$ & cost=$5", &mut v).unwrap(),
        "https://example.com/path?q=$ & cost=$5"
    );
}

#[test]
fn test_composed_expression() {
    let mut v = vars(&[("file", "report.final.txt"), ("ext", "md")]);
    assert_eq!(
        render("${file%.txt}.${ext:-txt} (${#file} chars, ${file:0:6})", &mut v).unwrap(),
        "report.final.md (16 chars, report)"
    );
}

#[test]
fn test_required_variable_aborts_without_output() {
    let err = render("prefix ${x:?missing} suffix", &mut vars(&[])).unwrap_err();
    match err {
        RenderError::Eval(e) => {
            assert_eq!(e.kind, EvalErrorKind::ParameterRequired);
            assert!(e.message.contains("missing"));
        }
        other => panic!("expected evaluation error, got {other:?}"),
    }
}

#[test]
fn test_parse_errors_surface_through_render() {
    let err = render("${x", &mut vars(&[])).unwrap_err();
    assert!(matches!(err, RenderError::Parse(_)));
}

#[test]
fn test_template_evaluates_against_many_resolvers() {
    let template = Template::parse("${greeting:-Hello}, ${name^}").unwrap();
    let mut first = vars(&[("name", "ada")]);
    let mut second = vars(&[("greeting", "Hi"), ("name", "grace")]);
    assert_eq!(template.evaluate(&mut first).unwrap(), "Hello, Ada");
    assert_eq!(template.evaluate(&mut second).unwrap(), "Hi, Grace");
}

#[test]
fn test_env_rendering_uses_process_environment() {
    let expected = std::env::var("PATH").unwrap_or_default();
    assert_eq!(render_env("$PATH").unwrap(), expected);
    assert_eq!(
        render_env("${ENVSUBST_IT_UNSET:=fallback}/$ENVSUBST_IT_UNSET").unwrap(),
        "fallback/fallback"
    );
    assert!(std::env::var("ENVSUBST_IT_UNSET").is_err());
}

// ── Advanced evaluation ─────────────────────────────────────────────────

#[test]
fn test_interceptor_short_circuits_operator() {
    let out = render_advanced("${y:-z}", |_, _| Ok(Intercept::Emit("X".to_string()))).unwrap();
    assert_eq!(out, "X");
}

#[test]
fn test_interceptor_continue_applies_operator() {
    let out = render_advanced(r#""${var:-5011}""#, |_, _| Ok(Intercept::Resolve(None))).unwrap();
    assert_eq!(out, r#""5011""#);
}

#[test]
fn test_interceptor_tracks_referenced_names() {
    let mut names = Vec::new();
    let out = render_advanced("${a:-${b}} $c", |name, info| {
        names.push(format!("{name}{}", info.operator()));
        Ok(Intercept::Resolve(Some(name.to_uppercase())))
    })
    .unwrap();
    assert_eq!(out, "A C");
    assert_eq!(names, ["b", "a:-", "c"]);
}

#[test]
fn test_interceptor_leaves_unknown_variables_untouched() {
    let known = vars(&[("HOST", "db.internal")]);
    let out = render_advanced("postgres://${HOST}:${PORT:-5432}/${DB}", |name, info| {
        Ok(match known.get(name) {
            Some(value) => Intercept::Resolve(Some(value.to_string())),
            None => Intercept::Emit(info.orig().to_string()),
        })
    })
    .unwrap();
    assert_eq!(out, "postgres://db.internal:${PORT:-5432}/${DB}");
}
