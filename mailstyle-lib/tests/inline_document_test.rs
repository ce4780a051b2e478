use mailstyle_lib::mail_generate::mail_style;
use mailstyle_lib::{InlineError, InlineOptions, MergeMode};
use pretty_assertions::assert_eq;

const NEWSLETTER: &str = r#"<!DOCTYPE html><html><head><style>
td { padding: 4px; }
td.cell { padding: 8px; }
a:hover { text-decoration: underline; }
@media (max-width: 600px) { td { padding: 0; } }
</style></head><body><table><tr><td class="cell" style="padding: 2px">One</td><td>Two</td></tr></table></body></html>"#;

fn options(merge_mode: MergeMode) -> InlineOptions {
    InlineOptions {
        merge_mode,
        ..InlineOptions::default()
    }
}

#[test]
fn inline_style_wins_ties_by_default() {
    let output = mail_style::generate(NEWSLETTER, "", &InlineOptions::default()).unwrap();
    // td.cell outranks td, and the inline declaration wins its tie with td.cell.
    assert!(output.contains(r#"<td class="cell" style="padding: 2px">One</td>"#), "{output}");
    assert!(output.contains(r#"<td style="padding: 4px">Two</td>"#), "{output}");
}

#[test]
fn standard_mode_lets_matching_rules_win_ties() {
    let output = mail_style::generate(NEWSLETTER, "", &options(MergeMode::Standard)).unwrap();
    assert!(output.contains(r#"<td class="cell" style="padding: 8px">One</td>"#), "{output}");
}

#[test]
fn more_specific_rule_wins_regardless_of_source_order() {
    let id_first = "<style>#x { text-align: right; } p { text-align: left; }</style>\
                    <p id=\"x\">a</p><p>b</p>";
    let id_last = "<style>p { text-align: left; } #x { text-align: right; }</style>\
                   <p id=\"x\">a</p><p>b</p>";
    for html in [id_first, id_last] {
        for mode in MergeMode::ALL {
            let output = mail_style::generate(html, "", &options(mode)).unwrap();
            assert!(
                output.contains(r#"<p id="x" style="text-align: right">a</p>"#),
                "{mode}: {output}"
            );
            assert!(output.contains(r#"<p style="text-align: left">b</p>"#), "{mode}: {output}");
        }
    }
}

#[test]
fn inline_data_uri_is_not_split_on_its_semicolon() {
    let html = r#"<p style="color: red; background-image: url(data:image/png;base64,AAAA)">x</p>"#;

    let output = mail_style::generate(html, "p { text-align: left; }", &InlineOptions::default())
        .unwrap();
    assert!(
        output.contains(
            r#"style="text-align: left; color: red; background-image: url(data:image/png;base64,AAAA)""#
        ),
        "{output}"
    );

    let css = "p { background-image: none; }";
    let output = mail_style::generate(html, css, &options(MergeMode::Standard)).unwrap();
    assert!(
        output.contains(r#"<p style="color: red; background-image: none">x</p>"#),
        "{output}"
    );
}

#[test]
fn stylesheet_values_are_printed_in_normalized_form() {
    // Inline declarations are kept as authored; stylesheet values come
    // back from the CSS printer, which shortens colors.
    let html = r#"<p style="border-color: blue">x</p>"#;
    let output = mail_style::generate(html, "p { color: blue; }", &InlineOptions::default())
        .unwrap();
    assert!(
        output.contains(r#"<p style="color: #00f; border-color: blue">x</p>"#),
        "{output}"
    );
}

#[test]
fn non_inlinable_rules_stay_in_the_style_element() {
    let output = mail_style::generate(NEWSLETTER, "", &InlineOptions::default()).unwrap();
    assert!(output.contains("<style>"), "{output}");
    assert!(output.contains("a:hover"), "{output}");
    assert!(output.contains("@media"), "{output}");
    assert!(!output.contains("td.cell {"), "{output}");
}

#[test]
fn extra_css_is_applied_after_document_rules() {
    let html = "<p style=\"margin: 0\">x</p>";
    let css = "p { text-align: center; }";
    let output = mail_style::generate(html, css, &options(MergeMode::AlwaysAppend)).unwrap();
    assert!(
        output.contains(r#"<p style="margin: 0; text-align: center">x</p>"#),
        "{output}"
    );
}

#[test]
fn batch_preserves_order() {
    let documents = vec![
        "<p>first</p>".to_string(),
        "<h1>second</h1>".to_string(),
        "<p>third</p>".to_string(),
    ];
    let css = "p { text-align: left; }";
    let results = mail_style::generate_batch(&documents, css, &InlineOptions::default());
    let outputs: Vec<String> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(outputs.len(), 3);
    assert!(outputs[0].contains(r#"<p style="text-align: left">first</p>"#));
    assert!(outputs[1].contains("<h1>second</h1>"));
    assert!(outputs[2].contains(r#"<p style="text-align: left">third</p>"#));
}

#[test]
fn invalid_mode_name_is_an_error() {
    assert!(matches!(
        "sideways".parse::<MergeMode>(),
        Err(InlineError::InvalidMergeMode(_))
    ));
}
