extern crate criterion;

use criterion::{criterion_group, criterion_main, Criterion};

use mailstyle_lib::mail_generate::mail_style;
use mailstyle_lib::{merge, InlineOptions, MergeMode, StyleToken};

fn bench_merge_wide_tokens(c: &mut Criterion) {
    let mut element = StyleToken::new("td.cell");
    let mut rule = StyleToken::new("td.cell");
    for i in 0..200 {
        element.push_property(format!("--var-{}: {}px", i, i));
        rule.push_property(format!("--var-{}: {}px", i * 2, i));
    }

    for mode in MergeMode::ALL {
        c.bench_function(&format!("merge_wide_{}", mode), |b| {
            b.iter(|| merge(Some(&element), Some(&rule), Some(mode)))
        });
    }
}

fn bench_inline_document(c: &mut Criterion) {
    let mut html = String::from("<style>td { padding: 4px; } td.cell { text-align: center; }</style><table>");
    for _ in 0..2_000 {
        html.push_str(r#"<tr><td class="cell" style="color: red">x</td><td>y</td></tr>"#);
    }
    html.push_str("</table>");

    c.bench_function("inline_document", |b| {
        b.iter(|| mail_style::generate(&html, "", &InlineOptions::default()))
    });
}

criterion_group!(benches, bench_merge_wide_tokens, bench_inline_document);
criterion_main!(benches);
