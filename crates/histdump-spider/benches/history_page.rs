use criterion::*;
use histdump_spider::stock::page::{parse_rows, HeaderSkip, TableMarker};
use histdump_spider::stock::schema::extract;

const HISTORY_PAGE: &str = include_str!("../tests/files/history.html");

// a full year of daily rows, roughly what the live page serves
fn year_page() -> String {
    let row = "<tr><td>Oct 16, 2026</td><td>231.10</td><td>233.00</td><td>229.85</td>\
               <td>232.40</td><td>232.40</td><td>45,120,300</td></tr>";
    HISTORY_PAGE.replacen("<tbody>", &format!("<tbody>{}", row.repeat(250)), 1)
}

// parse
// ----------------------------------------------------------
fn benchmark_parse(c: &mut Criterion) {
    let page = year_page();
    let marker = TableMarker::new(r#"table[data-test="historical-prices"]"#).expect("valid css");

    c.bench_function("parse rows (header skip)", |b| {
        b.iter(|| parse_rows(black_box(&page), &HeaderSkip::default()))
    });
    c.bench_function("parse rows (table marker)", |b| {
        b.iter(|| parse_rows(black_box(&page), &marker))
    });
}

// classify
// ----------------------------------------------------------
fn benchmark_classify(c: &mut Criterion) {
    let rows = parse_rows(&year_page(), &HeaderSkip::default());

    c.bench_function("classify rows", |b| {
        b.iter(|| extract(black_box(rows.clone())))
    });
}

criterion_group!(benches, benchmark_parse, benchmark_classify);
criterion_main!(benches);
