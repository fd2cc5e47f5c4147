use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use loctext_core::{Document, HtmlDownloadPage, HttpResponse, ParseMode, classify, parse_xml_like};

fn bench_parse(c: &mut Criterion) {
    let legacy = std::fs::read_to_string("../../tests/fixtures/legacy_page.xml").unwrap();
    let item = std::fs::read_to_string("../../tests/fixtures/item_page.html").unwrap();

    let mut group = c.benchmark_group("parse");

    group.bench_with_input(BenchmarkId::new("legacy", "xml"), &legacy, |b, body| {
        b.iter(|| Document::parse(black_box(body)))
    });

    group.bench_with_input(BenchmarkId::new("item_page", "html"), &item, |b, body| {
        b.iter(|| Document::parse(black_box(body)))
    });

    group.finish();
}

fn bench_paragraphs(c: &mut Criterion) {
    let legacy = std::fs::read_to_string("../../tests/fixtures/legacy_page.xml").unwrap();
    let many = legacy.repeat(200);

    let mut group = c.benchmark_group("paragraphs");

    group.bench_with_input(BenchmarkId::new("single", "page"), &legacy, |b, body| {
        b.iter(|| parse_xml_like(black_box(body)))
    });

    group.bench_with_input(BenchmarkId::new("repeated", "200 pages"), &many, |b, body| {
        b.iter(|| ParseMode::XmlLike.apply(black_box(body)))
    });

    group.finish();
}

fn bench_download_options(c: &mut Criterion) {
    let item = std::fs::read_to_string("../../tests/fixtures/item_page.html").unwrap();

    c.bench_function("download_options", |b| {
        b.iter(|| HtmlDownloadPage::text_downloads(black_box(&item), "https://www.loc.gov/item/mal0440500/"))
    });
}

fn bench_classify(c: &mut Criterion) {
    let not_found = std::fs::read_to_string("../../tests/fixtures/not_found.html").unwrap();
    let alto = std::fs::read_to_string("../../tests/fixtures/alto_page.xml").unwrap();

    c.bench_function("classify_not_found", |b| b.iter(|| classify(HttpResponse::new(200, black_box(not_found.as_str())))));
    c.bench_function("classify_alto", |b| b.iter(|| classify(HttpResponse::new(200, black_box(alto.as_str())))));
}

criterion_group!(benches, bench_parse, bench_paragraphs, bench_download_options, bench_classify);
criterion_main!(benches);
