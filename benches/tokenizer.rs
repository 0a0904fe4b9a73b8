use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spellwalk::checker::tokenizer::Tokenizer;
use spellwalk::DictionaryStore;

fn sample_text() -> String {
    let paragraph = "The quick brown fox jumps over the lazy dog. It's 42 o’clock, \
                     and well-known snake_case identifiers shouldn't slow us down.\n";
    paragraph.repeat(500)
}

fn bench_tokenize(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("tokenize_500_lines", |b| {
        b.iter(|| Tokenizer::new(black_box(&text)).occurrences().count())
    });
}

fn bench_lookup(c: &mut Criterion) {
    let text = sample_text();
    let dictionary =
        DictionaryStore::from_words(["the", "quick", "brown", "fox", "jumps", "over", "lazy"])
            .unwrap();
    c.bench_function("lookup_500_lines", |b| {
        b.iter(|| {
            Tokenizer::new(black_box(&text))
                .occurrences()
                .filter(|o| !dictionary.contains(&o.word))
                .count()
        })
    });
}

criterion_group!(benches, bench_tokenize, bench_lookup);
criterion_main!(benches);
