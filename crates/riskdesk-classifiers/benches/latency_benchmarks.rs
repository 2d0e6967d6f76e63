//! Latency benchmarks for the deterministic classifier
//!
//! The deterministic path sits on every fallback, so it has to stay well
//! under a millisecond regardless of question length.
//!
//! Run with: cargo bench -p riskdesk-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use riskdesk_classifiers::{normalize, DeterministicClassifier, SignalLexicon};
use riskdesk_core::SupportRequest;

const QUESTIONS: &[(&str, &str)] = &[
    ("balance", "What is my current account balance?"),
    ("lost_card", "I just lost my card!"),
    ("unauthorized", "I see several charges on my statement that I didn't make"),
    (
        "long_clean",
        "Hello, I have been a customer for many years and I would like to know how to \
         download my monthly statements for the last year so I can prepare my taxes. \
         Could you also tell me whether the app supports exporting them as a spreadsheet?",
    ),
];

fn benchmark_classify(c: &mut Criterion) {
    let classifier = DeterministicClassifier::builtin().expect("Failed to build classifier");

    let mut group = c.benchmark_group("Deterministic_Classifier");
    group.sample_size(200);

    for (name, question) in QUESTIONS {
        let request = SupportRequest::new(*question, "John");
        group.bench_with_input(BenchmarkId::new("classify", name), &request, |b, request| {
            b.iter(|| classifier.classify(black_box(request), None).unwrap());
        });
    }

    group.finish();
}

fn benchmark_lexicon_scan(c: &mut Criterion) {
    let lexicon = SignalLexicon::builtin().expect("Failed to build lexicon");

    let mut group = c.benchmark_group("Signal_Lexicon");
    for (name, question) in QUESTIONS {
        let text = normalize(question);
        group.bench_with_input(BenchmarkId::new("scan", name), &text, |b, text| {
            b.iter(|| lexicon.scan(black_box(text)).len());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_classify, benchmark_lexicon_scan);
criterion_main!(benches);
