use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use formnet::http::multipart::{FieldValue, MultipartForm};
use serde_json::json;

fn benchmark_encode_mixed_form(c: &mut Criterion) {
    // Typical upload: a few text fields, a JSON payload, one inline image.
    let image = format!(
        "data:image/jpeg;base64,{}",
        STANDARD.encode(vec![0xabu8; 64 * 1024])
    );
    let metadata = json!({
        "device": {"model": "Pixel 8", "os": "android-15"},
        "tags": ["receipt", "expense", "q3"],
        "retries": 0,
    });

    c.bench_function("encode_mixed_form", |b| {
        b.iter(|| {
            let form = MultipartForm::new()
                .field("user", "user-12345")
                .field("description", "October expense receipt")
                .field("metadata", FieldValue::from(metadata.clone()))
                .field("photo", image.as_str());
            black_box(form.into_body().unwrap())
        })
    });
}

fn benchmark_encode_text_only(c: &mut Criterion) {
    c.bench_function("encode_text_only", |b| {
        b.iter(|| {
            let form = MultipartForm::new()
                .field("a", "alpha")
                .field("b", "beta")
                .field("c", "gamma");
            black_box(form.into_body().unwrap())
        })
    });
}

criterion_group!(benches, benchmark_encode_mixed_form, benchmark_encode_text_only);
criterion_main!(benches);
