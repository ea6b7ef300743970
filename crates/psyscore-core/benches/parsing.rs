use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use psyscore_core::parser::{parse_answer_keys_str, parse_answer_string};

fn bench_answer_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("answer_string");

    let compact = "ABCDDCBAABCDDCBAABCDDCB";
    let spaced = "ABCD DCBA ABCD DCBA ABCD DCB";

    group.bench_function("compact", |b| {
        b.iter(|| parse_answer_string(black_box(compact)))
    });

    group.bench_function("spaced", |b| {
        b.iter(|| parse_answer_string(black_box(spaced)))
    });

    group.finish();
}

fn bench_key_file(c: &mut Criterion) {
    let file = {
        let mut s = String::from("[answer_keys]\nname = \"bench\"\n");
        for year in 2000..2024 {
            for subject in ["Math", "Hebrew", "English"] {
                for part in ["A", "B"] {
                    s.push_str(&format!(
                        "\n[[chapters]]\nyear = {year}\nseason = \"Winter\"\nsubject = \"{subject}\"\npart = \"{part}\"\nanswers = \"ABCDDCBAABCDDCBAABCDDCB\"\n"
                    ));
                }
            }
        }
        s
    };

    c.bench_function("key_file/144_chapters", |b| {
        b.iter(|| parse_answer_keys_str(black_box(&file), Path::new("bench.toml")))
    });
}

criterion_group!(benches, bench_answer_string, bench_key_file);
criterion_main!(benches);
