use std::hint::black_box;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use moodmirror::decode::{decode_base64_image, strip_data_url};
use opencv::core::{CV_8UC3, Mat, Scalar, Vector};
use opencv::imgcodecs;
use opencv::prelude::*;

fn encode(ext: &str, rows: i32, cols: i32) -> String {
    let mat = Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::new(30., 60., 90., 0.))
        .unwrap();
    let mut buf = Vector::<u8>::new();
    imgcodecs::imencode(ext, &mat, &mut buf, &Vector::new()).unwrap();
    STANDARD.encode(buf.as_slice())
}

fn benchmark_decode(c: &mut Criterion) {
    let png = format!("data:image/png;base64,{}", encode(".png", 480, 640));
    let jpg = format!("data:image/jpeg;base64,{}", encode(".jpg", 480, 640));

    let mut group = c.benchmark_group("图片解码");
    group.throughput(Throughput::Elements(1));
    group.bench_function("前缀剥离", |b| b.iter(|| strip_data_url(black_box(&png)).len()));
    group.bench_function("PNG 解码", |b| b.iter(|| decode_base64_image(black_box(&png))));
    group.bench_function("JPEG 解码", |b| b.iter(|| decode_base64_image(black_box(&jpg))));
    group.bench_function("无效输入", |b| b.iter(|| decode_base64_image(black_box("@@@@"))));
    group.finish();
}

criterion_group!(benches, benchmark_decode);
criterion_main!(benches);
