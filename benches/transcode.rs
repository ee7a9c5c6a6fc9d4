use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use vtk_raw::{transcode, validate, ArrayCollection, DataArray, Encoding};

/// a scalar, a vector and a tensor array over `n` points
fn create_collection(n: usize) -> ArrayCollection<DataArray> {
    let random = |components: usize| {
        let values: Array2<f64> = Array2::random((n, components), Uniform::new(0., 10.));
        values.into_raw_vec()
    };

    ArrayCollection::from(vec![
        DataArray::new("rho", 1, random(1)).unwrap(),
        DataArray::new("velocity", 3, random(3)).unwrap(),
        DataArray::new("stress", 9, random(9)).unwrap(),
    ])
}

fn write(collection: &ArrayCollection<DataArray>, encoding: Encoding) -> usize {
    let layout = validate(collection).unwrap();
    let mut out = Vec::with_capacity(layout.binary_len());
    transcode(collection, &layout, encoding, &mut out).unwrap();
    out.len()
}

fn transcode_bench(c: &mut Criterion) {
    let collection = create_collection(100_000);

    c.bench_function("transcode binary 100k", |b| {
        b.iter(|| write(black_box(&collection), Encoding::Binary))
    });

    c.bench_function("transcode ascii 100k", |b| {
        b.iter(|| write(black_box(&collection), Encoding::Ascii))
    });
}

criterion_group!(benches, transcode_bench);
criterion_main!(benches);
