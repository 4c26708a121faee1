use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use prism_common::Transform;

fn bench_cached_reads(iterations: usize) {
    let mut t = Transform::new()
        .with_position(Vec3::new(1.0, 2.0, 3.0))
        .with_rotation(Vec3::new(0.3, 1.1, -0.2))
        .with_scale(Vec3::new(1.0, 2.0, 0.5));

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(t.world_matrix());
        black_box(t.world_inverse_transpose_matrix());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  cached reads ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_dirty_reads(iterations: usize) {
    let mut t = Transform::new();

    let start = Instant::now();
    for i in 0..iterations {
        t.rotate(Vec3::new(0.0, 0.001, 0.0));
        t.move_relative(Vec3::new(0.0, 0.0, i as f32 * 1e-4));
        black_box(t.world_matrix());
        black_box(t.world_inverse_transpose_matrix());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  dirty reads ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_basis_vectors(iterations: usize) {
    let mut t = Transform::new();

    let start = Instant::now();
    for _ in 0..iterations {
        t.rotate(Vec3::new(0.001, 0.002, 0.0));
        black_box(t.forward());
        black_box(t.right());
        black_box(t.up());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  basis vectors ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("transform benchmarks");
    for iterations in [10_000, 100_000] {
        bench_cached_reads(iterations);
        bench_dirty_reads(iterations);
        bench_basis_vectors(iterations);
    }
}
