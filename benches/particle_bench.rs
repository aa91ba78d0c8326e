//! Benchmarks for CPU-side mesh and particle preparation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use helix_particles::asset::{encode_glb, generate_helix, load_mesh_from_bytes, HelixParams};
use helix_particles::scene::ParticleBuffer;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn helix(points_per_turn: u32) -> HelixParams {
    HelixParams {
        points_per_turn,
        ..Default::default()
    }
}

fn bench_particle_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("Particle Buffer");

    for points_per_turn in [120, 1_000, 10_000] {
        let mesh = generate_helix(&helix(points_per_turn));

        group.throughput(Throughput::Elements(mesh.vertex_count() as u64));
        group.bench_with_input(
            BenchmarkId::new("from_mesh", mesh.vertex_count()),
            &mesh,
            |b, mesh| {
                let mut rng = StdRng::seed_from_u64(42);
                b.iter(|| {
                    black_box(ParticleBuffer::from_mesh(mesh, &mut rng));
                });
            },
        );

        let particles = ParticleBuffer::from_mesh(&mesh, &mut StdRng::seed_from_u64(42));
        group.bench_with_input(
            BenchmarkId::new("instances", mesh.vertex_count()),
            &particles,
            |b, particles| {
                b.iter(|| {
                    black_box(particles.instances());
                });
            },
        );
    }

    group.finish();
}

fn bench_mesh_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mesh Loading");

    for points_per_turn in [120, 10_000] {
        let glb = encode_glb(&generate_helix(&helix(points_per_turn))).unwrap();

        group.throughput(Throughput::Bytes(glb.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("load_glb", points_per_turn),
            &glb,
            |b, glb| {
                b.iter(|| {
                    black_box(load_mesh_from_bytes(glb).unwrap());
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("center", points_per_turn),
            &load_mesh_from_bytes(&glb).unwrap(),
            |b, mesh| {
                b.iter(|| {
                    let mut mesh = mesh.clone();
                    black_box(mesh.center());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_particle_buffer, bench_mesh_loading);
criterion_main!(benches);
