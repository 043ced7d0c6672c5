//! Traversal benchmarks over layered dependency graphs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depgraph_core::DependencyNode;

/// Build `layers` layers of `width` nodes, each depending on every node in
/// the layer below. Returns the root, which depends on the top layer.
fn layered(layers: usize, width: usize) -> DependencyNode<usize> {
    let mut below: Vec<DependencyNode<usize>> = (0..width)
        .map(|i| DependencyNode::tagged(i, "LeafNode"))
        .collect();

    for layer in 1..layers {
        let current: Vec<_> = (0..width)
            .map(|i| DependencyNode::tagged(layer * width + i, "SectionNode"))
            .collect();
        for node in &current {
            for dep in &below {
                node.depends_on(dep);
            }
        }
        below = current;
    }

    let root = DependencyNode::tagged(usize::MAX, "RootNode");
    for dep in &below {
        root.depends_on(dep);
    }
    root
}

fn bench_traversal(c: &mut Criterion) {
    let root = layered(12, 8);

    c.bench_function("depth_layered_12x8", |b| {
        b.iter(|| black_box(root.depth()))
    });

    c.bench_function("dependencies_by_name_layered_12x8", |b| {
        b.iter(|| black_box(root.dependencies_by_name(black_box("Leaf"))))
    });

    c.bench_function("parent_by_name_layered_12x8", |b| {
        b.iter(|| black_box(root.parent_by_name(black_box("Leaf"))))
    });
}

criterion_group!(benches, bench_traversal);
criterion_main!(benches);
