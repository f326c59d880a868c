use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use family_tree_renderer::config::RenderOptions;
use family_tree_renderer::hierarchy::build_hierarchy;
use family_tree_renderer::interaction::ViewTransform;
use family_tree_renderer::layout::compute_layout;
use family_tree_renderer::model::{FamilyGraph, FamilyMember};
use family_tree_renderer::render::render_scene;
use std::hint::black_box;

/// A complete tree with `fanout` children per member, `generations` deep.
fn generated_family(fanout: usize, generations: usize) -> Vec<FamilyMember> {
    let mut members = vec![FamilyMember::new("0", "Member 0")];
    let mut frontier = vec!["0".to_string()];
    for _ in 1..generations {
        let mut next = Vec::with_capacity(frontier.len() * fanout);
        for parent in &frontier {
            for _ in 0..fanout {
                let id = members.len().to_string();
                members.push(
                    FamilyMember::new(id.clone(), format!("Member {id}"))
                        .with_parents([parent.as_str()]),
                );
                next.push(id);
            }
        }
        frontier = next;
    }
    members
}

/// Same family with every member after the first also listing a second,
/// earlier parent, so hierarchy building has duplicates to skip.
fn interlinked_family(fanout: usize, generations: usize) -> Vec<FamilyMember> {
    let mut members = generated_family(fanout, generations);
    for idx in 2..members.len() {
        let extra = ((idx - 1) / 2).to_string();
        if !members[idx].parent_ids.contains(&extra) {
            members[idx].parent_ids.push(extra);
        }
    }
    members
}

fn bench_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy");
    for (fanout, generations) in [(2usize, 8usize), (3, 7), (4, 6)] {
        let name = format!("fanout{fanout}_gen{generations}");
        let graph = FamilyGraph::from_members(interlinked_family(fanout, generations));
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                let tree = build_hierarchy(black_box(graph));
                black_box(tree.map(|tree| tree.len()));
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let options = RenderOptions::default();
    for (fanout, generations) in [(2usize, 8usize), (3, 7), (4, 6)] {
        let name = format!("fanout{fanout}_gen{generations}");
        let graph = FamilyGraph::from_members(generated_family(fanout, generations));
        let Some(tree) = build_hierarchy(&graph) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(name), &tree, |b, tree| {
            b.iter(|| {
                let layout = compute_layout(black_box(tree), &options);
                black_box(layout.width);
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let options = RenderOptions::default();
    let transform = ViewTransform::identity();
    for (fanout, generations) in [(2usize, 6usize), (3, 5), (2, 9)] {
        let name = format!("fanout{fanout}_gen{generations}");
        let members = generated_family(fanout, generations);
        group.bench_with_input(BenchmarkId::from_parameter(name), &members, |b, members| {
            b.iter(|| {
                let graph = FamilyGraph::from_members(black_box(members).iter().cloned());
                let tree = build_hierarchy(&graph);
                let layout = tree.map(|tree| compute_layout(&tree, &options));
                let scene = render_scene(layout.as_ref(), &options, &transform);
                black_box(scene.to_svg_string().len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hierarchy, bench_layout, bench_end_to_end);
criterion_main!(benches);
