use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use node_path::{PathSegment, PathStack, Walker};
use serde_json::{Map, Value, json};
use std::hint::black_box;

fn nested_document(depth: usize) -> Value {
    let mut document = json!({ "leaf": "${shared.value}" });
    for i in 0..depth {
        let mut object = Map::new();
        object.insert(format!("level{i}"), document);
        object.insert("items".to_string(), json!([1, 2, 3]));
        document = Value::Object(object);
    }
    json!({ "shared": { "value": 42 }, "tree": document })
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_stack");

    group.bench_function("push_release", |b| {
        let stack: PathStack = PathStack::new();
        b.iter(|| {
            let tokens: Vec<_> = (0..32).map(|i| stack.push(PathSegment::Index(i))).collect();
            for token in tokens.into_iter().rev() {
                stack.release(token).unwrap();
            }
        });
    });

    group.bench_function("guarded_visit", |b| {
        let stack: PathStack = PathStack::new();
        b.iter(|| {
            let _root = stack.enter(PathSegment::Root);
            for i in 0..32 {
                let _field = stack.enter(PathSegment::property("field"));
                let _index = stack.enter(PathSegment::Index(i));
                black_box(stack.depth());
            }
        });
    });

    group.bench_function("render_current_path", |b| {
        let stack: PathStack = PathStack::new();
        let tokens: Vec<_> = (0..32)
            .map(|i| stack.push(PathSegment::property(format!("level{i}"))))
            .collect();
        b.iter(|| black_box(stack.render().unwrap()));
        for token in tokens.into_iter().rev() {
            stack.release(token).unwrap();
        }
    });

    group.finish();

    let mut group = c.benchmark_group("walker");
    let document = nested_document(32);
    group.bench_function("resolve_nested", |b| {
        b.iter_batched(
            || Walker::new(&document),
            |walker| walker.resolve().unwrap(),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
