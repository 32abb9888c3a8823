use criterion::{black_box, criterion_group, criterion_main, Criterion};
use csd_retrofit::frame_filter::WatchingFrameFilter;
use csd_retrofit::geometry::{Point, Rect, Size};
use csd_retrofit::hit_test::{classify, Resizability, DEFAULT_RESIZE_BORDER};
use csd_retrofit::host::{Application, WidgetRole, WindowKind};
use csd_retrofit::{DecorationEngine, DecorationSettings};
use std::rc::Rc;

fn cursors(rect: Rect) -> Vec<Point> {
    (rect.left - 4..rect.right + 4)
        .step_by(7)
        .flat_map(|x| (rect.top - 4..rect.bottom + 4).step_by(7).map(move |y| Point::new(x, y)))
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let window = Rect::new(100, 100, 1380, 820);
    let points = cursors(window);
    c.bench_function("classify_grid", |b| {
        b.iter(|| {
            for point in &points {
                black_box(classify(
                    window,
                    *point,
                    Resizability::BOTH,
                    DEFAULT_RESIZE_BORDER,
                    point.y < window.top + 30,
                ));
            }
        })
    });
}

fn bench_engine_hit_test(c: &mut Criterion) {
    let app = Application::new();
    let settings = DecorationSettings {
        follow_system_accent: false,
        ..Default::default()
    };
    let engine =
        DecorationEngine::attach_with_filter(&app, settings, Rc::new(WatchingFrameFilter::new()));
    let window = app.create_window("main", WindowKind::Window, WidgetRole::Plain, Size::new(1280, 720));
    app.set_window_position(window, Point::new(100, 100));
    app.show(window);
    app.process_events();

    let points = cursors(Rect::new(100, 100, 1380, 820));
    c.bench_function("engine_hit_test_grid", |b| {
        b.iter(|| {
            for point in &points {
                black_box(engine.hit_test(window, *point));
            }
        })
    });
}

criterion_group!(benches, bench_classify, bench_engine_hit_test);
criterion_main!(benches);
