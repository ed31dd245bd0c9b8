use albrouter::dispatcher::{Context, Dispatcher};
use albrouter::error::HandlerResult;
use albrouter::handlers::{HttpHandler, RouteHandler};
use albrouter::router::Route;
use albrouter::server::{Request, Response};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

const PATTERNS: &[&str] = &[
    "/health",
    "/auth/login",
    "/auth/group/user/:user_id",
    "/auth/group/user/:user_id/book/:book",
    "/orgs/:org/teams/:team/members/:member",
    "/static/*",
];

fn build_route() -> Route {
    let mut route = Route::new();
    for pattern in PATTERNS {
        route.set_endpoint(pattern, vec![]);
    }
    route
}

fn bench_route_node(c: &mut Criterion) {
    let route = build_route();
    let mut group = c.benchmark_group("route_node");
    for path in [
        "/health",
        "/auth/group/user/42",
        "/auth/group/user/42/book/dune",
        "/orgs/acme/teams/core/members/7",
        "/static/css/vendor/site.min.css",
        "/does/not/exist",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(path), path, |b, path| {
            b.iter(|| route.route_node(black_box(path)).map(|m| m.is_last));
        });
    }
    group.finish();
}

struct Item;

impl HttpHandler for Item {
    fn get(&self, _ctx: &mut Context<'_>, _req: &Request, resp: &mut Response) -> HandlerResult {
        resp.set_body("ok");
        Ok(())
    }
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = Dispatcher::builder()
        .endpoint(
            "/auth/group/user/:user_id",
            vec![RouteHandler::http(Item)],
        )
        .build();
    let req = Request::new("GET", "/auth/group/user/42");

    c.bench_function("dispatch_get_item", |b| {
        b.iter(|| dispatcher.dispatch(black_box(&req)).map(|o| o.response.status_code()));
    });
}

criterion_group!(benches, bench_route_node, bench_dispatch);
criterion_main!(benches);
