use chrono::{Duration, Utc};
use common::UserId;
use criterion::{Criterion, criterion_group, criterion_main};
use order_store::{
    InMemoryOrderStore, NewOrder, OrderId, OrderQuery, OrderStatus, OrderStore, StatusTransition,
};

fn make_order(client: i64, n: usize) -> NewOrder {
    NewOrder {
        client_id: UserId::new(client),
        provider_id: None,
        service_type_id: None,
        quantity: 5.0,
        total: None,
        tax: None,
        delivery_fee: None,
        scheduled_pickup_time: None,
        scheduled_delivery_time: None,
        notes: None,
        order_number: format!("WC-B{n:06}"),
        created_at: Utc::now(),
    }
}

fn bench_insert_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("order_store/insert_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryOrderStore::new();
                store.insert_order(make_order(1, 0)).await.unwrap();
            });
        });
    });
}

fn bench_commit_transition(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("order_store/commit_transition", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryOrderStore::new();
                let (order, _) = store.insert_order(make_order(1, 0)).await.unwrap();
                let mut next = order.clone();
                next.status = OrderStatus::Confirmed;
                next.updated_at = order.updated_at + Duration::milliseconds(1);
                store
                    .commit_transition(StatusTransition::new(next, None))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_list_orders_1000(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();
    rt.block_on(async {
        for n in 0..1000 {
            store.insert_order(make_order((n % 10) as i64, n)).await.unwrap();
        }
    });

    c.bench_function("order_store/list_orders_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                store
                    .list_orders(OrderQuery::for_client(UserId::new(3)))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_status_history(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();
    rt.block_on(async {
        for n in 0..100 {
            store.insert_order(make_order(1, n)).await.unwrap();
        }
    });

    c.bench_function("order_store/status_history", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.status_history(OrderId::new(50)).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_insert_order,
    bench_commit_transition,
    bench_list_orders_1000,
    bench_status_history
);
criterion_main!(benches);
