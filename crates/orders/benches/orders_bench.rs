use catalog::{InMemoryCatalog, Product};
use common::{Money, ProductId, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use orders::{
    CreateOrder, InMemoryOrderRepository, OrderPatch, OrderRepository, OrderService, OrderStatus,
    PaymentMethod, RequestedItem, ShippingAddress, UpdateGuard,
};

fn address() -> ShippingAddress {
    ShippingAddress {
        name: "Bench".to_string(),
        phone: "1".to_string(),
        line1: "1 St".to_string(),
        line2: None,
        city: "X".to_string(),
        state: "Y".to_string(),
        postal_code: "Z".to_string(),
        country: "US".to_string(),
    }
}

fn setup() -> OrderService<InMemoryOrderRepository, InMemoryCatalog> {
    let catalog = InMemoryCatalog::new();
    catalog.put_product(Product::new(
        "SKU-001",
        "Widget",
        Money::from_cents(9999),
        u32::MAX,
    ));
    OrderService::new(InMemoryOrderRepository::new(), catalog)
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = setup();

    c.bench_function("orders/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .create_order(CreateOrder {
                        user_id: UserId::new(),
                        items: vec![RequestedItem {
                            product_id: ProductId::new("SKU-001"),
                            unit_price: Money::from_cents(9999),
                            quantity: 2,
                        }],
                        shipping_address: address(),
                        payment_method: PaymentMethod::CreditCard,
                        notes: None,
                    })
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_conditional_update(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let repo = InMemoryOrderRepository::new();
    let catalog = InMemoryCatalog::new();
    catalog.put_product(Product::new(
        "SKU-001",
        "Widget",
        Money::from_cents(9999),
        u32::MAX,
    ));
    let service = OrderService::new(repo.clone(), catalog);

    let order_id = rt.block_on(async {
        service
            .create_order(CreateOrder {
                user_id: UserId::new(),
                items: vec![RequestedItem {
                    product_id: ProductId::new("SKU-001"),
                    unit_price: Money::from_cents(9999),
                    quantity: 1,
                }],
                shipping_address: address(),
                payment_method: PaymentMethod::CreditCard,
                notes: None,
            })
            .await
            .unwrap()
            .id
    });

    c.bench_function("orders/conditional_update_noop_guard", |b| {
        b.iter(|| {
            rt.block_on(async {
                // Guard never matches; measures the CAS path itself
                let applied = repo
                    .conditional_update(
                        order_id,
                        UpdateGuard::status_is(OrderStatus::Shipped),
                        OrderPatch::set_status(OrderStatus::Delivered),
                    )
                    .await
                    .unwrap();
                assert!(!applied);
            });
        });
    });
}

criterion_group!(benches, bench_create_order, bench_conditional_update);
criterion_main!(benches);
