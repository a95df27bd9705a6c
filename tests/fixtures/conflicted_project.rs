//! Order service declarations with configuration mistakes.
//!
//! Exercises the diagnostic catalogue: a conflicted endpoint, a verbless
//! endpoint, an unreferenced group, and a legacy validator shape.

use crate::http::{GroupBuilder, RouteBuilder};

pub struct OrderDraft {
    pub items: Vec<String>,
}

pub struct OrdersGroup;

impl EndpointGroup for OrdersGroup {
    fn configure(group: GroupBuilder) -> GroupBuilder {
        group.mount("/api/v1/orders")
    }
}

pub struct AbandonedGroup;

impl EndpointGroup for AbandonedGroup {
    fn configure(group: GroupBuilder) -> GroupBuilder {
        group.mount("/api/v1/abandoned")
    }
}

pub struct ListOrdersEndpoint;

impl Endpoint for ListOrdersEndpoint {
    fn configure(route: RouteBuilder) -> RouteBuilder {
        route.get("/").in_group::<OrdersGroup>()
    }
}

pub struct BrokenEndpoint;

impl Endpoint for BrokenEndpoint {
    type Request = OrderDraft;

    fn configure(route: RouteBuilder) -> RouteBuilder {
        route.get("/orders/export").post("/orders/import").bind_body()
    }
}

pub struct SilentEndpoint;

impl Endpoint for SilentEndpoint {
    fn configure(route: RouteBuilder) -> RouteBuilder {
        route.named("Never routed")
    }
}

pub struct OrderDraftValidator;

impl RequestValidator<OrderDraft> for OrderDraftValidator {}
