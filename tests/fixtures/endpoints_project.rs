//! User service route declarations.
//!
//! A well-formed project: one group, four endpoints, one validator.

use crate::http::{GroupBuilder, RouteBuilder, ValidatorRegistry};

pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

pub struct UserList {
    pub users: Vec<User>,
    pub total: u64,
}

pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

pub struct UsersGroup;

impl EndpointGroup for UsersGroup {
    fn configure(group: GroupBuilder) -> GroupBuilder {
        group.mount("/api/v1/users").named("Users").tagged("Users")
    }
}

pub struct ListUsersEndpoint;

impl Endpoint for ListUsersEndpoint {
    type Response = UserList;

    fn configure(route: RouteBuilder) -> RouteBuilder {
        route.get("/").in_group::<UsersGroup>().bind_query()
    }
}

impl ListUsersEndpoint {
    pub async fn handle(query: ListQuery) -> UserList {
        UserList {
            users: Vec::new(),
            total: 0,
        }
    }
}

pub struct CreateUserEndpoint;

impl Endpoint for CreateUserEndpoint {
    type Request = CreateUserRequest;
    type Response = User;

    fn configure(route: RouteBuilder) -> RouteBuilder {
        route
            .post("/")
            .in_group::<UsersGroup>()
            .bind_body()
            .named("Create user")
    }
}

pub struct GetUserEndpoint;

impl Endpoint for GetUserEndpoint {
    type Response = User;

    fn configure(route: RouteBuilder) -> RouteBuilder {
        route.get("/{id}").in_group::<UsersGroup>().bind_path("id")
    }
}

pub struct HealthEndpoint;

impl Endpoint for HealthEndpoint {
    fn configure(route: RouteBuilder) -> RouteBuilder {
        route.get("/api/health").skip_validation()
    }
}

pub struct CreateUserValidator;

impl Validator for CreateUserValidator {
    type Target = CreateUserRequest;
}
