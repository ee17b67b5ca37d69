/// Application name
pub const APP_NAME: &str = "taskboard";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default API base URL used by the client when none is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Collection of owners
pub const OWNERS_PATH: &str = "/owners";

/// Collection of items, addressed by item id
pub const ITEMS_PATH: &str = "/items";

/// Legacy alias of [`OWNERS_PATH`]
pub const USERS_PATH: &str = "/users";

/// Legacy alias of [`ITEMS_PATH`]
pub const TASKS_PATH: &str = "/tasks";

/// Health probe
pub const HEALTH_PATH: &str = "/health";

/// `/owners/{id}`
pub fn owner_path(user_id: uuid::Uuid) -> String {
    format!("{OWNERS_PATH}/{user_id}")
}

/// `/owners/{id}/items`
pub fn owner_items_path(user_id: uuid::Uuid) -> String {
    format!("{OWNERS_PATH}/{user_id}{ITEMS_PATH}")
}

/// `/items/{id}`
pub fn item_path(task_id: uuid::Uuid) -> String {
    format!("{ITEMS_PATH}/{task_id}")
}
