/// Identity a ledger belongs to. Created once at provisioning time; never
/// deleted in normal operation.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    pub created_at: String,
}
