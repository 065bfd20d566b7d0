/// An originating institution: a bank, merchant, or API source.
#[derive(Debug, Clone)]
pub struct Company {
    pub id: Option<i64>,
    pub name: String,
    pub company_type: Option<String>,
    pub api_endpoint: Option<String>,
    pub api_available: bool,
    pub created_at: String,
}
