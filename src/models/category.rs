/// A classification node: two required levels (big/sub) and an optional
/// finer item label. Categories are soft-deactivated, never deleted, so
/// historical transactions always keep a valid reference.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Option<i64>,
    pub big_category: String,
    pub sub_category: String,
    pub item_category: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.big_category, self.sub_category)?;
        if let Some(item) = &self.item_category {
            write!(f, " / {item}")?;
        }
        Ok(())
    }
}
