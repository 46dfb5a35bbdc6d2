use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientRef {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BusinessTypeRef {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}
