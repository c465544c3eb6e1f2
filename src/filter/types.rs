use uuid::Uuid;

use super::error::FilterError;

/// Typed bind parameter. Keeps `$n` placeholders and values in lockstep.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Uuid(Uuid),
    Text(String),
    NullableUuid(Option<Uuid>),
    NullableText(Option<String>),
}

impl From<Uuid> for SqlParam {
    fn from(value: Uuid) -> Self {
        SqlParam::Uuid(value)
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<Option<Uuid>> for SqlParam {
    fn from(value: Option<Uuid>) -> Self {
        SqlParam::NullableUuid(value)
    }
}

impl From<Option<String>> for SqlParam {
    fn from(value: Option<String>) -> Self {
        SqlParam::NullableText(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Case-insensitive substring match. The value is LIKE-escaped first.
    ILike,
    /// Full-text match of a tsvector column against `plainto_tsquery`.
    TextSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn parse(value: &str) -> Result<Self, FilterError> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(FilterError::InvalidSortOrder(value.to_string())),
        }
    }
}

/// Table-qualified column reference, rendered as `"table"."column"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub table: &'static str,
    pub name: &'static str,
}

impl Column {
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self { table, name }
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if !is_identifier(self.table) {
            return Err(FilterError::InvalidTableName(self.table.to_string()));
        }
        if !is_identifier(self.name) {
            return Err(FilterError::InvalidColumn(self.name.to_string()));
        }
        Ok(())
    }

    pub fn to_sql(&self) -> String {
        format!("\"{}\".\"{}\"", self.table, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct SelectColumn {
    pub column: Column,
    pub alias: Option<&'static str>,
}

impl SelectColumn {
    pub fn to_sql(&self) -> String {
        match self.alias {
            Some(alias) => format!("{} AS \"{}\"", self.column.to_sql(), alias),
            None => self.column.to_sql(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: Column,
    pub operator: FilterOp,
    pub data: SqlParam,
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: Column,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
