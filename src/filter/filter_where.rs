use super::error::FilterError;
use super::types::{Column, FilterOp, FilterWhereInfo, SqlParam};

/// AND-ed list of conditions. Placeholder numbering starts after
/// `starting_param_index`, so the clause can follow other bound values.
#[derive(Debug, Clone, Default)]
pub struct FilterWhere {
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn push(&mut self, column: Column, operator: FilterOp, data: SqlParam) -> Result<(), FilterError> {
        column.validate()?;
        self.conditions.push(FilterWhereInfo { column, operator, data });
        Ok(())
    }

    pub fn generate(&self, starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut params = Vec::with_capacity(self.conditions.len());
        let mut sql_conditions = Vec::with_capacity(self.conditions.len());

        for condition in &self.conditions {
            let placeholder = format!("${}", starting_param_index + params.len() + 1);
            let column = condition.column.to_sql();
            let sql = match condition.operator {
                FilterOp::Eq => format!("{} = {}", column, placeholder),
                FilterOp::ILike => format!("{} ILIKE {} ESCAPE '\\'", column, placeholder),
                FilterOp::TextSearch => {
                    format!("{} @@ plainto_tsquery('simple', {})", column, placeholder)
                }
            };
            let value = match (condition.operator, &condition.data) {
                (FilterOp::ILike, SqlParam::Text(text)) => SqlParam::Text(like_pattern(text)),
                (_, data) => data.clone(),
            };
            sql_conditions.push(sql);
            params.push(value);
        }

        (sql_conditions.join(" AND "), params)
    }
}

/// Wraps `text` in `%…%` with LIKE metacharacters escaped.
pub fn like_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn numbers_placeholders_from_offset() {
        let mut filter_where = FilterWhere::new();
        let id = Uuid::new_v4();
        filter_where
            .push(Column::new("stores", "id"), FilterOp::Eq, id.into())
            .unwrap();
        filter_where
            .push(Column::new("stores", "owner_id"), FilterOp::Eq, id.into())
            .unwrap();

        let (sql, params) = filter_where.generate(2);
        assert_eq!(sql, "\"stores\".\"id\" = $3 AND \"stores\".\"owner_id\" = $4");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");

        let mut filter_where = FilterWhere::new();
        filter_where
            .push(Column::new("categories", "name"), FilterOp::ILike, "a_b".into())
            .unwrap();
        let (sql, params) = filter_where.generate(0);
        assert_eq!(sql, "\"categories\".\"name\" ILIKE $1 ESCAPE '\\'");
        assert_eq!(params, vec![SqlParam::Text("%a\\_b%".to_string())]);
    }

    #[test]
    fn rejects_bad_identifiers() {
        let mut filter_where = FilterWhere::new();
        let err = filter_where
            .push(Column::new("stores", "name; DROP"), FilterOp::Eq, "x".into())
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidColumn(_)));
    }
}
