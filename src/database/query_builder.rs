use sqlx::{self, postgres::PgArguments, FromRow, PgExecutor, PgPool};

use crate::database::manager::DatabaseError;
use crate::filter::{is_identifier, Filter, FilterError, FilterOp, FilterWhere, SqlParam, SqlResult};
use crate::filter::types::Column;

/// Runs a [`Filter`] and maps rows into `T`.
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.filter.to_sql();
        tracing::debug!(query = %sql_result.query, "select_all");
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(pool).await?)
    }
}

/// Dynamic `UPDATE … SET … WHERE … RETURNING …`.
///
/// SET values take `$1..$n`; WHERE placeholders continue after them.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table_name: &'static str,
    sets: Vec<(&'static str, SqlParam)>,
    where_data: FilterWhere,
    returning: Vec<&'static str>,
}

impl UpdateBuilder {
    pub fn new(table_name: &'static str) -> Result<Self, FilterError> {
        if !is_identifier(table_name) {
            return Err(FilterError::InvalidTableName(table_name.to_string()));
        }
        Ok(Self {
            table_name,
            sets: vec![],
            where_data: FilterWhere::new(),
            returning: vec![],
        })
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<SqlParam>) -> Result<&mut Self, FilterError> {
        if !is_identifier(column) {
            return Err(FilterError::InvalidColumn(column.to_string()));
        }
        self.sets.push((column, value.into()));
        Ok(self)
    }

    pub fn where_eq(&mut self, column: &'static str, value: impl Into<SqlParam>) -> Result<&mut Self, FilterError> {
        self.where_data
            .push(Column::new(self.table_name, column), FilterOp::Eq, value.into())?;
        Ok(self)
    }

    pub fn returning(&mut self, columns: &[&'static str]) -> Result<&mut Self, FilterError> {
        for column in columns {
            if !is_identifier(column) {
                return Err(FilterError::InvalidColumn(column.to_string()));
            }
        }
        self.returning.extend_from_slice(columns);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn to_sql(&self) -> SqlResult {
        let mut params: Vec<SqlParam> = Vec::with_capacity(self.sets.len());
        let set_clause = self
            .sets
            .iter()
            .enumerate()
            .map(|(i, (column, value))| {
                params.push(value.clone());
                format!("\"{}\" = ${}", column, i + 1)
            })
            .collect::<Vec<_>>()
            .join(", ");

        let (where_clause, where_params) = self.where_data.generate(params.len());
        params.extend(where_params);

        let mut query = format!("UPDATE \"{}\" SET {}", self.table_name, set_clause);
        if !where_clause.is_empty() {
            query.push_str(&format!(" WHERE {}", where_clause));
        }
        if !self.returning.is_empty() {
            let cols = self
                .returning
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", ");
            query.push_str(&format!(" RETURNING {}", cols));
        }

        SqlResult { query, params }
    }

    pub async fn fetch_optional<'e, T, E>(&self, executor: E) -> Result<Option<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
        E: PgExecutor<'e>,
    {
        let sql_result = self.to_sql();
        tracing::debug!(query = %sql_result.query, "update");
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_optional(executor).await?)
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::NullableUuid(u) => q.bind(*u),
        SqlParam::NullableText(s) => q.bind(s.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn update_continues_placeholder_numbering_into_where() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let mut update = UpdateBuilder::new("stores").unwrap();
        update
            .set("name", "Corner shop")
            .unwrap()
            .set("description", "Open late")
            .unwrap()
            .where_eq("id", id)
            .unwrap()
            .where_eq("owner_id", owner)
            .unwrap()
            .returning(&["id"])
            .unwrap();

        let sql = update.to_sql();
        assert_eq!(
            sql.query,
            "UPDATE \"stores\" SET \"name\" = $1, \"description\" = $2 \
             WHERE \"stores\".\"id\" = $3 AND \"stores\".\"owner_id\" = $4 RETURNING \"id\""
        );
        assert_eq!(sql.params.len(), 4);
        assert_eq!(sql.params[2], SqlParam::Uuid(id));
    }

    #[test]
    fn update_binds_nulls() {
        let mut update = UpdateBuilder::new("categories").unwrap();
        update.set("parent_category_id", None::<Uuid>).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.to_sql().params, vec![SqlParam::NullableUuid(None)]);
    }

    #[test]
    fn rejects_bad_set_column() {
        let mut update = UpdateBuilder::new("stores").unwrap();
        assert!(update.set("name = 'x' --", "y").is_err());
    }
}
