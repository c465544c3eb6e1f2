use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::pagination::{Pagination, Sort, SortField};
use super::types::{is_identifier, Column, FilterOp, FilterOrderInfo, SelectColumn, SqlParam, SqlResult};

/// SELECT builder over one base table with optional LEFT JOINs.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: &'static str,
    select_columns: Vec<SelectColumn>,
    joins: Vec<String>,
    where_data: FilterWhere,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Filter {
    pub fn new(table_name: &'static str) -> Result<Self, FilterError> {
        if !is_identifier(table_name) {
            return Err(FilterError::InvalidTableName(table_name.to_string()));
        }
        Ok(Self {
            table_name,
            select_columns: vec![],
            joins: vec![],
            where_data: FilterWhere::new(),
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn select(&mut self, column: Column, alias: Option<&'static str>) -> Result<&mut Self, FilterError> {
        column.validate()?;
        if let Some(alias) = alias {
            if !is_identifier(alias) {
                return Err(FilterError::InvalidColumn(alias.to_string()));
            }
        }
        self.select_columns.push(SelectColumn { column, alias });
        Ok(self)
    }

    /// `LEFT JOIN "<left.table>" ON <left> = <right>`
    pub fn left_join(&mut self, left: Column, right: Column) -> Result<&mut Self, FilterError> {
        left.validate()?;
        right.validate()?;
        self.joins.push(format!(
            "LEFT JOIN \"{}\" ON {} = {}",
            left.table,
            left.to_sql(),
            right.to_sql()
        ));
        Ok(self)
    }

    pub fn where_eq(&mut self, column: Column, value: impl Into<SqlParam>) -> Result<&mut Self, FilterError> {
        self.where_data.push(column, FilterOp::Eq, value.into())?;
        Ok(self)
    }

    pub fn where_ilike(&mut self, column: Column, text: &str) -> Result<&mut Self, FilterError> {
        self.where_data.push(column, FilterOp::ILike, SqlParam::Text(text.to_string()))?;
        Ok(self)
    }

    pub fn where_text_search(&mut self, column: Column, text: &str) -> Result<&mut Self, FilterError> {
        self.where_data
            .push(column, FilterOp::TextSearch, SqlParam::Text(text.to_string()))?;
        Ok(self)
    }

    pub fn order<F: SortField>(&mut self, sort: &Sort<F>) -> Result<&mut Self, FilterError> {
        self.order_data.push(FilterOrder::parse(sort.field.column(), sort.direction)?);
        Ok(self)
    }

    pub fn paginate(&mut self, pagination: &Pagination) -> &mut Self {
        self.limit = Some(pagination.limit());
        self.offset = Some(pagination.offset());
        self
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_data.generate(0);

        let query = [
            format!("SELECT {}", self.build_select_clause()),
            format!("FROM \"{}\"", self.table_name),
            self.joins.join(" "),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            FilterOrder::generate(&self.order_data),
            self.build_limit_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() {
            format!("\"{}\".*", self.table_name)
        } else {
            self.select_columns
                .iter()
                .map(SelectColumn::to_sql)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}
