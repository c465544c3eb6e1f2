use super::error::FilterError;
use super::types::{Column, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn parse(column: Column, sort: SortDirection) -> Result<FilterOrderInfo, FilterError> {
        column.validate()?;
        Ok(FilterOrderInfo { column, sort })
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", i.column.to_sql(), i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
