use crate::Table;

/// Path prefix of the PostgREST table endpoints.
pub const REST_PREFIX: &str = "/rest/v1/";

/// A query parameter; values are raw and get encoded by the HTTP client.
pub type QueryParam = (&'static str, String);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub nulls_first: bool,
}

impl Order {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            nulls_first: false,
        }
    }

    pub const fn nulls_first(self) -> Self {
        Self {
            nulls_first: true,
            ..self
        }
    }

    fn param(&self) -> String {
        if self.nulls_first {
            format!("{}.asc.nullsfirst", self.column)
        } else {
            format!("{}.asc", self.column)
        }
    }
}

/// Ordered select with an optional row limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Select {
    table: Table,
    columns: &'static str,
    order: Option<Order>,
    limit: Option<usize>,
}

impl Select {
    pub const fn new(table: Table) -> Self {
        Self {
            table,
            columns: "*",
            order: None,
            limit: None,
        }
    }

    pub const fn columns(self, columns: &'static str) -> Self {
        Self { columns, ..self }
    }

    pub const fn order(self, order: Order) -> Self {
        Self {
            order: Some(order),
            ..self
        }
    }

    pub const fn limit(self, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    pub fn path(&self) -> String {
        table_path(self.table)
    }

    pub fn params(&self) -> Vec<QueryParam> {
        let mut params = vec![("select", self.columns.to_string())];
        if let Some(order) = &self.order {
            params.push(("order", order.param()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

pub fn table_path(table: Table) -> String {
    format!("{}{}", REST_PREFIX, table.name())
}

/// Matches the rows whose `column` equals `value`.
pub fn eq_filter(column: &'static str, value: &str) -> QueryParam {
    (column, format!("eq.{}", value))
}
