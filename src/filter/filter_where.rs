use serde_json::Value;

use super::error::FilterError;
use super::types::{field_sql, validate_field_name, FilterOp, FilterWhereInfo};

/// Compiles a Mongo-style condition document into a SQL predicate over the
/// JSONB `doc` column. Every operand is bound as a JSONB parameter.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(where_data: &Value, starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build(where_data)?;
        Ok((sql, filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null => Ok(()),
            Value::Object(_) => Self::parse_where_data(where_data).map(|_| ()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    /// Flatten a condition document into `(field, operator, operand)` triples.
    /// Logical operators keep their nested document(s) as the operand.
    pub fn parse_where_data(where_data: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok(vec![]),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        };

        let mut conditions = Vec::new();
        for (key, value) in obj {
            if key.starts_with('$') {
                let operator = FilterOp::from_key(key)
                    .filter(FilterOp::is_logical)
                    .ok_or_else(|| FilterError::UnsupportedOperator(key.clone()))?;
                Self::validate_logical_operand(key, operator, value)?;
                conditions.push(FilterWhereInfo { field: String::new(), operator, data: value.clone() });
                continue;
            }

            validate_field_name(key)?;
            match value {
                Value::Object(ops) if ops.keys().all(|k| k.starts_with('$')) && !ops.is_empty() => {
                    for (op_key, op_val) in ops {
                        let operator = FilterOp::from_key(op_key)
                            .filter(|op| !op.is_logical())
                            .ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
                        Self::validate_operand(op_key, operator, op_val)?;
                        conditions.push(FilterWhereInfo { field: key.clone(), operator, data: op_val.clone() });
                    }
                }
                // Implicit equality: { field: value }
                _ => conditions.push(FilterWhereInfo { field: key.clone(), operator: FilterOp::Eq, data: value.clone() }),
            }
        }
        Ok(conditions)
    }

    fn validate_logical_operand(key: &str, operator: FilterOp, value: &Value) -> Result<(), FilterError> {
        match (operator, value) {
            (FilterOp::And | FilterOp::Or, Value::Array(items)) => {
                for item in items {
                    Self::validate(item)?;
                }
                Ok(())
            }
            (FilterOp::Not, Value::Object(_)) => Self::validate(value),
            (FilterOp::Not, _) => Err(FilterError::InvalidOperatorData(format!("{} requires object", key))),
            _ => Err(FilterError::InvalidOperatorData(format!("{} requires array", key))),
        }
    }

    fn validate_operand(key: &str, operator: FilterOp, value: &Value) -> Result<(), FilterError> {
        match operator {
            FilterOp::In if !value.is_array() => {
                Err(FilterError::InvalidOperatorData(format!("{} requires array", key)))
            }
            FilterOp::Find if !value.is_string() => {
                Err(FilterError::InvalidOperatorData(format!("{} requires string", key)))
            }
            _ => Ok(()),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<String, FilterError> {
        let conditions = Self::parse_where_data(where_data)?;
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in &conditions {
            sql_conditions.push(self.build_sql_condition(condition)?);
        }
        Ok(if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        })
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let column = field_sql(&condition.field);
        let data = &condition.data;

        let sql = match condition.operator {
            FilterOp::Eq if data.is_null() => format!("COALESCE({}, 'null'::jsonb) = 'null'::jsonb", column),
            FilterOp::Eq => format!("{} = {}", column, self.param(data.clone())),
            FilterOp::Ne if data.is_null() => format!("COALESCE({}, 'null'::jsonb) <> 'null'::jsonb", column),
            FilterOp::Ne => format!("({} IS NULL OR {} <> {})", column, column, self.param(data.clone())),
            FilterOp::Gt => format!("{} > {}", column, self.param(data.clone())),
            FilterOp::Gte => format!("{} >= {}", column, self.param(data.clone())),
            FilterOp::Lt => format!("{} < {}", column, self.param(data.clone())),
            FilterOp::Lte => format!("{} <= {}", column, self.param(data.clone())),
            FilterOp::In => {
                let values = data.as_array().cloned().unwrap_or_default();
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                // One array parameter regardless of list length
                let param = self.param(Value::Array(values));
                format!("{} IN (SELECT value FROM jsonb_array_elements({}))", column, param)
            }
            FilterOp::Find => {
                // ->> yields text; #>> '{}' unwraps the bound JSONB string
                let param = self.param(data.clone());
                format!("strpos((\"doc\"->>'{}'), ({} #>> '{{}}')) > 0", condition.field, param)
            }
            FilterOp::And | FilterOp::Or => {
                let items = data.as_array().cloned().unwrap_or_default();
                if items.is_empty() {
                    return Ok(if condition.operator == FilterOp::And { "1=1" } else { "1=0" }.to_string());
                }
                let mut parts = Vec::with_capacity(items.len());
                for item in &items {
                    parts.push(format!("({})", self.build(item)?));
                }
                let joiner = if condition.operator == FilterOp::And { " AND " } else { " OR " };
                format!("({})", parts.join(joiner))
            }
            FilterOp::Not => format!("NOT ({})", self.build(data)?),
        };
        Ok(sql)
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
