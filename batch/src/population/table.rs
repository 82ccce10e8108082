use anyhow::{bail, Context};
use pdetcore::prelude::BinarySystem;
use serde::{Deserialize, Serialize};

pub const REQUIRED_COLUMNS: [&str; 8] = ["m1", "m2", "s1x", "s1y", "s1z", "s2x", "s2y", "s2z"];
pub const REDSHIFT_COLUMN: &str = "z";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Columnar population: one row per binary, nulls kept explicit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopulationTable {
    columns: Vec<Column>,
}

impl PopulationTable {
    pub fn from_columns(columns: Vec<Column>) -> anyhow::Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.values.len();
            for column in &columns {
                if column.values.len() != rows {
                    bail!(
                        "column {} has {} rows, expected {}",
                        column.name,
                        column.values.len(),
                        rows
                    );
                }
            }
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                bail!("column {} appears twice", column.name);
            }
        }
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Replaces the named column in place, or appends it.
    pub fn set_column(&mut self, name: &str, values: Vec<Option<f64>>) -> anyhow::Result<()> {
        if !self.columns.is_empty() && values.len() != self.len() {
            bail!(
                "column {} has {} rows, table has {}",
                name,
                values.len(),
                self.len()
            );
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
        Ok(())
    }

    /// One [`BinarySystem`] per row. A null or absent `z` leaves the redshift unset.
    pub fn systems(&self) -> anyhow::Result<Vec<BinarySystem>> {
        let required = REQUIRED_COLUMNS
            .iter()
            .map(|name| {
                self.column(name)
                    .with_context(|| format!("population is missing column {}", name))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let redshift = self.column(REDSHIFT_COLUMN);

        (0..self.len())
            .map(|row| {
                let mut v = [0.0; 8];
                for (slot, column) in v.iter_mut().zip(&required) {
                    *slot = column.values[row].with_context(|| {
                        format!("row {} has no value for {}", row, column.name)
                    })?;
                }
                let z = redshift.and_then(|c| c.values[row]);
                Ok(BinarySystem::new(
                    v[0],
                    v[1],
                    z,
                    [v[2], v[3], v[4]],
                    [v[5], v[6], v[7]],
                ))
            })
            .collect()
    }
}
