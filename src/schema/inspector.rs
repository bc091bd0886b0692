use std::fmt;
use serde::Serialize;
use tokio_postgres::GenericClient;
use tracing::debug;
use crate::error::{MigrateError, Result};

/// One column pair of a foreign key constraint.
///
/// `from_table` references `to_table`, so rows of `to_table` have to exist
/// before rows of `from_table` can be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ForeignKey {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    /// Name of the constraint the column pair belongs to, if known
    pub constraint: Option<String>,
}

impl ForeignKey {
    pub fn new(
        from_table: impl Into<String>,
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_column: from_column.into(),
            to_table: to_table.into(),
            to_column: to_column.into(),
            constraint: None,
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {}.{}", self.from_table, self.from_column, self.to_table, self.to_column)
    }
}

/// Tables and foreign keys of one namespace, read from the same snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSnapshot {
    pub namespace: String,
    pub tables: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

/// Read-only catalog queries.
///
/// Meant to run inside a repeatable-read transaction so that the table list
/// and the foreign key list agree with each other.
pub struct SchemaInspector<'a, C: GenericClient> {
    client: &'a C,
}

impl<'a, C: GenericClient> SchemaInspector<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Ordinary and partitioned tables of `namespace`, ordered by name.
    /// Individual partitions are left out since rows are routed through
    /// their parent.
    pub async fn list_tables(&self, namespace: &str) -> Result<Vec<String>> {
        let rows = self.client.query(
            r#"
            SELECT c.relname::text
            FROM pg_catalog.pg_class c
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = $1
              AND c.relkind IN ('r', 'p')
              AND NOT c.relispartition
            ORDER BY c.relname
            "#,
            &[&namespace],
        ).await.map_err(|e| MigrateError::query("listing tables", e))?;

        let tables: Vec<String> = rows.into_iter().map(|row| row.get(0)).collect();
        debug!(namespace, count = tables.len(), "Listed tables");
        Ok(tables)
    }

    /// Foreign key column pairs whose source and target both live in
    /// `namespace` and are members of `tables`.
    ///
    /// Composite constraints yield one entry per column pair, in key order.
    pub async fn list_foreign_keys(&self, namespace: &str, tables: &[String]) -> Result<Vec<ForeignKey>> {
        if tables.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.client.query(
            r#"
            SELECT src.relname::text,
                   src_att.attname::text,
                   dst.relname::text,
                   dst_att.attname::text,
                   con.conname::text
            FROM pg_catalog.pg_constraint con
            JOIN pg_catalog.pg_class src ON src.oid = con.conrelid
            JOIN pg_catalog.pg_namespace src_ns ON src_ns.oid = src.relnamespace
            JOIN pg_catalog.pg_class dst ON dst.oid = con.confrelid
            JOIN pg_catalog.pg_namespace dst_ns ON dst_ns.oid = dst.relnamespace
            CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
                WITH ORDINALITY AS k(src_attnum, dst_attnum, position)
            JOIN pg_catalog.pg_attribute src_att
                ON src_att.attrelid = con.conrelid AND src_att.attnum = k.src_attnum
            JOIN pg_catalog.pg_attribute dst_att
                ON dst_att.attrelid = con.confrelid AND dst_att.attnum = k.dst_attnum
            WHERE con.contype = 'f'
              AND src_ns.nspname = $1
              AND dst_ns.nspname = $1
              AND src.relname::text = ANY($2::text[])
              AND dst.relname::text = ANY($2::text[])
            ORDER BY src.relname, con.conname, k.position
            "#,
            &[&namespace, &tables],
        ).await.map_err(|e| MigrateError::query("listing foreign keys", e))?;

        let foreign_keys: Vec<ForeignKey> = rows.into_iter()
            .map(|row| {
                ForeignKey::new(
                    row.get::<_, String>(0),
                    row.get::<_, String>(1),
                    row.get::<_, String>(2),
                    row.get::<_, String>(3),
                ).with_constraint(row.get::<_, String>(4))
            })
            .collect();

        debug!(namespace, count = foreign_keys.len(), "Listed foreign keys");
        Ok(foreign_keys)
    }

    /// List tables, then the foreign keys among them
    pub async fn snapshot(&self, namespace: &str) -> Result<CatalogSnapshot> {
        let tables = self.list_tables(namespace).await?;
        let foreign_keys = self.list_foreign_keys(namespace, &tables).await?;

        Ok(CatalogSnapshot {
            namespace: namespace.to_string(),
            tables,
            foreign_keys,
        })
    }
}
