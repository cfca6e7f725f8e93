//! SQLite backed reconciliation store.
//!
//! [`Store`] owns the connection. A scrape run borrows it mutably through a
//! [`UnitOfWork`], which wraps a single transaction: rows inserted through it
//! are visible to later lookups in the same unit, and nothing reaches the
//! database file until [`UnitOfWork::commit`]. Dropping a unit without
//! committing rolls everything back.

use std::path::Path;

use rusqlite::{params, params_from_iter, types::Value, Connection, OpenFlags, Transaction};

use crate::model::{
    AssemblyCandidacy, CouncilCandidacy, District, Group, Id, Party, Person, Record,
};
use crate::parse::CandidateFields;
use crate::{Error, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS party (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS district (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS "group" (
    id         INTEGER PRIMARY KEY,
    identifier TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS person (
    id          INTEGER PRIMARY KEY,
    ballot_name TEXT NOT NULL,
    locality    TEXT NOT NULL,
    party_id    INTEGER REFERENCES party(id),
    phone       TEXT NOT NULL DEFAULT '',
    mobile      TEXT NOT NULL DEFAULT '',
    website     TEXT NOT NULL DEFAULT '',
    email       TEXT NOT NULL DEFAULT '',
    UNIQUE (ballot_name, locality)
);
CREATE TABLE IF NOT EXISTS legislative_assembly (
    id          INTEGER PRIMARY KEY,
    person_id   INTEGER NOT NULL REFERENCES person(id),
    district_id INTEGER NOT NULL REFERENCES district(id)
);
CREATE TABLE IF NOT EXISTS legislative_council (
    id        INTEGER PRIMARY KEY,
    person_id INTEGER NOT NULL REFERENCES person(id),
    group_id  INTEGER REFERENCES "group"(id)
);
"#;

/// Outcome of [`UnitOfWork::resolve_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    Found(T),
    Created(T),
}

impl<T> Resolved<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Resolved::Created(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Resolved::Found(t) | Resolved::Created(t) => t,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Resolved::Found(t) | Resolved::Created(t) => t,
        }
    }
}

/// Column name paired with the value it is compared against or inserted with.
pub type Fields = [(&'static str, Value)];

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens an existing database without write access. Nothing is created.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_connection(Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Creates any missing tables. Existing tables are left untouched.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Borrow the underlying connection for read-only queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn begin(&mut self) -> Result<UnitOfWork<'_>> {
        Ok(UnitOfWork {
            tx: self.conn.transaction()?,
        })
    }

    pub fn count<T: Record>(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

pub struct UnitOfWork<'conn> {
    tx: Transaction<'conn>,
}

impl UnitOfWork<'_> {
    /// Looks up the single record whose columns equal `filter`.
    /// Comparison uses `IS`, so a `NULL` filter value matches `NULL` columns.
    pub fn find<T: Record>(&self, filter: &Fields) -> Result<Option<T>> {
        let predicate = filter
            .iter()
            .map(|(column, _)| format!("{column} IS ?"))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!(
            "SELECT {} FROM {} WHERE {predicate} LIMIT 2",
            T::COLUMNS,
            T::TABLE
        );

        let mut stmt = self.tx.prepare_cached(&sql)?;
        let mut rows = stmt.query_map(params_from_iter(filter.iter().map(|(_, v)| v)), T::from_row)?;
        let first = rows.next().transpose()?;
        if rows.next().transpose()?.is_some() {
            return Err(Error::UniquenessViolation {
                table: T::TABLE,
                key: describe(filter),
            });
        }
        Ok(first)
    }

    /// Inserts a record and reads it back with its assigned id.
    pub fn add<T: Record>(&self, fields: &Fields) -> Result<T> {
        let columns = fields
            .iter()
            .map(|(column, _)| *column)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; fields.len()].join(", ");
        let sql = format!("INSERT INTO {} ({columns}) VALUES ({placeholders})", T::TABLE);

        self.tx
            .prepare_cached(&sql)?
            .execute(params_from_iter(fields.iter().map(|(_, v)| v)))?;
        self.get(self.tx.last_insert_rowid())
    }

    pub fn get<T: Record>(&self, id: Id) -> Result<T> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", T::COLUMNS, T::TABLE);
        Ok(self.tx.query_row(&sql, params![id], T::from_row)?)
    }

    /// Returns the record matching `filter`, or inserts one built from `fields`.
    /// An empty filter never matches.
    pub fn resolve_or_create<T: Record>(
        &self,
        filter: &Fields,
        fields: &Fields,
    ) -> Result<Resolved<T>> {
        if !filter.is_empty() {
            if let Some(found) = self.find(filter)? {
                return Ok(Resolved::Found(found));
            }
        }
        self.add(fields).map(Resolved::Created)
    }

    pub fn district(&self, name: &str) -> Result<Resolved<District>> {
        let key = [("name", text(name))];
        self.resolve_or_create(&key, &key)
    }

    pub fn party(&self, name: &str) -> Result<Resolved<Party>> {
        let key = [("name", text(name))];
        self.resolve_or_create(&key, &key)
    }

    pub fn group(&self, identifier: &str, name: &str) -> Result<Resolved<Group>> {
        self.resolve_or_create(
            &[("identifier", text(identifier))],
            &[("identifier", text(identifier)), ("name", text(name))],
        )
    }

    /// Persons are keyed on `(ballot_name, locality)`; contact details only
    /// apply when the person is first created.
    pub fn person(&self, fields: &CandidateFields, party: Option<&Party>) -> Result<Resolved<Person>> {
        self.resolve_or_create(
            &[
                ("ballot_name", text(&fields.ballot_name)),
                ("locality", text(&fields.locality)),
            ],
            &[
                ("ballot_name", text(&fields.ballot_name)),
                ("locality", text(&fields.locality)),
                ("party_id", optional_id(party.map(Party::id))),
                ("phone", text(&fields.phone)),
                ("mobile", text(&fields.mobile)),
                ("website", text(&fields.website)),
                ("email", text(&fields.email)),
            ],
        )
    }

    /// Points `person` at `party`. Returns whether the person changed.
    pub fn attach_party(&self, person: &mut Person, party: &Party) -> Result<bool> {
        if person.party_id == Some(party.id) {
            return Ok(false);
        }
        self.tx.execute(
            "UPDATE person SET party_id = ?1 WHERE id = ?2",
            params![party.id, person.id],
        )?;
        person.party_id = Some(party.id);
        Ok(true)
    }

    pub fn assembly_candidacy(
        &self,
        person: &Person,
        district: &District,
    ) -> Result<Resolved<AssemblyCandidacy>> {
        let key = [
            ("person_id", Value::Integer(person.id)),
            ("district_id", Value::Integer(district.id)),
        ];
        self.resolve_or_create(&key, &key)
    }

    pub fn council_candidacy(
        &self,
        person: &Person,
        group: Option<&Group>,
    ) -> Result<Resolved<CouncilCandidacy>> {
        let key = [
            ("person_id", Value::Integer(person.id)),
            ("group_id", optional_id(group.map(Group::id))),
        ];
        self.resolve_or_create(&key, &key)
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn text(s: &str) -> Value {
    Value::Text(s.to_owned())
}

fn optional_id(id: Option<Id>) -> Value {
    match id {
        Some(id) => Value::Integer(id),
        None => Value::Null,
    }
}

fn describe(filter: &Fields) -> String {
    filter
        .iter()
        .map(|(column, value)| format!("{column}={value:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}
