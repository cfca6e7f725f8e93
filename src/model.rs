//! Persisted entities. Every entity is identified by its SQLite rowid and
//! reconciled against its natural key (see [`crate::store`]).

use rusqlite::Row;

/// Typed SQLite rowid.
pub type Id = i64;

/// Row mapping shared by every entity table.
pub trait Record: Sized {
    const TABLE: &'static str;
    /// Column list used when selecting a whole record, `id` first.
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn id(&self) -> Id;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: Id,
    pub ballot_name: String,
    pub locality: String,
    pub party_id: Option<Id>,
    pub phone: String,
    pub mobile: String,
    pub website: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct District {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub id: Id,
    pub name: String,
}

/// A council ballot group, e.g. identifier `"A"` with name `"Greens"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: Id,
    pub identifier: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyCandidacy {
    pub id: Id,
    pub person_id: Id,
    pub district_id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouncilCandidacy {
    pub id: Id,
    pub person_id: Id,
    pub group_id: Option<Id>,
}

impl Record for Person {
    const TABLE: &'static str = "person";
    const COLUMNS: &'static str =
        "id, ballot_name, locality, party_id, phone, mobile, website, email";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ballot_name: row.get(1)?,
            locality: row.get(2)?,
            party_id: row.get(3)?,
            phone: row.get(4)?,
            mobile: row.get(5)?,
            website: row.get(6)?,
            email: row.get(7)?,
        })
    }

    fn id(&self) -> Id {
        self.id
    }
}

impl Record for District {
    const TABLE: &'static str = "district";
    const COLUMNS: &'static str = "id, name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    fn id(&self) -> Id {
        self.id
    }
}

impl Record for Party {
    const TABLE: &'static str = "party";
    const COLUMNS: &'static str = "id, name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    fn id(&self) -> Id {
        self.id
    }
}

impl Record for Group {
    // `group` is an SQL keyword, so the table name carries its own quotes.
    const TABLE: &'static str = "\"group\"";
    const COLUMNS: &'static str = "id, identifier, name";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            identifier: row.get(1)?,
            name: row.get(2)?,
        })
    }

    fn id(&self) -> Id {
        self.id
    }
}

impl Record for AssemblyCandidacy {
    const TABLE: &'static str = "legislative_assembly";
    const COLUMNS: &'static str = "id, person_id, district_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            person_id: row.get(1)?,
            district_id: row.get(2)?,
        })
    }

    fn id(&self) -> Id {
        self.id
    }
}

impl Record for CouncilCandidacy {
    const TABLE: &'static str = "legislative_council";
    const COLUMNS: &'static str = "id, person_id, group_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            person_id: row.get(1)?,
            group_id: row.get(2)?,
        })
    }

    fn id(&self) -> Id {
        self.id
    }
}
