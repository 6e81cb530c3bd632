//! Ship storage: registration and the last-report pointer.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::model::{Report, Ship};

use super::{Result, Storage, StorageError, parse_decimal, parse_opt_uuid, parse_timestamp, parse_uuid};

impl Storage {
    /// Registers a new ship.
    pub fn register_ship(&self, ship: &Ship) -> Result<()> {
        let conn = self.connect()?;
        if find_ship(&conn, ship.id)?.is_some() {
            return Err(StorageError::ShipAlreadyExists(ship.id));
        }
        conn.execute(
            "INSERT INTO ship (id, name, propeller_pitch, last_report, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                ship.id.to_string(),
                &ship.name,
                ship.propeller_pitch.map(|p| p.to_string()),
                ship.last_report.map(|r| r.to_string()),
                ship.created_at.to_string(),
            ],
        )?;
        info!(ship_id = %ship.id, name = %ship.name, "registered ship");
        Ok(())
    }

    /// Loads a ship.
    pub fn load_ship(&self, id: Uuid) -> Result<Ship> {
        let conn = self.connect()?;
        load_ship_row(&conn, id)
    }

    /// Lists all ships in registration order.
    pub fn list_ships(&self) -> Result<Vec<Ship>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, propeller_pitch, last_report, created_at
             FROM ship ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], ShipRow::read)?;
        let mut ships = Vec::new();
        for row in rows {
            ships.push(row?.into_ship()?);
        }
        Ok(ships)
    }

    /// The most recent report a ship has filed, if any.
    pub fn latest_report(&self, ship_id: Uuid) -> Result<Option<Report>> {
        let conn = self.connect()?;
        let ship = load_ship_row(&conn, ship_id)?;
        ship.last_report
            .map(|id| super::report::load_report_row(&conn, id))
            .transpose()
    }
}

struct ShipRow {
    id: String,
    name: String,
    propeller_pitch: Option<String>,
    last_report: Option<String>,
    created_at: String,
}

impl ShipRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            propeller_pitch: row.get(2)?,
            last_report: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn into_ship(self) -> Result<Ship> {
        Ok(Ship {
            id: parse_uuid(&self.id, "ship id")?,
            name: self.name,
            propeller_pitch: self
                .propeller_pitch
                .as_deref()
                .map(|p| parse_decimal(p, "propeller pitch"))
                .transpose()?,
            last_report: parse_opt_uuid(self.last_report, "last report")?,
            created_at: parse_timestamp(&self.created_at, "ship created_at")?,
        })
    }
}

fn find_ship(conn: &Connection, id: Uuid) -> Result<Option<Ship>> {
    conn.query_row(
        "SELECT id, name, propeller_pitch, last_report, created_at FROM ship WHERE id = ?1",
        [id.to_string()],
        ShipRow::read,
    )
    .optional()?
    .map(ShipRow::into_ship)
    .transpose()
}

pub(super) fn load_ship_row(conn: &Connection, id: Uuid) -> Result<Ship> {
    find_ship(conn, id)?.ok_or(StorageError::ShipNotFound(id))
}

/// Moves a ship's last-report pointer.
pub(super) fn set_last_report(conn: &Connection, ship_id: Uuid, report_id: Uuid) -> Result<()> {
    let rows = conn.execute(
        "UPDATE ship SET last_report = ?1 WHERE id = ?2",
        [report_id.to_string(), ship_id.to_string()],
    )?;
    if rows == 0 {
        return Err(StorageError::ShipNotFound(ship_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal::Decimal;

    use crate::storage::tests::test_storage;

    #[test]
    fn register_and_load_ship() {
        let (_dir, storage) = test_storage();
        let ship = Ship::new("Nordic Tern", Some(Decimal::new(452, 2)));

        storage.register_ship(&ship).unwrap();
        let loaded = storage.load_ship(ship.id).unwrap();

        assert_eq!(loaded.name, "Nordic Tern");
        assert_eq!(loaded.propeller_pitch, Some(Decimal::new(452, 2)));
        assert_eq!(loaded.last_report, None);
    }

    #[test]
    fn register_duplicate_ship_fails() {
        let (_dir, storage) = test_storage();
        let ship = Ship::new("Nordic Tern", None);

        storage.register_ship(&ship).unwrap();
        let err = storage.register_ship(&ship).unwrap_err();

        assert!(matches!(err, StorageError::ShipAlreadyExists(_)));
    }

    #[test]
    fn load_nonexistent_ship_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_ship(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::ShipNotFound(_)));
    }

    #[test]
    fn list_ships_in_registration_order() {
        let (_dir, storage) = test_storage();
        let first = Ship::new("First", None);
        let second = Ship::new("Second", None);

        storage.register_ship(&first).unwrap();
        storage.register_ship(&second).unwrap();

        let names: Vec<_> = storage
            .list_ships()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["First", "Second"]);
    }

    #[test]
    fn latest_report_empty_for_new_ship() {
        let (_dir, storage) = test_storage();
        let ship = Ship::new("Nordic Tern", None);
        storage.register_ship(&ship).unwrap();

        assert_eq!(storage.latest_report(ship.id).unwrap(), None);
    }
}
