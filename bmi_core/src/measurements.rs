//! Append-only measurement log.
//!
//! Records are inserted once and never updated or deleted. Reads return a
//! person's records ordered by timestamp, with same-second ties kept in
//! insertion order.

use crate::types::{format_timestamp, parse_timestamp};
use crate::{Error, Measurement, NewMeasurement, Result, SeriesPoint, Store};
use rusqlite::params;
use rusqlite::types::Value;

/// Measurement log interface
pub trait MeasurementLog {
    /// Durably append one record and return its id
    fn append(&mut self, measurement: &NewMeasurement) -> Result<i64>;

    /// BMI series for `person_name`, oldest first. Unknown names yield an
    /// empty series.
    fn history_for(&self, person_name: &str) -> Result<Vec<SeriesPoint>>;

    /// Full records for `person_name`, oldest first
    fn records_for(&self, person_name: &str) -> Result<Vec<Measurement>>;
}

/// SQLite-backed measurement log
pub struct SqliteMeasurementLog {
    store: Store,
}

impl SqliteMeasurementLog {
    /// Create a log over an already opened store
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }
}

/// Raw row from the `usuarios` table, before parsing into domain types.
/// Columns are untyped in files written by older tools, so any value
/// (including NULL or text in a numeric column) may turn up.
#[derive(Debug)]
struct MeasurementRow {
    id: i64,
    nome: Value,
    peso: Value,
    altura: Value,
    imc: Value,
    data: Value,
}

impl MeasurementRow {
    fn text(&self, column: &str, value: &Value) -> Result<String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Null => Err(self.missing(column)),
            other => Err(self.mistyped(column, other)),
        }
    }

    fn real(&self, column: &str, value: &Value) -> Result<f64> {
        match *value {
            Value::Real(v) => Ok(v),
            Value::Integer(v) => Ok(v as f64),
            Value::Null => Err(self.missing(column)),
            ref other => Err(self.mistyped(column, other)),
        }
    }

    fn missing(&self, column: &str) -> Error {
        Error::Persistence(format!("Row {} has no value for {}", self.id, column))
    }

    fn mistyped(&self, column: &str, value: &Value) -> Error {
        Error::Persistence(format!(
            "Row {} has a {:?} value in {}",
            self.id,
            value.data_type(),
            column
        ))
    }
}

impl TryFrom<MeasurementRow> for Measurement {
    type Error = Error;

    fn try_from(row: MeasurementRow) -> Result<Self> {
        let data = row.text("data", &row.data)?;
        Ok(Measurement {
            id: row.id,
            person_name: row.text("nome", &row.nome)?,
            weight_kg: row.real("peso", &row.peso)?,
            height_m: row.real("altura", &row.altura)?,
            bmi: row.real("imc", &row.imc)?,
            recorded_at: parse_timestamp(&data)?,
        })
    }
}

impl MeasurementLog for SqliteMeasurementLog {
    fn append(&mut self, measurement: &NewMeasurement) -> Result<i64> {
        if measurement.person_name.trim().is_empty() {
            return Err(Error::InvalidInput("name must not be empty".into()));
        }

        let conn = self.store.conn();
        conn.execute(
            "INSERT INTO usuarios (nome, peso, altura, imc, data) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                measurement.person_name,
                measurement.weight_kg,
                measurement.height_m,
                measurement.bmi,
                format_timestamp(&measurement.recorded_at),
            ],
        )?;
        let id = conn.last_insert_rowid();

        tracing::info!(
            "Recorded measurement {} for {:?} (BMI {:.2})",
            id,
            measurement.person_name,
            measurement.bmi
        );
        Ok(id)
    }

    fn history_for(&self, person_name: &str) -> Result<Vec<SeriesPoint>> {
        let series: Vec<SeriesPoint> = self
            .records_for(person_name)?
            .iter()
            .map(SeriesPoint::from)
            .collect();

        tracing::debug!("Loaded {} series points for {:?}", series.len(), person_name);
        Ok(series)
    }

    fn records_for(&self, person_name: &str) -> Result<Vec<Measurement>> {
        let mut stmt = self.store.conn().prepare(
            "SELECT id, nome, peso, altura, imc, data FROM usuarios \
             WHERE nome = ?1 ORDER BY data ASC, id ASC",
        )?;

        let rows = stmt.query_map([person_name], |row| {
            Ok(MeasurementRow {
                id: row.get(0)?,
                nome: row.get(1)?,
                peso: row.get(2)?,
                altura: row.get(3)?,
                imc: row.get(4)?,
                data: row.get(5)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            let row = row?;
            let id = row.id;
            match Measurement::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping unreadable measurement {}: {}", id, e);
                    // Continue reading, don't fail completely
                }
            }
        }

        // Stable sort keeps insertion order for equal timestamps
        records.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn record(name: &str, weight: f64, height: f64, at: NaiveDateTime) -> NewMeasurement {
        NewMeasurement {
            person_name: name.into(),
            weight_kg: weight,
            height_m: height,
            bmi: weight / (height * height),
            recorded_at: at,
        }
    }

    fn memory_log() -> SqliteMeasurementLog {
        SqliteMeasurementLog::new(Store::open_in_memory().unwrap())
    }

    #[test]
    fn test_append_then_history_ends_with_record() {
        let mut log = memory_log();
        log.append(&record("Ana", 60.0, 1.6, ts(1, 9, 0, 0))).unwrap();
        let last = record("Ana", 62.0, 1.6, ts(2, 9, 0, 0));
        log.append(&last).unwrap();

        let series = log.history_for("Ana").unwrap();
        let tail = series.last().unwrap();
        assert_eq!(tail.recorded_at, last.recorded_at);
        assert_eq!(tail.bmi, last.bmi);
    }

    #[test]
    fn test_ids_increase() {
        let mut log = memory_log();
        let first = log.append(&record("Ana", 60.0, 1.6, ts(1, 9, 0, 0))).unwrap();
        let second = log.append(&record("Bia", 70.0, 1.7, ts(1, 9, 0, 0))).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_ana_scenario() {
        crate::logging::init_test();
        let mut log = memory_log();
        let t1 = ts(1, 10, 0, 0);
        let t2 = ts(1, 10, 0, 5);
        log.append(&NewMeasurement {
            person_name: "Ana".into(),
            weight_kg: 60.0,
            height_m: 1.60,
            bmi: 23.4375,
            recorded_at: t1,
        })
        .unwrap();
        log.append(&NewMeasurement {
            person_name: "Ana".into(),
            weight_kg: 61.0,
            height_m: 1.60,
            bmi: 23.828125,
            recorded_at: t2,
        })
        .unwrap();

        let series = log.history_for("Ana").unwrap();
        assert_eq!(
            series,
            vec![
                SeriesPoint {
                    recorded_at: t1,
                    bmi: 23.4375
                },
                SeriesPoint {
                    recorded_at: t2,
                    bmi: 23.828125
                },
            ]
        );
    }

    #[test]
    fn test_history_sorted_regardless_of_insert_order() {
        let mut log = memory_log();
        log.append(&record("Ana", 63.0, 1.6, ts(3, 8, 0, 0))).unwrap();
        log.append(&record("Ana", 60.0, 1.6, ts(1, 8, 0, 0))).unwrap();
        log.append(&record("Ana", 61.0, 1.6, ts(2, 8, 0, 0))).unwrap();

        let series = log.history_for("Ana").unwrap();
        let times: Vec<_> = series.iter().map(|p| p.recorded_at).collect();
        assert_eq!(times, vec![ts(1, 8, 0, 0), ts(2, 8, 0, 0), ts(3, 8, 0, 0)]);
    }

    #[test]
    fn test_same_second_keeps_insertion_order() {
        let mut log = memory_log();
        let at = ts(1, 8, 0, 0);
        log.append(&record("Ana", 60.0, 1.6, at)).unwrap();
        log.append(&record("Ana", 65.0, 1.6, at)).unwrap();
        log.append(&record("Ana", 55.0, 1.6, at)).unwrap();

        let weights: Vec<_> = log
            .records_for("Ana")
            .unwrap()
            .iter()
            .map(|r| r.weight_kg)
            .collect();
        assert_eq!(weights, vec![60.0, 65.0, 55.0]);
    }

    #[test]
    fn test_unknown_person_is_empty() {
        let mut log = memory_log();
        log.append(&record("Ana", 60.0, 1.6, ts(1, 8, 0, 0))).unwrap();
        assert!(log.history_for("unknown person").unwrap().is_empty());
    }

    #[test]
    fn test_matching_is_exact_and_case_sensitive() {
        let mut log = memory_log();
        log.append(&record("Ana", 60.0, 1.6, ts(1, 8, 0, 0))).unwrap();
        log.append(&record("ana", 70.0, 1.6, ts(1, 8, 0, 0))).unwrap();
        log.append(&record("Ana ", 80.0, 1.6, ts(1, 8, 0, 0))).unwrap();

        let records = log.records_for("Ana").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].weight_kg, 60.0);
    }

    #[test]
    fn test_records_keep_stored_bmi() {
        let mut log = memory_log();
        let mut entry = record("Ana", 60.0, 1.6, ts(1, 8, 0, 0));
        entry.bmi = 22.0;
        log.append(&entry).unwrap();

        let records = log.records_for("Ana").unwrap();
        assert_eq!(records[0].bmi, 22.0);
    }

    #[test]
    fn test_append_rejects_empty_name() {
        let mut log = memory_log();
        let err = log.append(&record("  ", 60.0, 1.6, ts(1, 8, 0, 0))).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(log.records_for("  ").unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_rows_are_skipped() {
        let mut log = memory_log();
        log.append(&record("Ana", 60.0, 1.6, ts(1, 8, 0, 0))).unwrap();
        log.store()
            .conn()
            .execute(
                "INSERT INTO usuarios (nome, peso, altura, imc, data) \
                 VALUES ('Ana', 61.0, 1.6, NULL, 'not a date')",
                [],
            )
            .unwrap();

        let series = log.history_for("Ana").unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_non_numeric_values_are_skipped() {
        let mut log = memory_log();
        log.append(&record("Ana", 60.0, 1.6, ts(1, 8, 0, 0))).unwrap();
        log.store()
            .conn()
            .execute_batch(
                "INSERT INTO usuarios (nome, peso, altura, imc, data) \
                     VALUES ('Ana', 'sixty', 1.6, 23.0, '2024-03-02 08:00:00');
                 INSERT INTO usuarios (nome, peso, altura, imc, data) \
                     VALUES ('Ana', 62.0, 1.6, X'00FF', '2024-03-03 08:00:00');
                 INSERT INTO usuarios (nome, peso, altura, imc, data) \
                     VALUES ('Ana', 64, 1.6, 25, '2024-03-04 08:00:00');",
            )
            .unwrap();

        let records = log.records_for("Ana").unwrap();
        let weights: Vec<_> = records.iter().map(|r| r.weight_kg).collect();
        // integer cells are still numbers
        assert_eq!(weights, vec![60.0, 64.0]);
        assert_eq!(records[1].bmi, 25.0);
    }

    #[test]
    fn test_rejected_insert_is_persistence_error() {
        let mut log = memory_log();
        log.append(&record("Ana", 60.0, 1.6, ts(1, 8, 0, 0))).unwrap();
        log.store()
            .conn()
            .execute_batch(
                "CREATE TRIGGER frozen BEFORE INSERT ON usuarios \
                 BEGIN SELECT RAISE(ABORT, 'archive is read-only'); END;",
            )
            .unwrap();

        let err = log.append(&record("Ana", 61.0, 1.6, ts(2, 8, 0, 0))).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(log.history_for("Ana").unwrap().len(), 1);
    }

    #[test]
    fn test_data_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("usuarios.db");

        {
            let mut log = SqliteMeasurementLog::new(Store::open(&db_path).unwrap());
            log.append(&record("Ana", 60.0, 1.6, ts(1, 8, 0, 0))).unwrap();
        }

        let log = SqliteMeasurementLog::new(Store::open(&db_path).unwrap());
        assert_eq!(log.history_for("Ana").unwrap().len(), 1);
    }

    #[test]
    fn test_stored_text_layout() {
        let mut log = memory_log();
        log.append(&record("Ana", 60.0, 1.6, ts(1, 8, 5, 9))).unwrap();

        let data: String = log
            .store()
            .conn()
            .query_row("SELECT data FROM usuarios", [], |row| row.get(0))
            .unwrap();
        assert_eq!(data, "2024-03-01 08:05:09");
    }
}
