use std::time::{Duration, Instant};

use rusqlite::Connection;

/// Number of VM instructions between deadline checks.
const PROGRESS_INTERVAL_OPS: i32 = 100;

/// Run `read` with a deadline. SQLite interrupts the running statement once
/// `timeout` has elapsed, which surfaces as an `OperationInterrupted` error
/// from whichever call was stepping it.
pub(crate) fn with_deadline<T>(
    conn: &Connection,
    timeout: Duration,
    read: impl FnOnce(&Connection) -> T,
) -> T {
    let deadline = Instant::now() + timeout;
    conn.progress_handler(
        PROGRESS_INTERVAL_OPS,
        Some(move || Instant::now() >= deadline),
    );
    let result = read(conn);
    conn.progress_handler(PROGRESS_INTERVAL_OPS, None::<fn() -> bool>);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ErrorCode;

    const LONG_COUNT: &str = "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 50000000)
         SELECT COUNT(*) FROM n";

    #[test]
    fn long_reads_are_interrupted() {
        let conn = Connection::open_in_memory().unwrap();

        let result: rusqlite::Result<i64> = with_deadline(&conn, Duration::from_millis(10), |conn| {
            conn.query_row(LONG_COUNT, [], |row| row.get(0))
        });

        let err = result.unwrap_err();
        assert_eq!(err.sqlite_error_code(), Some(ErrorCode::OperationInterrupted));
    }

    #[test]
    fn handler_is_removed_afterwards() {
        let conn = Connection::open_in_memory().unwrap();
        let quick: i64 = with_deadline(&conn, Duration::from_millis(1), |conn| {
            conn.query_row("SELECT 41 + 1", [], |row| row.get(0))
        })
        .unwrap();
        assert_eq!(quick, 42);

        std::thread::sleep(Duration::from_millis(20));
        // A deadline that already passed would interrupt this if it lingered.
        let total: i64 = conn
            .query_row(
                "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 10000)
                 SELECT COUNT(*) FROM n",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(total, 10000);
    }
}
