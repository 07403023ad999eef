/// Base projection over song ⋈ album ⋈ artist shared by every song listing.
const SONG_SELECT: &str = "SELECT s.id, s.name AS title, s.duration, al.name AS album, ar.name AS artist
             FROM song s
             JOIN album al ON s.album_id = al.id
             JOIN artist ar ON al.artist_id = ar.id";

/// Optional artist/album narrowing for the song list. `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
}

impl SongFilter {
    pub fn new(artist_id: Option<i64>, album_id: Option<i64>) -> Self {
        Self {
            artist_id,
            album_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artist_id.is_none() && self.album_id.is_none()
    }
}

/// A finished read statement plus the values bound to its placeholders, in
/// placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SongQuery {
    pub sql: String,
    pub params: Vec<i64>,
}

/// Compose the song listing for `filter`. Filter values are always bound as
/// parameters; the SQL text only ever varies by which predicates appear.
pub fn build_song_query(filter: &SongFilter) -> SongQuery {
    let mut predicates = Vec::with_capacity(2);
    let mut params = Vec::with_capacity(2);

    if let Some(artist_id) = filter.artist_id {
        params.push(artist_id);
        predicates.push(format!("ar.id = ?{}", params.len()));
    }
    if let Some(album_id) = filter.album_id {
        params.push(album_id);
        predicates.push(format!("al.id = ?{}", params.len()));
    }

    let mut sql = String::from(SONG_SELECT);
    if !predicates.is_empty() {
        sql.push_str("\n             WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    sql.push_str("\n             ORDER BY s.id");

    SongQuery { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filter_has_no_predicate() {
        let query = build_song_query(&SongFilter::default());

        assert!(!query.sql.contains("WHERE"));
        assert!(query.params.is_empty());
    }

    #[test]
    fn artist_only() {
        let query = build_song_query(&SongFilter::new(Some(2), None));

        assert!(query.sql.contains("WHERE ar.id = ?1"));
        assert!(!query.sql.contains("al.id = ?"));
        assert_eq!(query.params, vec![2]);
    }

    #[test]
    fn album_only() {
        let query = build_song_query(&SongFilter::new(None, Some(5)));

        assert!(query.sql.contains("WHERE al.id = ?1"));
        assert!(!query.sql.contains("ar.id = ?"));
        assert_eq!(query.params, vec![5]);
    }

    #[test]
    fn both_filters_are_conjunctive() {
        let query = build_song_query(&SongFilter::new(Some(1), Some(3)));

        assert!(query.sql.contains("WHERE ar.id = ?1 AND al.id = ?2"));
        assert_eq!(query.params, vec![1, 3]);
    }

    #[test]
    fn ids_never_reach_the_sql_text() {
        let query = build_song_query(&SongFilter::new(Some(987_654), Some(123_456)));

        assert!(!query.sql.contains("987654"));
        assert!(!query.sql.contains("123456"));
    }
}
