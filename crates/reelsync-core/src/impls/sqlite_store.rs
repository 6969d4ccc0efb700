//! SqliteVideoStore - 既存の SQLite DB 上の `videos` テーブル
//!
//! スキーマは作らない・変更しない。起動時に必要なカラムがあるかだけ確認する。

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, Row, params};
use tokio::sync::Mutex;

use crate::domain::{HostedLink, PersistenceError, VideoId, VideoRecord};
use crate::ports::VideoStore;

const REQUIRED_COLUMNS: &[&str] = &["id", "file_path", "title", "description", "vimeo_link"];

/// ロックされた DB を待つ時間
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed store.
///
/// Connection は Sync ではないので tokio の Mutex で包む。
/// ロック中に await はしない（rusqlite の呼び出しはすべて同期関数の中で完結する）。
pub struct SqliteVideoStore {
    conn: Mutex<Connection>,
}

impl SqliteVideoStore {
    /// 既存の DB を開く。ファイルが無ければ作らずにエラーにする。
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        Self::from_connection(conn)
    }

    /// 開済みの Connection から作る（in-memory DB のテストで使う）
    pub fn from_connection(conn: Connection) -> Result<Self, PersistenceError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        verify_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn verify_schema(conn: &Connection) -> Result<(), PersistenceError> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('videos')")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(PersistenceError::MissingSchema("videos".to_string()));
    }
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c.eq_ignore_ascii_case(required)) {
            return Err(PersistenceError::MissingSchema(format!("videos.{required}")));
        }
    }
    Ok(())
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<VideoRecord> {
    // file_path が NULL なら空のパスにする。アップロード側で FileMissing になり、その行だけ失敗する
    let file_path: Option<String> = row.get(1)?;
    // title/description が NULL の行も扱えるようにしておく
    let title: Option<String> = row.get(2)?;
    let description: Option<String> = row.get(3)?;
    let link: Option<String> = row.get(4)?;

    Ok(VideoRecord {
        id: VideoId::new(row.get(0)?),
        file_path: file_path.unwrap_or_default().into(),
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        hosted_link: link.and_then(HostedLink::parse),
    })
}

fn query_pending(
    conn: &Connection,
    after: Option<VideoId>,
    batch_size: usize,
) -> Result<Vec<VideoRecord>, PersistenceError> {
    let mut stmt = conn.prepare_cached(
        "
        SELECT id, file_path, title, description, vimeo_link
        FROM videos
        WHERE (vimeo_link IS NULL OR TRIM(vimeo_link) = '')
          AND id > ?1
        ORDER BY id ASC
        LIMIT ?2
        ",
    )?;

    let after = after.map_or(i64::MIN, VideoId::get);
    let limit = i64::try_from(batch_size).unwrap_or(i64::MAX);

    let rows = stmt.query_map(params![after, limit], map_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(PersistenceError::from)
}

fn update_link(conn: &Connection, id: VideoId, link: &HostedLink) -> Result<(), PersistenceError> {
    let changed = conn.execute(
        "UPDATE videos SET vimeo_link = ?1 WHERE id = ?2",
        params![link.as_str(), id.get()],
    )?;
    if changed == 0 {
        return Err(PersistenceError::NotFound(id));
    }
    Ok(())
}

#[async_trait]
impl VideoStore for SqliteVideoStore {
    async fn fetch_pending(
        &self,
        after: Option<VideoId>,
        batch_size: usize,
    ) -> Result<Vec<VideoRecord>, PersistenceError> {
        let conn = self.conn.lock().await;
        query_pending(&conn, after, batch_size)
    }

    async fn record_link(&self, id: VideoId, link: &HostedLink) -> Result<(), PersistenceError> {
        let conn = self.conn.lock().await;
        update_link(&conn, id, link)
    }

    async fn count_pending(&self) -> Result<u64, PersistenceError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM videos WHERE vimeo_link IS NULL OR TRIM(vimeo_link) = ''",
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;

    pub(crate) const SCHEMA: &str = "
        CREATE TABLE videos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_path TEXT NOT NULL,
            title TEXT,
            description TEXT,
            vimeo_link TEXT
        );
    ";

    /// (id, link) の組で videos を作る
    pub(crate) fn seed(conn: &Connection, rows: &[(i64, Option<&str>)]) {
        conn.execute_batch(SCHEMA).unwrap();
        for (id, link) in rows {
            conn.execute(
                "INSERT INTO videos (id, file_path, title, description, vimeo_link) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, format!("/videos/{id}.mp4"), format!("title {id}"), format!("desc {id}"), link],
            )
            .unwrap();
        }
    }

    fn store_with(rows: &[(i64, Option<&str>)]) -> SqliteVideoStore {
        let conn = Connection::open_in_memory().unwrap();
        seed(&conn, rows);
        SqliteVideoStore::from_connection(conn).unwrap()
    }

    fn ids(records: &[VideoRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id.get()).collect()
    }

    #[tokio::test]
    async fn fetch_pending_returns_rows_in_id_order() {
        let store = store_with(&[(3, None), (1, None), (2, None)]);

        let batch = store.fetch_pending(None, 10).await.unwrap();

        assert_eq!(ids(&batch), vec![1, 2, 3]);
        assert_eq!(batch[0].file_path, Path::new("/videos/1.mp4"));
        assert_eq!(batch[0].title, "title 1");
        assert_eq!(batch[0].description, "desc 1");
        assert!(batch.iter().all(VideoRecord::is_pending));
    }

    #[rstest]
    #[case::one(1)]
    #[case::two(2)]
    #[case::three(3)]
    #[case::larger_than_table(50)]
    #[tokio::test]
    async fn fetch_pending_never_returns_linked_rows(#[case] batch_size: usize) {
        let store = store_with(&[
            (1, Some("https://vimeo.com/1")),
            (2, None),
            (3, Some("https://vimeo.com/3")),
            (4, Some("")),
            (5, None),
            (6, Some("https://vimeo.com/6")),
            (7, Some("   ")),
        ]);

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let batch = store.fetch_pending(cursor, batch_size).await.unwrap();
            assert!(batch.len() <= batch_size);
            let Some(last) = batch.last() else { break };
            cursor = Some(last.id);
            seen.extend(ids(&batch));
        }

        assert_eq!(seen, vec![2, 4, 5, 7]);
    }

    #[tokio::test]
    async fn fetch_pending_respects_cursor() {
        let store = store_with(&[(1, None), (2, None), (3, None)]);

        let batch = store.fetch_pending(Some(VideoId::new(1)), 10).await.unwrap();
        assert_eq!(ids(&batch), vec![2, 3]);

        let batch = store.fetch_pending(Some(VideoId::new(3)), 10).await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn record_link_removes_row_from_pending() {
        let store = store_with(&[(1, None), (2, None)]);
        let link = HostedLink::parse("https://vimeo.com/100").unwrap();

        store.record_link(VideoId::new(1), &link).await.unwrap();

        let batch = store.fetch_pending(None, 10).await.unwrap();
        assert_eq!(ids(&batch), vec![2]);
        assert_eq!(store.count_pending().await.unwrap(), 1);

        let conn = store.conn.lock().await;
        let stored: String = conn
            .query_row("SELECT vimeo_link FROM videos WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, "https://vimeo.com/100");
    }

    #[tokio::test]
    async fn record_link_unknown_id_is_not_found() {
        let store = store_with(&[(1, None)]);
        let link = HostedLink::parse("https://vimeo.com/100").unwrap();

        let err = store.record_link(VideoId::new(99), &link).await.unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(id) if id == VideoId::new(99)));
    }

    #[tokio::test]
    async fn null_title_and_description_read_as_empty() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute("INSERT INTO videos (id, file_path) VALUES (1, '/v/1.mp4')", [])
            .unwrap();
        let store = SqliteVideoStore::from_connection(conn).unwrap();

        let batch = store.fetch_pending(None, 1).await.unwrap();
        assert_eq!(batch[0].title, "");
        assert_eq!(batch[0].description, "");
    }

    #[tokio::test]
    async fn whitespace_only_link_counts_as_pending() {
        let store = store_with(&[(1, Some("    ")), (2, Some("https://vimeo.com/2"))]);

        assert_eq!(store.count_pending().await.unwrap(), 1);
        let batch = store.fetch_pending(None, 10).await.unwrap();
        assert_eq!(ids(&batch), vec![1]);
        assert!(batch[0].hosted_link.is_none());
    }

    #[tokio::test]
    async fn null_file_path_does_not_hide_later_rows() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE videos (id INTEGER PRIMARY KEY, file_path TEXT, title TEXT, description TEXT, vimeo_link TEXT);
             INSERT INTO videos (id, file_path) VALUES (1, NULL);
             INSERT INTO videos (id, file_path) VALUES (2, '/v/2.mp4');",
        )
        .unwrap();
        let store = SqliteVideoStore::from_connection(conn).unwrap();

        let batch = store.fetch_pending(None, 10).await.unwrap();

        assert_eq!(ids(&batch), vec![1, 2]);
        assert_eq!(batch[0].file_path, Path::new(""));
        assert_eq!(batch[1].file_path, Path::new("/v/2.mp4"));
    }

    #[test]
    fn open_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");

        let err = SqliteVideoStore::open(&path).err().unwrap();
        assert!(matches!(err, PersistenceError::Sqlite(_)));
        assert!(!path.exists());
    }

    #[test]
    fn open_rejects_database_without_videos_table() {
        let file = tempfile::NamedTempFile::new().unwrap();
        Connection::open(file.path())
            .unwrap()
            .execute_batch("CREATE TABLE other (id INTEGER PRIMARY KEY);")
            .unwrap();

        let err = SqliteVideoStore::open(file.path()).err().unwrap();
        assert!(matches!(err, PersistenceError::MissingSchema(ref name) if name == "videos"));
    }

    #[test]
    fn open_rejects_table_without_link_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE videos (id INTEGER PRIMARY KEY, file_path TEXT, title TEXT, description TEXT);",
        )
        .unwrap();

        let err = SqliteVideoStore::from_connection(conn).err().unwrap();
        assert!(matches!(err, PersistenceError::MissingSchema(ref name) if name == "videos.vimeo_link"));
    }

    #[tokio::test]
    async fn open_reads_existing_database_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        seed(&Connection::open(file.path()).unwrap(), &[(1, None), (2, Some("https://vimeo.com/2"))]);

        let store = SqliteVideoStore::open(file.path()).unwrap();
        assert_eq!(store.count_pending().await.unwrap(), 1);
    }
}
