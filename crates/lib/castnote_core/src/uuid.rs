// Summary rows are listed newest-first per episode, so their ids are
// generated app-side as UUIDv7. Users keep PG's gen_random_uuid() (v4), except
// in the in-memory user store.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}
