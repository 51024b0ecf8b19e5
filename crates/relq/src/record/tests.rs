use super::*;
use crate::ctx::SqlContext;
use crate::stmt::Statement;
use crate::types::generic;
use crate::wire::{MemoryRow, WireValue};
use pretty_assertions::assert_eq;

#[derive(Debug, Default)]
struct UserRow {
    id: RecordField<i64>,
    name: RecordField<String>,
    email: RecordField<String>,
}

impl Record for UserRow {
    fn describe() -> SqlResult<RecordInfo> {
        RecordInfo::new("users")?
            .key("id", &generic().big_int.not_null)?
            .field("name", &generic().varchar.not_null)?
            .field("email", &generic().varchar.nullable)
    }

    fn write_fields(&self, w: &mut RecordWriter) -> SqlResult<()> {
        w.field("id", true, &generic().big_int.not_null, &self.id)?;
        w.field("name", false, &generic().varchar.not_null, &self.name)?;
        w.field("email", false, &generic().varchar.nullable, &self.email)
    }

    fn load(&mut self, reader: &mut RowReader) -> SqlResult<()> {
        reader.field(&generic().big_int.not_null, &mut self.id)?;
        reader.field(&generic().varchar.not_null, &mut self.name)?;
        reader.field(&generic().varchar.nullable, &mut self.email)
    }
}

#[test]
fn field_three_state_protocol() {
    let mut field: RecordField<i64> = RecordField::new();
    assert!(!field.has_value());
    assert_eq!(field.get(), None);

    field.set_null();
    assert!(field.has_value());
    assert_eq!(field.get(), None);

    field.set(5);
    assert!(field.has_value());
    assert_eq!(field.get(), Some(&5));

    field.drop_value();
    assert!(!field.has_value());
    assert_eq!(field.get(), None);
}

#[test]
fn insert_eligibility_depends_on_key_role() {
    let fresh: RecordField<i64> = RecordField::new();
    // Ordinary columns always participate; keys only once set.
    assert!(fresh.is_data_for_insert(false));
    assert!(!fresh.is_data_for_insert(true));

    let mut set = RecordField::new();
    set.set(1i64);
    assert!(set.is_data_for_insert(true));

    let mut null = RecordField::<i64>::new();
    null.set_null();
    assert!(null.is_data_for_insert(true));

    assert!(!fresh.is_data_for_update());
    assert!(set.is_data_for_update());
}

#[test]
fn insert_omits_unset_primary_key() {
    let ctx = SqlContext::generic();
    let mut user = UserRow::default();
    user.name.set("alice".into());
    user.email.set_null();

    let query = insert_record(&user).unwrap().to_query(&ctx).unwrap();
    assert_eq!(query.sql, "INSERT INTO users (name, email) VALUES (?, ?)");
    assert_eq!(
        query.params,
        vec![WireValue::Text("alice".into()), WireValue::Null]
    );
}

#[test]
fn insert_includes_primary_key_when_set() {
    let ctx = SqlContext::generic();
    let mut user = UserRow::default();
    user.id.set(7);
    user.name.set("alice".into());

    let query = insert_record(&user).unwrap().to_query(&ctx).unwrap();
    assert_eq!(
        query.sql,
        "INSERT INTO users (id, name, email) VALUES (?, ?, ?)"
    );
    assert_eq!(
        query.params,
        vec![
            WireValue::BigInt(7),
            WireValue::Text("alice".into()),
            WireValue::Null,
        ]
    );
}

#[test]
fn update_touches_only_set_fields_and_keys_on_the_primary_key() {
    let ctx = SqlContext::generic();
    let mut user = UserRow::default();
    user.id.set(7);
    user.name.set("bob".into());
    // email stays unset and untouched.

    let query = update_record(&user).unwrap().to_query(&ctx).unwrap();
    assert_eq!(query.sql, "UPDATE users SET name = ? WHERE id = ?");
    assert_eq!(
        query.params,
        vec![WireValue::Text("bob".into()), WireValue::BigInt(7)]
    );
}

#[test]
fn update_without_key_value_is_an_error() {
    let mut user = UserRow::default();
    user.name.set("bob".into());
    assert!(update_record(&user).is_err());
}

#[test]
fn delete_keys_on_the_primary_key() {
    let ctx = SqlContext::generic();
    let mut user = UserRow::default();
    user.id.set(9);

    let query = delete_record(&user).unwrap().to_query(&ctx).unwrap();
    assert_eq!(query.sql, "DELETE FROM users WHERE id = ?");
    assert_eq!(query.params, vec![WireValue::BigInt(9)]);
}

#[test]
fn select_record_lists_mapped_columns_in_declaration_order() {
    let ctx = SqlContext::generic();
    let query = select_record::<UserRow>().unwrap().to_query(&ctx).unwrap();
    assert_eq!(
        query.sql,
        "SELECT users.id, users.name, users.email FROM users"
    );
}

#[test]
fn load_maps_null_to_the_explicit_null_state() {
    let row = MemoryRow::new(vec![
        WireValue::BigInt(3),
        WireValue::Text("carol".into()),
        WireValue::Null,
    ]);
    let mut user = UserRow::default();
    let mut reader = RowReader::new(&row);
    user.load(&mut reader).unwrap();

    assert_eq!(user.id.get(), Some(&3));
    assert_eq!(user.name.get().map(String::as_str), Some("carol"));
    assert!(user.email.has_value());
    assert_eq!(user.email.get(), None);
}

#[test]
fn record_info_is_cached_copy_on_write() {
    let first = record_info::<UserRow>().unwrap();
    let second = record_info::<UserRow>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.table.last_part(), "users");
    assert_eq!(first.fields.len(), 3);
    assert!(first.fields[0].primary_key);
    assert_eq!(first.fields[2].wire_name, "varchar");
}
