use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,      // assigned by the database
    pub name: String, // unique by convention, not by constraint
}
