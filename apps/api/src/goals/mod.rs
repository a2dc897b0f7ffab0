// Goal list and goal CRUD over the record store.
pub mod handlers;
