mod query;
mod update;
